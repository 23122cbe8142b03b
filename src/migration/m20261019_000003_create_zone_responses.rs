//! Migration: Create zone_responses table.
//!
//! One row per (defect, zone), written by that zone's group leader.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE zone_responses (
                    id UUID PRIMARY KEY,
                    defect_id UUID NOT NULL REFERENCES defects(id) ON DELETE CASCADE,
                    zone VARCHAR(2) NOT NULL
                        CHECK (zone IN ('L1', 'L2', 'L3', 'L4', 'R0', 'R1', 'R2', 'R3', 'R4')),
                    involved BOOLEAN NOT NULL DEFAULT TRUE,
                    root_cause TEXT,
                    action_taken TEXT,
                    manpower_name VARCHAR(255),
                    manpower_ein VARCHAR(50),
                    created_by UUID REFERENCES users(id) ON DELETE SET NULL,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                    CONSTRAINT zone_responses_defect_zone_key UNIQUE (defect_id, zone)
                );

                CREATE TRIGGER update_zone_responses_updated_at
                    BEFORE UPDATE ON zone_responses
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TRIGGER IF EXISTS update_zone_responses_updated_at ON zone_responses;
                DROP TABLE IF EXISTS zone_responses CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
