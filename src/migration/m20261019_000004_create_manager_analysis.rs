//! Migration: Create manager_analysis table.
//!
//! At most one 4M analysis per defect.

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
                CREATE TABLE manager_analysis (
                    id UUID PRIMARY KEY,
                    defect_id UUID NOT NULL REFERENCES defects(id) ON DELETE CASCADE,
                    machine TEXT,
                    method TEXT,
                    manpower TEXT,
                    material TEXT,
                    manager_name VARCHAR(255),
                    updated_by UUID REFERENCES users(id) ON DELETE SET NULL,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                    CONSTRAINT manager_analysis_defect_id_key UNIQUE (defect_id)
                );

                CREATE TRIGGER update_manager_analysis_updated_at
                    BEFORE UPDATE ON manager_analysis
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
                DROP TRIGGER IF EXISTS update_manager_analysis_updated_at ON manager_analysis;
                DROP TABLE IF EXISTS manager_analysis CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
