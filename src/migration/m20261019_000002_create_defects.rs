//! Migration: Create defects table.

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
                CREATE TABLE defects (
                    id UUID PRIMARY KEY,
                    report_id VARCHAR(40) NOT NULL,
                    vehicle_frame_no VARCHAR(100) NOT NULL,
                    model_name VARCHAR(255) NOT NULL,
                    defect_category VARCHAR(100) NOT NULL,
                    defect_notes TEXT,
                    image_key VARCHAR(500),

                    -- JSON array of zone codes, never empty
                    targeted_zones JSONB NOT NULL
                        CHECK (jsonb_typeof(targeted_zones) = 'array'
                               AND jsonb_array_length(targeted_zones) > 0),

                    status VARCHAR(10) NOT NULL DEFAULT 'OPEN'
                        CHECK (status IN ('OPEN', 'CLOSED')),
                    created_by UUID REFERENCES users(id) ON DELETE SET NULL,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE UNIQUE INDEX idx_defects_report_id ON defects(report_id);

                -- Listing newest first, optionally filtered by status
                CREATE INDEX idx_defects_created_at ON defects(created_at DESC);
                CREATE INDEX idx_defects_status ON defects(status, created_at DESC);

                CREATE TRIGGER update_defects_updated_at
                    BEFORE UPDATE ON defects
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
                DROP TRIGGER IF EXISTS update_defects_updated_at ON defects;
                DROP TABLE IF EXISTS defects CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
