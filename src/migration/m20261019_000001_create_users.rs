//! Migration: Create users table and shared trigger function.
//!
//! Accounts carry their role; group leaders also carry their zone.

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
                -- Shared trigger function for updated_at
                CREATE OR REPLACE FUNCTION update_updated_at_column()
                RETURNS TRIGGER AS $$
                BEGIN
                    NEW.updated_at = NOW();
                    RETURN NEW;
                END;
                $$ LANGUAGE plpgsql;

                CREATE TABLE users (
                    id UUID PRIMARY KEY,
                    email VARCHAR(255) NOT NULL,
                    name VARCHAR(255) NOT NULL,
                    role VARCHAR(20) NOT NULL
                        CHECK (role IN ('final_inspector', 'group_leader', 'manager')),
                    zone VARCHAR(2)
                        CHECK (zone IN ('L1', 'L2', 'L3', 'L4', 'R0', 'R1', 'R2', 'R3', 'R4')),
                    password_hash TEXT NOT NULL,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                    -- Group leaders own exactly one zone, other roles none
                    CONSTRAINT users_role_zone_check CHECK (
                        (role = 'group_leader' AND zone IS NOT NULL)
                        OR (role <> 'group_leader' AND zone IS NULL)
                    )
                );

                -- Case-insensitive unique email
                CREATE UNIQUE INDEX idx_users_email_lower ON users(LOWER(email));

                CREATE TRIGGER update_users_updated_at
                    BEFORE UPDATE ON users
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
                DROP TRIGGER IF EXISTS update_users_updated_at ON users;
                DROP TABLE IF EXISTS users CASCADE;
                DROP FUNCTION IF EXISTS update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }
}
