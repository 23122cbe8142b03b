//! Database queries for zone responses.

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseBackend, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    Statement,
};
use uuid::Uuid;

use crate::entity::zone_response::{self, Entity as ZoneResponseEntity};
use crate::error::{AppError, AppResult};
use crate::models::{UpsertOutcome, Zone, ZoneResponse};

use super::DbPool;

const UPSERT_SQL: &str = r#"
    INSERT INTO zone_responses (
        id, defect_id, zone, involved, root_cause, action_taken,
        manpower_name, manpower_ein, created_by, created_at, updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
    ON CONFLICT (defect_id, zone) DO UPDATE SET
        involved = EXCLUDED.involved,
        root_cause = EXCLUDED.root_cause,
        action_taken = EXCLUDED.action_taken,
        manpower_name = EXCLUDED.manpower_name,
        manpower_ein = EXCLUDED.manpower_ein,
        updated_at = EXCLUDED.updated_at
    RETURNING
        id, defect_id, zone, involved, root_cause, action_taken,
        manpower_name, manpower_ein, created_by, created_at, updated_at,
        (xmax = 0) AS inserted
"#;

/// A zone response row as returned by the upsert, plus whether it was new.
#[derive(Debug, FromQueryResult)]
struct UpsertedRow {
    id: Uuid,
    defect_id: Uuid,
    zone: String,
    involved: bool,
    root_cause: Option<String>,
    action_taken: Option<String>,
    manpower_name: Option<String>,
    manpower_ein: Option<String>,
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    inserted: bool,
}

impl UpsertedRow {
    fn into_model(self) -> zone_response::Model {
        zone_response::Model {
            id: self.id,
            defect_id: self.defect_id,
            zone: self.zone,
            involved: self.involved,
            root_cause: self.root_cause,
            action_taken: self.action_taken,
            manpower_name: self.manpower_name,
            manpower_ein: self.manpower_ein,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn outcome_of(inserted: bool) -> UpsertOutcome {
    if inserted {
        UpsertOutcome::Created
    } else {
        UpsertOutcome::Updated
    }
}

impl DbPool {
    /// All responses recorded for a defect, in zone order.
    pub async fn list_zone_responses(&self, defect_id: Uuid) -> AppResult<Vec<ZoneResponse>> {
        let models = ZoneResponseEntity::find()
            .filter(zone_response::Column::DefectId.eq(defect_id))
            .order_by_asc(zone_response::Column::Zone)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list zone responses: {}", e)))?;

        models.into_iter().map(model_to_zone_response).collect()
    }

    /// Every zone response, for the export.
    pub async fn list_all_zone_responses(&self) -> AppResult<Vec<ZoneResponse>> {
        let models = ZoneResponseEntity::find()
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list zone responses: {}", e)))?;

        models.into_iter().map(model_to_zone_response).collect()
    }

    /// Insert or rewrite the response for `(defect_id, zone)`.
    ///
    /// Concurrent writes for the same zone resolve last-write-wins; the row
    /// keeps its id, author and creation time. The outcome is read from the
    /// write itself (`xmax = 0` only on a freshly inserted row), so it holds
    /// even when another submission for the zone landed first.
    pub async fn upsert_zone_response(
        &self,
        response: &ZoneResponse,
    ) -> AppResult<(ZoneResponse, UpsertOutcome)> {
        let values: Vec<sea_orm::Value> = vec![
            response.id.into(),
            response.defect_id.into(),
            response.zone.as_str().into(),
            response.involved.into(),
            response.root_cause.clone().into(),
            response.action_taken.clone().into(),
            response.manpower_name.clone().into(),
            response.manpower_ein.clone().into(),
            response.created_by.into(),
            response.created_at.into(),
            response.updated_at.into(),
        ];

        let row = UpsertedRow::find_by_statement(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            UPSERT_SQL,
            values,
        ))
        .one(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to save zone response: {}", e)))?
        .ok_or_else(|| AppError::Database("Zone response upsert returned no row".to_string()))?;

        let outcome = outcome_of(row.inserted);
        Ok((model_to_zone_response(row.into_model())?, outcome))
    }
}

fn model_to_zone_response(m: zone_response::Model) -> AppResult<ZoneResponse> {
    let zone = Zone::parse(&m.zone).ok_or_else(|| {
        AppError::Database(format!("Unknown zone '{}' on zone response {}", m.zone, m.id))
    })?;

    Ok(ZoneResponse {
        id: m.id,
        defect_id: m.defect_id,
        zone,
        involved: m.involved,
        root_cause: m.root_cause,
        action_taken: m.action_taken,
        manpower_name: m.manpower_name,
        manpower_ein: m.manpower_ein,
        created_by: m.created_by,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_follows_the_write() {
        assert_eq!(outcome_of(true), UpsertOutcome::Created);
        assert_eq!(outcome_of(false), UpsertOutcome::Updated);
    }

    #[test]
    fn test_upsert_keeps_identity_columns() {
        let (_, set_clause) = UPSERT_SQL
            .split_once("DO UPDATE SET")
            .expect("upsert has an update clause");
        let (set_clause, _) = set_clause.split_once("RETURNING").unwrap();
        for column in ["id =", "created_by =", "created_at =", "defect_id =", "zone ="] {
            assert!(
                !set_clause.contains(&format!(" {}", column)),
                "{} must survive a rewrite",
                column
            );
        }
        assert!(UPSERT_SQL.contains("(xmax = 0) AS inserted"));
    }
}
