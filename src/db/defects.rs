//! Database queries for defects.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::warn;
use uuid::Uuid;

use crate::entity::defect::{self, ActiveModel, Entity as DefectEntity};
use crate::error::{AppError, AppResult};
use crate::models::{Defect, DefectCounts, DefectStatus, NewDefect, Zone};
use crate::services::report_id::generate_report_id;

use super::{DbPool, is_unique_violation};

impl DbPool {
    /// Insert a new OPEN defect with a generated report id.
    ///
    /// A report id collision is retried once with a fresh id.
    pub async fn insert_defect(
        &self,
        new: NewDefect,
        created_by: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Defect> {
        let zones = serde_json::to_value(&new.targeted_zones)?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let model = ActiveModel {
                id: Set(Uuid::now_v7()),
                report_id: Set(generate_report_id(now)),
                vehicle_frame_no: Set(new.vehicle_frame_no.clone()),
                model_name: Set(new.model_name.clone()),
                defect_category: Set(new.defect_category.clone()),
                defect_notes: Set(new.defect_notes.clone()),
                image_key: Set(new.image_key.clone()),
                targeted_zones: Set(zones.clone()),
                status: Set(DefectStatus::Open.as_str().to_string()),
                created_by: Set(Some(created_by)),
                created_at: Set(now),
                updated_at: Set(now),
            };

            match model.insert(self.connection()).await {
                Ok(inserted) => return model_to_defect(inserted),
                Err(e) if attempt == 1 && is_unique_violation(&e) => {
                    warn!("Report id collision, regenerating");
                }
                Err(e) => {
                    return Err(AppError::Database(format!("Failed to insert defect: {}", e)));
                }
            }
        }
    }

    /// Get a defect by ID.
    pub async fn get_defect(&self, id: Uuid) -> AppResult<Option<Defect>> {
        let result = DefectEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get defect: {}", e)))?;

        result.map(model_to_defect).transpose()
    }

    /// List defects newest first, optionally filtered by status.
    pub async fn list_defects(&self, status: Option<DefectStatus>) -> AppResult<Vec<Defect>> {
        let mut query = DefectEntity::find();
        if let Some(status) = status {
            query = query.filter(defect::Column::Status.eq(status.as_str()));
        }

        let models = query
            .order_by_desc(defect::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list defects: {}", e)))?;

        models.into_iter().map(model_to_defect).collect()
    }

    /// Count defects per status.
    pub async fn count_defects(&self) -> AppResult<DefectCounts> {
        let open = DefectEntity::find()
            .filter(defect::Column::Status.eq(DefectStatus::Open.as_str()))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count defects: {}", e)))?;
        let closed = DefectEntity::find()
            .filter(defect::Column::Status.eq(DefectStatus::Closed.as_str()))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count defects: {}", e)))?;

        Ok(DefectCounts {
            all: open + closed,
            open,
            closed,
        })
    }
}

pub(crate) fn model_to_defect(m: defect::Model) -> AppResult<Defect> {
    let targeted_zones: Vec<Zone> = serde_json::from_value(m.targeted_zones).map_err(|e| {
        AppError::Database(format!("Invalid targeted_zones for defect {}: {}", m.id, e))
    })?;
    let status = DefectStatus::parse(&m.status).ok_or_else(|| {
        AppError::Database(format!("Unknown status '{}' for defect {}", m.status, m.id))
    })?;

    Ok(Defect {
        id: m.id,
        report_id: m.report_id,
        vehicle_frame_no: m.vehicle_frame_no,
        model_name: m.model_name,
        defect_category: m.defect_category,
        defect_notes: m.defect_notes,
        image_key: m.image_key,
        targeted_zones,
        status,
        created_by: m.created_by,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}
