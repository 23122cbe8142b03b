//! Database queries for manager analyses.

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::defect::{self, Entity as DefectEntity};
use crate::entity::manager_analysis::{self, ActiveModel, Entity as AnalysisEntity};
use crate::error::{AppError, AppResult};
use crate::models::{Defect, ManagerAnalysis};

use super::DbPool;
use super::defects::model_to_defect;

impl DbPool {
    /// The analysis recorded for a defect, if any.
    pub async fn get_manager_analysis(&self, defect_id: Uuid) -> AppResult<Option<ManagerAnalysis>> {
        find_analysis(self.connection(), defect_id).await
    }

    /// Every analysis, for the export.
    pub async fn list_all_manager_analyses(&self) -> AppResult<Vec<ManagerAnalysis>> {
        let models = AnalysisEntity::find()
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list analyses: {}", e)))?;

        Ok(models.into_iter().map(model_to_analysis).collect())
    }

    /// Save the analysis and the defect status together.
    ///
    /// Both writes share one transaction: either both are visible or neither.
    /// The defect row is only written when its stored status differs.
    pub async fn save_analysis_with_status(
        &self,
        analysis: &ManagerAnalysis,
        defect: &Defect,
    ) -> AppResult<(ManagerAnalysis, Defect)> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let model = ActiveModel {
            id: Set(analysis.id),
            defect_id: Set(analysis.defect_id),
            machine: Set(analysis.machine.clone()),
            method: Set(analysis.method.clone()),
            manpower: Set(analysis.manpower.clone()),
            material: Set(analysis.material.clone()),
            manager_name: Set(analysis.manager_name.clone()),
            updated_by: Set(analysis.updated_by),
            created_at: Set(analysis.updated_at),
            updated_at: Set(analysis.updated_at),
        };

        AnalysisEntity::insert(model)
            .on_conflict(
                OnConflict::column(manager_analysis::Column::DefectId)
                    .update_columns([
                        manager_analysis::Column::Machine,
                        manager_analysis::Column::Method,
                        manager_analysis::Column::Manpower,
                        manager_analysis::Column::Material,
                        manager_analysis::Column::ManagerName,
                        manager_analysis::Column::UpdatedBy,
                        manager_analysis::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to save analysis: {}", e)))?;

        // Rows already in the target status are left alone so the
        // updated_at trigger only fires on a real transition.
        DefectEntity::update_many()
            .col_expr(defect::Column::Status, Expr::value(defect.status.as_str()))
            .filter(defect::Column::Id.eq(defect.id))
            .filter(defect::Column::Status.ne(defect.status.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to update defect status: {}", e)))?;

        let saved = find_analysis(&txn, analysis.defect_id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to fetch saved analysis".to_string()))?;
        let updated = DefectEntity::find_by_id(defect.id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get defect: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Defect {}", defect.id)))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit analysis: {}", e)))?;

        Ok((saved, model_to_defect(updated)?))
    }
}

async fn find_analysis<C: ConnectionTrait>(
    conn: &C,
    defect_id: Uuid,
) -> AppResult<Option<ManagerAnalysis>> {
    let result = AnalysisEntity::find()
        .filter(manager_analysis::Column::DefectId.eq(defect_id))
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get analysis: {}", e)))?;

    Ok(result.map(model_to_analysis))
}

fn model_to_analysis(m: manager_analysis::Model) -> ManagerAnalysis {
    ManagerAnalysis {
        id: m.id,
        defect_id: m.defect_id,
        machine: m.machine,
        method: m.method,
        manpower: m.manpower,
        material: m.material,
        manager_name: m.manager_name,
        updated_by: m.updated_by,
        updated_at: m.updated_at,
    }
}
