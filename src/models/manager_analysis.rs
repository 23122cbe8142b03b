//! Manager 4M analysis models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{DefectResponse, DefectStatus, UpsertOutcome, normalize_text};

/// Root-cause analysis along the machine / method / manpower / material axes.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ManagerAnalysis {
    pub id: Uuid,
    pub defect_id: Uuid,
    pub machine: Option<String>,
    pub method: Option<String>,
    pub manpower: Option<String>,
    pub material: Option<String>,
    pub manager_name: Option<String>,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

/// The editable fields of an analysis. Any subset may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct AnalysisForm {
    #[serde(default)]
    pub machine: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub manpower: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub manager_name: Option<String>,
}

impl AnalysisForm {
    pub fn normalized(self) -> Self {
        Self {
            machine: normalize_text(self.machine),
            method: normalize_text(self.method),
            manpower: normalize_text(self.manpower),
            material: normalize_text(self.material),
            manager_name: normalize_text(self.manager_name),
        }
    }
}

/// Request body for `PUT /defects/{id}/analysis`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitAnalysisRequest {
    #[serde(flatten)]
    pub form: AnalysisForm,
    /// Status the defect should have after saving. Saving never closes implicitly.
    pub status: DefectStatus,
}

/// Response for an analysis upsert.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisSaved {
    pub outcome: UpsertOutcome,
    pub manager_analysis: ManagerAnalysis,
    pub defect: DefectResponse,
}
