//! Defect domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{ManagerAnalysis, ZoneResponse, Zone};

/// Defect status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum DefectStatus {
    Open,
    Closed,
}

impl DefectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(Self::Open),
            "CLOSED" => Some(Self::Closed),
            _ => None,
        }
    }
}

impl std::fmt::Display for DefectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A logged defect (aggregate root).
#[derive(Debug, Clone, PartialEq)]
pub struct Defect {
    pub id: Uuid,
    /// Human-readable code, e.g. `DEF-20261019143005-9F3A61C2`.
    pub report_id: String,
    pub vehicle_frame_no: String,
    pub model_name: String,
    pub defect_category: String,
    pub defect_notes: Option<String>,
    /// Object storage key of the photo, if one was uploaded.
    pub image_key: Option<String>,
    /// Zones the inspector flagged. Never empty, no duplicates.
    pub targeted_zones: Vec<Zone>,
    pub status: DefectStatus,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to log a new defect.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateDefectRequest {
    pub vehicle_frame_no: String,
    pub model_name: String,
    pub defect_category: String,
    #[serde(default)]
    pub defect_notes: Option<String>,
    /// Key returned by `POST /images`.
    #[serde(default)]
    pub image_key: Option<String>,
    pub targeted_zones: Vec<Zone>,
}

/// Validated fields for a new defect, produced by the lifecycle gate.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDefect {
    pub vehicle_frame_no: String,
    pub model_name: String,
    pub defect_category: String,
    pub defect_notes: Option<String>,
    pub image_key: Option<String>,
    pub targeted_zones: Vec<Zone>,
}

/// Defect as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DefectResponse {
    pub id: Uuid,
    pub report_id: String,
    pub vehicle_frame_no: String,
    pub model_name: String,
    pub defect_category: String,
    pub defect_notes: Option<String>,
    pub image_key: Option<String>,
    /// Permanent public URL of the photo.
    pub image_url: Option<String>,
    pub targeted_zones: Vec<Zone>,
    pub status: DefectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DefectResponse {
    pub fn from_defect(defect: Defect, image_url: Option<String>) -> Self {
        Self {
            id: defect.id,
            report_id: defect.report_id,
            vehicle_frame_no: defect.vehicle_frame_no,
            model_name: defect.model_name,
            defect_category: defect.defect_category,
            defect_notes: defect.defect_notes,
            image_key: defect.image_key,
            image_url,
            targeted_zones: defect.targeted_zones,
            status: defect.status,
            created_at: defect.created_at,
            updated_at: defect.updated_at,
        }
    }
}

/// Query parameters for listing defects.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ListDefectsQuery {
    /// Only return defects in this status.
    #[serde(default)]
    pub status: Option<DefectStatus>,
}

/// Per-status totals, independent of the list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DefectCounts {
    pub all: u64,
    pub open: u64,
    pub closed: u64,
}

/// Defect list response.
#[derive(Debug, Serialize, ToSchema)]
pub struct DefectListResponse {
    pub defects: Vec<DefectResponse>,
    pub counts: DefectCounts,
}

/// What the calling user may do on a defect detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ViewerConstraints {
    /// The caller's zone, for group leaders.
    pub zone: Option<Zone>,
    /// The caller's zone is targeted, so "not involved" is unavailable.
    pub zone_is_targeted: bool,
    pub can_respond: bool,
    pub can_analyze: bool,
}

/// Defect detail with everything recorded against it.
#[derive(Debug, Serialize, ToSchema)]
pub struct DefectDetailResponse {
    pub defect: DefectResponse,
    pub zone_responses: Vec<ZoneResponse>,
    pub manager_analysis: Option<ManagerAnalysis>,
    pub viewer: ViewerConstraints,
}

/// Query parameters for a signed image URL.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignedUrlQuery {
    /// Validity in seconds (default 3600, max 604800).
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Signed image URL response.
#[derive(Debug, Serialize, ToSchema)]
pub struct SignedUrlResponse {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}
