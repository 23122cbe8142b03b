//! Zone response models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Zone, normalize_text};

/// A group leader's investigation result for one zone of one defect.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ZoneResponse {
    pub id: Uuid,
    pub defect_id: Uuid,
    pub zone: Zone,
    pub involved: bool,
    pub root_cause: Option<String>,
    pub action_taken: Option<String>,
    pub manpower_name: Option<String>,
    pub manpower_ein: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Free-text findings recorded with a zone response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct ZoneFindings {
    #[serde(default)]
    pub root_cause: Option<String>,
    #[serde(default)]
    pub action_taken: Option<String>,
    #[serde(default)]
    pub manpower_name: Option<String>,
    /// Employee identification number of the responsible operator.
    #[serde(default)]
    pub manpower_ein: Option<String>,
}

impl ZoneFindings {
    /// Trim every field and turn blanks into `None`.
    pub fn normalized(self) -> Self {
        Self {
            root_cause: normalize_text(self.root_cause),
            action_taken: normalize_text(self.action_taken),
            manpower_name: normalize_text(self.manpower_name),
            manpower_ein: normalize_text(self.manpower_ein),
        }
    }
}

/// Request body for `PUT /defects/{id}/zone-response`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitZoneResponseRequest {
    /// Zone the caller is responding for. Must be the caller's own zone.
    pub zone: Zone,
    pub involved: bool,
    #[serde(flatten)]
    pub findings: ZoneFindings,
}

/// Whether an upsert inserted a new row or rewrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Response for a zone response upsert.
#[derive(Debug, Serialize, ToSchema)]
pub struct ZoneResponseSaved {
    pub outcome: UpsertOutcome,
    pub zone_response: ZoneResponse,
}
