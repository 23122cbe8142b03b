//! Domain models for the defect tracker.

pub mod defect;
pub mod manager_analysis;
pub mod role;
pub mod user;
pub mod ws_event;
pub mod zone;
pub mod zone_response;

// Re-export commonly used types
pub use defect::{
    CreateDefectRequest, Defect, DefectCounts, DefectDetailResponse, DefectListResponse,
    DefectResponse, DefectStatus, ListDefectsQuery, NewDefect, SignedUrlQuery, SignedUrlResponse,
    ViewerConstraints,
};
pub use manager_analysis::{AnalysisForm, AnalysisSaved, ManagerAnalysis, SubmitAnalysisRequest};
pub use role::{Principal, Role, RoleAssignment};
pub use user::{SessionClaims, SessionResponse, SignInRequest, SignUpRequest, User, UserResponse};
pub use ws_event::{WsEvent, WsEventMessage};
pub use zone::{Side, Zone, ZoneInfo};
pub use zone_response::{
    SubmitZoneResponseRequest, UpsertOutcome, ZoneFindings, ZoneResponse, ZoneResponseSaved,
};

/// Trim a free-text field, mapping blank input to `None`.
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
