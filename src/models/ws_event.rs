//! WebSocket event types for real-time updates.
//!
//! Events are invalidation signals: clients re-fetch the affected views
//! instead of applying the payload as a delta.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DefectStatus, Zone};

/// WebSocket event sent to connected clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
#[serde(rename_all = "snake_case")]
pub enum WsEvent {
    /// A defect was logged.
    DefectCreated(DefectCreatedPayload),
    /// A defect row changed (status update).
    DefectUpdated(DefectUpdatedPayload),
    /// A zone response was inserted or rewritten.
    ZoneResponseSaved(ZoneResponseSavedPayload),
    /// A manager analysis was inserted or rewritten.
    AnalysisSaved(AnalysisSavedPayload),
}

/// Payload for defect_created event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefectCreatedPayload {
    pub defect_id: Uuid,
    pub report_id: String,
    pub targeted_zones: Vec<Zone>,
    pub created_at: DateTime<Utc>,
}

/// Payload for defect_updated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefectUpdatedPayload {
    pub defect_id: Uuid,
    pub status: DefectStatus,
}

/// Payload for zone_response_saved event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneResponseSavedPayload {
    pub defect_id: Uuid,
    pub zone: Zone,
}

/// Payload for analysis_saved event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSavedPayload {
    pub defect_id: Uuid,
}

/// Wrapper that includes timestamp with every event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsEventMessage {
    #[serde(flatten)]
    pub event: WsEvent,
    pub timestamp: DateTime<Utc>,
}

impl WsEventMessage {
    /// Create a new event message with the current timestamp.
    pub fn new(event: WsEvent) -> Self {
        Self {
            event,
            timestamp: Utc::now(),
        }
    }
}

impl WsEvent {
    pub fn defect_created(
        defect_id: Uuid,
        report_id: String,
        targeted_zones: Vec<Zone>,
        created_at: DateTime<Utc>,
    ) -> Self {
        WsEvent::DefectCreated(DefectCreatedPayload {
            defect_id,
            report_id,
            targeted_zones,
            created_at,
        })
    }

    pub fn defect_updated(defect_id: Uuid, status: DefectStatus) -> Self {
        WsEvent::DefectUpdated(DefectUpdatedPayload { defect_id, status })
    }

    pub fn zone_response_saved(defect_id: Uuid, zone: Zone) -> Self {
        WsEvent::ZoneResponseSaved(ZoneResponseSavedPayload { defect_id, zone })
    }

    pub fn analysis_saved(defect_id: Uuid) -> Self {
        WsEvent::AnalysisSaved(AnalysisSavedPayload { defect_id })
    }

    /// Defect the event refers to.
    pub fn defect_id(&self) -> Uuid {
        match self {
            WsEvent::DefectCreated(p) => p.defect_id,
            WsEvent::DefectUpdated(p) => p.defect_id,
            WsEvent::ZoneResponseSaved(p) => p.defect_id,
            WsEvent::AnalysisSaved(p) => p.defect_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_shape() {
        let id = Uuid::now_v7();
        let msg = WsEventMessage::new(WsEvent::zone_response_saved(id, Zone::R1));
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["type"], "zone_response_saved");
        assert_eq!(value["payload"]["zone"], "R1");
        assert_eq!(value["payload"]["defect_id"], id.to_string());
        assert!(value.get("timestamp").is_some());
    }

    #[test]
    fn test_defect_id_accessor() {
        let id = Uuid::now_v7();
        assert_eq!(WsEvent::defect_updated(id, DefectStatus::Closed).defect_id(), id);
        assert_eq!(WsEvent::analysis_saved(id).defect_id(), id);
    }
}
