//! Defect lifecycle gate.
//!
//! Pure decision functions: given the acting principal, the current records
//! and a requested change, decide whether the change is allowed and produce
//! the records that should be persisted. Nothing here touches the database,
//! so callers load the current state, call the gate, then write the result.
//!
//! Status machine: `OPEN <-> CLOSED`, reachable only through
//! [`submit_manager_analysis`] by a manager. Responding zones never move the
//! status.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    AnalysisForm, CreateDefectRequest, Defect, DefectStatus, ManagerAnalysis, NewDefect,
    Principal, RoleAssignment, UpsertOutcome, ViewerConstraints, Zone, ZoneFindings,
    ZoneResponse, normalize_text,
};

/// Result of a zone response submission: the record to persist and whether it is new.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneResponseUpsert {
    pub outcome: UpsertOutcome,
    pub response: ZoneResponse,
}

/// Result of a manager analysis submission.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisUpsert {
    pub outcome: UpsertOutcome,
    pub analysis: ManagerAnalysis,
    pub defect: Defect,
}

/// Longest values the schema stores, in characters.
pub mod limits {
    pub const VEHICLE_FRAME_NO: usize = 100;
    pub const MODEL_NAME: usize = 255;
    pub const DEFECT_CATEGORY: usize = 100;
    pub const IMAGE_KEY: usize = 500;
    pub const MANPOWER_NAME: usize = 255;
    pub const MANPOWER_EIN: usize = 50;
    pub const MANAGER_NAME: usize = 255;
    pub const EMAIL: usize = 255;
    pub const USER_NAME: usize = 255;
}

/// Reject `value` when it is longer than the column that stores it.
pub fn check_length(field: &str, value: &str, max: usize) -> AppResult<()> {
    if value.chars().count() > max {
        return Err(AppError::InvalidInput(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

fn check_optional_length(field: &str, value: Option<&str>, max: usize) -> AppResult<()> {
    value.map_or(Ok(()), |v| check_length(field, v, max))
}

/// Whether `zone` is one of the zones the inspector targeted on `defect`.
pub fn is_targeted_zone(defect: &Defect, zone: Zone) -> bool {
    defect.targeted_zones.contains(&zone)
}

/// Only final inspectors log defects.
pub fn authorize_defect_creation(principal: &Principal) -> AppResult<()> {
    match principal.assignment {
        RoleAssignment::FinalInspector => Ok(()),
        RoleAssignment::GroupLeader { .. } | RoleAssignment::Manager => {
            Err(AppError::PermissionDenied(format!(
                "{} cannot log defects",
                principal.role().label()
            )))
        }
    }
}

/// Validate a new defect request and normalize its fields.
pub fn validate_new_defect(request: CreateDefectRequest) -> AppResult<NewDefect> {
    let vehicle_frame_no = required_text(
        request.vehicle_frame_no,
        "vehicle_frame_no",
        limits::VEHICLE_FRAME_NO,
    )?;
    let model_name = required_text(request.model_name, "model_name", limits::MODEL_NAME)?;
    let defect_category = required_text(
        request.defect_category,
        "defect_category",
        limits::DEFECT_CATEGORY,
    )?;

    let mut targeted_zones: Vec<Zone> = Vec::with_capacity(request.targeted_zones.len());
    for zone in request.targeted_zones {
        if !targeted_zones.contains(&zone) {
            targeted_zones.push(zone);
        }
    }
    if targeted_zones.is_empty() {
        return Err(AppError::InvalidInput(
            "at least one targeted zone is required".to_string(),
        ));
    }

    Ok(NewDefect {
        vehicle_frame_no,
        model_name,
        defect_category,
        defect_notes: normalize_text(request.defect_notes),
        image_key: normalize_text(request.image_key),
        targeted_zones,
    })
}

fn required_text(value: String, field: &str, max: usize) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", field)));
    }
    check_length(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

/// Check that the principal is the group leader of `acting_zone`.
pub fn authorize_zone_response(principal: &Principal, acting_zone: Zone) -> AppResult<()> {
    match principal.assignment {
        RoleAssignment::GroupLeader { zone } if zone == acting_zone => Ok(()),
        RoleAssignment::GroupLeader { zone } => Err(AppError::PermissionDenied(format!(
            "group leader of {} cannot respond for zone {}",
            zone, acting_zone
        ))),
        RoleAssignment::FinalInspector | RoleAssignment::Manager => {
            Err(AppError::PermissionDenied(format!(
                "{} cannot submit zone responses",
                principal.role().label()
            )))
        }
    }
}

/// Decide a zone response submission.
///
/// Upserts on `(defect.id, acting_zone)`: an existing response keeps its id,
/// author and creation time. A targeted zone cannot decline involvement.
pub fn submit_zone_response(
    defect: &Defect,
    existing_responses: &[ZoneResponse],
    principal: &Principal,
    acting_zone: Zone,
    involved: bool,
    findings: ZoneFindings,
    now: DateTime<Utc>,
) -> AppResult<ZoneResponseUpsert> {
    authorize_zone_response(principal, acting_zone)?;

    if !involved && is_targeted_zone(defect, acting_zone) {
        return Err(AppError::InvalidStateTransition(format!(
            "targeted zone cannot decline involvement ({} is targeted on {})",
            acting_zone, defect.report_id
        )));
    }

    let findings = findings.normalized();
    check_optional_length(
        "manpower_name",
        findings.manpower_name.as_deref(),
        limits::MANPOWER_NAME,
    )?;
    check_optional_length(
        "manpower_ein",
        findings.manpower_ein.as_deref(),
        limits::MANPOWER_EIN,
    )?;

    let existing = existing_responses
        .iter()
        .find(|r| r.defect_id == defect.id && r.zone == acting_zone);

    let (outcome, id, created_by, created_at) = match existing {
        Some(r) => (UpsertOutcome::Updated, r.id, r.created_by, r.created_at),
        None => (
            UpsertOutcome::Created,
            Uuid::now_v7(),
            Some(principal.user_id),
            now,
        ),
    };

    Ok(ZoneResponseUpsert {
        outcome,
        response: ZoneResponse {
            id,
            defect_id: defect.id,
            zone: acting_zone,
            involved,
            root_cause: findings.root_cause,
            action_taken: findings.action_taken,
            manpower_name: findings.manpower_name,
            manpower_ein: findings.manpower_ein,
            created_by,
            created_at,
            updated_at: now,
        },
    })
}

/// Only managers record analyses and change status.
pub fn authorize_manager(principal: &Principal) -> AppResult<()> {
    if principal.is_manager() {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(format!(
            "{} cannot analyze or change defect status",
            principal.role().label()
        )))
    }
}

/// Decide a manager analysis submission.
///
/// Upserts the single analysis for the defect and sets the status to exactly
/// `desired_status`. Any subset of the 4M fields may be empty, including all
/// of them when closing.
pub fn submit_manager_analysis(
    defect: &Defect,
    existing_analysis: Option<&ManagerAnalysis>,
    principal: &Principal,
    form: AnalysisForm,
    desired_status: DefectStatus,
    now: DateTime<Utc>,
) -> AppResult<AnalysisUpsert> {
    authorize_manager(principal)?;

    let form = form.normalized();
    check_optional_length(
        "manager_name",
        form.manager_name.as_deref(),
        limits::MANAGER_NAME,
    )?;
    let (outcome, id) = match existing_analysis.filter(|a| a.defect_id == defect.id) {
        Some(a) => (UpsertOutcome::Updated, a.id),
        None => (UpsertOutcome::Created, Uuid::now_v7()),
    };

    let analysis = ManagerAnalysis {
        id,
        defect_id: defect.id,
        machine: form.machine,
        method: form.method,
        manpower: form.manpower,
        material: form.material,
        manager_name: form.manager_name,
        updated_by: Some(principal.user_id),
        updated_at: now,
    };

    let mut updated = defect.clone();
    updated.status = desired_status;
    if desired_status != defect.status {
        updated.updated_at = now;
    }

    Ok(AnalysisUpsert {
        outcome,
        analysis,
        defect: updated,
    })
}

/// What the principal may do on the detail view of `defect`.
pub fn viewer_constraints(defect: &Defect, principal: &Principal) -> ViewerConstraints {
    let zone = principal.zone();
    ViewerConstraints {
        zone,
        zone_is_targeted: zone.is_some_and(|z| is_targeted_zone(defect, z)),
        can_respond: zone.is_some(),
        can_analyze: principal.is_manager(),
    }
}
