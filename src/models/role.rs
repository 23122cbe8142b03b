//! Roles and the authenticated principal.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Zone;

/// Account role, assigned at sign-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    FinalInspector,
    GroupLeader,
    Manager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FinalInspector => "final_inspector",
            Self::GroupLeader => "group_leader",
            Self::Manager => "manager",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "final_inspector" => Some(Self::FinalInspector),
            "group_leader" => Some(Self::GroupLeader),
            "manager" => Some(Self::Manager),
            _ => None,
        }
    }

    /// Display label shown next to the user's name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FinalInspector => "Final Inspector",
            Self::GroupLeader => "Group Leader",
            Self::Manager => "Manager",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A role together with the data that role carries.
///
/// Group leaders own exactly one zone; the other roles own none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleAssignment {
    FinalInspector,
    GroupLeader { zone: Zone },
    Manager,
}

impl RoleAssignment {
    /// Combine a stored role and optional zone.
    ///
    /// Fails if a group leader has no zone or another role has one.
    pub fn from_parts(role: Role, zone: Option<Zone>) -> Result<Self, String> {
        match (role, zone) {
            (Role::GroupLeader, Some(zone)) => Ok(Self::GroupLeader { zone }),
            (Role::GroupLeader, None) => Err("group_leader accounts require a zone".to_string()),
            (Role::FinalInspector, None) => Ok(Self::FinalInspector),
            (Role::Manager, None) => Ok(Self::Manager),
            (role, Some(_)) => Err(format!("{} accounts cannot carry a zone", role)),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::FinalInspector => Role::FinalInspector,
            Self::GroupLeader { .. } => Role::GroupLeader,
            Self::Manager => Role::Manager,
        }
    }

    pub fn zone(&self) -> Option<Zone> {
        match self {
            Self::GroupLeader { zone } => Some(*zone),
            Self::FinalInspector | Self::Manager => None,
        }
    }
}

/// The caller of a gated operation, resolved from the session and the users table.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub name: String,
    pub assignment: RoleAssignment,
}

impl Principal {
    pub fn new(user_id: Uuid, name: impl Into<String>, assignment: RoleAssignment) -> Self {
        Self {
            user_id,
            name: name.into(),
            assignment,
        }
    }

    pub fn role(&self) -> Role {
        self.assignment.role()
    }

    pub fn zone(&self) -> Option<Zone> {
        self.assignment.zone()
    }

    pub fn is_manager(&self) -> bool {
        matches!(self.assignment, RoleAssignment::Manager)
    }
}
