//! Production line zones.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Side of the line a zone belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// One of the nine fixed line segments a defect can be traced to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
pub enum Zone {
    L1,
    L2,
    L3,
    L4,
    R0,
    R1,
    R2,
    R3,
    R4,
}

impl Zone {
    /// All zones in line order.
    pub const ALL: [Zone; 9] = [
        Zone::L1,
        Zone::L2,
        Zone::L3,
        Zone::L4,
        Zone::R0,
        Zone::R1,
        Zone::R2,
        Zone::R3,
        Zone::R4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::L3 => "L3",
            Self::L4 => "L4",
            Self::R0 => "R0",
            Self::R1 => "R1",
            Self::R2 => "R2",
            Self::R3 => "R3",
            Self::R4 => "R4",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "L1" => Some(Self::L1),
            "L2" => Some(Self::L2),
            "L3" => Some(Self::L3),
            "L4" => Some(Self::L4),
            "R0" => Some(Self::R0),
            "R1" => Some(Self::R1),
            "R2" => Some(Self::R2),
            "R3" => Some(Self::R3),
            "R4" => Some(Self::R4),
            _ => None,
        }
    }

    pub fn side(&self) -> Side {
        match self {
            Self::L1 | Self::L2 | Self::L3 | Self::L4 => Side::Left,
            Self::R0 | Self::R1 | Self::R2 | Self::R3 | Self::R4 => Side::Right,
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Zone catalogue entry returned by `GET /zones`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ZoneInfo {
    pub zone: Zone,
    pub side: Side,
}

impl From<Zone> for ZoneInfo {
    fn from(zone: Zone) -> Self {
        Self {
            zone,
            side: zone.side(),
        }
    }
}
