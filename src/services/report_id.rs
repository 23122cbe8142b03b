//! Human-readable defect report ids.

use chrono::{DateTime, Utc};

/// Prefix of every report id.
pub const REPORT_ID_PREFIX: &str = "DEF";

/// Generate a report id such as `DEF-20261019143005-9F3A61C2`.
///
/// The timestamp keeps ids sortable by eye; the random suffix keeps ids
/// created in the same second distinct. The unique index on
/// `defects.report_id` catches the remaining collisions.
pub fn generate_report_id(now: DateTime<Utc>) -> String {
    let suffix: [u8; 4] = rand::random();
    format!(
        "{}-{}-{}",
        REPORT_ID_PREFIX,
        now.format("%Y%m%d%H%M%S"),
        hex::encode_upper(suffix)
    )
}
