//! Spreadsheet export of the defect register.
//!
//! [`build_export_rows`] flattens defects, zone responses and analyses into
//! one row per defect; [`write_workbook`] renders those rows as an xlsx file.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Defect, ManagerAnalysis, ZoneResponse};

/// Worksheet name.
pub const SHEET_NAME: &str = "Defects Report";

/// Header row, in column order.
pub const EXPORT_HEADERS: [&str; 16] = [
    "Visual Evidence",
    "Report ID",
    "Date",
    "Time",
    "Vehicle Frame No",
    "Model",
    "Defect Category",
    "Defect Details",
    "Targeted Zones",
    "Zone Analysis & Findings",
    "Machine (4M)",
    "Method (4M)",
    "Manpower (4M)",
    "Material (4M)",
    "Manager Name",
    "Status",
];

/// Column widths in characters, matching [`EXPORT_HEADERS`].
const COLUMN_WIDTHS: [f64; 16] = [
    40.0, 25.0, 12.0, 10.0, 20.0, 20.0, 18.0, 40.0, 25.0, 60.0, 30.0, 30.0, 30.0, 30.0, 20.0,
    10.0,
];

const NO_IMAGE: &str = "No Image";
const NO_RESPONSES: &str = "No responses yet";

/// One flattened defect row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub visual_evidence: String,
    pub report_id: String,
    pub date: String,
    pub time: String,
    pub vehicle_frame_no: String,
    pub model: String,
    pub defect_category: String,
    pub defect_details: String,
    pub targeted_zones: String,
    pub zone_findings: String,
    pub machine: String,
    pub method: String,
    pub manpower: String,
    pub material: String,
    pub manager_name: String,
    pub status: String,
}

impl ExportRow {
    /// Cell values in header order.
    pub fn cells(&self) -> [&str; 16] {
        [
            &self.visual_evidence,
            &self.report_id,
            &self.date,
            &self.time,
            &self.vehicle_frame_no,
            &self.model,
            &self.defect_category,
            &self.defect_details,
            &self.targeted_zones,
            &self.zone_findings,
            &self.machine,
            &self.method,
            &self.manpower,
            &self.material,
            &self.manager_name,
            &self.status,
        ]
    }
}

/// Render one zone response as a findings line.
pub fn format_zone_line(response: &ZoneResponse) -> String {
    if !response.involved {
        return format!("{}: Not Involved", response.zone);
    }

    let mut parts = vec![format!("{}: Involved", response.zone)];
    if let Some(root_cause) = &response.root_cause {
        parts.push(format!("Root Cause: {}", root_cause));
    }
    if let Some(action) = &response.action_taken {
        parts.push(format!("Action: {}", action));
    }
    if let Some(name) = &response.manpower_name {
        parts.push(format!(
            "Manpower: {} ({})",
            name,
            response.manpower_ein.as_deref().unwrap_or("N/A")
        ));
    }
    parts.join(" | ")
}

/// Join the findings lines of a defect, in line order of the zones.
pub fn format_zone_findings(responses: &[&ZoneResponse]) -> String {
    if responses.is_empty() {
        return NO_RESPONSES.to_string();
    }
    let mut sorted: Vec<&ZoneResponse> = responses.to_vec();
    sorted.sort_by_key(|r| r.zone);
    sorted
        .into_iter()
        .map(format_zone_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Flatten the register into export rows, newest defect first.
///
/// `image_url` turns a stored image key into the link written in the
/// "Visual Evidence" column.
pub fn build_export_rows<F>(
    defects: &[Defect],
    zone_responses: &[ZoneResponse],
    analyses: &[ManagerAnalysis],
    offset: FixedOffset,
    image_url: F,
) -> Vec<ExportRow>
where
    F: Fn(&str) -> Option<String>,
{
    let mut responses_by_defect: HashMap<Uuid, Vec<&ZoneResponse>> = HashMap::new();
    for response in zone_responses {
        responses_by_defect
            .entry(response.defect_id)
            .or_default()
            .push(response);
    }

    let analysis_by_defect: HashMap<Uuid, &ManagerAnalysis> =
        analyses.iter().map(|a| (a.defect_id, a)).collect();

    let mut ordered: Vec<&Defect> = defects.iter().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    ordered
        .into_iter()
        .map(|defect| {
            let created = defect.created_at.with_timezone(&offset);
            let responses = responses_by_defect
                .get(&defect.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let analysis = analysis_by_defect.get(&defect.id).copied();

            ExportRow {
                visual_evidence: defect
                    .image_key
                    .as_deref()
                    .and_then(&image_url)
                    .unwrap_or_else(|| NO_IMAGE.to_string()),
                report_id: defect.report_id.clone(),
                date: created.format("%Y-%m-%d").to_string(),
                time: created.format("%H:%M:%S").to_string(),
                vehicle_frame_no: defect.vehicle_frame_no.clone(),
                model: defect.model_name.clone(),
                defect_category: defect.defect_category.clone(),
                defect_details: defect.defect_notes.clone().unwrap_or_default(),
                targeted_zones: defect
                    .targeted_zones
                    .iter()
                    .map(|z| z.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                zone_findings: format_zone_findings(responses),
                machine: analysis.and_then(|a| a.machine.clone()).unwrap_or_default(),
                method: analysis.and_then(|a| a.method.clone()).unwrap_or_default(),
                manpower: analysis.and_then(|a| a.manpower.clone()).unwrap_or_default(),
                material: analysis.and_then(|a| a.material.clone()).unwrap_or_default(),
                manager_name: analysis.and_then(|a| a.manager_name.clone()).unwrap_or_default(),
                status: defect.status.as_str().to_string(),
            }
        })
        .collect()
}

/// Download filename, e.g. `Defects_Report_2026-10-19_1430.xlsx`.
pub fn export_filename(now: DateTime<Utc>, offset: FixedOffset) -> String {
    format!(
        "Defects_Report_{}.xlsx",
        now.with_timezone(&offset).format("%Y-%m-%d_%H%M")
    )
}

/// Render rows as an xlsx workbook with a bold header row.
pub fn write_workbook(rows: &[ExportRow]) -> AppResult<Vec<u8>> {
    build_workbook(rows).map_err(|e| AppError::Export(format!("Failed to build workbook: {}", e)))
}

fn build_workbook(rows: &[ExportRow]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let cell_format = Format::new().set_text_wrap();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, (header, width)) in EXPORT_HEADERS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, width)?;
        worksheet.write_string_with_format(0, col, *header, &header_format)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let row_num = (i + 1) as u32;
        for (col, value) in row.cells().iter().enumerate() {
            worksheet.write_string_with_format(row_num, col as u16, *value, &cell_format)?;
        }
    }

    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DefectStatus, Zone};
    use chrono::TimeZone;

    fn defect(report_id: &str, created_at: DateTime<Utc>, zones: &[Zone]) -> Defect {
        Defect {
            id: Uuid::now_v7(),
            report_id: report_id.to_string(),
            vehicle_frame_no: "MA3FRAME001".to_string(),
            model_name: "Swift VXI".to_string(),
            defect_category: "Paint Defect".to_string(),
            defect_notes: None,
            image_key: None,
            targeted_zones: zones.to_vec(),
            status: DefectStatus::Open,
            created_by: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn response(defect_id: Uuid, zone: Zone, involved: bool) -> ZoneResponse {
        let now = Utc::now();
        ZoneResponse {
            id: Uuid::now_v7(),
            defect_id,
            zone,
            involved,
            root_cause: None,
            action_taken: None,
            manpower_name: None,
            manpower_ein: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_zone_line_formats() {
        let id = Uuid::now_v7();
        assert_eq!(
            format_zone_line(&response(id, Zone::R0, false)),
            "R0: Not Involved"
        );

        let mut r = response(id, Zone::L2, true);
        r.root_cause = Some("loose clamp".to_string());
        r.manpower_name = Some("Ravi".to_string());
        assert_eq!(
            format_zone_line(&r),
            "L2: Involved | Root Cause: loose clamp | Manpower: Ravi (N/A)"
        );

        r.action_taken = Some("retrained".to_string());
        r.manpower_ein = Some("E1042".to_string());
        assert_eq!(
            format_zone_line(&r),
            "L2: Involved | Root Cause: loose clamp | Action: retrained | Manpower: Ravi (E1042)"
        );
    }

    #[test]
    fn test_rows_one_per_defect_newest_first() {
        let older = defect(
            "DEF-A",
            Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap(),
            &[Zone::L2, Zone::R1],
        );
        let mut newer = defect(
            "DEF-B",
            Utc.with_ymd_and_hms(2026, 1, 2, 23, 30, 15).unwrap(),
            &[Zone::R4],
        );
        newer.image_key = Some("0190.png".to_string());
        newer.defect_notes = Some("scratch on door".to_string());

        let responses = vec![
            response(older.id, Zone::R1, true),
            response(older.id, Zone::L2, true),
            response(older.id, Zone::R0, false),
        ];
        let analyses = vec![ManagerAnalysis {
            id: Uuid::now_v7(),
            defect_id: older.id,
            machine: Some("die wear".to_string()),
            method: None,
            manpower: None,
            material: None,
            manager_name: Some("Meera".to_string()),
            updated_by: None,
            updated_at: Utc::now(),
        }];

        let rows = build_export_rows(
            &[older.clone(), newer.clone()],
            &responses,
            &analyses,
            utc(),
            |key| Some(format!("https://img.example.com/{}", key)),
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].report_id, "DEF-B");
        assert_eq!(rows[0].visual_evidence, "https://img.example.com/0190.png");
        assert_eq!(rows[0].zone_findings, "No responses yet");
        assert_eq!(rows[0].defect_details, "scratch on door");
        assert_eq!(rows[0].date, "2026-01-02");
        assert_eq!(rows[0].time, "23:30:15");
        assert_eq!(rows[0].machine, "");

        assert_eq!(rows[1].visual_evidence, "No Image");
        assert_eq!(rows[1].targeted_zones, "L2, R1");
        assert_eq!(rows[1].zone_findings.lines().count(), 3);
        assert!(rows[1].zone_findings.starts_with("L2: Involved"));
        assert_eq!(rows[1].machine, "die wear");
        assert_eq!(rows[1].manager_name, "Meera");
        assert_eq!(rows[1].status, "OPEN");
    }

    #[test]
    fn test_offset_shifts_date_and_time() {
        let d = defect(
            "DEF-C",
            Utc.with_ymd_and_hms(2026, 3, 31, 20, 0, 0).unwrap(),
            &[Zone::L1],
        );
        let ist = FixedOffset::east_opt(330 * 60).unwrap();
        let rows = build_export_rows(&[d], &[], &[], ist, |_| None);
        assert_eq!(rows[0].date, "2026-04-01");
        assert_eq!(rows[0].time, "01:30:00");
    }

    #[test]
    fn test_export_filename() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 14, 30, 59).unwrap();
        assert_eq!(
            export_filename(now, utc()),
            "Defects_Report_2026-10-19_1430.xlsx"
        );
    }

    #[test]
    fn test_workbook_is_xlsx() {
        let d = defect("DEF-D", Utc::now(), &[Zone::L3]);
        let rows = build_export_rows(&[d], &[], &[], utc(), |_| None);
        let bytes = write_workbook(&rows).unwrap();
        assert!(bytes.starts_with(b"PK"));

        let empty = write_workbook(&[]).unwrap();
        assert!(empty.starts_with(b"PK"));
    }
}
