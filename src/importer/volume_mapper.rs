// ==========================================
// RAB 估价引擎 - 工程量模板映射
// ==========================================
// 模板列: URAIAN_PEKERJAAN, VOLUME, LOKASI
// 可选列: SATUAN, MINGGU_MULAI, DURASI_MINGGU
// 缺省: LOKASI = "-", MINGGU_MULAI = 1, DURASI_MINGGU = 1
// 周次窗口超出 MAX_SCHEDULE_WEEK 的行跳过（INVALID_WEEK）
// ==========================================

use crate::domain::cell::{Cell, RawSheet};
use crate::domain::import::{ParseDiagnostic, SkipReason};
use crate::domain::project::{VolumeRow, WeekWindow, MAX_SCHEDULE_WEEK};
use crate::importer::importer_trait::{SheetContext, SheetMapper, SheetOutcome};
use crate::importer::normalizer::{cell_coefficient, cell_text, clean_text};
use tracing::{info, warn};

pub const COL_DESCRIPTION: &str = "URAIAN_PEKERJAAN";
pub const COL_VOLUME: &str = "VOLUME";
pub const COL_LOCATION: &str = "LOKASI";
pub const COL_UNIT: &str = "SATUAN";
pub const COL_START_WEEK: &str = "MINGGU_MULAI";
pub const COL_DURATION: &str = "DURASI_MINGGU";

/// 表头标签归一: 大写，空格与连字符视为下划线
fn header_label(cell: &Cell) -> Option<String> {
    let text = cell.as_text()?;
    Some(
        clean_text(text, true)
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VolumeLayout {
    description: usize,
    volume: usize,
    location: Option<usize>,
    unit: Option<usize>,
    start_week: Option<usize>,
    duration: Option<usize>,
}

impl VolumeLayout {
    fn from_header(row: &[Cell]) -> Option<Self> {
        let labels: Vec<Option<String>> = row.iter().map(header_label).collect();
        let find = |name: &str| labels.iter().position(|l| l.as_deref() == Some(name));

        Some(Self {
            description: find(COL_DESCRIPTION)?,
            volume: find(COL_VOLUME)?,
            location: find(COL_LOCATION),
            unit: find(COL_UNIT),
            start_week: find(COL_START_WEEK),
            duration: find(COL_DURATION),
        })
    }
}

fn text_at(row: &[Cell], col: Option<usize>) -> Option<String> {
    cell_text(row.get(col?))
}

/// 周次列: 取整，缺失或小于 1 时为 1；超过 MAX_SCHEDULE_WEEK 时为 None
fn week_at(row: &[Cell], col: Option<usize>) -> Option<u32> {
    let week = col
        .and_then(|c| row.get(c))
        .map(cell_coefficient)
        .filter(|p| p.was_parsed && p.value >= 1.0)
        .map(|p| p.value.round());
    match week {
        None => Some(1),
        Some(w) if w <= f64::from(MAX_SCHEDULE_WEEK) => Some(w as u32),
        Some(_) => None,
    }
}

/// 工程量模板映射器
#[derive(Debug, Clone, Default)]
pub struct VolumeMapper;

impl SheetMapper for VolumeMapper {
    type Output = VolumeRow;

    fn map_sheet(&self, sheet: &RawSheet, _context: &SheetContext) -> SheetOutcome<VolumeRow> {
        let mut outcome = SheetOutcome::default();

        let header = sheet
            .rows
            .iter()
            .enumerate()
            .find_map(|(idx, row)| VolumeLayout::from_header(row).map(|l| (idx, l)));

        let Some((header_idx, layout)) = header else {
            warn!(sheet = %sheet.name, "未找到工程量模板表头");
            for (idx, row) in sheet.rows.iter().enumerate() {
                let reason = if row.iter().all(Cell::is_empty) {
                    SkipReason::Blank
                } else {
                    SkipReason::Unrecognized
                };
                outcome.skipped.record(reason);
                outcome.diagnostics.push(ParseDiagnostic {
                    sheet: sheet.name.clone(),
                    row_number: idx + 1,
                    reason,
                });
            }
            return outcome;
        };

        for (idx, row) in sheet.rows.iter().enumerate().skip(header_idx + 1) {
            let row_number = idx + 1;
            let mut skip = |reason: SkipReason| {
                outcome.skipped.record(reason);
                outcome.diagnostics.push(ParseDiagnostic {
                    sheet: sheet.name.clone(),
                    row_number,
                    reason,
                });
            };

            if row.iter().all(Cell::is_empty) {
                skip(SkipReason::Blank);
                continue;
            }

            let Some(description) = text_at(row, Some(layout.description)) else {
                skip(SkipReason::MissingName);
                continue;
            };

            let volume = row
                .get(layout.volume)
                .map(cell_coefficient)
                .filter(|p| p.was_parsed && p.value >= 0.0);
            let Some(volume) = volume else {
                skip(SkipReason::MissingVolume);
                continue;
            };

            let window = week_at(row, layout.start_week)
                .zip(week_at(row, layout.duration))
                .map(|(start, duration)| WeekWindow::new(start, duration))
                .filter(WeekWindow::within_limit);
            let Some(window) = window else {
                skip(SkipReason::InvalidWeek);
                continue;
            };

            outcome.items.push(VolumeRow {
                row_number,
                description,
                volume: volume.value,
                location: text_at(row, layout.location).unwrap_or_else(|| "-".to_string()),
                unit: text_at(row, layout.unit),
                start_week: window.start,
                duration_weeks: window.duration,
            });
        }

        info!(
            sheet = %sheet.name,
            rows = outcome.items.len(),
            skipped = outcome.skipped_rows(),
            "工程量模板映射完成"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn num(v: f64) -> Cell {
        Cell::Number(v)
    }

    #[test]
    fn test_template_rows_with_defaults() {
        let sheet = RawSheet::new(
            "Input_Volume",
            vec![
                vec![text("NO"), text("URAIAN_PEKERJAAN"), text("VOLUME"), text("LOKASI")],
                vec![num(1.0), text("Galian tanah pondasi"), num(50.5), text("Lantai 1")],
                vec![num(2.0), text("Pasang bata merah"), text("120,0"), Cell::Empty],
                vec![num(3.0), Cell::Empty, num(15.0), text("Lantai 2")],
                vec![num(4.0), text("Cor beton kolom"), text("belum diukur")],
            ],
        );

        let outcome = VolumeMapper.map_sheet(&sheet, &SheetContext::default());
        assert_eq!(outcome.items.len(), 2);

        let first = &outcome.items[0];
        assert_eq!(first.row_number, 2);
        assert_eq!(first.volume, 50.5);
        assert_eq!(first.location, "Lantai 1");
        assert_eq!(first.start_week, 1);
        assert_eq!(first.duration_weeks, 1);
        assert!(first.unit.is_none());

        assert_eq!(outcome.items[1].volume, 120.0);
        assert_eq!(outcome.items[1].location, "-");

        assert_eq!(outcome.skipped.missing_name, 1);
        assert_eq!(outcome.skipped.missing_volume, 1);
    }

    #[test]
    fn test_optional_schedule_columns() {
        let sheet = RawSheet::new(
            "Input_Volume",
            vec![
                vec![
                    text("Uraian Pekerjaan"),
                    text("Volume"),
                    text("Satuan"),
                    text("Minggu Mulai"),
                    text("Durasi Minggu"),
                ],
                vec![text("Urugan pasir"), num(12.0), text("m3"), num(3.0), num(2.0)],
                vec![text("Plesteran"), num(80.0), text("m2"), num(0.0), Cell::Empty],
            ],
        );

        let outcome = VolumeMapper.map_sheet(&sheet, &SheetContext::default());
        assert_eq!(outcome.items[0].unit.as_deref(), Some("m3"));
        assert_eq!(outcome.items[0].start_week, 3);
        assert_eq!(outcome.items[0].duration_weeks, 2);
        assert_eq!(outcome.items[1].start_week, 1);
        assert_eq!(outcome.items[1].duration_weeks, 1);
    }

    #[test]
    fn test_missing_header_skips_everything() {
        let sheet = RawSheet::new(
            "Sheet1",
            vec![vec![text("Galian"), num(10.0)], vec![]],
        );
        let outcome = VolumeMapper.map_sheet(&sheet, &SheetContext::default());
        assert!(outcome.items.is_empty());
        assert_eq!(outcome.skipped.unrecognized, 1);
        assert_eq!(outcome.skipped.blank, 1);
    }

    #[test]
    fn test_weeks_beyond_schedule_limit_skipped() {
        let header = vec![
            text("URAIAN_PEKERJAAN"),
            text("VOLUME"),
            text("MINGGU_MULAI"),
            text("DURASI_MINGGU"),
        ];
        let sheet = RawSheet::new(
            "Input_Volume",
            vec![
                header,
                vec![text("Galian tanah"), num(10.0), num(5e9), num(1.0)],
                vec![text("Urugan pasir"), num(4.0), num(500.0), num(30.0)],
                vec![text("Pasangan bata"), num(8.0), num(520.0), num(1.0)],
            ],
        );

        let outcome = VolumeMapper.map_sheet(&sheet, &SheetContext::default());
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].description, "Pasangan bata");
        assert_eq!(outcome.items[0].start_week, MAX_SCHEDULE_WEEK);
        assert_eq!(outcome.skipped.invalid_week, 2);
        assert_eq!(outcome.diagnostics[0].reason, SkipReason::InvalidWeek);
        assert_eq!(outcome.diagnostics[0].row_number, 2);
    }
}
