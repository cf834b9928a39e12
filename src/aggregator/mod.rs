//! 曜日シート集計モジュール
//!
//! Mon〜Fri の予約シートを検証し、顧客別・曜日別・セッション別に集計する。
//!
//! ## 処理フロー
//! 1. 5曜日すべてのシートを特定（1つでも欠ければ全体を中止）
//! 2. 各シートを型付きの行に変換（Charge列がなければ中止）
//! 3. 曜日順に集計結果を出力

use crate::error::{ChargeSenseError, Result};
use crate::loader::UploadedWorkbook;
use chargesense_common::{
    cell_text, coerce_number, is_bus_indicator, BusUsageRecord, Cell, CustomerSegmentRecord,
    Table, Weekday, WeeklyChargeRecord,
};

/// セッション列（この順で出力する）
pub const SESSIONS: [&str; 4] = ["AM", "Explorers 1", "Explorers 2", "Explorers 3"];

/// 料金列（大文字小文字は無視）
pub const CHARGE_COLUMN: &str = "Charge";

const FORENAME_COLUMN: &str = "Forename";
const SURNAME_COLUMN: &str = "Surname";

/// 曜日シートの1行（変換後）
#[derive(Debug, Clone, PartialEq)]
pub struct DaySheetRow {
    pub forename: String,
    pub surname: String,
    /// SESSIONS と同順の数値
    pub sessions: [f64; 4],
    pub charge: f64,
}

impl DaySheetRow {
    /// 氏名キー（空なら集計対象外）
    pub fn segment(&self) -> String {
        format!("{} {}", self.forename.trim(), self.surname.trim())
            .trim()
            .to_string()
    }

    /// 予約が入っているセッション数
    pub fn booking_count(&self) -> u32 {
        self.sessions.iter().filter(|&&v| v > 0.0).count() as u32
    }
}

/// 1曜日分のシート（変換後）
#[derive(Debug, Clone, PartialEq)]
pub struct DaySheet {
    pub day: Weekday,
    pub rows: Vec<DaySheetRow>,
}

impl DaySheet {
    /// 表を型付きの行に変換する
    pub fn parse(day: Weekday, table: &Table) -> Result<Self> {
        let table = table.map_headers(|h| h.trim().to_string());

        let charge_col = table
            .column_ignore_case(CHARGE_COLUMN)
            .ok_or_else(|| ChargeSenseError::MissingRequiredColumn(CHARGE_COLUMN.to_string()))?;
        let session_cols: Vec<Option<usize>> = SESSIONS.iter().map(|s| table.column(s)).collect();
        let forename_col = table.column(FORENAME_COLUMN);
        let surname_col = table.column(SURNAME_COLUMN);

        let text_at = |row: usize, col: Option<usize>| {
            col.map(|c| cell_text(table.cell(row, c))).unwrap_or_default()
        };

        let rows = (0..table.len())
            .map(|r| {
                let mut sessions = [0.0; 4];
                for (value, col) in sessions.iter_mut().zip(&session_cols) {
                    *value = col.map(|c| coerce_number(table.cell(r, c))).unwrap_or(0.0);
                }
                DaySheetRow {
                    forename: text_at(r, forename_col),
                    surname: text_at(r, surname_col),
                    sessions,
                    charge: coerce_number(table.cell(r, charge_col)),
                }
            })
            .collect();

        Ok(Self { day, rows })
    }

    /// 曜日の料金合計（氏名が空の行も含む）
    pub fn total_charge(&self) -> f64 {
        self.rows.iter().map(|r| r.charge).sum()
    }

    /// 氏名のある行
    pub fn retained_rows(&self) -> impl Iterator<Item = &DaySheetRow> {
        self.rows.iter().filter(|r| !r.segment().is_empty())
    }

    /// セッションごとのバス利用数（氏名のある行のみ）
    pub fn bus_usage(&self) -> Vec<BusUsageRecord> {
        SESSIONS
            .iter()
            .enumerate()
            .map(|(i, session)| BusUsageRecord {
                bus_service: format!("{} {}", self.day, session),
                usage: self
                    .retained_rows()
                    .filter(|r| is_bus_indicator(&Cell::Number(r.sessions[i])))
                    .count() as u32,
            })
            .collect()
    }
}

/// 曜日シート集計結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayAggregation {
    pub customer_segments: Vec<CustomerSegmentRecord>,
    pub weekly_charges: Vec<WeeklyChargeRecord>,
    pub bus_usage: Vec<BusUsageRecord>,
    pub week_start: Option<String>,
}

/// いずれかのシート名が曜日エイリアスに一致するか
pub fn has_day_sheets(workbook: &UploadedWorkbook) -> bool {
    workbook
        .sheet_names()
        .any(|name| Weekday::from_sheet_name(name).is_some())
}

/// 5曜日のシートを特定して変換する
pub fn resolve_day_sheets(workbook: &UploadedWorkbook) -> Result<Vec<DaySheet>> {
    let tables = Weekday::ALL
        .iter()
        .map(|&day| {
            workbook
                .find(|name| day.matches(name))
                .map(|(_, table)| (day, table))
                .ok_or(ChargeSenseError::MissingRequiredSheet(day))
        })
        .collect::<Result<Vec<_>>>()?;

    tables
        .into_iter()
        .map(|(day, table)| DaySheet::parse(day, table))
        .collect()
}

/// 曜日シートを集計する
///
/// 曜日シートが1枚もなければ空の結果を返す（マーケティングのみのアップロード）。
pub fn aggregate_days(workbook: &UploadedWorkbook, filename: &str) -> Result<DayAggregation> {
    if !has_day_sheets(workbook) {
        tracing::debug!("no day sheets, skipping booking aggregation");
        return Ok(DayAggregation::default());
    }

    let sheets = resolve_day_sheets(workbook)?;
    let mut aggregation = DayAggregation {
        week_start: Some(week_start_from_filename(filename)),
        ..Default::default()
    };

    for sheet in &sheets {
        aggregation
            .customer_segments
            .extend(sheet.retained_rows().map(|row| CustomerSegmentRecord {
                segment: row.segment(),
                day: sheet.day,
                booking_count: row.booking_count(),
                total_charge: row.charge,
            }));

        aggregation.weekly_charges.push(WeeklyChargeRecord {
            day: sheet.day,
            total_charge: sheet.total_charge(),
        });

        aggregation.bus_usage.extend(sheet.bus_usage());

        tracing::debug!(
            day = %sheet.day,
            rows = sheet.rows.len(),
            retained = sheet.retained_rows().count(),
            "day sheet aggregated"
        );
    }

    Ok(aggregation)
}

/// 週の開始日（現状はファイル名をそのまま使う）
pub fn week_start_from_filename(filename: &str) -> String {
    filename.to_string()
}
