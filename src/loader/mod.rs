//! ワークブック読み込みモジュール
//!
//! アップロードされたバイト列を「シート名 → 表」の対応に変換する。
//! 拡張子で形式を判定し、中身の判別は行わない。

mod delimited;
mod spreadsheet;

pub use spreadsheet::to_cell;

use crate::error::{ChargeSenseError, Result};
use chargesense_common::Table;

/// CSVの暗黙シート名（曜日にもマーケティングにも該当しない名前）
pub const CSV_SHEET_NAME: &str = "Sheet1";

/// 受け付ける拡張子
const SUPPORTED_EXTENSIONS: &[&str] = &[".xlsx", ".xls", ".csv"];

/// ファイル形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Csv,
    Spreadsheet,
}

impl UploadFormat {
    /// ファイル名の末尾で形式を判定
    pub fn from_filename(filename: &str) -> Result<Self> {
        if !SUPPORTED_EXTENSIONS.iter().any(|ext| filename.ends_with(ext)) {
            return Err(ChargeSenseError::UnsupportedFormat(filename.to_string()));
        }
        if filename.ends_with(".csv") {
            Ok(UploadFormat::Csv)
        } else {
            Ok(UploadFormat::Spreadsheet)
        }
    }
}

/// シート名 → 表（シート順を保持）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadedWorkbook {
    sheets: Vec<(String, Table)>,
}

impl UploadedWorkbook {
    /// シートを追加（同名シートは位置を保ったまま内容を置き換える）
    pub fn insert(&mut self, name: String, table: Table) {
        match self.sheets.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = table,
            None => self.sheets.push((name, table)),
        }
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(n, _)| n.as_str())
    }

    pub fn sheets(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.sheets.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.sheets.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// 条件に合う最初のシート
    pub fn find<P>(&self, predicate: P) -> Option<(&str, &Table)>
    where
        P: Fn(&str) -> bool,
    {
        self.sheets().find(|(name, _)| predicate(name))
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// アップロードされたファイルを読み込む
pub fn load_workbook(filename: &str, bytes: &[u8]) -> Result<UploadedWorkbook> {
    let format = UploadFormat::from_filename(filename)?;

    let workbook = match format {
        UploadFormat::Csv => {
            let mut workbook = UploadedWorkbook::default();
            workbook.insert(CSV_SHEET_NAME.to_string(), delimited::parse_csv(bytes)?);
            workbook
        }
        UploadFormat::Spreadsheet => spreadsheet::parse_spreadsheet(bytes)?,
    };

    if workbook.is_empty() {
        return Err(ChargeSenseError::MalformedInput(
            "ワークブックにシートがありません".into(),
        ));
    }

    tracing::debug!(
        filename,
        sheets = ?workbook.sheet_names().collect::<Vec<_>>(),
        "workbook loaded"
    );
    Ok(workbook)
}

/// 空のヘッダを `Unnamed: N` に置き換える
fn header_name(raw: String, index: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        format!("Unnamed: {}", index)
    } else {
        raw
    }
}
