//! Excel（xls / xlsx）読み込み

use super::{header_name, UploadedWorkbook};
use crate::error::{ChargeSenseError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chargesense_common::{Cell, Table};
use std::io::Cursor;

/// 全シートを読み込む（シート名は前後の空白を除去）
pub fn parse_spreadsheet(bytes: &[u8]) -> Result<UploadedWorkbook> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ChargeSenseError::MalformedInput(e.to_string()))?;

    let mut sheets = UploadedWorkbook::default();
    for sheet_name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ChargeSenseError::MalformedInput(e.to_string()))?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row
                .iter()
                .enumerate()
                .map(|(i, cell)| header_name(header_text(cell), i))
                .collect(),
            None => Vec::new(),
        };

        let mut table = Table::new(headers);
        for row in rows {
            let cells: Vec<Cell> = row.iter().map(to_cell).collect();
            if cells.iter().all(Cell::is_empty) {
                continue;
            }
            table.push_row(cells);
        }

        sheets.insert(sheet_name.trim().to_string(), table);
    }

    Ok(sheets)
}

/// calamineのセルを共通セル型に変換
pub fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        // 日付はシリアル値として保持
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Empty,
    }
}

fn header_text(data: &Data) -> String {
    match to_cell(data) {
        Cell::Empty => String::new(),
        cell => chargesense_common::cell_text(&cell),
    }
}
