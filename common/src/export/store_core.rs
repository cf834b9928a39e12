//! マーケティング履歴のExcel生成（共通ライブラリ）
//!
//! 履歴全行を1シートに書き出す。列は全行の和集合で、
//! 入力列 → 追加列（初出順） → 付与列 の順に並べる。

use crate::table::Cell;
use crate::types::MarketingRow;
use rust_xlsxwriter::{Format, Workbook};

/// 履歴シート名
pub const STORE_SHEET_NAME: &str = "marketing_history";

/// 全行の列名の和集合
pub fn store_columns(rows: &[MarketingRow]) -> Vec<String> {
    let mut extras: Vec<String> = Vec::new();
    for row in rows {
        for (name, _) in &row.extras {
            if !extras.contains(name) {
                extras.push(name.clone());
            }
        }
    }

    MarketingRow::INPUT_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(extras)
        .chain(MarketingRow::DERIVED_COLUMNS.iter().map(|c| c.to_string()))
        .collect()
}

/// 履歴をExcelバッファに生成
pub fn generate_store_buffer(rows: &[MarketingRow]) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let columns = store_columns(rows);
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(STORE_SHEET_NAME)
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    for (col, name) in columns.iter().enumerate() {
        let col = column_index(col)?;
        worksheet
            .write_string_with_format(0, col, name, &header_format)
            .map_err(|e| format!("ヘッダ書き込みエラー: {}", e))?;
    }

    for (i, row) in rows.iter().enumerate() {
        let excel_row = u32::try_from(i + 1).map_err(|_| "行数が上限を超えています".to_string())?;
        for (col, name) in columns.iter().enumerate() {
            let col = column_index(col)?;
            let result = match row.get(name) {
                Cell::Empty => continue,
                Cell::Number(n) if !n.is_finite() => continue,
                Cell::Number(n) => worksheet.write_number(excel_row, col, n),
                Cell::Text(s) => worksheet.write_string(excel_row, col, &s),
                Cell::Bool(b) => worksheet.write_boolean(excel_row, col, b),
            };
            result.map_err(|e| format!("セル書き込みエラー: {}", e))?;
        }
    }

    // バッファに書き出し
    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}

fn column_index(col: usize) -> Result<u16, String> {
    u16::try_from(col).map_err(|_| format!("列数が上限を超えています: {}", col))
}
