//! CSV読み込み

use super::header_name;
use crate::error::{ChargeSenseError, Result};
use chargesense_common::{Cell, Table};

/// CSVを1つの表として読み込む（先頭行がヘッダ）
pub fn parse_csv(bytes: &[u8]) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| ChargeSenseError::MalformedInput(e.to_string()))?
        .clone();
    if headers.is_empty() {
        return Err(ChargeSenseError::MalformedInput(
            "No columns to parse from file".into(),
        ));
    }

    let mut table = Table::new(
        headers
            .iter()
            .enumerate()
            .map(|(i, h)| header_name(h.to_string(), i))
            .collect(),
    );

    for record in reader.records() {
        let record = record.map_err(|e| ChargeSenseError::MalformedInput(e.to_string()))?;
        let row: Vec<Cell> = record.iter().map(Cell::infer).collect();
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        table.push_row(row);
    }

    Ok(table)
}
