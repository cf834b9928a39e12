//! セル値の数値・真偽値への変換
//!
//! どの関数も失敗しない。解釈できない値は 0.0 / false に落とす。

use crate::table::Cell;

/// 金額セルから取り除く通貨記号（文字化けした形を先に処理する）
const CURRENCY_GLYPHS: &[&str] = &["Â£", "£"];

/// 数値として扱わないトークン
const ZERO_TOKENS: &[&str] = &["bus", ""];

/// セルを数値に変換する
///
/// - 空セル・NaN → 0.0
/// - 文字列は通貨記号と前後の空白を除去し、`bus` / 空文字なら 0.0
/// - それ以外は数値として解釈し、失敗したら 0.0
pub fn coerce_number(cell: &Cell) -> f64 {
    let value = match cell {
        Cell::Empty => 0.0,
        Cell::Number(n) => *n,
        Cell::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Cell::Text(s) => {
            let stripped = strip_currency(s);
            let trimmed = stripped.trim();
            if ZERO_TOKENS.contains(&trimmed.to_lowercase().as_str()) {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
    };

    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// セルがバス利用を表すか判定する
///
/// 文字列に `bus` を含む（大文字小文字無視）か、正の数値なら true。
/// 予約が入っているだけの数値セルもバス利用として数える。
pub fn is_bus_indicator(cell: &Cell) -> bool {
    match cell {
        Cell::Text(s) if s.to_lowercase().contains("bus") => true,
        Cell::Text(s) => s.trim().parse::<f64>().map(|n| n > 0.0).unwrap_or(false),
        Cell::Number(n) => *n > 0.0,
        Cell::Bool(b) => *b,
        Cell::Empty => false,
    }
}

/// 名前列などの文字列表現
///
/// 空セルは空文字。整数値の数値は小数点なしで表記する。
pub fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(s) => s.clone(),
        Cell::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", *n as i64),
        Cell::Number(n) => n.to_string(),
        Cell::Bool(b) => (if *b { "True" } else { "False" }).to_string(),
    }
}

fn strip_currency(s: &str) -> String {
    CURRENCY_GLYPHS
        .iter()
        .fold(s.to_string(), |acc, glyph| acc.replace(glyph, ""))
}
