//! セル・表の型定義
//!
//! アップロードされたワークブックの各シートを、型の緩いセルの
//! 矩形データとして保持する。

use serde::{Serialize, Serializer};

/// シート上の1セル
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    /// CSVなど文字列しか持たない入力からセルを推定する
    ///
    /// 空文字は `Empty`、数値として読めるものは `Number`、それ以外は `Text`。
    pub fn infer(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Cell::Empty;
        }
        match raw.trim().parse::<f64>() {
            Ok(n) => Cell::Number(n),
            Err(_) => Cell::Text(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// 小数1桁に丸めたセルを返す（数値以外はそのまま）
    pub fn rounded(&self) -> Self {
        match self {
            Cell::Number(n) => Cell::Number(round1(*n)),
            other => other.clone(),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Empty => serializer.serialize_none(),
            Cell::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            Cell::Number(_) => serializer.serialize_none(),
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

/// 小数1桁に丸める
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// ヘッダ行付きの矩形データ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// 行を追加（列数はヘッダに揃える）
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.headers.len(), Cell::Empty);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 列名から列番号を取得（重複時は後勝ち）
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().rposition(|h| h == name)
    }

    /// 大文字小文字を無視して列番号を取得（重複時は後勝ち）
    pub fn column_ignore_case(&self, name: &str) -> Option<usize> {
        self.headers.iter().rposition(|h| h.eq_ignore_ascii_case(name))
    }

    /// 指定列の値を取得（範囲外は `Empty`）
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        const EMPTY: &Cell = &Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(EMPTY)
    }

    /// ヘッダを変換した新しい表を返す
    pub fn map_headers<F>(&self, f: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        Self {
            headers: self.headers.iter().map(|h| f(h)).collect(),
            rows: self.rows.clone(),
        }
    }
}
