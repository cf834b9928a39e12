//! マーケティング履歴ストア
//!
//! 過去のアップロード分を含む全行を1つの表として保持する。追記専用で、
//! 追記のたびに全件を読み込み、末尾に今回分を足して全件を書き戻す。
//!
//! 読み込み〜書き戻しは同一ストアのロックで直列化する。別プロセスからの
//! 同時書き込みは保護しない（後から書いた側が勝つ）。

use crate::error::{ChargeSenseError, Result};
use crate::loader::to_cell;
use crate::marketing::parse_marketing_rows;
use calamine::{open_workbook_auto, Reader};
use chargesense_common::export::store_core::generate_store_buffer;
use chargesense_common::{cell_text, MarketingRow, Table};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// 履歴ストアの読み書き
pub trait MarketingStore: Send + Sync {
    /// 全履歴を読み込む（未作成なら空）
    fn load(&self) -> Result<Vec<MarketingRow>>;

    /// 全履歴を書き戻す
    fn save(&self, rows: &[MarketingRow]) -> Result<()>;

    /// 追記を直列化するロック
    fn merge_lock(&self) -> &Mutex<()>;

    /// 履歴の末尾に追記し、追記後の総行数を返す
    fn append(&self, rows: &[MarketingRow]) -> Result<usize> {
        let _guard = self
            .merge_lock()
            .lock()
            .map_err(|_| ChargeSenseError::Store("ストアのロックが破損しています".into()))?;

        let mut history = self.load()?;
        let previous = history.len();
        history.extend_from_slice(rows);
        self.save(&history)?;

        tracing::info!(
            previous,
            appended = rows.len(),
            total = history.len(),
            "marketing history merged"
        );
        Ok(history.len())
    }
}

/// xlsxファイルによる履歴ストア
#[derive(Debug)]
pub struct XlsxMarketingStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl XlsxMarketingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl MarketingStore for XlsxMarketingStore {
    fn load(&self) -> Result<Vec<MarketingRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut workbook = open_workbook_auto(&self.path)
            .map_err(|e| ChargeSenseError::Store(format!("{}: {}", self.path.display(), e)))?;
        let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
            return Ok(Vec::new());
        };
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ChargeSenseError::Store(format!("{}: {}", self.path.display(), e)))?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|header| {
                header
                    .iter()
                    .map(|cell| cell_text(&to_cell(cell)).trim().to_lowercase())
                    .collect()
            })
            .unwrap_or_default();

        let mut table = Table::new(headers);
        for row in rows {
            table.push_row(row.iter().map(to_cell).collect());
        }

        Ok(parse_marketing_rows(&table))
    }

    fn save(&self, rows: &[MarketingRow]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ChargeSenseError::Store(format!("{}: {}", parent.display(), e)))?;
            }
        }

        let buffer = generate_store_buffer(rows).map_err(ChargeSenseError::Store)?;

        // 書きかけのファイルを残さないよう一時ファイル経由で置き換える
        let temp_path = self.temp_path();
        std::fs::write(&temp_path, buffer)
            .map_err(|e| ChargeSenseError::Store(format!("{}: {}", temp_path.display(), e)))?;
        std::fs::rename(&temp_path, &self.path)
            .map_err(|e| ChargeSenseError::Store(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }

    fn merge_lock(&self) -> &Mutex<()> {
        &self.lock
    }
}

/// メモリ上の履歴ストア（テスト・ドライラン用）
#[derive(Debug, Default)]
pub struct MemoryMarketingStore {
    rows: Mutex<Vec<MarketingRow>>,
    lock: Mutex<()>,
}

impl MemoryMarketingStore {
    pub fn with_rows(rows: Vec<MarketingRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
            lock: Mutex::new(()),
        }
    }
}

impl MarketingStore for MemoryMarketingStore {
    fn load(&self) -> Result<Vec<MarketingRow>> {
        self.rows
            .lock()
            .map(|rows| rows.clone())
            .map_err(|_| ChargeSenseError::Store("ストアのロックが破損しています".into()))
    }

    fn save(&self, rows: &[MarketingRow]) -> Result<()> {
        let mut stored = self
            .rows
            .lock()
            .map_err(|_| ChargeSenseError::Store("ストアのロックが破損しています".into()))?;
        *stored = rows.to_vec();
        Ok(())
    }

    fn merge_lock(&self) -> &Mutex<()> {
        &self.lock
    }
}
