use chargesense_common::Weekday;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChargeSenseError {
    #[error("Unsupported file type. Upload CSV or Excel: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read file: {0}")]
    MalformedInput(String),

    #[error("Missing {0} sheet")]
    MissingRequiredSheet(Weekday),

    #[error("Missing required column: '{0}'")]
    MissingRequiredColumn(String),

    #[error("マーケティング履歴の保存に失敗: {0}")]
    Store(String),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl ChargeSenseError {
    /// アップロード内容が原因で処理を打ち切ったか
    ///
    /// false の場合は保存先や設定など実行環境側の失敗。
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ChargeSenseError::UnsupportedFormat(_)
                | ChargeSenseError::MalformedInput(_)
                | ChargeSenseError::MissingRequiredSheet(_)
                | ChargeSenseError::MissingRequiredColumn(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ChargeSenseError>;
