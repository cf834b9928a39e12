//! シート名のエイリアス判定
//!
//! 曜日シート（Mon〜Fri）とマーケティングシートをシート名だけで判別する。
//! 中身は見ない。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 予約シートを持つ曜日
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl Weekday {
    /// 処理順（この順で集計結果を出力する）
    pub const ALL: [Weekday; 5] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];

    /// 表示名
    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
        }
    }

    /// シート名として受け付ける表記（小文字）
    pub fn aliases(&self) -> [&'static str; 2] {
        match self {
            Weekday::Mon => ["mon", "monday"],
            Weekday::Tue => ["tue", "tuesday"],
            Weekday::Wed => ["wed", "wednesday"],
            Weekday::Thu => ["thu", "thursday"],
            Weekday::Fri => ["fri", "friday"],
        }
    }

    /// シート名がこの曜日を指すか
    pub fn matches(&self, sheet_name: &str) -> bool {
        let lower = sheet_name.to_lowercase();
        self.aliases().contains(&lower.as_str())
    }

    /// シート名から曜日を判定
    pub fn from_sheet_name(sheet_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.matches(sheet_name))
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// マーケティングシート名の接頭辞
pub const MARKETING_PREFIX: &str = "marketing";

/// シート名がマーケティングシートを指すか
pub fn is_marketing_sheet(sheet_name: &str) -> bool {
    sheet_name.to_lowercase().starts_with(MARKETING_PREFIX)
}
