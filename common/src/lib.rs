//! ChargeSense Common Library
//!
//! 取り込み・集計・回帰で共有される型とユーティリティ

pub mod table;
pub mod coerce;
pub mod alias;
pub mod regression;
pub mod types;
pub mod export;

pub use table::{Cell, Table};
pub use coerce::{cell_text, coerce_number, is_bus_indicator};
pub use alias::{is_marketing_sheet, Weekday};
pub use regression::OlsModel;
pub use types::{
    BusUsageRecord, ChannelRoas, CustomerSegmentRecord, MarketingAnalytics, MarketingRow,
    UploadResponse, WeeklyChargeRecord,
};
