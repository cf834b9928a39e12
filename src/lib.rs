//! ChargeSense
//!
//! 週次の予約シート・マーケティング費用シートを取り込み、
//! 顧客別・曜日別の集計とチャネル別ROASを算出する。

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod marketing;
pub mod pipeline;
pub mod store;

pub use error::{ChargeSenseError, Result};
pub use pipeline::process_upload;
