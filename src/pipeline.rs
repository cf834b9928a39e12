//! アップロード処理パイプライン
//!
//! 読み込み → 曜日シート集計 → マーケティング分析（履歴追記）→ レスポンス組み立て。
//! 曜日シートの検証を先に行い、アップロードが拒否される場合は履歴に書き込まない。

use crate::aggregator;
use crate::error::Result;
use crate::loader;
use crate::marketing;
use crate::store::MarketingStore;
use chargesense_common::types::SUCCESS_MESSAGE;
use chargesense_common::UploadResponse;
use chrono::{DateTime, Utc};

/// アップロード1件を処理する
pub fn process_upload(
    filename: &str,
    bytes: &[u8],
    store: &dyn MarketingStore,
) -> Result<UploadResponse> {
    process_upload_at(filename, bytes, store, Utc::now())
}

/// 処理時刻を指定してアップロード1件を処理する
pub fn process_upload_at(
    filename: &str,
    bytes: &[u8],
    store: &dyn MarketingStore,
    now: DateTime<Utc>,
) -> Result<UploadResponse> {
    let workbook = loader::load_workbook(filename, bytes)?;

    let days = aggregator::aggregate_days(&workbook, filename)?;
    let marketing_analytics = marketing::analyze_marketing(&workbook, store, now)?;

    tracing::info!(
        filename,
        segments = days.customer_segments.len(),
        marketing = marketing_analytics.is_some(),
        "upload processed"
    );

    Ok(UploadResponse {
        customer_segments: days.customer_segments,
        weekly_charges: days.weekly_charges,
        bus_usage: days.bus_usage,
        marketing_analytics,
        week_start: days.week_start,
        message: SUCCESS_MESSAGE.to_string(),
    })
}
