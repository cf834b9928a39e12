//! マーケティング分析モジュール
//!
//! マーケティングシートの売上をチャネル別広告費（search / social / email）で
//! 回帰し、係数をチャネル別ROASとして扱う。今回分の行は履歴ストアに追記する。
//!
//! ## 処理フロー
//! 1. 名前が `marketing` で始まる最初のシートを選択
//! 2. 列名を小文字化し、必須列を数値化（欠けていれば0）
//! 3. ROAS推定・売上予測
//! 4. 全行に同一の処理時刻を付与し、履歴に追記

use crate::error::Result;
use crate::loader::UploadedWorkbook;
use crate::store::MarketingStore;
use chargesense_common::regression::column_means;
use chargesense_common::{
    cell_text, coerce_number, is_marketing_sheet, Cell, ChannelRoas, MarketingAnalytics,
    MarketingRow, OlsModel, Table,
};
use chrono::{DateTime, Utc};

/// 回帰に必要な最小行数
const MIN_ROWS_FOR_FIT: usize = 2;

/// ROAS推定結果
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RoasEstimate {
    pub roas: ChannelRoas,
    pub forecast: f64,
}

/// 処理時刻の文字列表現（UTC、オフセットなし、マイクロ秒まで）
pub fn format_uploaded_at(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// 表（ヘッダは小文字化済み）をマーケティング行に変換する
///
/// 固定列は数値化し、それ以外の空でないセルは追加列として保持する。
pub fn parse_marketing_rows(table: &Table) -> Vec<MarketingRow> {
    let extra_cols: Vec<(usize, &String)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(i, name)| !MarketingRow::is_fixed_column(name) && table.column(name) == Some(*i))
        .collect();

    (0..table.len())
        .map(|r| {
            let number = |name: &str| {
                table
                    .column(name)
                    .map(|c| coerce_number(table.cell(r, c)))
                    .unwrap_or(0.0)
            };
            MarketingRow {
                revenue: number("revenue"),
                total_bookings: number("total_bookings"),
                search_spend: number("search_spend"),
                social_spend: number("social_spend"),
                email_spend: number("email_spend"),
                roas_search: number("roas_search"),
                roas_social: number("roas_social"),
                roas_email: number("roas_email"),
                uploaded_at: table
                    .column("uploaded_at")
                    .map(|c| cell_text(table.cell(r, c)))
                    .unwrap_or_default(),
                extras: extra_cols
                    .iter()
                    .filter_map(|(c, name)| match table.cell(r, *c) {
                        Cell::Empty => None,
                        cell => Some(((*name).clone(), cell.clone())),
                    })
                    .collect(),
            }
        })
        .collect()
}

/// マーケティングシートを変換する（列名は小文字・前後空白なしに揃える）
pub fn parse_marketing_sheet(table: &Table) -> Vec<MarketingRow> {
    let normalized = table.map_headers(|h| h.trim().to_lowercase());
    parse_marketing_rows(&normalized)
        .into_iter()
        .map(|row| MarketingRow {
            roas_search: 0.0,
            roas_social: 0.0,
            roas_email: 0.0,
            uploaded_at: String::new(),
            ..row
        })
        .collect()
}

/// チャネル別ROASと売上予測を推定する
///
/// 行数が2未満、または売上合計が0ならすべて0。予測は売上合計が正のときのみ。
pub fn estimate_roas(rows: &[MarketingRow]) -> RoasEstimate {
    let total_revenue: f64 = rows.iter().map(|r| r.revenue).sum();
    if rows.len() < MIN_ROWS_FOR_FIT || total_revenue == 0.0 {
        return RoasEstimate::default();
    }

    let x: Vec<[f64; 3]> = rows.iter().map(MarketingRow::spend).collect();
    let y: Vec<f64> = rows.iter().map(|r| r.revenue).collect();
    let model = OlsModel::fit(&x, &y);

    // 今回アップロード分の平均広告費での予測
    let forecast = if total_revenue > 0.0 {
        model.predict(&column_means(&x))
    } else {
        0.0
    };

    RoasEstimate {
        roas: ChannelRoas::from_coefficients(model.coefficients()),
        forecast,
    }
}

/// マーケティングシートを分析し、履歴に追記する
///
/// マーケティングシートがなければ `None`（エラーではない）。
pub fn analyze_marketing(
    workbook: &UploadedWorkbook,
    store: &dyn MarketingStore,
    now: DateTime<Utc>,
) -> Result<Option<MarketingAnalytics>> {
    let Some((sheet_name, table)) = workbook.find(is_marketing_sheet) else {
        tracing::debug!("no marketing sheet, skipping analytics");
        return Ok(None);
    };

    let mut rows = parse_marketing_sheet(table);
    let estimate = estimate_roas(&rows);
    let uploaded_at = format_uploaded_at(now);
    for row in rows.iter_mut() {
        row.roas_search = estimate.roas.search;
        row.roas_social = estimate.roas.social;
        row.roas_email = estimate.roas.email;
        row.uploaded_at = uploaded_at.clone();
    }

    tracing::info!(
        sheet = sheet_name,
        rows = rows.len(),
        roas_search = estimate.roas.search,
        roas_social = estimate.roas.social,
        roas_email = estimate.roas.email,
        forecast = estimate.forecast,
        "marketing sheet analyzed"
    );

    store.append(&rows)?;

    Ok(Some(MarketingAnalytics {
        weeks_data: rows.iter().map(MarketingRow::rounded).collect(),
        channel_roas: estimate.roas,
        total_revenue_forecast: estimate.forecast,
    }))
}
