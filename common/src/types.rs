//! 集計結果の型定義
//!
//! アップロード1回分のレスポンスを構成する型:
//! - CustomerSegmentRecord / WeeklyChargeRecord / BusUsageRecord: 曜日シートの集計
//! - MarketingRow / MarketingAnalytics: マーケティングシートの回帰結果
//! - UploadResponse: 上記をまとめた最終出力

use crate::alias::Weekday;
use crate::table::{round1, Cell};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// 処理成功時のメッセージ
pub const SUCCESS_MESSAGE: &str = "Upload processed successfully";

/// 顧客（氏名）ごとの1日分の予約
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSegmentRecord {
    pub segment: String,
    pub day: Weekday,
    pub booking_count: u32,
    pub total_charge: f64,
}

/// 曜日ごとの料金合計
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyChargeRecord {
    pub day: Weekday,
    pub total_charge: f64,
}

/// 曜日×セッションごとのバス利用数
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusUsageRecord {
    pub bus_service: String,
    pub usage: u32,
}

/// マーケティングシートの1行（変換後）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarketingRow {
    pub revenue: f64,
    pub total_bookings: f64,
    pub search_spend: f64,
    pub social_spend: f64,
    pub email_spend: f64,
    pub roas_search: f64,
    pub roas_social: f64,
    pub roas_email: f64,
    pub uploaded_at: String,
    /// 必須列以外の列（シート上の順序を保持）
    pub extras: Vec<(String, Cell)>,
}

impl MarketingRow {
    /// 数値列（回帰に使う順）
    pub const INPUT_COLUMNS: [&'static str; 5] = [
        "revenue",
        "total_bookings",
        "search_spend",
        "social_spend",
        "email_spend",
    ];

    /// 処理時に付与される列
    pub const DERIVED_COLUMNS: [&'static str; 4] =
        ["roas_search", "roas_social", "roas_email", "uploaded_at"];

    /// 列名が固定列（入力・付与列）か
    pub fn is_fixed_column(name: &str) -> bool {
        Self::INPUT_COLUMNS.contains(&name) || Self::DERIVED_COLUMNS.contains(&name)
    }

    /// 回帰の説明変数 [search, social, email]
    pub fn spend(&self) -> [f64; 3] {
        [self.search_spend, self.social_spend, self.email_spend]
    }

    /// 固有列の値をセルとして取得
    pub fn fixed_cell(&self, name: &str) -> Option<Cell> {
        let value = match name {
            "revenue" => self.revenue,
            "total_bookings" => self.total_bookings,
            "search_spend" => self.search_spend,
            "social_spend" => self.social_spend,
            "email_spend" => self.email_spend,
            "roas_search" => self.roas_search,
            "roas_social" => self.roas_social,
            "roas_email" => self.roas_email,
            "uploaded_at" => return Some(Cell::Text(self.uploaded_at.clone())),
            _ => return None,
        };
        Some(Cell::Number(value))
    }

    /// 追加列の値を取得
    pub fn extra(&self, name: &str) -> Option<&Cell> {
        self.extras.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// 固有列・追加列を問わず値を取得（存在しない列は空セル）
    pub fn get(&self, name: &str) -> Cell {
        self.fixed_cell(name)
            .or_else(|| self.extra(name).cloned())
            .unwrap_or(Cell::Empty)
    }

    /// 数値を小数1桁に丸めたコピー
    pub fn rounded(&self) -> Self {
        Self {
            revenue: round1(self.revenue),
            total_bookings: round1(self.total_bookings),
            search_spend: round1(self.search_spend),
            social_spend: round1(self.social_spend),
            email_spend: round1(self.email_spend),
            roas_search: round1(self.roas_search),
            roas_social: round1(self.roas_social),
            roas_email: round1(self.roas_email),
            uploaded_at: self.uploaded_at.clone(),
            extras: self
                .extras
                .iter()
                .map(|(k, v)| (k.clone(), v.rounded()))
                .collect(),
        }
    }

    /// 出力列の順序: 入力列 → 追加列 → 付与列
    pub fn column_names(&self) -> Vec<String> {
        Self::INPUT_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.extras.iter().map(|(k, _)| k.clone()))
            .chain(Self::DERIVED_COLUMNS.iter().map(|c| c.to_string()))
            .collect()
    }
}

impl Serialize for MarketingRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns = self.column_names();
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        for column in &columns {
            map.serialize_entry(column, &self.get(column))?;
        }
        map.end()
    }
}

/// チャネル別ROAS
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ChannelRoas {
    pub search: f64,
    pub social: f64,
    pub email: f64,
}

impl ChannelRoas {
    pub fn from_coefficients(coef: [f64; 3]) -> Self {
        Self {
            search: coef[0],
            social: coef[1],
            email: coef[2],
        }
    }
}

/// マーケティング分析結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketingAnalytics {
    /// 今回アップロード分の行（小数1桁に丸め済み）
    pub weeks_data: Vec<MarketingRow>,
    pub channel_roas: ChannelRoas,
    pub total_revenue_forecast: f64,
}

/// アップロード1回分のレスポンス
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub customer_segments: Vec<CustomerSegmentRecord>,
    pub weekly_charges: Vec<WeeklyChargeRecord>,
    pub bus_usage: Vec<BusUsageRecord>,
    pub marketing_analytics: Option<MarketingAnalytics>,
    #[serde(rename = "week_start")]
    pub week_start: Option<String>,
    pub message: String,
}

impl Default for UploadResponse {
    fn default() -> Self {
        Self {
            customer_segments: Vec::new(),
            weekly_charges: Vec::new(),
            bus_usage: Vec::new(),
            marketing_analytics: None,
            week_start: None,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> MarketingRow {
        MarketingRow {
            revenue: 1234.56,
            search_spend: 10.04,
            roas_search: 2.345,
            uploaded_at: "2026-01-05T10:00:00.000000".into(),
            extras: vec![
                ("week".into(), Cell::Text("W1".into())),
                ("clicks".into(), Cell::Number(12.34)),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_column_order() {
        let columns = sample_row().column_names();
        assert_eq!(columns[0], "revenue");
        assert_eq!(columns[5], "week");
        assert_eq!(columns[6], "clicks");
        assert_eq!(columns.last().map(String::as_str), Some("uploaded_at"));
        assert_eq!(columns.len(), 11);
    }

    #[test]
    fn test_rounded_row() {
        let rounded = sample_row().rounded();
        assert_eq!(rounded.revenue, 1234.6);
        assert_eq!(rounded.search_spend, 10.0);
        assert_eq!(rounded.roas_search, 2.3);
        assert_eq!(rounded.extra("clicks"), Some(&Cell::Number(12.3)));
        assert_eq!(rounded.extra("week"), Some(&Cell::Text("W1".into())));
    }

    #[test]
    fn test_row_serializes_as_record() {
        let value = serde_json::to_value(sample_row()).unwrap();
        assert_eq!(value["revenue"], 1234.56);
        assert_eq!(value["week"], "W1");
        assert_eq!(value["uploaded_at"], "2026-01-05T10:00:00.000000");
        assert_eq!(value["email_spend"], 0.0);
    }

    #[test]
    fn test_response_field_names() {
        let response = UploadResponse {
            customer_segments: vec![CustomerSegmentRecord {
                segment: "Ann Lee".into(),
                day: Weekday::Tue,
                booking_count: 2,
                total_charge: 12.5,
            }],
            bus_usage: vec![BusUsageRecord {
                bus_service: "Tue AM".into(),
                usage: 1,
            }],
            ..Default::default()
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["customerSegments"][0]["segment"], "Ann Lee");
        assert_eq!(value["customerSegments"][0]["day"], "Tue");
        assert_eq!(value["customerSegments"][0]["bookingCount"], 2);
        assert_eq!(value["customerSegments"][0]["totalCharge"], 12.5);
        assert_eq!(value["busUsage"][0]["busService"], "Tue AM");
        assert!(value["weeklyCharges"].as_array().unwrap().is_empty());
        assert!(value["marketingAnalytics"].is_null());
        assert!(value["week_start"].is_null());
        assert_eq!(value["message"], SUCCESS_MESSAGE);
    }
}
