//! アップロード処理の結合テスト
//!
//! xlsx / csv を実際に生成し、読み込みから履歴追記までを検証

use chargesense::error::ChargeSenseError;
use chargesense::pipeline::process_upload_at;
use chargesense::store::{MarketingStore, XlsxMarketingStore};
use chargesense_common::Weekday;
use chrono::{DateTime, TimeZone, Utc};
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

/// テスト用セル
#[derive(Clone)]
enum V {
    S(&'static str),
    N(f64),
    E,
}

type Sheet = (&'static str, Vec<Vec<V>>);

fn xlsx_bytes(sheets: &[Sheet]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match cell {
                    V::S(s) => {
                        worksheet.write_string(r as u32, c as u16, *s).unwrap();
                    }
                    V::N(n) => {
                        worksheet.write_number(r as u32, c as u16, *n).unwrap();
                    }
                    V::E => {}
                }
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

fn day_sheet(name: &'static str, charge: f64) -> Sheet {
    (
        name,
        vec![
            vec![
                V::S("Forename"),
                V::S("Surname"),
                V::S("AM"),
                V::S("Explorers 1"),
                V::S("Charge"),
            ],
            vec![V::S("Ann"), V::S("Lee"), V::N(1.0), V::S("bus"), V::N(charge)],
            vec![V::S("Bob"), V::S("Ray"), V::E, V::N(2.0), V::S("£4.50")],
        ],
    )
}

fn week_sheets() -> Vec<Sheet> {
    vec![
        day_sheet("Mon", 10.0),
        day_sheet("Tuesday", 11.0),
        day_sheet("Wed", 12.0),
        day_sheet("thu", 13.0),
        day_sheet("FRI", 14.0),
    ]
}

fn marketing_sheet(name: &'static str, rows: &[[f64; 4]]) -> Sheet {
    let mut data = vec![vec![
        V::S("Week"),
        V::S("Revenue"),
        V::S("Search_Spend"),
        V::S("Social_Spend"),
        V::S("Email_Spend"),
    ]];
    for row in rows {
        data.push(vec![V::S("W1"), V::N(row[0]), V::N(row[1]), V::N(row[2]), V::N(row[3])]);
    }
    (name, data)
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap()
}

const BATCH_A: [[f64; 4]; 4] = [
    [1000.0, 100.0, 50.0, 10.0],
    [1500.0, 200.0, 40.0, 20.0],
    [1200.0, 120.0, 90.0, 5.0],
    [1800.0, 250.0, 70.0, 30.0],
];

const BATCH_B: [[f64; 4]; 3] = [
    [500.0, 10.0, 5.0, 1.0],
    [700.0, 30.0, 2.0, 8.0],
    [650.0, 25.0, 9.0, 3.0],
];

/// 5曜日＋マーケティングシートの通常アップロード
#[test]
fn test_full_week_with_marketing() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = XlsxMarketingStore::new(dir.path().join("history.xlsx"));

    let mut sheets = week_sheets();
    sheets.push(marketing_sheet("Marketing", &BATCH_A));
    let bytes = xlsx_bytes(&sheets);

    let response = process_upload_at("week42.xlsx", &bytes, &store, now()).unwrap();

    assert_eq!(response.customer_segments.len(), 10);
    assert_eq!(response.customer_segments[0].segment, "Ann Lee");
    assert_eq!(response.customer_segments[0].day, Weekday::Mon);
    // AM=1, Explorers 1="bus"(→0)
    assert_eq!(response.customer_segments[0].booking_count, 1);
    assert_eq!(response.customer_segments[1].total_charge, 4.5);

    assert_eq!(response.weekly_charges.len(), 5);
    assert_eq!(response.weekly_charges[4].day, Weekday::Fri);
    assert_eq!(response.weekly_charges[4].total_charge, 18.5);

    assert_eq!(response.bus_usage.len(), 20);
    assert_eq!(response.bus_usage[0].bus_service, "Mon AM");
    assert_eq!(response.bus_usage[0].usage, 1);
    assert_eq!(response.bus_usage[1].bus_service, "Mon Explorers 1");
    assert_eq!(response.bus_usage[1].usage, 1);

    assert_eq!(response.week_start.as_deref(), Some("week42.xlsx"));

    let analytics = response.marketing_analytics.expect("marketing analytics");
    assert_eq!(analytics.weeks_data.len(), 4);
    let mean_revenue = BATCH_A.iter().map(|r| r[0]).sum::<f64>() / BATCH_A.len() as f64;
    assert!((analytics.total_revenue_forecast - mean_revenue).abs() < 1e-6);
    assert_eq!(analytics.weeks_data[0].uploaded_at, "2026-10-16T08:00:00.000000");

    let stored = store.load().unwrap();
    assert_eq!(stored.len(), 4);
    assert_eq!(stored[0].roas_search, analytics.channel_roas.search);
}

/// 曜日シートが1枚欠けていたら全体が失敗し、履歴も更新されない
#[test]
fn test_missing_day_sheet_rejects_whole_upload() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = XlsxMarketingStore::new(dir.path().join("history.xlsx"));

    let mut sheets = week_sheets();
    sheets.remove(3);
    sheets.push(marketing_sheet("Marketing", &BATCH_A));
    let bytes = xlsx_bytes(&sheets);

    let err = process_upload_at("week.xlsx", &bytes, &store, now()).unwrap_err();
    assert!(matches!(err, ChargeSenseError::MissingRequiredSheet(Weekday::Thu)));
    assert_eq!(err.to_string(), "Missing Thu sheet");
    assert!(err.is_rejection());
    assert!(!store.path().exists());
}

/// シート名の前後の空白は無視して曜日・マーケティングを判定する
#[test]
fn test_padded_sheet_names_are_trimmed() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = XlsxMarketingStore::new(dir.path().join("history.xlsx"));

    let sheets = vec![
        day_sheet(" Mon ", 10.0),
        day_sheet("Tuesday ", 11.0),
        day_sheet("  Wed", 12.0),
        day_sheet("thu", 13.0),
        day_sheet("FRI ", 14.0),
        marketing_sheet(" Marketing ", &BATCH_A),
    ];
    let bytes = xlsx_bytes(&sheets);

    let response = process_upload_at("week.xlsx", &bytes, &store, now()).unwrap();

    assert_eq!(response.weekly_charges.len(), 5);
    assert_eq!(response.weekly_charges[0].day, Weekday::Mon);
    assert_eq!(response.weekly_charges[0].total_charge, 14.5);
    let analytics = response.marketing_analytics.expect("marketing analytics");
    assert_eq!(analytics.weeks_data.len(), BATCH_A.len());
    assert_eq!(store.load().unwrap().len(), BATCH_A.len());
}

/// Charge列のない曜日シート
#[test]
fn test_missing_charge_column() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = XlsxMarketingStore::new(dir.path().join("history.xlsx"));

    let mut sheets = week_sheets();
    sheets[2] = ("Wed", vec![vec![V::S("Forename"), V::S("Surname"), V::S("Price")]]);
    let bytes = xlsx_bytes(&sheets);

    let err = process_upload_at("week.xlsx", &bytes, &store, now()).unwrap_err();
    assert_eq!(err.to_string(), "Missing required column: 'Charge'");
}

/// マーケティング風の内容でもCSVはシート名で判定されない
#[test]
fn test_csv_is_never_marketing() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = XlsxMarketingStore::new(dir.path().join("history.xlsx"));

    let csv = b"revenue,search_spend,social_spend,email_spend\n100,10,5,1\n200,20,1,2\n";
    let response = process_upload_at("weekly.csv", csv, &store, now()).unwrap();

    assert!(response.marketing_analytics.is_none());
    assert!(response.customer_segments.is_empty());
    assert!(response.week_start.is_none());
    assert!(!store.path().exists());

    let json = serde_json::to_value(&response).unwrap();
    assert!(json["marketingAnalytics"].is_null());
    assert_eq!(json["message"], "Upload processed successfully");
}

/// 氏名が空の行は顧客一覧から除外されるが、曜日合計には含まれる
#[test]
fn test_weekly_total_counts_unnamed_rows() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = XlsxMarketingStore::new(dir.path().join("history.xlsx"));

    let mut sheets = week_sheets();
    sheets[0] = (
        "Monday",
        vec![
            vec![V::S("Forename"), V::S("Surname"), V::S("charge")],
            vec![V::S("Ann"), V::S("Lee"), V::N(10.0)],
            vec![V::E, V::E, V::N(25.0)],
        ],
    );
    let bytes = xlsx_bytes(&sheets);

    let response = process_upload_at("week.xlsx", &bytes, &store, now()).unwrap();

    let monday: Vec<_> = response
        .customer_segments
        .iter()
        .filter(|s| s.day == Weekday::Mon)
        .collect();
    assert_eq!(monday.len(), 1);
    assert_eq!(monday[0].total_charge, 10.0);
    assert_eq!(response.weekly_charges[0].total_charge, 35.0);
}

/// 連続アップロードは履歴の末尾に順に追記され、ROASはバッチごとに計算される
#[test]
fn test_sequential_uploads_append_in_order() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = XlsxMarketingStore::new(dir.path().join("data").join("history.xlsx"));

    let first = xlsx_bytes(&[marketing_sheet("marketing_a", &BATCH_A)]);
    let second = xlsx_bytes(&[marketing_sheet("Marketing B", &BATCH_B)]);

    let a = process_upload_at("a.xlsx", &first, &store, now()).unwrap();
    let b = process_upload_at("b.xlsx", &second, &store, now()).unwrap();

    let stored = store.load().unwrap();
    assert_eq!(stored.len(), BATCH_A.len() + BATCH_B.len());

    let revenues: Vec<f64> = stored.iter().map(|r| r.revenue).collect();
    let expected: Vec<f64> = BATCH_A.iter().chain(BATCH_B.iter()).map(|r| r[0]).collect();
    assert_eq!(revenues, expected);

    let roas_a = a.marketing_analytics.unwrap().channel_roas;
    let roas_b = b.marketing_analytics.unwrap().channel_roas;
    assert_eq!(stored[0].roas_search, roas_a.search);
    assert_eq!(stored[BATCH_A.len()].roas_search, roas_b.search);
    assert_ne!(roas_a.search, roas_b.search);

    // 追加列も履歴に残る
    assert_eq!(
        stored[0].extra("week"),
        Some(&chargesense_common::Cell::Text("W1".into()))
    );
}

/// マーケティングシートが1行だけならROAS・予測は0
#[test]
fn test_single_marketing_row_has_zero_roas() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = XlsxMarketingStore::new(dir.path().join("history.xlsx"));

    let bytes = xlsx_bytes(&[marketing_sheet("Marketing", &[[900.0, 50.0, 20.0, 10.0]])]);
    let response = process_upload_at("one.xlsx", &bytes, &store, now()).unwrap();

    let analytics = response.marketing_analytics.unwrap();
    assert_eq!(analytics.channel_roas.search, 0.0);
    assert_eq!(analytics.channel_roas.social, 0.0);
    assert_eq!(analytics.channel_roas.email, 0.0);
    assert_eq!(analytics.total_revenue_forecast, 0.0);
    assert_eq!(store.load().unwrap().len(), 1);
}

/// 非対応の拡張子
#[test]
fn test_unsupported_extension() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = XlsxMarketingStore::new(dir.path().join("history.xlsx"));

    let err = process_upload_at("week.pdf", b"%PDF", &store, now()).unwrap_err();
    assert!(matches!(err, ChargeSenseError::UnsupportedFormat(_)));
}

/// 拡張子がxlsxでも中身が壊れていれば読み込みエラー
#[test]
fn test_corrupt_workbook() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = XlsxMarketingStore::new(dir.path().join("history.xlsx"));

    let err = process_upload_at("week.xlsx", b"PK\x03\x04broken", &store, now()).unwrap_err();
    assert!(matches!(err, ChargeSenseError::MalformedInput(_)));
    assert!(err.to_string().starts_with("Failed to read file:"));
}
