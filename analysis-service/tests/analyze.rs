use actix_web::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use analysis_service::breakout::Bar;
use analysis_service::quotes::QuoteSource;
use analysis_service::{register, AnalysisError, AppState};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

const BOUNDARY: &str = "----analysis-test-boundary";

struct StubQuotes(Result<Vec<Bar>, String>);

#[async_trait]
impl QuoteSource for StubQuotes {
    async fn daily_bars(
        &self,
        _ticker: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<Bar>, AnalysisError> {
        self.0.clone().map_err(AnalysisError::Quotes)
    }
}

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(offset)
}

/// Forty days with one breakout on day 25, held for five days for a 10% gain.
fn breakout_bars() -> Vec<Bar> {
    (0..40)
        .map(|i| Bar {
            date: day(i),
            close: match i {
                0..=24 => 100.0,
                25..=29 => 110.0,
                _ => 121.0,
            },
            volume: if i == 25 { 5000.0 } else { 1000.0 },
        })
        .collect()
}

fn flat_bars(count: i64) -> Vec<Bar> {
    (0..count)
        .map(|i| Bar {
            date: day(i),
            close: 100.0,
            volume: 1000.0,
        })
        .collect()
}

fn as_csv(bars: &[Bar]) -> String {
    let mut csv = String::from("Date,Open,Close,Volume\n");
    for bar in bars {
        csv.push_str(&format!("{},0,{},{}\n", bar.date, bar.close, bar.volume));
    }
    csv
}

fn fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("ticker", "TEST"),
        ("start_date", "2024-01-01"),
        ("end_date", "2024-03-01"),
        ("volume_threshold", "200"),
        ("price_change_threshold", "5"),
        ("holding_period", "5"),
    ]
}

fn multipart_body(fields: &[(&str, &str)], prices: Option<&str>) -> Vec<u8> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            BOUNDARY, name, value
        ));
    }
    if let Some(prices) = prices {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"prices\"; filename=\"prices.csv\"\r\nContent-Type: text/csv\r\n\r\n{}\r\n",
            BOUNDARY, prices
        ));
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));
    body.into_bytes()
}

fn analyze_request(fields: &[(&str, &str)], prices: Option<&str>) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/analyze")
        .insert_header((
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart_body(fields, prices))
}

fn state(quotes: StubQuotes, folder: &TempDir) -> web::Data<AppState> {
    web::Data::new(AppState {
        trades_folder: folder.path().to_path_buf(),
        quotes: Arc::new(quotes),
    })
}

async fn analyze(
    quotes: StubQuotes,
    fields: &[(&str, &str)],
    prices: Option<&str>,
) -> (StatusCode, Value, TempDir) {
    let folder = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new()
            .app_data(state(quotes, &folder))
            .configure(register),
    )
    .await;
    let response = test::call_service(&app, analyze_request(fields, prices).to_request()).await;
    let status = response.status();
    let body: Value = test::read_body_json(response).await;
    (status, body, folder)
}

#[actix_web::test]
async fn writes_a_trade_log_for_breakouts() {
    let (status, body, folder) = analyze(StubQuotes(Ok(breakout_bars())), &fields(), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "message": "Analysis complete!",
            "file": "trades/TEST_breakout_trades.csv"
        })
    );
    let log = std::fs::read_to_string(folder.path().join("TEST_breakout_trades.csv")).unwrap();
    assert_eq!(
        log,
        "Sr. No.,Ticker,Entry Date,Entry Price,Exit Date,Exit Price,Return (%)\n\
         1,TEST,2024-01-26,110.0,2024-01-31,121.0,10.0\n"
    );
}

#[actix_web::test]
async fn uploaded_prices_replace_the_provider() {
    let prices = as_csv(&breakout_bars());
    let quotes = StubQuotes(Err(String::from("provider should not be called")));
    let (status, body, _folder) = analyze(quotes, &fields(), Some(&prices)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Analysis complete!");
}

#[actix_web::test]
async fn missing_fields_are_rejected() {
    let mut partial = fields();
    partial.retain(|(name, _)| *name != "holding_period");
    let (status, body, _folder) = analyze(StubQuotes(Ok(breakout_bars())), &partial, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "All fields are required!" }));
}

#[actix_web::test]
async fn reversed_dates_are_rejected() {
    let mut reversed = fields();
    reversed[1] = ("start_date", "2024-06-01");
    let (status, body, _folder) = analyze(StubQuotes(Ok(breakout_bars())), &reversed, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Start date must be before end date!");
}

#[actix_web::test]
async fn provider_failures_are_reported() {
    let quotes = StubQuotes(Err(String::from("No data found, symbol may be delisted")));
    let (status, body, _folder) = analyze(quotes, &fields(), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No data found, symbol may be delisted");
}

#[actix_web::test]
async fn empty_data_is_reported() {
    let (status, body, _folder) = analyze(StubQuotes(Ok(Vec::new())), &fields(), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No data found for the given ticker!");
}

#[actix_web::test]
async fn too_few_bars_are_insufficient() {
    let (status, body, _folder) = analyze(StubQuotes(Ok(flat_bars(19))), &fields(), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Insufficient data for analysis!");
}

#[actix_web::test]
async fn no_breakouts_is_an_error_body_with_ok_status() {
    let (status, body, folder) = analyze(StubQuotes(Ok(flat_bars(40))), &fields(), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "error": "No breakout trades found!" }));
    assert!(!folder.path().join("TEST_breakout_trades.csv").exists());
}

#[actix_web::test]
async fn malformed_price_files_are_rejected() {
    let quotes = StubQuotes(Ok(breakout_bars()));
    let (status, body, _folder) = analyze(quotes, &fields(), Some("Date,Close\n2024-01-01,1\n")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid price file: missing `Volume` column");
}

#[actix_web::test]
async fn trade_logs_download_as_attachments() {
    let folder = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new()
            .app_data(state(StubQuotes(Ok(breakout_bars())), &folder))
            .configure(register),
    )
    .await;

    let response = test::call_service(&app, analyze_request(&fields(), None).to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    let file = body["file"].as_str().unwrap().to_owned();

    let request = test::TestRequest::get()
        .uri(&format!("/{}", file))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("TEST_breakout_trades.csv"));
    let csv = test::read_body(response).await;
    assert!(csv.starts_with(b"Sr. No.,Ticker"));
}

#[actix_web::test]
async fn unknown_or_hidden_files_are_not_found() {
    let folder = tempfile::tempdir().unwrap();
    std::fs::write(folder.path().join(".secret"), "hidden").unwrap();
    std::fs::write(folder.path().join("a..csv"), "dotted").unwrap();
    let app = test::init_service(
        App::new()
            .app_data(state(StubQuotes(Ok(Vec::new())), &folder))
            .configure(register),
    )
    .await;

    for uri in ["/trades/missing.csv", "/trades/.secret", "/trades/a..csv"] {
        let response = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}
