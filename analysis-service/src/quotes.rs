use crate::breakout::Bar;
use crate::error::AnalysisError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::Deserialize;
use url::Url;

/// Supplies daily bars for `start <= date < end`, oldest first.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn daily_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, AnalysisError>;
}

/// Parse an uploaded CSV of daily bars.
///
/// The header row decides where `Date`, `Close` and `Volume` live; other
/// columns (`Open`, `Adj Close`, ...) are ignored. Rows with an empty close or
/// volume are skipped.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<Bar>, AnalysisError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| AnalysisError::PriceFile(e.to_string()))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name))
            .ok_or_else(|| AnalysisError::PriceFile(format!("missing `{}` column", name)))
    };
    let (date_at, close_at, volume_at) = (column("Date")?, column("Close")?, column("Volume")?);

    let mut bars = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| AnalysisError::PriceFile(e.to_string()))?;
        let (Some(date), Some(close), Some(volume)) =
            (record.get(date_at), record.get(close_at), record.get(volume_at))
        else {
            continue;
        };
        if close.is_empty() || volume.is_empty() {
            continue;
        }
        let invalid = |what: &str| {
            // header is line 1
            AnalysisError::PriceFile(format!("invalid {} on line {}", what, line + 2))
        };
        bars.push(Bar {
            date: parse_date(date).ok_or_else(|| invalid("date"))?,
            close: close.parse().map_err(|_| invalid("close"))?,
            volume: volume.parse().map_err(|_| invalid("volume"))?,
        });
    }

    bars.sort_by_key(|bar| bar.date);
    Ok(bars)
}

/// Keep the bars dated `start <= date < end`.
pub fn within(bars: Vec<Bar>, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    bars.into_iter()
        .filter(|bar| start <= bar.date && bar.date < end)
        .collect()
}

// Accepts `2024-01-02` as well as exports with a time part, `2024-01-02 00:00:00-05:00`
fn parse_date(value: &str) -> Option<NaiveDate> {
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Sent with every chart request, the API rejects clients without one.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Daily bars from the Yahoo Finance chart API.
pub struct YahooQuotes {
    client: reqwest::Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Deserialize)]
struct ChartError {
    description: String,
}

#[derive(Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl YahooQuotes {
    /// A client that identifies itself with [`USER_AGENT`].
    pub fn client() -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder().user_agent(USER_AGENT).build()
    }

    pub fn new(client: reqwest::Client, base_url: &str) -> Result<YahooQuotes, url::ParseError> {
        // Keep the last path segment when joining the ticker
        let base = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{}/", base_url)
        };
        Ok(YahooQuotes {
            client,
            base_url: Url::parse(&base)?,
        })
    }

    fn chart_url(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Url, AnalysisError> {
        let mut url = self
            .base_url
            .join(ticker)
            .map_err(|e| AnalysisError::Quotes(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("period1", &midnight_timestamp(start).to_string())
            .append_pair("period2", &midnight_timestamp(end).to_string())
            .append_pair("interval", "1d");
        Ok(url)
    }
}

#[async_trait]
impl QuoteSource for YahooQuotes {
    async fn daily_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, AnalysisError> {
        let url = self.chart_url(ticker, start, end)?;
        log::debug!("fetching quotes from {}", url);

        let response: ChartResponse = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AnalysisError::Quotes(e.to_string()))?
            .json()
            .await
            .map_err(|e| AnalysisError::Quotes(e.to_string()))?;

        let bars = chart_bars(response.chart)?;
        Ok(within(bars, start, end))
    }
}

fn chart_bars(chart: Chart) -> Result<Vec<Bar>, AnalysisError> {
    if let Some(error) = chart.error {
        return Err(AnalysisError::Quotes(error.description));
    }
    let Some(result) = chart.result.and_then(|results| results.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(Vec::new());
    };

    let bars = result
        .timestamp
        .iter()
        .zip(quote.close.iter().zip(quote.volume.iter()))
        .filter_map(|(timestamp, (close, volume))| {
            Some(Bar {
                date: DateTime::from_timestamp(*timestamp, 0)?.date_naive(),
                close: (*close)?,
                volume: (*volume)?,
            })
        })
        .collect();
    Ok(bars)
}

fn midnight_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn reads_columns_by_name() {
        let csv = b"Date,Open,High,Low,Close,Adj Close,Volume\n\
            2024-01-03,1,1,1,11.5,11.4,2000\n\
            2024-01-02,1,1,1,10.0,9.9,1000\n";
        let bars = parse_csv(csv).unwrap();
        assert_eq!(
            bars,
            vec![
                Bar {
                    date: date("2024-01-02"),
                    close: 10.0,
                    volume: 1000.0
                },
                Bar {
                    date: date("2024-01-03"),
                    close: 11.5,
                    volume: 2000.0
                },
            ]
        );
    }

    #[test]
    fn accepts_timestamps_and_skips_gaps() {
        let csv = b"date,close,volume\n\
            2024-01-02 00:00:00-05:00, 10.0, 1000\n\
            2024-01-03 00:00:00-05:00,,\n";
        let bars = parse_csv(csv).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, date("2024-01-02"));
    }

    #[test]
    fn reports_missing_columns() {
        let err = parse_csv(b"Date,Close\n2024-01-02,10\n").unwrap_err();
        assert_eq!(err.to_string(), "Invalid price file: missing `Volume` column");
    }

    #[test]
    fn reports_the_offending_line() {
        let err = parse_csv(b"Date,Close,Volume\n2024-01-02,10,5\n2024-01-03,ten,5\n").unwrap_err();
        assert_eq!(err.to_string(), "Invalid price file: invalid close on line 3");
    }

    #[test]
    fn end_date_is_exclusive() {
        let bars = parse_csv(b"Date,Close,Volume\n2024-01-01,1,1\n2024-01-02,1,1\n2024-01-03,1,1\n")
            .unwrap();
        let kept = within(bars, date("2024-01-02"), date("2024-01-03"));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].date, date("2024-01-02"));
    }

    #[test]
    fn decodes_chart_responses() {
        let body = r#"{"chart": {"result": [{
            "timestamp": [1704205800, 1704292200, 1704378600],
            "indicators": {"quote": [{
                "close": [185.64, null, 181.91],
                "volume": [82488700, 58414500, 71983600]
            }]}
        }], "error": null}}"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();
        let bars = chart_bars(response.chart).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, date("2024-01-02"));
        assert_eq!(bars[1].close, 181.91);
    }

    #[test]
    fn chart_errors_surface_their_description() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();
        let err = chart_bars(response.chart).unwrap_err();
        assert_eq!(err.to_string(), "No data found, symbol may be delisted");
    }

    #[test]
    fn builds_chart_urls() {
        let quotes = YahooQuotes::new(
            YahooQuotes::client().unwrap(),
            "https://query1.finance.yahoo.com/v8/finance/chart",
        )
        .unwrap();
        let url = quotes
            .chart_url("AAPL", date("2024-01-01"), date("2024-01-02"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://query1.finance.yahoo.com/v8/finance/chart/AAPL?period1=1704067200&period2=1704153600&interval=1d"
        );
    }
}
