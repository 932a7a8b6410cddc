use crate::breakout::Thresholds;
use crate::error::AnalysisError;
use actix_multipart::Multipart;
use bytes::BytesMut;
use chrono::NaiveDate;
use futures::StreamExt;
use std::collections::HashMap;

/// Name of the optional file field carrying daily bars as CSV.
pub const PRICES_FIELD: &str = "prices";
/// Shortest date range worth analysing, in days.
pub const MIN_RANGE_DAYS: i64 = 45;

/// Raw contents of a submitted analysis form.
#[derive(Debug, Default)]
pub struct AnalyzeForm {
    pub fields: HashMap<String, String>,
    pub prices: Option<Vec<u8>>,
}

/// A validated analysis request.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub thresholds: Thresholds,
}

impl AnalyzeForm {
    /// Drain a multipart payload. Text fields are kept by name, the `prices`
    /// field is kept as raw bytes; a field without a name is skipped.
    pub async fn read(mut multipart: Multipart) -> Result<AnalyzeForm, AnalysisError> {
        let mut form = AnalyzeForm::default();
        // For each multipart field
        while let Some(field) = multipart.next().await {
            let mut field = field?;
            let Some(name) = field
                .content_disposition()
                .and_then(|content_disposition| content_disposition.get_name())
                .map(str::to_owned)
            else {
                continue;
            };

            // Get all bytes of the field
            let mut bytes = BytesMut::new();
            while let Some(chunk) = field.next().await {
                bytes.extend_from_slice(&chunk?);
            }

            if name == PRICES_FIELD {
                form.prices = Some(bytes.to_vec());
            } else {
                form.fields
                    .insert(name, String::from_utf8_lossy(&bytes).into_owned());
            }
        }
        Ok(form)
    }

    fn text(&self, name: &str) -> Result<&str, AnalysisError> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .ok_or(AnalysisError::MissingFields)
    }

    fn number<T: std::str::FromStr>(&self, name: &str) -> Result<T, AnalysisError> {
        self.text(name)?
            .parse()
            .map_err(|_| AnalysisError::MissingFields)
    }

    fn date(&self, name: &str) -> Result<NaiveDate, AnalysisError> {
        NaiveDate::parse_from_str(self.text(name)?, "%Y-%m-%d")
            .map_err(|_| AnalysisError::MissingFields)
    }

    pub fn validate(&self) -> Result<AnalysisRequest, AnalysisError> {
        let ticker = self.text("ticker")?;
        let start_date = self.date("start_date")?;
        let end_date = self.date("end_date")?;
        let volume_threshold: f64 = self.number("volume_threshold")?;
        let price_change_threshold: f64 = self.number("price_change_threshold")?;
        let holding_period: i64 = self.number("holding_period")?;

        if volume_threshold == 0.0 || price_change_threshold == 0.0 || holding_period == 0 {
            return Err(AnalysisError::MissingFields);
        }
        if !volume_threshold.is_finite() || !price_change_threshold.is_finite() {
            return Err(AnalysisError::InvalidValues);
        }
        if volume_threshold < 0.0 || price_change_threshold < 0.0 || holding_period < 0 {
            return Err(AnalysisError::InvalidValues);
        }
        // The ticker ends up in a file name
        if !ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=' | '_'))
            || ticker.starts_with('.')
        {
            return Err(AnalysisError::InvalidValues);
        }
        if start_date > end_date {
            return Err(AnalysisError::DateOrder);
        }
        if (end_date - start_date).num_days() < MIN_RANGE_DAYS {
            return Err(AnalysisError::InsufficientData);
        }

        Ok(AnalysisRequest {
            ticker: ticker.to_owned(),
            start_date,
            end_date,
            thresholds: Thresholds {
                volume_threshold,
                price_change_threshold,
                holding_period: holding_period as usize,
            },
        })
    }
}
