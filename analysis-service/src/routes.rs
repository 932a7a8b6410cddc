use crate::breakout::{find_trades, Bar};
use crate::config::TRADES_ROUTE;
use crate::error::{AnalysisError, ErrorBody};
use crate::form::{AnalysisRequest, AnalyzeForm};
use crate::quotes::{self, QuoteSource};
use crate::report::{report_name, save_report};
use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// Minimum number of bars the analysis needs, one full volume window.
pub const MIN_BARS: usize = 20;

pub struct AppState {
    pub trades_folder: PathBuf,
    pub quotes: Arc<dyn QuoteSource>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub message: String,
    pub file: String,
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/analyze").route(web::post().to(analyze)))
        .service(
            web::resource(format!("/{}/{{filename}}", TRADES_ROUTE.as_str()))
                .route(web::get().to(download)),
        );
}

async fn load_bars(
    state: &AppState,
    request: &AnalysisRequest,
    prices: Option<Vec<u8>>,
) -> Result<Vec<Bar>, AnalysisError> {
    match prices {
        Some(prices) => Ok(quotes::within(
            quotes::parse_csv(&prices)?,
            request.start_date,
            request.end_date,
        )),
        None => {
            state
                .quotes
                .daily_bars(&request.ticker, request.start_date, request.end_date)
                .await
        }
    }
}

pub async fn analyze(
    state: web::Data<AppState>,
    multipart: Multipart,
) -> Result<HttpResponse, AnalysisError> {
    let form = AnalyzeForm::read(multipart).await?;
    let request = form.validate()?;

    // Fetch and process data
    let bars = load_bars(&state, &request, form.prices).await?;
    if bars.is_empty() {
        return Err(AnalysisError::NoData);
    }
    if bars.len() < MIN_BARS {
        return Err(AnalysisError::InsufficientData);
    }

    let trades = find_trades(&request.ticker, &bars, &request.thresholds);
    if trades.is_empty() {
        return Ok(HttpResponse::Ok().json(ErrorBody {
            error: String::from("No breakout trades found!"),
        }));
    }
    log::info!(
        "{}: {} trade(s) over {} bar(s)",
        request.ticker,
        trades.len(),
        bars.len()
    );

    // fs operations are blocking, we have to execute writes on threadpool
    let folder = state.trades_folder.clone();
    let ticker = request.ticker.clone();
    let saved = web::block(move || save_report(&folder, &ticker, &trades))
        .await
        .unwrap_or_else(|e| Err(io::Error::new(io::ErrorKind::Other, e.to_string())));
    let path = saved.map_err(|source| AnalysisError::Io {
        operation: String::from("write trade log"),
        source,
    })?;
    log::debug!("trade log written to {}", path.display());

    Ok(HttpResponse::Ok().json(AnalyzeResponse {
        message: String::from("Analysis complete!"),
        file: format!("{}/{}", TRADES_ROUTE.as_str(), report_name(&request.ticker)),
    }))
}

pub async fn download(
    state: web::Data<AppState>,
    filename: web::Path<String>,
) -> Result<NamedFile, AnalysisError> {
    let filename = filename.into_inner();
    if filename.is_empty()
        || filename.starts_with('.')
        || filename.contains("..")
        || filename.contains(|c: char| c == '/' || c == '\\')
    {
        return Err(AnalysisError::NotFound);
    }
    log::debug!("serving trade log {}", filename);

    let file = NamedFile::open_async(state.trades_folder.join(&filename))
        .await
        .map_err(|_| AnalysisError::NotFound)?;
    Ok(file.set_content_disposition(ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(filename)],
    }))
}
