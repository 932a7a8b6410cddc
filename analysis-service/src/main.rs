use actix_web::{middleware, web, App, HttpServer};
use analysis_service::config::{LISTEN_AT, QUOTES_URL, TRADES_FOLDER};
use analysis_service::quotes::YahooQuotes;
use analysis_service::{register, AppState};
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

fn create_trades_folder() -> io::Result<()> {
    let path: &str = &TRADES_FOLDER;
    // Recursive won't fail if the folders already exist
    fs::DirBuilder::new().recursive(true).create(path)
}

fn init() -> io::Result<()> {
    // Initialise logger
    env_logger::init();
    // Create the trades folder
    create_trades_folder()
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    init()?;
    let address: SocketAddr = LISTEN_AT
        .parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let client = YahooQuotes::client().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let quotes = YahooQuotes::new(client, &QUOTES_URL)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let state = web::Data::new(AppState {
        trades_folder: PathBuf::from(TRADES_FOLDER.as_str()),
        quotes: Arc::new(quotes),
    });
    log::info!("listening on {}", address);

    // Start http server
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            // Save shared state in Server's state
            .app_data(state.clone())
            .configure(register)
    })
    .bind(address)?
    .run()
    .await
}
