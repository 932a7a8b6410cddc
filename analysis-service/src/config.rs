use std::env;

// Evaluate env vars only once
lazy_static::lazy_static! {
    pub static ref LISTEN_AT: String =
        env::var("LISTEN_AT").unwrap_or_else(|_| String::from("127.0.0.1:5000"));
    pub static ref TRADES_FOLDER: String =
        env::var("TRADES_FOLDER").unwrap_or_else(|_| String::from("trades"));
    pub static ref TRADES_ROUTE: String =
        env::var("TRADES_ROUTE").unwrap_or_else(|_| String::from("trades"));
    pub static ref QUOTES_URL: String = env::var("QUOTES_URL")
        .unwrap_or_else(|_| String::from("https://query1.finance.yahoo.com/v8/finance/chart"));
}
