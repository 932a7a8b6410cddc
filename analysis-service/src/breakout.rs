//! Volume and price breakout detection over daily bars.
//!
//! A day is a breakout when its volume exceeds a multiple of the trailing
//! 20-day average volume and its close rose by at least a given percentage
//! over the previous close. Every breakout taken while flat opens a position
//! that is closed `holding_period` bars later.

use chrono::NaiveDate;
use serde::Serialize;

pub const VOLUME_WINDOW: usize = 20;

/// One trading day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Volume as a percentage of the 20-day average, `200.0` means twice the average
    pub volume_threshold: f64,
    /// Minimum daily change of the close, in percent
    pub price_change_threshold: f64,
    /// Bars between entry and exit
    pub holding_period: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exit {
    pub date: NaiveDate,
    pub price: f64,
    pub return_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub sr_no: usize,
    pub ticker: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    /// `None` when the holding period runs past the last bar
    pub exit: Option<Exit>,
}

/// Row of the trade log as written to CSV.
#[derive(Debug, Serialize)]
pub struct TradeRow<'a> {
    #[serde(rename = "Sr. No.")]
    pub sr_no: usize,
    #[serde(rename = "Ticker")]
    pub ticker: &'a str,
    #[serde(rename = "Entry Date")]
    pub entry_date: NaiveDate,
    #[serde(rename = "Entry Price")]
    pub entry_price: f64,
    #[serde(rename = "Exit Date")]
    pub exit_date: Option<NaiveDate>,
    #[serde(rename = "Exit Price")]
    pub exit_price: Option<f64>,
    #[serde(rename = "Return (%)")]
    pub return_pct: Option<f64>,
}

impl Trade {
    pub fn row(&self) -> TradeRow<'_> {
        TradeRow {
            sr_no: self.sr_no,
            ticker: &self.ticker,
            entry_date: self.entry_date,
            entry_price: self.entry_price,
            exit_date: self.exit.map(|exit| exit.date),
            exit_price: self.exit.map(|exit| exit.price),
            return_pct: self.exit.map(|exit| exit.return_pct),
        }
    }
}

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean volume of the window ending at each bar, `None` until the window is full.
pub fn rolling_average_volume(bars: &[Bar]) -> Vec<Option<f64>> {
    let mut averages = Vec::with_capacity(bars.len());
    let mut sum = 0.0;
    for (i, bar) in bars.iter().enumerate() {
        sum += bar.volume;
        if i >= VOLUME_WINDOW {
            sum -= bars[i - VOLUME_WINDOW].volume;
        }
        averages.push(if i + 1 >= VOLUME_WINDOW {
            Some(sum / VOLUME_WINDOW as f64)
        } else {
            None
        });
    }
    averages
}

/// Percentage change of each close over the previous one, `None` for the first bar.
pub fn price_changes(bars: &[Bar]) -> Vec<Option<f64>> {
    std::iter::once(None)
        .chain(
            bars.windows(2)
                .map(|pair| Some((pair[1].close - pair[0].close) / pair[0].close * 100.0)),
        )
        .take(bars.len())
        .collect()
}

pub fn breakout_days(bars: &[Bar], thresholds: &Thresholds) -> Vec<bool> {
    let volume_multiple = thresholds.volume_threshold / 100.0;
    rolling_average_volume(bars)
        .into_iter()
        .zip(price_changes(bars))
        .zip(bars)
        .map(|((average, change), bar)| {
            let volume_breakout = average.is_some_and(|average| bar.volume > volume_multiple * average);
            let price_breakout =
                change.is_some_and(|change| change >= thresholds.price_change_threshold);
            volume_breakout && price_breakout
        })
        .collect()
}

pub fn find_trades(ticker: &str, bars: &[Bar], thresholds: &Thresholds) -> Vec<Trade> {
    let breakouts = breakout_days(bars, thresholds);
    let mut trades: Vec<Trade> = Vec::new();
    let mut exit_index: Option<usize> = None;

    for (i, bar) in bars.iter().enumerate() {
        match exit_index {
            None if breakouts[i] => {
                trades.push(Trade {
                    sr_no: trades.len() + 1,
                    ticker: ticker.to_owned(),
                    entry_date: bar.date,
                    entry_price: round2(bar.close),
                    exit: None,
                });
                exit_index = Some(i + thresholds.holding_period);
            }
            Some(index) if index == i => {
                if let Some(trade) = trades.last_mut() {
                    let price = round2(bar.close);
                    trade.exit = Some(Exit {
                        date: bar.date,
                        price,
                        return_pct: round2((price - trade.entry_price) / trade.entry_price * 100.0),
                    });
                }
                exit_index = None;
            }
            _ => {}
        }
    }

    trades
}
