use crate::breakout::Trade;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the trade log for `ticker`, ex: AAPL_breakout_trades.csv
pub fn report_name(ticker: &str) -> String {
    format!("{}_breakout_trades.csv", ticker)
}

pub fn write_csv<W: io::Write>(writer: W, trades: &[Trade]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for trade in trades {
        writer.serialize(trade.row())?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the trade log into `folder`, replacing an older log for the same ticker.
pub fn save_report(folder: &Path, ticker: &str, trades: &[Trade]) -> io::Result<PathBuf> {
    // Recursive won't fail if the folders already exist
    fs::DirBuilder::new().recursive(true).create(folder)?;
    let path = folder.join(report_name(ticker));
    let file = fs::File::create(&path)?;
    write_csv(file, trades).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    Ok(path)
}
