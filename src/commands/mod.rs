pub mod archives;
pub mod backtest;
pub mod beta;
pub mod daily_trades;
pub mod health;
pub mod portfolio;
pub mod stocks;
pub mod sweep;
pub mod testing;

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a single backend request is in flight. Finished (and
/// cleared) by the caller as soon as the response lands.
pub(crate) fn request_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
