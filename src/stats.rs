use chrono::NaiveDate;
use statrs::statistics::Statistics;
use std::cmp::Ordering;

const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 60.0 * 60.0;

/// Back-calculate CAGR from a total-return percentage and the run's date
/// range. The backend reports returns as percentages; the views derive the
/// annualized figure locally.
pub fn cagr_from_return_percent(total_return_percent: f64, start: NaiveDate, end: NaiveDate) -> f64 {
    if !total_return_percent.is_finite() || end <= start {
        return 0.0;
    }

    let seconds = (end - start).num_seconds() as f64;
    let years = seconds / SECONDS_PER_YEAR;
    if years <= 0.0 {
        return 0.0;
    }

    let growth_ratio = 1.0 + total_return_percent / 100.0;
    if growth_ratio <= 0.0 {
        return -100.0;
    }

    (growth_ratio.powf(1.0 / years) - 1.0) * 100.0
}

/// Summary line over the return figures of a sweep. Non-finite values are
/// excluded from every statistic.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub best: f64,
    pub worst: f64,
}

pub fn summarize_returns(values: &[f64]) -> ReturnSummary {
    let filtered: Vec<f64> = values
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .collect();

    if filtered.is_empty() {
        return ReturnSummary {
            count: 0,
            mean: 0.0,
            median: 0.0,
            std_dev: 0.0,
            best: 0.0,
            worst: 0.0,
        };
    }

    let mean = filtered.clone().mean();
    let std_dev = if filtered.len() > 1 {
        filtered.clone().std_dev()
    } else {
        0.0
    };
    let best = filtered.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let worst = filtered.iter().copied().fold(f64::INFINITY, f64::min);

    ReturnSummary {
        count: filtered.len(),
        mean,
        median: median(&filtered),
        std_dev,
        best,
        worst,
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cagr_matches_closed_form() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();

        let cagr = cagr_from_return_percent(21.0, start, end);

        let years = (end - start).num_seconds() as f64 / SECONDS_PER_YEAR;
        let expected = (1.21_f64.powf(1.0 / years) - 1.0) * 100.0;
        assert!((cagr - expected).abs() < 1e-9);
    }

    #[test]
    fn cagr_of_inverted_range_is_zero() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert_eq!(cagr_from_return_percent(10.0, start, end), 0.0);
    }

    #[test]
    fn total_loss_caps_at_minus_one_hundred() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(cagr_from_return_percent(-100.0, start, end), -100.0);
    }

    #[test]
    fn summary_excludes_non_finite_values() {
        let summary = summarize_returns(&[10.0, f64::NAN, 20.0, f64::INFINITY, 30.0]);
        assert_eq!(summary.count, 3);
        assert!((summary.mean - 20.0).abs() < 1e-9);
        assert!((summary.median - 20.0).abs() < 1e-9);
        assert!((summary.best - 30.0).abs() < 1e-9);
        assert!((summary.worst - 10.0).abs() < 1e-9);
    }

    #[test]
    fn empty_summary_is_all_zero() {
        let summary = summarize_returns(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean, 0.0);
    }

    #[test]
    fn even_length_median_averages_middle_pair() {
        let summary = summarize_returns(&[1.0, 2.0, 3.0, 4.0]);
        assert!((summary.median - 2.5).abs() < 1e-9);
    }
}
