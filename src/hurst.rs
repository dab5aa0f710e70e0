//! Hurst exponent estimation for one-dimensional series
//!
//! Two independent estimators of self-similarity, both reduced to a
//! power-law fit over a range of lag scales: the deviation of lagged
//! differences, and the generalized structure function.

use crate::error::{invalid, Error, Result};

/// Estimate H from the standard deviation of lagged differences.
///
/// For each lag in `2..=max_lag` the series is differenced at that lag and
/// the deviation of the differences recorded; H is the slope of the
/// deviations against the lags in log-log space.
pub fn simple(series: &[f64], max_lag: usize) -> Result<f64> {
    check_series(series, max_lag)?;

    let mut log_lags = Vec::with_capacity(max_lag - 1);
    let mut log_taus = Vec::with_capacity(max_lag - 1);
    for lag in 2..=max_lag {
        let diffs: Vec<f64> = series[lag..]
            .iter()
            .zip(series[..series.len() - lag].iter())
            .map(|(a, b)| a - b)
            .collect();
        let tau = deviation(&diffs);
        if tau <= 0.0 {
            return Err(Error::Statistical(format!(
                "zero dispersion at lag {}",
                lag
            )));
        }
        log_lags.push((lag as f64).ln());
        log_taus.push(tau.ln());
    }

    let (slope, _) = linear_fit(&log_lags, &log_taus)?;
    Ok(slope)
}

/// Estimate H from the generalized structure function of order `q`.
///
/// The structure function at each lag is the mean of `|x[t+lag] - x[t]|^q`;
/// its log-log slope against the lags is `q * H`.
pub fn generalized(series: &[f64], max_lag: usize, q: f64) -> Result<f64> {
    check_series(series, max_lag)?;
    if q <= 0.0 || !q.is_finite() {
        return Err(invalid(format!("moment order q must be positive, got {}", q)));
    }

    let mut log_lags = Vec::with_capacity(max_lag - 1);
    let mut log_sq = Vec::with_capacity(max_lag - 1);
    for lag in 2..=max_lag {
        let n = series.len() - lag;
        let sq = series[lag..]
            .iter()
            .zip(series[..n].iter())
            .map(|(a, b)| (a - b).abs().powf(q))
            .sum::<f64>()
            / n as f64;
        if sq <= 0.0 {
            return Err(Error::Statistical(format!(
                "degenerate structure function at lag {}",
                lag
            )));
        }
        log_lags.push((lag as f64).ln());
        log_sq.push(sq.ln());
    }

    let (slope, _) = linear_fit(&log_lags, &log_sq)?;
    Ok(slope / q)
}

fn check_series(series: &[f64], max_lag: usize) -> Result<()> {
    if max_lag < 3 {
        return Err(invalid("max_lag must be at least 3"));
    }
    if series.len() <= max_lag + 1 {
        return Err(invalid(format!(
            "series of {} points is too short for max_lag {}",
            series.len(),
            max_lag
        )));
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(Error::Statistical("series contains non-finite values".into()));
    }
    Ok(())
}

/// Population standard deviation
fn deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Ordinary least-squares fit of `ys` against `xs`
fn linear_fit(xs: &[f64], ys: &[f64]) -> Result<(f64, f64)> {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        covariance += (x - mean_x) * (y - mean_y);
        variance += (x - mean_x).powi(2);
    }
    if variance == 0.0 {
        return Err(Error::Statistical(
            "ill-conditioned fit: no spread in lag scales".into(),
        ));
    }

    let slope = covariance / variance;
    Ok((slope, mean_y - slope * mean_x))
}
