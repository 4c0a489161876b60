//! `FittingEngine`: picks the best-fit parametric [`Distribution`] for a
//! sample vector by AIC. Two entry points — [`fit_interarrival`] for
//! continuous non-negative gaps, [`fit_alighting`] for discrete counts —
//! mirroring the two ways the source data is collected.

use serde::{Deserialize, Serialize};
use statrs::function::gamma::ln_gamma;

use crate::distributions::Distribution;

const MIN_SHAPE: f64 = 0.2;

/// One raw observation in a fitting request.
#[derive(Debug, Clone, Deserialize)]
pub struct FitRecord {
    #[serde(rename = "Record_ID")]
    pub record_id: i64,
    #[serde(rename = "Numeric_Value")]
    pub numeric_value: f64,
}

/// A (station, time range) bucket of raw observations to fit.
#[derive(Debug, Clone, Deserialize)]
pub struct FitDataEntry {
    #[serde(rename = "Station")]
    pub station: String,
    #[serde(rename = "Time_Range")]
    pub time_range: String,
    #[serde(rename = "Records")]
    pub records: Vec<FitRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FitRequest {
    #[serde(rename = "Data")]
    pub data: Vec<FitDataEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FitResponseEntry {
    #[serde(rename = "Station")]
    pub station: String,
    #[serde(rename = "Time_Range")]
    pub time_range: String,
    #[serde(rename = "Distribution")]
    pub distribution: String,
    #[serde(rename = "ArgumentList")]
    pub argument_list: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FitResponse {
    #[serde(rename = "DataFitResponse")]
    pub data_fit_response: Vec<FitResponseEntry>,
}

fn fit_entries<F>(req: &FitRequest, fit: F) -> FitResponse
where
    F: Fn(&[f64]) -> Distribution,
{
    let data_fit_response = req
        .data
        .iter()
        .map(|entry| {
            let values: Vec<f64> = entry.records.iter().map(|r| r.numeric_value).collect();
            let dist = fit(&values);
            FitResponseEntry {
                station: entry.station.clone(),
                time_range: entry.time_range.clone(),
                distribution: dist.name().to_string(),
                argument_list: dist.argument_list(),
            }
        })
        .collect();
    FitResponse { data_fit_response }
}

/// Fit every entry's records as interarrival gaps.
pub fn fit_interarrival_request(req: &FitRequest) -> FitResponse {
    fit_entries(req, fit_interarrival)
}

/// Fit every entry's records as alighting counts.
pub fn fit_alighting_request(req: &FitRequest) -> FitResponse {
    fit_entries(req, fit_alighting)
}

/// Fit the best interarrival-gap distribution to `raw` (continuous,
/// non-negative samples). Outliers above the 99th percentile are trimmed
/// first when there are enough samples to make that meaningful.
pub fn fit_interarrival(raw: &[f64]) -> Distribution {
    if raw.is_empty() {
        return Distribution::Constant { value: 0.0 };
    }
    if all_equal(raw) {
        return Distribution::Constant { value: raw[0] };
    }

    let values: Vec<f64> = if raw.len() > 10 {
        let cutoff = percentile(raw, 99.0);
        let trimmed: Vec<f64> = raw.iter().copied().filter(|v| *v <= cutoff).collect();
        if trimmed.len() >= 2 {
            trimmed
        } else {
            raw.to_vec()
        }
    } else {
        raw.to_vec()
    };

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let mut best: Option<(f64, Distribution)> = None;
    let mut consider = |aic: f64, dist: Distribution| {
        if !aic.is_finite() {
            return;
        }
        match &best {
            Some((best_aic, _)) if *best_aic <= aic => {}
            _ => best = Some((aic, dist)),
        }
    };

    // Exponential: loc = min, rate = 1 / (mean - loc).
    {
        let loc = min;
        let scale = (mean - loc).max(1e-9);
        let rate = 1.0 / scale;
        let dist = Distribution::Exponential { rate, loc };
        let log_l: f64 = values.iter().map(|v| exponential_logpdf(*v, rate, loc)).sum();
        consider(2.0 * 2.0 - 2.0 * log_l, dist);
    }

    // Weibull: loc fixed at 0, shape via Newton-Raphson, scale closed-form
    // given the shape.
    if let Some(shape) = fit_weibull_shape(&values) {
        if shape >= MIN_SHAPE {
            let scale = weibull_scale_given_shape(&values, shape);
            if scale.is_finite() && scale > 0.0 {
                let dist = Distribution::Weibull { shape, scale, loc: 0.0 };
                let log_l: f64 = values
                    .iter()
                    .map(|v| weibull_logpdf(*v, shape, scale, 0.0))
                    .sum();
                consider(2.0 * 3.0 - 2.0 * log_l, dist);
            }
        }
    }

    // Gamma: loc fixed at 0, shape via Minka's closed-form approximation,
    // scale = mean / shape.
    if let Some(shape) = fit_gamma_shape(&values) {
        if shape >= MIN_SHAPE {
            let scale = (mean / shape).max(1e-9);
            let dist = Distribution::Gamma { shape, scale, loc: 0.0 };
            let log_l: f64 = values
                .iter()
                .map(|v| gamma_logpdf(*v, shape, scale, 0.0))
                .sum();
            consider(2.0 * 3.0 - 2.0 * log_l, dist);
        }
    }

    // Uniform: loc fixed at 0, [min, max] from the sample extremes.
    {
        let dist = Distribution::Uniform { min, max, loc: 0.0 };
        let log_l: f64 = values.iter().map(|v| uniform_logpdf(*v, min, max)).sum();
        consider(2.0 * 2.0 - 2.0 * log_l, dist);
    }

    // Poisson, fit by sample mean regardless of the continuous candidates.
    {
        let lambda = mean.max(1e-9);
        let dist = Distribution::Poisson { lambda };
        let log_l: f64 = values.iter().map(|v| poisson_logpmf(*v, lambda)).sum();
        consider(2.0 * 1.0 - 2.0 * log_l, dist);
    }

    best.map(|(_, d)| d).unwrap_or_else(|| {
        let loc = min;
        let rate = 1.0 / (mean - loc).max(1e-9);
        Distribution::Exponential { rate, loc }
    })
}

/// Fit the best alighting-count distribution to `raw` (rounded to integer
/// counts first).
pub fn fit_alighting(raw: &[f64]) -> Distribution {
    if raw.is_empty() {
        return Distribution::Constant { value: 0.0 };
    }
    let values: Vec<i64> = raw.iter().map(|v| v.round() as i64).collect();
    if values.iter().all(|v| *v == values[0]) {
        return Distribution::Constant { value: values[0] as f64 };
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<i64>() as f64 / n;
    let min = *values.iter().min().unwrap();
    let max = *values.iter().max().unwrap();

    let mut best: Option<(f64, Distribution)> = None;

    {
        let lambda = mean.max(1e-9);
        let log_l: f64 = values
            .iter()
            .map(|v| poisson_logpmf(*v as f64, lambda))
            .sum();
        let aic = 2.0 * 1.0 - 2.0 * log_l;
        if aic.is_finite() {
            best = Some((aic, Distribution::Poisson { lambda }));
        }
    }

    {
        let span = (max - min + 1) as f64;
        let log_pmf = -span.ln();
        let log_l = log_pmf * n;
        let aic = 2.0 * 2.0 - 2.0 * log_l;
        if aic.is_finite() {
            let better = match &best {
                Some((best_aic, _)) => aic < *best_aic,
                None => true,
            };
            if better {
                best = Some((aic, Distribution::IntUniform { min, max }));
            }
        }
    }

    best.map(|(_, d)| d)
        .unwrap_or(Distribution::Constant { value: mean })
}

fn all_equal(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

/// Linear-interpolated percentile, numpy's default method.
fn percentile(values: &[f64], pct: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = (pct / 100.0) * (n as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] + frac * (sorted[hi] - sorted[lo])
    }
}

fn exponential_logpdf(x: f64, rate: f64, loc: f64) -> f64 {
    let z = x - loc;
    if z < 0.0 {
        return f64::NEG_INFINITY;
    }
    rate.ln() - rate * z
}

fn uniform_logpdf(x: f64, min: f64, max: f64) -> f64 {
    if x < min || x > max || max <= min {
        f64::NEG_INFINITY
    } else {
        -(max - min).ln()
    }
}

fn weibull_logpdf(x: f64, shape: f64, scale: f64, loc: f64) -> f64 {
    let z = x - loc;
    if z < 0.0 {
        return f64::NEG_INFINITY;
    }
    if z == 0.0 {
        return if shape < 1.0 { f64::INFINITY } else { f64::NEG_INFINITY };
    }
    shape.ln() - shape * scale.ln() + (shape - 1.0) * z.ln() - (z / scale).powf(shape)
}

fn gamma_logpdf(x: f64, shape: f64, scale: f64, loc: f64) -> f64 {
    let z = x - loc;
    if z <= 0.0 {
        return f64::NEG_INFINITY;
    }
    (shape - 1.0) * z.ln() - z / scale - shape * scale.ln() - ln_gamma(shape)
}

fn poisson_logpmf(x: f64, lambda: f64) -> f64 {
    if x < 0.0 || lambda <= 0.0 {
        return f64::NEG_INFINITY;
    }
    x * lambda.ln() - lambda - ln_gamma(x + 1.0)
}

/// Newton-Raphson estimate of the Weibull shape parameter (loc fixed at 0),
/// via finite-difference derivative of the profile log-likelihood.
fn fit_weibull_shape(values: &[f64]) -> Option<f64> {
    if values.iter().any(|v| *v <= 0.0) {
        return None;
    }
    let mut shape = 1.0_f64;
    let profile = |k: f64| -> f64 {
        let scale = weibull_scale_given_shape(values, k);
        if !scale.is_finite() || scale <= 0.0 {
            return f64::NEG_INFINITY;
        }
        values.iter().map(|v| weibull_logpdf(*v, k, scale, 0.0)).sum()
    };
    let h = 1e-4;
    for _ in 0..50 {
        let f0 = profile(shape);
        let f_plus = profile(shape + h);
        let f_minus = profile((shape - h).max(1e-6));
        if !(f0.is_finite() && f_plus.is_finite() && f_minus.is_finite()) {
            break;
        }
        let grad = (f_plus - f_minus) / (2.0 * h);
        let hess = (f_plus - 2.0 * f0 + f_minus) / (h * h);
        if hess.abs() < 1e-12 {
            break;
        }
        let step = grad / hess;
        let next = (shape - step).max(1e-3);
        if (next - shape).abs() < 1e-7 {
            shape = next;
            break;
        }
        shape = next;
    }
    if shape.is_finite() && shape > 0.0 {
        Some(shape)
    } else {
        None
    }
}

fn weibull_scale_given_shape(values: &[f64], shape: f64) -> f64 {
    let n = values.len() as f64;
    let sum_pow: f64 = values.iter().map(|v| v.powf(shape)).sum();
    (sum_pow / n).powf(1.0 / shape)
}

/// Minka's (2002) closed-form approximation of the Gamma shape MLE (loc
/// fixed at 0).
fn fit_gamma_shape(values: &[f64]) -> Option<f64> {
    if values.iter().any(|v| *v <= 0.0) {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let mean_log = values.iter().map(|v| v.ln()).sum::<f64>() / n;
    let s = mean.ln() - mean_log;
    if s <= 0.0 {
        return None;
    }
    let shape = (3.0 - s + ((s - 3.0).powi(2) + 24.0 * s).sqrt()) / (12.0 * s);
    if shape.is_finite() && shape > 0.0 {
        Some(shape)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_interarrival_is_constant_zero() {
        assert_eq!(fit_interarrival(&[]), Distribution::Constant { value: 0.0 });
    }

    #[test]
    fn all_equal_interarrival_is_constant() {
        assert_eq!(
            fit_interarrival(&[4.0, 4.0, 4.0]),
            Distribution::Constant { value: 4.0 }
        );
    }

    #[test]
    fn empty_alighting_is_constant_zero() {
        assert_eq!(fit_alighting(&[]), Distribution::Constant { value: 0.0 });
    }

    #[test]
    fn alighting_all_zero_is_constant_zero() {
        assert_eq!(
            fit_alighting(&[0.0, 0.0, 0.0, 0.0, 0.0]),
            Distribution::Constant { value: 0.0 }
        );
    }

    #[test]
    fn alighting_all_equal_nonzero() {
        assert_eq!(
            fit_alighting(&[3.0, 3.0, 3.0]),
            Distribution::Constant { value: 3.0 }
        );
    }

    #[test]
    fn alighting_mixed_counts_picks_poisson_or_intuniform() {
        let dist = fit_alighting(&[2.0, 4.0, 3.0, 5.0, 2.0, 4.0]);
        match dist {
            Distribution::Poisson { lambda } => assert!((lambda - 3.3333).abs() < 0.01),
            Distribution::IntUniform { min, max } => {
                assert_eq!(min, 2);
                assert_eq!(max, 5);
            }
            other => panic!("unexpected distribution: {other:?}"),
        }
    }

    #[test]
    fn interarrival_is_deterministic() {
        let values = [1.0, 2.0, 1.5, 3.0, 0.5, 2.5, 1.8, 4.0, 2.2, 1.1, 3.3];
        assert_eq!(fit_interarrival(&values), fit_interarrival(&values));
    }

    #[test]
    fn interarrival_on_exponential_sample_recovers_plausible_rate() {
        // Pre-generated Exp(rate=0.5) sample, mean ~2.0.
        let values: Vec<f64> = (1..=200)
            .map(|i| {
                let u = (i as f64) / 201.0;
                -(1.0 - u).ln() / 0.5
            })
            .collect();
        let dist = fit_interarrival(&values);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let sampled_mean = match &dist {
            Distribution::Exponential { rate, loc } => loc + 1.0 / rate,
            Distribution::Gamma { shape, scale, loc } => loc + shape * scale,
            Distribution::Weibull { .. } | Distribution::Uniform { .. } | Distribution::Poisson { .. } => mean,
            other => panic!("unexpected distribution: {other:?}"),
        };
        assert!((sampled_mean - mean).abs() / mean < 0.15);
    }

    #[test]
    fn percentile_trims_outliers_above_99th() {
        let mut values: Vec<f64> = (1..=100).map(|i| i as f64).collect();
        values.push(10_000.0);
        let p99 = percentile(&values, 99.0);
        assert!(p99 < 1000.0);
    }

    #[test]
    fn fit_alighting_request_emits_one_response_per_entry() {
        let req = FitRequest {
            data: vec![FitDataEntry {
                station: "A".into(),
                time_range: "06.00-06.15".into(),
                records: vec![
                    FitRecord { record_id: 1, numeric_value: 3.0 },
                    FitRecord { record_id: 2, numeric_value: 3.0 },
                    FitRecord { record_id: 3, numeric_value: 3.0 },
                ],
            }],
        };
        let resp = fit_alighting_request(&req);
        assert_eq!(resp.data_fit_response.len(), 1);
        assert_eq!(resp.data_fit_response[0].distribution, "Constant");
        assert_eq!(resp.data_fit_response[0].argument_list, "value=3.0000");
    }
}
