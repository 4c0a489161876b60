//! `DistributionFactory`: parses a `(name, "k=v,k=v")` pair into a
//! sampleable [`Distribution`]. Parsing is decoupled from sampling — a parsed
//! distribution is bound to the caller's RNG only when `sample` is called, so
//! the same parsed rule can be resampled with different seeds.

use rand::Rng;
use rand_distr::{Distribution as _, Exp, Gamma, Poisson, Weibull};

use crate::error::SimError;

/// A sampleable demand distribution, as produced either by
/// [`FittingEngine`](crate::fitting) or parsed directly from a scenario's
/// `ArgumentList` string.
#[derive(Debug, Clone, PartialEq)]
pub enum Distribution {
    Constant { value: f64 },
    Poisson { lambda: f64 },
    Exponential { rate: f64, loc: f64 },
    Weibull { shape: f64, scale: f64, loc: f64 },
    Gamma { shape: f64, scale: f64, loc: f64 },
    Uniform { min: f64, max: f64, loc: f64 },
    IntUniform { min: i64, max: i64 },
    /// Suppresses arrivals entirely: always samples `+inf`.
    NoArrival,
}

impl Distribution {
    /// Draw one sample. Continuous families return an unrounded value;
    /// callers that need integer counts (alighting) round themselves, since
    /// the distribution doesn't know which role it's playing.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Distribution::Constant { value } => *value,
            Distribution::Poisson { lambda } => {
                if *lambda <= 0.0 {
                    return 0.0;
                }
                Poisson::new(*lambda)
                    .expect("lambda > 0 checked above")
                    .sample(rng)
            }
            Distribution::Exponential { rate, loc } => {
                let rate = rate.max(1e-12);
                Exp::new(rate).expect("rate > 0 checked above").sample(rng) + loc
            }
            Distribution::Weibull { shape, scale, loc } => {
                Weibull::new(*scale, *shape)
                    .expect("shape/scale validated at parse time")
                    .sample(rng)
                    + loc
            }
            Distribution::Gamma { shape, scale, loc } => {
                Gamma::new(*shape, *scale)
                    .expect("shape/scale validated at parse time")
                    .sample(rng)
                    + loc
            }
            Distribution::Uniform { min, max, loc } => rng.gen_range(*min..=*max) + loc,
            Distribution::IntUniform { min, max } => rng.gen_range(*min..=*max) as f64,
            Distribution::NoArrival => f64::INFINITY,
        }
    }

    /// Canonical name, as emitted in an `ArgumentList` record.
    pub fn name(&self) -> &'static str {
        match self {
            Distribution::Constant { .. } => "Constant",
            Distribution::Poisson { .. } => "Poisson",
            Distribution::Exponential { .. } => "Exponential",
            Distribution::Weibull { .. } => "Weibull",
            Distribution::Gamma { .. } => "Gamma",
            Distribution::Uniform { .. } => "Uniform",
            Distribution::IntUniform { .. } => "IntUniform",
            Distribution::NoArrival => "NoArrival",
        }
    }

    /// Stable, parseable `k=v` argument string with 4-decimal floats, the
    /// inverse of [`DistributionFactory::parse`].
    pub fn argument_list(&self) -> String {
        match self {
            Distribution::Constant { value } => format!("value={value:.4}"),
            Distribution::Poisson { lambda } => format!("lambda={lambda:.4}"),
            Distribution::Exponential { rate, loc } => format!("rate={rate:.4}, loc={loc:.4}"),
            Distribution::Weibull { shape, loc, scale } => {
                format!("shape={shape:.4}, loc={loc:.4}, scale={scale:.4}")
            }
            Distribution::Gamma { shape, loc, scale } => {
                format!("shape={shape:.4}, loc={loc:.4}, scale={scale:.4}")
            }
            Distribution::Uniform { min, max, .. } => format!("min={min:.4}, max={max:.4}"),
            Distribution::IntUniform { min, max } => format!("min={min}, max={max}"),
            Distribution::NoArrival => "value=inf".to_string(),
        }
    }
}

/// Parses `(name, args)` pairs into [`Distribution`]s.
pub struct DistributionFactory;

impl DistributionFactory {
    /// Parse a distribution name (case-insensitive) and a `"k1=v1, k2=v2"`
    /// argument string.
    pub fn parse(name: &str, args: &str) -> Result<Distribution, SimError> {
        let params = parse_kv(args)?;
        let get = |key: &str| -> Result<f64, SimError> {
            params.get(key).copied().ok_or_else(|| {
                SimError::InvalidDistribution(format!("missing parameter `{key}` for {name}"))
            })
        };

        match name.trim().to_lowercase().as_str() {
            "constant" => Ok(Distribution::Constant { value: get("value")? }),
            "poisson" => {
                let lambda = get("lambda")?;
                if lambda < 0.0 {
                    return Err(SimError::InvalidDistribution(
                        "Poisson lambda must be >= 0".into(),
                    ));
                }
                Ok(Distribution::Poisson { lambda })
            }
            "exponential" => {
                let rate = get("rate")?;
                if rate <= 0.0 {
                    return Err(SimError::InvalidDistribution(
                        "Exponential rate must be > 0".into(),
                    ));
                }
                let loc = params.get("loc").copied().unwrap_or(0.0);
                Ok(Distribution::Exponential { rate, loc })
            }
            "weibull" => {
                let shape = get("shape")?;
                let scale = get("scale")?;
                if shape <= 0.0 || scale <= 0.0 {
                    return Err(SimError::InvalidDistribution(
                        "Weibull shape/scale must be > 0".into(),
                    ));
                }
                let loc = params.get("loc").copied().unwrap_or(0.0);
                Ok(Distribution::Weibull { shape, scale, loc })
            }
            "gamma" => {
                let shape = get("shape")?;
                let scale = get("scale")?;
                if shape <= 0.0 || scale <= 0.0 {
                    return Err(SimError::InvalidDistribution(
                        "Gamma shape/scale must be > 0".into(),
                    ));
                }
                let loc = params.get("loc").copied().unwrap_or(0.0);
                Ok(Distribution::Gamma { shape, scale, loc })
            }
            "uniform" => {
                let min = params
                    .get("min")
                    .or_else(|| params.get("low"))
                    .copied()
                    .ok_or_else(|| {
                        SimError::InvalidDistribution("missing min/low for Uniform".into())
                    })?;
                let max = params
                    .get("max")
                    .or_else(|| params.get("high"))
                    .copied()
                    .ok_or_else(|| {
                        SimError::InvalidDistribution("missing max/high for Uniform".into())
                    })?;
                if max < min {
                    return Err(SimError::InvalidDistribution(
                        "Uniform max must be >= min".into(),
                    ));
                }
                let loc = params.get("loc").copied().unwrap_or(0.0);
                Ok(Distribution::Uniform { min, max, loc })
            }
            "intuniform" => {
                let min = get("min")? as i64;
                let max = get("max")? as i64;
                if max < min {
                    return Err(SimError::InvalidDistribution(
                        "IntUniform max must be >= min".into(),
                    ));
                }
                Ok(Distribution::IntUniform { min, max })
            }
            "noarrival" | "no arrival" => Ok(Distribution::NoArrival),
            other => Err(SimError::InvalidDistribution(format!(
                "unknown distribution `{other}`"
            ))),
        }
    }
}

fn parse_kv(args: &str) -> Result<std::collections::HashMap<String, f64>, SimError> {
    let mut map = std::collections::HashMap::new();
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return Ok(map);
    }
    for kv in trimmed.split(',') {
        let (k, v) = kv.trim().split_once('=').ok_or_else(|| {
            SimError::InvalidDistribution(format!("malformed argument `{kv}`"))
        })?;
        let v: f64 = v.trim().parse().map_err(|_| {
            SimError::InvalidDistribution(format!("non-numeric argument value in `{kv}`"))
        })?;
        map.insert(k.trim().to_lowercase(), v);
    }
    Ok(map)
}
