//! Numeric summary statistics.
//!
//! Values that parse as finite floats are kept as samples. Everything else
//! is discarded by bucket: `NaN`, `Inf`, or the value text itself, each
//! with the record numbers it came from.

use indexmap::IndexMap;
use serde::Serialize;

use crate::predicate::parse_float;

pub const NAN_BUCKET: &str = "NaN";
pub const INF_BUCKET: &str = "Inf";

#[derive(Debug, Clone)]
pub struct StatisticalProfile {
    samples: Vec<f64>,
    discards: IndexMap<String, Vec<u64>>,
}

impl Default for StatisticalProfile {
    fn default() -> Self {
        let mut discards = IndexMap::new();
        discards.insert(NAN_BUCKET.to_string(), Vec::new());
        discards.insert(INF_BUCKET.to_string(), Vec::new());
        Self {
            samples: Vec::new(),
            discards,
        }
    }
}

impl StatisticalProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, value: &str, record: u64) {
        let bucket = match parse_float(value) {
            Some(x) if x.is_finite() => {
                self.samples.push(x);
                return;
            }
            Some(x) if x.is_nan() => NAN_BUCKET,
            Some(_) => INF_BUCKET,
            None => value,
        };
        match self.discards.get_mut(bucket) {
            Some(records) => records.push(record),
            None => {
                self.discards.insert(bucket.to_string(), vec![record]);
            }
        }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Discarded values and the records holding them.
    pub fn discards(&self) -> impl Iterator<Item = (&str, &[u64])> {
        self.discards.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn summary(&self) -> Summary {
        Summary::compute(&self.samples)
    }

    pub fn report(&self) -> StatisticalReport {
        StatisticalReport {
            summary: self.summary(),
            discards: self
                .discards()
                .map(|(value, records)| Discard {
                    value: value.to_string(),
                    records: records.to_vec(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticalReport {
    pub summary: Summary,
    pub discards: Vec<Discard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Discard {
    pub value: String,
    pub records: Vec<u64>,
}

/// Descriptive statistics over the samples.
///
/// Variance and standard deviation use one degree of freedom, quartiles are
/// linearly interpolated, `mad` is the mean absolute deviation around the
/// mean, and `skew`/`kurt` are the bias-adjusted sample skewness and excess
/// kurtosis. Undefined values are NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub q50: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
    pub var: f64,
    pub mad: f64,
    pub median: f64,
    pub skew: f64,
    pub sem: f64,
    pub kurt: f64,
}

impl Summary {
    pub fn compute(samples: &[f64]) -> Self {
        let count = samples.len();
        let n = count as f64;

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mean = if count > 0 { samples.iter().sum::<f64>() / n } else { f64::NAN };
        let deviations = || samples.iter().map(move |x| x - mean);
        let m2: f64 = deviations().map(|d| d * d).sum();
        let m3: f64 = deviations().map(|d| d * d * d).sum();
        let m4: f64 = deviations().map(|d| (d * d) * (d * d)).sum();

        let var = if count > 1 { m2 / (n - 1.0) } else { f64::NAN };
        let std = var.sqrt();
        let mad = if count > 0 {
            deviations().map(f64::abs).sum::<f64>() / n
        } else {
            f64::NAN
        };

        let skew = if count < 3 {
            f64::NAN
        } else if m2 == 0.0 {
            0.0
        } else {
            (n * (n - 1.0).sqrt() / (n - 2.0)) * (m3 / m2.powf(1.5))
        };

        let kurt = if count < 4 {
            f64::NAN
        } else {
            let denominator = (n - 2.0) * (n - 3.0) * m2 * m2;
            if denominator == 0.0 {
                0.0
            } else {
                let adjust = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
                n * (n + 1.0) * (n - 1.0) * m4 / denominator - adjust
            }
        };

        let median = quantile(&sorted, 0.5);
        Self {
            count,
            mean,
            std,
            min: sorted.first().copied().unwrap_or(f64::NAN),
            q25: quantile(&sorted, 0.25),
            q50: median,
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied().unwrap_or(f64::NAN),
            var,
            mad,
            median,
            skew,
            sem: std / n.sqrt(),
            kurt,
        }
    }

    /// Name/value pairs in report order.
    pub fn fields(&self) -> [(&'static str, f64); 14] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.q50),
            ("75%", self.q75),
            ("max", self.max),
            ("var", self.var),
            ("mad", self.mad),
            ("median", self.median),
            ("skew", self.skew),
            ("sem", self.sem),
            ("kurt", self.kurt),
        ]
    }
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_summary_of_one_to_four() {
        let s = Summary::compute(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(s.count, 4);
        assert!(close(s.mean, 2.5));
        assert!(close(s.var, 5.0 / 3.0));
        assert!(close(s.std, (5.0f64 / 3.0).sqrt()));
        assert!(close(s.min, 1.0));
        assert!(close(s.q25, 1.75));
        assert!(close(s.q50, 2.5));
        assert!(close(s.median, 2.5));
        assert!(close(s.q75, 3.25));
        assert!(close(s.max, 4.0));
        assert!(close(s.mad, 1.0));
        assert!(close(s.skew, 0.0));
        assert!(close(s.sem, s.std / 2.0));
        assert!(close(s.kurt, -1.2));
    }

    #[test]
    fn test_skew_of_skewed_sample() {
        let s = Summary::compute(&[1.0, 2.0, 10.0]);
        assert!((s.skew - 1.652_316_740_332_99).abs() < 1e-9);
        assert!(s.kurt.is_nan());
    }

    #[test]
    fn test_small_samples_are_undefined() {
        let empty = Summary::compute(&[]);
        assert_eq!(empty.count, 0);
        assert!(empty.mean.is_nan());
        assert!(empty.min.is_nan());
        assert!(empty.q50.is_nan());

        let one = Summary::compute(&[7.0]);
        assert!(close(one.mean, 7.0));
        assert!(one.std.is_nan());
        assert!(one.sem.is_nan());
        assert!(close(one.median, 7.0));
    }

    #[test]
    fn test_constant_sample() {
        let s = Summary::compute(&[3.0; 5]);
        assert!(close(s.std, 0.0));
        assert!(close(s.skew, 0.0));
        assert!(close(s.kurt, 0.0));
    }

    #[test]
    fn test_discards_by_bucket() {
        let mut profile = StatisticalProfile::new();
        profile.record("1.5", 1);
        profile.record("nan", 2);
        profile.record("x", 3);
        profile.record("-inf", 4);
        profile.record("2", 5);
        profile.record("x", 6);

        assert_eq!(profile.samples(), &[1.5, 2.0]);
        let discards: Vec<(&str, &[u64])> = profile.discards().collect();
        assert_eq!(
            discards,
            vec![(NAN_BUCKET, &[2][..]), (INF_BUCKET, &[4][..]), ("x", &[3, 6][..])]
        );
    }

    #[test]
    fn test_empty_buckets_always_present() {
        let profile = StatisticalProfile::new();
        let report = profile.report();
        assert_eq!(report.discards.len(), 2);
        assert!(report.discards.iter().all(|d| d.records.is_empty()));
        assert_eq!(report.summary.count, 0);
    }
}
