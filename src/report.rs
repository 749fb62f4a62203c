//! Console report
//!
//! Pure formatting of harness results, either as a column table or as one
//! JSON object per trial. Each table column is 18 wide (mean and stddev, 9
//! each, three significant digits); ratio columns hold `Scalar / variant` and
//! its propagated error.

use crate::config::BenchConfig;
use crate::error::{BenchError, Mismatch};
use crate::harness::TrialReport;
use crate::Variant;
use std::fmt::Write;

const SIZE_WIDTH: usize = 8;
const COLUMN_WIDTH: usize = 18;
const HALF_WIDTH: usize = 9;
const SIGNIFICANT: usize = 3;

/// `v` with `digits` significant digits, `%g` style: trailing zeros dropped,
/// exponent form below `1e-4` or from `10^digits` up
pub fn significant(v: f64, digits: usize) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    if v == 0.0 {
        return "0".to_string();
    }

    let digits = digits.max(1);
    let sci = format!("{:.*e}", digits - 1, v);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= digits as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs())
    } else {
        let decimals = (digits as i32 - 1 - exp) as usize;
        trim_zeros(&format!("{:.*}", decimals, v)).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Run parameters printed before the table
pub fn preamble(config: &BenchConfig) -> String {
    format!(
        "NumberOfEvaluations: {}\nMinRepeat: {}",
        config.evaluations, config.repetitions
    )
}

pub fn header(config: &BenchConfig) -> String {
    let mut line = format!("{:>w$}", "MapSize", w = SIZE_WIDTH);
    for variant in config.enabled.iter() {
        let _ = write!(line, "{:>w$}", variant.name(), w = COLUMN_WIDTH);
    }
    if config.enabled.scalar {
        for variant in config.enabled.iter().filter(|&v| v != Variant::Scalar) {
            let _ = write!(line, "{:>w$}", format!("Scalar/{}", variant.name()), w = COLUMN_WIDTH);
        }
    }
    line
}

/// One table row; `✓` marks a trial that passed cross-validation
pub fn row(trial: &TrialReport) -> String {
    let mut line = format!("{:>w$}", trial.map_size, w = SIZE_WIDTH);
    for (_, m) in &trial.measurements {
        let _ = write!(
            line,
            "{:>w$}{:>w$}",
            significant(m.mean, SIGNIFICANT),
            significant(m.stddev, SIGNIFICANT),
            w = HALF_WIDTH
        );
    }
    for (_, r) in &trial.ratios {
        let _ = write!(
            line,
            "{:>w$}{:>w$}",
            significant(r.value, SIGNIFICANT),
            significant(r.stddev, SIGNIFICANT),
            w = HALF_WIDTH
        );
    }

    if trial.passed() {
        line.push_str(" ✓");
    } else {
        line.push_str(" ✗");
    }

    let unstable: Vec<&str> = trial
        .measurements
        .iter()
        .filter(|(_, m)| !m.converged)
        .map(|(v, _)| v.name())
        .collect();
    if !unstable.is_empty() {
        let _ = write!(line, " (unstable: {})", unstable.join(", "));
    }
    line
}

pub fn failure(mismatch: &Mismatch) -> String {
    mismatch.to_string()
}

/// One trial as a single-line JSON object
pub fn json(trial: &TrialReport) -> Result<String, BenchError> {
    Ok(serde_json::to_string(trial)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnabledVariants;
    use crate::harness::{Measurement, Ratio};
    use serde_json::Value;

    fn measurement(mean: f64, converged: bool) -> Measurement {
        Measurement {
            mean,
            stddev: 0.5,
            batches: 1,
            converged,
        }
    }

    #[test]
    fn test_header_columns() {
        let config = BenchConfig {
            enabled: EnabledVariants {
                vec16: false,
                vec2: false,
                vec12: false,
                horizontal2: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let h = header(&config);
        assert!(h.starts_with(" MapSize"));
        assert!(h.contains("Vectorized"));
        assert!(h.contains("Scalar/Horizontal"));
        assert!(!h.contains("Vec16"));
        assert_eq!(h.chars().count(), SIZE_WIDTH + 5 * COLUMN_WIDTH);
    }

    #[test]
    fn test_header_without_scalar_has_no_ratios() {
        let config = BenchConfig {
            enabled: EnabledVariants {
                scalar: false,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(!header(&config).contains("Scalar"));
    }

    #[test]
    fn test_row_format() {
        let trial = TrialReport {
            map_size: 12,
            measurements: vec![
                (Variant::Scalar, measurement(80.0, true)),
                (Variant::Vectorized, measurement(20.0, false)),
            ],
            ratios: vec![(
                Variant::Vectorized,
                Ratio {
                    value: 4.0,
                    stddev: 0.1,
                },
            )],
            failure: None,
        };
        let r = row(&trial);
        assert!(r.starts_with("      12       80      0.5"));
        assert!(r.contains("        4      0.1 ✓"));
        assert!(r.ends_with("(unstable: Vectorized)"));
    }

    #[test]
    fn test_failure_text() {
        let m = Mismatch {
            variant: Variant::Vec2,
            point: [0.5, -0.25],
            expected: [1.0, 2.0, 3.0],
            actual: [1.0, 2.5, 3.0],
        };
        assert_eq!(failure(&m), "Vec2 not equal at [0.5, -0.25]: [1, 2, 3] vs. [1, 2.5, 3]");
    }

    #[test]
    fn test_significant_digits() {
        assert_eq!(significant(80.0, 3), "80");
        assert_eq!(significant(0.5, 3), "0.5");
        assert_eq!(significant(1.0 / 3.0, 3), "0.333");
        assert_eq!(significant(100.0, 3), "100");
        assert_eq!(significant(123.456, 3), "123");
        assert_eq!(significant(12345.6, 3), "1.23e+04");
        assert_eq!(significant(999.6, 3), "1e+03");
        assert_eq!(significant(0.000123, 3), "0.000123");
        assert_eq!(significant(0.0000123, 3), "1.23e-05");
        assert_eq!(significant(-2.5, 3), "-2.5");
        assert_eq!(significant(0.0, 3), "0");
    }

    #[test]
    fn test_large_cycle_counts_keep_width() {
        let trial = TrialReport {
            map_size: 235,
            measurements: vec![(Variant::Scalar, measurement(123_456.0, true))],
            ratios: Vec::new(),
            failure: None,
        };
        assert_eq!(row(&trial), "     235 1.23e+05      0.5 ✓");
    }

    #[test]
    fn test_json_row() {
        let trial = TrialReport {
            map_size: 7,
            measurements: vec![(Variant::Horizontal2, measurement(3.0, true))],
            ratios: Vec::new(),
            failure: Some(Mismatch {
                variant: Variant::Horizontal2,
                point: [1.0, -1.0],
                expected: [0.0; 3],
                actual: [1.0, 0.0, 0.0],
            }),
        };
        let text = json(&trial).unwrap();
        assert!(!text.contains('\n'));

        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["map_size"], 7);
        assert_eq!(v["measurements"][0][0], "Horizontal2");
        assert_eq!(v["measurements"][0][1]["mean"], 3.0);
        assert_eq!(v["failure"]["variant"], "Horizontal2");
        assert_eq!(v["failure"]["actual"][0], 1.0);
    }
}
