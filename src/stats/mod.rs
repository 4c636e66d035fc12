//! Statistics used by the trend tester and the bootstrap
//!
//! - Average ranks with ties
//! - Spearman rank correlation with a Student-t p-value
//! - Benjamini-Hochberg false-discovery-rate adjustment
//! - Sample standard deviation

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Outcome of a correlation test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    pub coefficient: f64,
    /// Two-sided
    pub p_value: f64,
    pub n: usize,
}

/// Why a correlation could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationError {
    /// One of the two series has zero variance
    Constant,
    /// Fewer than three paired observations
    TooFewPoints(usize),
    /// The series have different lengths
    LengthMismatch,
}

/// 1-based ranks; tied values share the mean of their positions
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // positions i..=j (0-based) share rank mean((i+1)..=(j+1))
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }
    ranks
}

/// Pearson correlation; `None` when either series is constant
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&a, &b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= f64::EPSILON * n || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Spearman's rho with a two-sided p-value from the t approximation
/// `t = rho * sqrt((n - 2) / (1 - rho^2))`, df = n - 2.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<Correlation, CorrelationError> {
    if x.len() != y.len() {
        return Err(CorrelationError::LengthMismatch);
    }
    let n = x.len();
    if n < 3 {
        return Err(CorrelationError::TooFewPoints(n));
    }
    if is_constant(x) || is_constant(y) {
        return Err(CorrelationError::Constant);
    }

    let rx = average_ranks(x);
    let ry = average_ranks(y);
    let rho = pearson(&rx, &ry).ok_or(CorrelationError::Constant)?;

    Ok(Correlation {
        coefficient: rho,
        p_value: t_test_p_value(rho, n),
        n,
    })
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

fn t_test_p_value(rho: f64, n: usize) -> f64 {
    let df = (n - 2) as f64;
    let denom = 1.0 - rho * rho;
    if denom <= 0.0 {
        return 0.0;
    }
    let t = rho * (df / denom).sqrt();
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0),
        Err(_) => 1.0,
    }
}

/// Benjamini-Hochberg step-up adjustment.
///
/// Returned values are aligned with the input, capped at 1, never below the
/// raw p-value and monotone in the raw p-value ordering.
pub fn benjamini_hochberg(p_values: &[f64]) -> Vec<f64> {
    let m = p_values.len();
    if m == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let mut adjusted = vec![0.0; m];
    let mut running_min = 1.0_f64;
    for (pos, &idx) in order.iter().enumerate().rev() {
        let rank = (pos + 1) as f64;
        let candidate = (p_values[idx] * m as f64 / rank).min(1.0);
        running_min = running_min.min(candidate);
        adjusted[idx] = running_min.max(p_values[idx]);
    }
    adjusted
}

/// Sample standard deviation (n - 1 denominator); 0 for fewer than two values
pub fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    var.max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_ranks_with_ties() {
        assert_eq!(average_ranks(&[10.0, 20.0, 30.0]), vec![1.0, 2.0, 3.0]);
        assert_eq!(average_ranks(&[3.0, 1.0, 3.0, 2.0]), vec![3.5, 1.0, 3.5, 2.0]);
        assert_eq!(average_ranks(&[5.0, 5.0, 5.0]), vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_strictly_increasing_series_is_significant() {
        let years: Vec<f64> = (2000..2010).map(f64::from).collect();
        let freq: Vec<f64> = (0..10).map(|i| 0.001 * (i as f64 + 1.0).powf(1.3)).collect();
        let c = spearman(&years, &freq).unwrap();
        assert!((c.coefficient - 1.0).abs() < 1e-12);
        assert!(c.p_value < 0.05);
        assert_eq!(c.n, 10);
    }

    #[test]
    fn test_decreasing_series() {
        let years = [2000.0, 2001.0, 2002.0, 2003.0, 2004.0];
        let freq = [0.5, 0.4, 0.3, 0.2, 0.1];
        let c = spearman(&years, &freq).unwrap();
        assert!((c.coefficient + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_known_value_with_ties() {
        // ranks of y: 1, 2.5, 2.5, 5, 4 -> rho = 8.5 / sqrt(95), t ~ 3.0867 on 3 df
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.0, 2.0, 2.0, 4.0, 3.0];
        let c = spearman(&x, &y).unwrap();
        assert!((c.coefficient - 0.872_081_599).abs() < 1e-6);
        assert!((c.p_value - 0.053_854).abs() < 1e-4);
    }

    #[test]
    fn test_constant_series_is_untestable() {
        let years = [2000.0, 2001.0, 2002.0, 2003.0];
        assert_eq!(spearman(&years, &[0.2; 4]), Err(CorrelationError::Constant));
        assert_eq!(spearman(&years, &[0.0; 4]), Err(CorrelationError::Constant));
    }

    #[test]
    fn test_too_few_points() {
        assert_eq!(
            spearman(&[2000.0, 2001.0], &[0.1, 0.2]),
            Err(CorrelationError::TooFewPoints(2))
        );
        assert_eq!(
            spearman(&[2000.0, 2001.0, 2002.0], &[0.1, 0.2]),
            Err(CorrelationError::LengthMismatch)
        );
    }

    #[test]
    fn test_benjamini_hochberg_known_values() {
        let raw = [0.01, 0.04, 0.03, 0.005];
        let adj = benjamini_hochberg(&raw);
        // sorted: 0.005(1), 0.01(2), 0.03(3), 0.04(4); m = 4
        // 0.04*4/4=0.04, 0.03*4/3=0.04, 0.01*4/2=0.02, 0.005*4/1=0.02
        let expected = [0.02, 0.04, 0.04, 0.02];
        for (a, e) in adj.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "{} vs {}", a, e);
        }
    }

    #[test]
    fn test_adjusted_never_below_raw() {
        let raw = [0.9, 0.001, 0.5, 0.049, 0.2, 0.2, 1.0, 0.0];
        let adj = benjamini_hochberg(&raw);
        for (r, a) in raw.iter().zip(&adj) {
            assert!(a >= r);
            assert!(*a <= 1.0);
        }
    }

    #[test]
    fn test_benjamini_hochberg_empty() {
        assert!(benjamini_hochberg(&[]).is_empty());
    }

    #[test]
    fn test_sample_std_dev() {
        assert_eq!(sample_std_dev(&[]), 0.0);
        assert_eq!(sample_std_dev(&[3.0]), 0.0);
        assert_eq!(sample_std_dev(&[2.0, 2.0, 2.0]), 0.0);
        let sd = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((sd - 2.138_089_935).abs() < 1e-6);
    }
}
