//! Gaussian rule - product of per-dimension Gaussian memberships

use super::Rule;

/// Rule whose firing strength is `Π_j exp(-(x_j - c_j)² / (2 σ_j²))`.
///
/// Premise parameters are laid out as `[c_1..c_n, σ_1..σ_n]`.
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianRule {
    params: Vec<f64>,
    consequent: Vec<f64>,
}

impl GaussianRule {
    /// Create from centers, widths and consequent values
    ///
    /// # Panics
    ///
    /// Panics if `centers` and `widths` differ in length.
    pub fn new(centers: Vec<f64>, widths: Vec<f64>, consequent: Vec<f64>) -> Self {
        assert_eq!(
            centers.len(),
            widths.len(),
            "one width per center is required"
        );
        let mut params = centers;
        params.extend(widths);
        Self { params, consequent }
    }

    /// Input dimensionality
    pub fn dims(&self) -> usize {
        self.params.len() / 2
    }

    pub fn centers(&self) -> &[f64] {
        &self.params[..self.dims()]
    }

    pub fn widths(&self) -> &[f64] {
        &self.params[self.dims()..]
    }
}

impl Rule for GaussianRule {
    fn membership(&self, input: &[f64]) -> f64 {
        self.centers()
            .iter()
            .zip(self.widths())
            .zip(input)
            .map(|((&c, &s), &x)| (-(x - c).powi(2) / (2.0 * s * s)).exp())
            .product()
    }

    fn gradient(&self, input: &[f64]) -> Vec<f64> {
        let n = self.dims();
        let mu = self.membership(input);
        let mut grad = vec![0.0; 2 * n];

        for (j, &x) in input.iter().enumerate().take(n) {
            let (c, s) = (self.params[j], self.params[n + j]);
            let d = x - c;
            grad[j] = mu * d / (s * s);
            grad[n + j] = mu * d * d / (s * s * s);
        }
        grad
    }

    fn parameters(&self) -> &[f64] {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut [f64] {
        &mut self.params
    }

    fn consequent(&self) -> &[f64] {
        &self.consequent
    }

    fn consequent_mut(&mut self) -> &mut [f64] {
        &mut self.consequent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_gradient(rule: &GaussianRule, input: &[f64]) -> Vec<f64> {
        let h = 1e-6;
        (0..rule.parameters().len())
            .map(|p| {
                let mut plus = rule.clone();
                let mut minus = rule.clone();
                plus.parameters_mut()[p] += h;
                minus.parameters_mut()[p] -= h;
                (plus.membership(input) - minus.membership(input)) / (2.0 * h)
            })
            .collect()
    }

    #[test]
    fn test_peak_at_center() {
        let rule = GaussianRule::new(vec![1.0, -2.0], vec![0.5, 3.0], vec![0.0]);
        assert!((rule.membership(&[1.0, -2.0]) - 1.0).abs() < 1e-12);
        assert!(rule.membership(&[2.0, -2.0]) < 1.0);
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let rule = GaussianRule::new(vec![0.3, -1.0], vec![0.8, 1.7], vec![1.0]);
        let input = [0.9, 0.2];

        let analytic = rule.gradient(&input);
        let numeric = numeric_gradient(&rule, &input);

        assert_eq!(analytic.len(), 4);
        for (a, n) in analytic.iter().zip(&numeric) {
            assert!((a - n).abs() < 1e-6, "analytic {a} vs numeric {n}");
        }
    }

    #[test]
    fn test_layout() {
        let rule = GaussianRule::new(vec![1.0, 2.0], vec![3.0, 4.0], vec![0.0, 0.0]);
        assert_eq!(rule.dims(), 2);
        assert_eq!(rule.centers(), &[1.0, 2.0]);
        assert_eq!(rule.widths(), &[3.0, 4.0]);
        assert_eq!(rule.parameters(), &[1.0, 2.0, 3.0, 4.0]);
    }
}
