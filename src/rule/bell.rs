//! Generalized bell rule

use super::Rule;

/// Rule whose firing strength is `Π_j 1 / (1 + |(x_j - c_j) / a_j|^(2 b_j))`.
///
/// Premise parameters are laid out as `[a_1..a_n, b_1..b_n, c_1..c_n]`.
/// Widths `a_j` are expected to stay positive.
#[derive(Clone, Debug, PartialEq)]
pub struct BellRule {
    params: Vec<f64>,
    consequent: Vec<f64>,
}

impl BellRule {
    /// # Panics
    ///
    /// Panics if `widths`, `slopes` and `centers` differ in length.
    pub fn new(widths: Vec<f64>, slopes: Vec<f64>, centers: Vec<f64>, consequent: Vec<f64>) -> Self {
        assert!(
            widths.len() == slopes.len() && slopes.len() == centers.len(),
            "bell parameters must have one entry per input dimension"
        );
        let mut params = widths;
        params.extend(slopes);
        params.extend(centers);
        Self { params, consequent }
    }

    pub fn dims(&self) -> usize {
        self.params.len() / 3
    }

    /// (a, b, c) for dimension `j`
    fn abc(&self, j: usize) -> (f64, f64, f64) {
        let n = self.dims();
        (self.params[j], self.params[n + j], self.params[2 * n + j])
    }

    fn term(&self, j: usize, x: f64) -> f64 {
        let (a, b, c) = self.abc(j);
        1.0 / (1.0 + ((x - c) / a).abs().powf(2.0 * b))
    }
}

impl Rule for BellRule {
    fn membership(&self, input: &[f64]) -> f64 {
        input
            .iter()
            .take(self.dims())
            .enumerate()
            .map(|(j, &x)| self.term(j, x))
            .product()
    }

    fn gradient(&self, input: &[f64]) -> Vec<f64> {
        let n = self.dims();
        let mu = self.membership(input);
        let mut grad = vec![0.0; 3 * n];

        for (j, &x) in input.iter().enumerate().take(n) {
            let (a, b, c) = self.abc(j);
            let d = x - c;
            if d == 0.0 {
                // q = 0: every partial vanishes at the center
                continue;
            }
            let u = (d / a).abs();
            let q = u.powf(2.0 * b);
            let mu_j = 1.0 / (1.0 + q);
            // dμ/dθ = -μ · μ_j · dq/dθ
            let scale = mu * mu_j;
            grad[j] = scale * 2.0 * b * q / a;
            grad[n + j] = -scale * 2.0 * q * u.ln();
            grad[2 * n + j] = scale * 2.0 * b * q / d;
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
