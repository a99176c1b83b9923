//! Per-parameter learning rates and their sign-agreement update
//!
//! Rates and gradients live in [`ParamTable`]s: one flat buffer with a row per
//! rule. Rows may differ in length (premise counts vary per rule) but the
//! shape is fixed when the table is built.

use super::QPropConfig;

/// Jagged (rule, index) table backed by a single buffer
#[derive(Debug, Clone, PartialEq)]
pub struct ParamTable {
    offsets: Vec<usize>,
    values: Vec<f64>,
}

impl ParamTable {
    /// Build a table with `row_lens[i]` entries in row `i`, all set to `fill`
    pub fn filled(row_lens: &[usize], fill: f64) -> Self {
        let mut offsets = Vec::with_capacity(row_lens.len() + 1);
        let mut total = 0;
        offsets.push(total);
        for len in row_lens {
            total += len;
            offsets.push(total);
        }
        Self {
            offsets,
            values: vec![fill; total],
        }
    }

    pub fn zeros(row_lens: &[usize]) -> Self {
        Self::filled(row_lens, 0.0)
    }

    /// Number of rows (rules)
    pub fn rows(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn row_len(&self, row: usize) -> usize {
        self.offsets[row + 1] - self.offsets[row]
    }

    pub fn row_lens(&self) -> Vec<usize> {
        self.offsets.windows(2).map(|w| w[1] - w[0]).collect()
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[self.offsets[row]..self.offsets[row + 1]]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.values[self.offsets[row]..self.offsets[row + 1]]
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.row(row)[col]
    }

    /// All entries, row-major
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// True when both tables have identical row lengths
    pub fn same_shape(&self, other: &ParamTable) -> bool {
        self.offsets == other.offsets
    }
}

/// What the last rate update did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateUpdateStats {
    /// Sign agreement, rate multiplied by eta_plus
    pub grown: usize,
    /// Sign flip, rate multiplied by eta_minus
    pub shrunk: usize,
    /// Zero product, rate set to delta_min
    pub reset: usize,
}

impl RateUpdateStats {
    fn merge(self, other: Self) -> Self {
        Self {
            grown: self.grown + other.grown,
            shrunk: self.shrunk + other.shrunk,
            reset: self.reset + other.reset,
        }
    }
}

/// Learning rates for premise parameters and consequent values
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveRates {
    pub premise: ParamTable,
    pub consequent: ParamTable,
}

impl AdaptiveRates {
    /// Every rate starts at `initial`
    pub fn new(premise_lens: &[usize], output_dim: usize, initial: f64) -> Self {
        let consequent_lens = vec![output_dim; premise_lens.len()];
        Self {
            premise: ParamTable::filled(premise_lens, initial),
            consequent: ParamTable::filled(&consequent_lens, initial),
        }
    }

    /// Update both tables from the current and previous batch gradients.
    ///
    /// With no previous gradient the rates are left untouched.
    pub fn update(
        &mut self,
        current_premise: &ParamTable,
        current_consequent: &ParamTable,
        previous: Option<(&ParamTable, &ParamTable)>,
        config: &QPropConfig,
    ) -> RateUpdateStats {
        let Some((prev_premise, prev_consequent)) = previous else {
            return RateUpdateStats::default();
        };
        let premise = update_rates(&mut self.premise, current_premise, prev_premise, config);
        let consequent = update_rates(
            &mut self.consequent,
            current_consequent,
            prev_consequent,
            config,
        );
        premise.merge(consequent)
    }
}

/// Sign-agreement rate update over one table.
///
/// For each entry `m = current * previous`:
/// `m > 0` grows the rate (capped at `delta_max`), `m < 0` shrinks it
/// (floored at `delta_min`), `m == 0` resets it to `delta_min`.
pub fn update_rates(
    rates: &mut ParamTable,
    current: &ParamTable,
    previous: &ParamTable,
    config: &QPropConfig,
) -> RateUpdateStats {
    debug_assert!(rates.same_shape(current) && rates.same_shape(previous));

    let mut stats = RateUpdateStats::default();
    for ((rate, &cur), &prev) in rates
        .values_mut()
        .iter_mut()
        .zip(current.values())
        .zip(previous.values())
    {
        let mltp = cur * prev;
        if mltp > 0.0 {
            *rate = (*rate * config.eta_plus).min(config.delta_max);
            stats.grown += 1;
        } else if mltp < 0.0 {
            *rate = (*rate * config.eta_minus).max(config.delta_min);
            stats.shrunk += 1;
        } else {
            // Also catches NaN products
            *rate = config.delta_min;
            stats.reset += 1;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[f64]]) -> ParamTable {
        let lens: Vec<usize> = rows.iter().map(|r| r.len()).collect();
        let mut t = ParamTable::zeros(&lens);
        for (i, r) in rows.iter().enumerate() {
            t.row_mut(i).copy_from_slice(r);
        }
        t
    }

    #[test]
    fn test_jagged_layout() {
        let t = ParamTable::filled(&[2, 0, 3], 1.5);
        assert_eq!(t.rows(), 3);
        assert_eq!(t.row_len(0), 2);
        assert_eq!(t.row_len(1), 0);
        assert_eq!(t.row_len(2), 3);
        assert_eq!(t.values().len(), 5);
        assert_eq!(t.row_lens(), vec![2, 0, 3]);
        assert!(t.row(2).iter().all(|&v| v == 1.5));
    }

    #[test]
    fn test_row_mut_is_isolated() {
        let mut t = ParamTable::zeros(&[2, 2]);
        t.row_mut(1)[0] = 7.0;
        assert_eq!(t.row(0), &[0.0, 0.0]);
        assert_eq!(t.get(1, 0), 7.0);
    }

    #[test]
    fn test_sign_agreement_rules() {
        let config = QPropConfig::default();
        let mut rates = ParamTable::filled(&[4], 0.01);
        let previous = table(&[&[1.0, 1.0, -2.0, 0.0]]);
        let current = table(&[&[3.0, -1.0, -0.5, 5.0]]);

        let stats = update_rates(&mut rates, &current, &previous, &config);

        assert!((rates.get(0, 0) - 0.012).abs() < 1e-15); // grown
        assert!((rates.get(0, 1) - 0.005).abs() < 1e-15); // flipped
        assert!((rates.get(0, 2) - 0.012).abs() < 1e-15); // both negative
        assert_eq!(rates.get(0, 3), config.delta_min); // zero product
        assert_eq!(
            stats,
            RateUpdateStats {
                grown: 2,
                shrunk: 1,
                reset: 1
            }
        );
    }

    #[test]
    fn test_rates_clamped() {
        let config = QPropConfig::default();
        let mut rates = table(&[&[0.95, 1.5e-8]]);
        let previous = table(&[&[1.0, 1.0]]);
        let current = table(&[&[1.0, -1.0]]);

        update_rates(&mut rates, &current, &previous, &config);

        assert_eq!(rates.get(0, 0), config.delta_max);
        assert_eq!(rates.get(0, 1), config.delta_min);
    }

    #[test]
    fn test_first_update_leaves_rates() {
        let config = QPropConfig::default();
        let mut rates = AdaptiveRates::new(&[2, 3], 2, config.initial_learning_rate);
        let grads = ParamTable::filled(&[2, 3], 1.0);
        let zgrads = ParamTable::filled(&[2, 2], 1.0);

        let stats = rates.update(&grads, &zgrads, None, &config);

        assert_eq!(stats, RateUpdateStats::default());
        assert!(rates
            .premise
            .values()
            .iter()
            .chain(rates.consequent.values())
            .all(|&r| r == config.initial_learning_rate));
    }

    #[test]
    fn test_update_touches_both_tables() {
        let config = QPropConfig::default();
        let mut rates = AdaptiveRates::new(&[1], 2, 0.1);
        let p = table(&[&[1.0]]);
        let z = table(&[&[1.0, -1.0]]);
        let z_prev = table(&[&[1.0, 1.0]]);

        let stats = rates.update(&p, &z, Some((&p, &z_prev)), &config);

        assert!((rates.premise.get(0, 0) - 0.12).abs() < 1e-15);
        assert!((rates.consequent.get(0, 0) - 0.12).abs() < 1e-15);
        assert!((rates.consequent.get(0, 1) - 0.05).abs() < 1e-15);
        assert_eq!(stats.grown, 2);
        assert_eq!(stats.shrunk, 1);
    }
}
