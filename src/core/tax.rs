/// Polish capital-gains tax: flat 19%, with a 4% solidarity surcharge (23%
/// marginal) on the portion of gains above 1M PLN. Fixed policy, not exposed
/// as a user input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxPolicy {
    pub flat_rate: f64,
    pub high_rate: f64,
    pub threshold: f64,
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self {
            flat_rate: 0.19,
            high_rate: 0.23,
            threshold: 1_000_000.0,
        }
    }
}

impl TaxPolicy {
    /// Tax owed on a realized gain. A negative gain produces a proportional
    /// negative tax (an implicit credit); see DESIGN.md for the open product
    /// decision on loss treatment.
    pub fn tax(&self, gross_profit: f64, progressive: bool) -> f64 {
        if !progressive || gross_profit <= self.threshold {
            return gross_profit * self.flat_rate;
        }
        self.threshold * self.flat_rate + (gross_profit - self.threshold) * self.high_rate
    }

    /// Tax on the second leg of a two-milestone sale. When the combined
    /// profit crosses the threshold only in combination, the lower bracket
    /// must not be taxed twice: tax the combined total and subtract what the
    /// first leg already paid.
    pub fn second_leg_tax(&self, gross_first: f64, gross_second: f64) -> f64 {
        let combined = gross_first + gross_second;
        if combined > self.threshold {
            self.tax(combined, true) - self.tax(gross_first, false)
        } else {
            self.tax(gross_second, false)
        }
    }

    /// Share of sale proceeds kept after flat tax (0.81 under the default
    /// policy), used by the break-even price.
    pub fn after_tax_factor(&self) -> f64 {
        1.0 - self.flat_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn flat_tax_is_nineteen_percent() {
        let policy = TaxPolicy::default();
        assert_approx(policy.tax(400_000.0, false), 76_000.0);
        assert_approx(policy.tax(400_000.0, true), 76_000.0);
        assert_approx(policy.tax(0.0, false), 0.0);
    }

    #[test]
    fn progressive_tax_applies_high_rate_above_threshold() {
        let policy = TaxPolicy::default();
        // 1M at 19% + 0.5M at 23%.
        assert_approx(policy.tax(1_500_000.0, true), 190_000.0 + 115_000.0);
        // Non-progressive call ignores the threshold.
        assert_approx(policy.tax(1_500_000.0, false), 285_000.0);
        // Exactly at the threshold stays in the flat bracket.
        assert_approx(policy.tax(1_000_000.0, true), 190_000.0);
    }

    #[test]
    fn negative_profit_yields_proportional_credit() {
        let policy = TaxPolicy::default();
        assert_approx(policy.tax(-100_000.0, false), -19_000.0);
    }

    #[test]
    fn second_leg_tax_avoids_double_taxing_lower_bracket() {
        let policy = TaxPolicy::default();
        // Each leg is below the threshold; together they cross it.
        let first = 600_000.0;
        let second = 700_000.0;
        let first_tax = policy.tax(first, false);
        let second_tax = policy.second_leg_tax(first, second);
        assert_approx(first_tax + second_tax, policy.tax(first + second, true));

        // Below the combined threshold the second leg is taxed flat.
        assert_approx(policy.second_leg_tax(100_000.0, 200_000.0), 38_000.0);
    }

    #[test]
    fn after_tax_factor_matches_flat_rate() {
        assert_approx(TaxPolicy::default().after_tax_factor(), 0.81);
    }

    proptest! {
        #[test]
        fn split_taxation_sums_to_combined(
            first in 0.0f64..3_000_000.0,
            second in 0.0f64..3_000_000.0,
        ) {
            let policy = TaxPolicy::default();
            let total = policy.tax(first, false) + policy.second_leg_tax(first, second);
            let combined = policy.tax(first + second, first + second > policy.threshold);
            prop_assert!((total - combined).abs() < 1e-6);
        }

        #[test]
        fn net_profit_round_trip_is_exact(gross in -1_000_000.0f64..5_000_000.0) {
            let policy = TaxPolicy::default();
            for progressive in [false, true] {
                let tax = policy.tax(gross, progressive);
                let net = gross - tax;
                prop_assert!(net == gross - tax);
                prop_assert!((net + tax - gross).abs() <= 1e-6 * gross.abs().max(1.0));
            }
        }

        #[test]
        fn progressive_never_undercuts_flat(gross in 0.0f64..5_000_000.0) {
            let policy = TaxPolicy::default();
            prop_assert!(policy.tax(gross, true) >= policy.tax(gross, false) - 1e-9);
        }
    }
}
