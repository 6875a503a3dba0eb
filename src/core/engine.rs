use super::acquire::{acquire, break_even_price, Acquisition};
use super::loan::{adjusted_interest, amortize, InvalidParameter};
use super::tax::TaxPolicy;
use super::types::{
    BenchmarkResult, HodlOutcome, Inputs, MilestoneResult, ProjectionResult, SaleLeg,
};
use super::value::{compound_growth, purchasing_power, roi};

/// Purchase epoch ("year 0"). All inflation horizons count from here.
const PURCHASE_YEAR: u32 = 2025;
const YEARS_TO_PEAK1: u32 = 2;
const YEARS_TO_PEAK2: u32 = 4;

/// Long-horizon milestone years and their distance from the purchase epoch.
const MILESTONE_YEARS: [u32; 3] = [2030, 2035, 2040];

/// Runs the whole pipeline: acquisition, loan cost, partial-sale projection,
/// HODL baselines, long-horizon milestones, and the bond/equity benchmarks.
/// Pure function of its inputs; recomputed from scratch on every call.
pub fn run_projection(inputs: &Inputs) -> Result<ProjectionResult, InvalidParameter> {
    let policy = TaxPolicy::default();
    let loan = amortize(inputs.loan_amount, inputs.interest_rate, inputs.loan_years)?;
    let acq = acquire(inputs);

    // Interest is a cost only for strategies that actually borrow.
    let interest_cost = if inputs.purchase_strategy.uses_loan() {
        loan.total_interest
    } else {
        0.0
    };

    let break_even = break_even_price(
        acq.invested_pln,
        interest_cost,
        acq.btc_amount,
        inputs.usd_pln_rate,
        inputs.transaction_cost,
    );

    let fx = inputs.usd_pln_rate;
    let basis_pln_per_btc = acq.average_cost_usd * fx;
    let sell_fraction = inputs.sell_at_peak1.clamp(0.0, 100.0) / 100.0;

    // Leg 1: partial sale at peak 1, always taxed flat on its own.
    let btc_sold = acq.btc_amount * sell_fraction;
    let value_sold = btc_sold * inputs.btc_peak1 * fx;
    let gross1 = value_sold - btc_sold * basis_pln_per_btc;
    let tax1 = policy.tax(gross1, false);
    let net1 = gross1 - tax1;
    let peak1 = SaleLeg {
        btc_sold,
        sale_value: value_sold,
        gross_profit: gross1,
        tax: tax1,
        net_profit: net1,
        net_profit_real: purchasing_power(net1, inflation(inputs), YEARS_TO_PEAK1),
    };

    // Leg 2: remainder at peak 2; the combined profit decides the bracket.
    let btc_remaining = acq.btc_amount - btc_sold;
    let value_remaining = btc_remaining * inputs.btc_peak2 * fx;
    let gross2 = value_remaining - btc_remaining * basis_pln_per_btc;
    let tax2 = policy.second_leg_tax(gross1, gross2);
    let net2 = gross2 - tax2;
    let peak2 = SaleLeg {
        btc_sold: btc_remaining,
        sale_value: value_remaining,
        gross_profit: gross2,
        tax: tax2,
        net_profit: net2,
        net_profit_real: purchasing_power(net2, inflation(inputs), YEARS_TO_PEAK2),
    };

    let total_gross = gross1 + gross2;
    let total_net = net1 + net2;
    let total_net_real = peak1.net_profit_real + peak2.net_profit_real;

    // Early repayment out of peak-1 proceeds shortens the loan and trims the
    // interest actually paid.
    let adjusted = if inputs.purchase_strategy.uses_loan() {
        let early_payment = if inputs.pay_off_loan { net1 } else { 0.0 };
        adjusted_interest(early_payment, inputs.loan_amount, loan.total_interest)
    } else {
        0.0
    };
    let final_profit = total_net - adjusted;

    let hodl_peak1 = hodl_outcome(
        inputs,
        &acq,
        &policy,
        inputs.btc_peak1,
        YEARS_TO_PEAK1,
        interest_cost,
    );
    let hodl_peak2 = hodl_outcome(
        inputs,
        &acq,
        &policy,
        inputs.btc_peak2,
        YEARS_TO_PEAK2,
        interest_cost,
    );

    let milestone_prices = [
        inputs.btc_peak2030,
        inputs.btc_peak2035,
        inputs.btc_peak2040,
    ];
    let milestones = MILESTONE_YEARS
        .iter()
        .zip(milestone_prices)
        .map(|(&year, price)| milestone(inputs, &acq, &policy, year, price, interest_cost))
        .collect();

    let bonds = benchmark(inputs, &policy, inputs.bonds_amount, inputs.bonds_rate, true)?;
    let equity = benchmark(inputs, &policy, inputs.bonds_amount, inputs.equity_rate, false)?;

    Ok(ProjectionResult {
        btc_amount: acq.btc_amount,
        average_buy_price_usd: acq.average_cost_usd,
        loan_btc: acq.loan_btc,
        dca_btc: acq.dca_btc,
        cash_btc: acq.cash_btc,
        dca_total_spent: acq.dca_total_spent,
        invested_pln: acq.invested_pln,
        monthly_payment: loan.monthly_payment,
        total_loan_cost: loan.total_cost,
        total_interest: loan.total_interest,
        adjusted_interest: adjusted,
        break_even_price_usd: break_even,
        peak1,
        peak2,
        total_gross_profit: total_gross,
        total_net_profit: total_net,
        total_net_profit_real: total_net_real,
        final_profit,
        hodl_peak1,
        hodl_peak2,
        milestones,
        roi_btc_percent: roi(final_profit, acq.invested_pln),
        roi_bonds_percent: roi(bonds.final_profit, bonds.principal),
        roi_equity_percent: roi(equity.final_profit, equity.principal),
        bonds,
        equity,
    })
}

fn inflation(inputs: &Inputs) -> f64 {
    inputs.inflation_rate
}

/// Full liquidation of the position at a single peak price.
fn hodl_outcome(
    inputs: &Inputs,
    acq: &Acquisition,
    policy: &TaxPolicy,
    price_usd: f64,
    years_held: u32,
    interest_cost: f64,
) -> HodlOutcome {
    let value = acq.btc_amount * price_usd * inputs.usd_pln_rate;
    let gross = value - acq.btc_amount * acq.average_cost_usd * inputs.usd_pln_rate;
    let tax = policy.tax(gross, true);
    let net = gross - tax;
    HodlOutcome {
        sale_value: value,
        gross_profit: gross,
        tax,
        net_profit: net,
        net_profit_real: purchasing_power(net, inflation(inputs), years_held),
        final_profit: net - interest_cost,
    }
}

fn milestone(
    inputs: &Inputs,
    acq: &Acquisition,
    policy: &TaxPolicy,
    year: u32,
    price_usd: f64,
    interest_cost: f64,
) -> MilestoneResult {
    let years_held = year - PURCHASE_YEAR;
    let value = acq.btc_amount * price_usd * inputs.usd_pln_rate;
    let gross = value - acq.btc_amount * acq.average_cost_usd * inputs.usd_pln_rate;
    let tax = policy.tax(gross, true);
    let net = gross - tax;
    MilestoneResult {
        year,
        price_usd,
        value_pln: value,
        total_cost: acq.invested_pln + interest_cost,
        gross_profit: gross,
        tax,
        net_profit: net,
        net_profit_real: purchasing_power(net, inflation(inputs), years_held),
    }
}

/// Fixed-rate benchmark over the loan horizon. Bonds carry their own
/// amortized financing cost (the comparison borrows for both sides);
/// the equity index is assumed unlevered.
fn benchmark(
    inputs: &Inputs,
    policy: &TaxPolicy,
    principal: f64,
    rate_percent: f64,
    loan_financed: bool,
) -> Result<BenchmarkResult, InvalidParameter> {
    let years = inputs.loan_years;
    let growth = compound_growth(principal, rate_percent, years);
    let tax = policy.tax(growth, false);
    let net = growth - tax;
    let loan_interest = if loan_financed {
        amortize(principal, inputs.interest_rate, years)?.total_interest
    } else {
        0.0
    };
    Ok(BenchmarkResult {
        principal,
        rate_percent,
        years,
        compound_return: growth,
        tax,
        net_return: net,
        net_return_real: purchasing_power(net, inflation(inputs), years),
        loan_interest,
        final_profit: net - loan_interest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{PurchaseStrategy, Scenario};
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_inputs() -> Inputs {
        let prices = Scenario::Neutral.prices();
        Inputs {
            loan_amount: 100_000.0,
            interest_rate: 12.0,
            loan_years: 10,
            bonds_amount: 80_000.0,
            bonds_rate: 6.0,
            equity_rate: 8.0,
            btc_buy_price: 80_000.0,
            btc_peak1: prices.peak1,
            btc_peak2: prices.peak2,
            btc_peak2030: prices.year2030,
            btc_peak2035: prices.year2035,
            btc_peak2040: prices.year2040,
            usd_pln_rate: 3.75,
            inflation_rate: 4.0,
            transaction_cost: 1.0,
            purchase_strategy: PurchaseStrategy::LumpLoan,
            sell_at_peak1: 50.0,
            pay_off_loan: true,
            dca_years: 2,
            dca_amount: 2_000.0,
            savings_amount: 100_000.0,
        }
    }

    #[test]
    fn neutral_2030_milestone_matches_reference_figures() {
        let result = run_projection(&sample_inputs()).expect("valid inputs");
        assert_approx_tol(result.btc_amount, 1.0 / 3.0, 1e-9);

        let m2030 = result.milestones[0];
        assert_eq!(m2030.year, 2030);
        assert_approx_tol(m2030.value_pln, 500_000.0, 0.01);
        assert_approx_tol(m2030.total_cost, 172_165.0, 1.0);
        assert_approx_tol(m2030.gross_profit, 400_000.0, 0.01);
        assert_approx_tol(m2030.tax, 76_000.0, 0.01);
        assert_approx_tol(m2030.net_profit, 324_000.0, 0.01);
        assert_approx_tol(m2030.net_profit_real, 266_304.0, 1.0);
    }

    #[test]
    fn milestone_horizons_count_from_purchase_epoch() {
        let result = run_projection(&sample_inputs()).expect("valid inputs");
        let years: Vec<u32> = result.milestones.iter().map(|m| m.year).collect();
        assert_eq!(years, vec![2030, 2035, 2040]);
        for m in &result.milestones {
            let expected = purchasing_power(m.net_profit, 4.0, m.year - 2025);
            assert_approx_tol(m.net_profit_real, expected, 1e-6);
        }
    }

    #[test]
    fn partial_sale_legs_round_trip_net_of_tax() {
        let result = run_projection(&sample_inputs()).expect("valid inputs");
        assert!(result.peak1.net_profit == result.peak1.gross_profit - result.peak1.tax);
        assert!(result.peak2.net_profit == result.peak2.gross_profit - result.peak2.tax);
        assert_approx_tol(
            result.total_net_profit,
            result.peak1.net_profit + result.peak2.net_profit,
            1e-9,
        );
    }

    #[test]
    fn fifty_fifty_split_reference_figures() {
        let result = run_projection(&sample_inputs()).expect("valid inputs");
        // 1/6 BTC sold at 240k USD, basis 300k PLN/BTC.
        assert_approx_tol(result.peak1.sale_value, 150_000.0, 0.01);
        assert_approx_tol(result.peak1.gross_profit, 100_000.0, 0.01);
        assert_approx_tol(result.peak1.tax, 19_000.0, 0.01);
        assert_approx_tol(result.peak1.net_profit, 81_000.0, 0.01);
        // Remaining 1/6 BTC at 500k USD.
        assert_approx_tol(result.peak2.sale_value, 312_500.0, 0.01);
        assert_approx_tol(result.peak2.gross_profit, 262_500.0, 0.01);
        // Combined gross stays under the threshold: flat tax on leg 2.
        assert_approx_tol(result.peak2.tax, 49_875.0, 0.01);
        assert_approx_tol(result.total_net_profit, 293_625.0, 0.01);
    }

    #[test]
    fn sell_everything_at_peak1_matches_hodl_baseline() {
        let mut inputs = sample_inputs();
        inputs.sell_at_peak1 = 100.0;
        let result = run_projection(&inputs).expect("valid inputs");
        assert_approx_tol(
            result.total_net_profit,
            result.hodl_peak1.net_profit,
            1e-6,
        );
        assert_approx_tol(result.peak2.sale_value, 0.0, 1e-9);
    }

    #[test]
    fn sell_nothing_at_peak1_matches_hodl_baseline() {
        let mut inputs = sample_inputs();
        inputs.sell_at_peak1 = 0.0;
        let result = run_projection(&inputs).expect("valid inputs");
        assert_approx_tol(
            result.total_net_profit,
            result.hodl_peak2.net_profit,
            1e-6,
        );
        assert_approx_tol(result.peak1.sale_value, 0.0, 1e-9);
    }

    #[test]
    fn out_of_range_sell_percentage_is_clamped() {
        let mut inputs = sample_inputs();
        inputs.sell_at_peak1 = 250.0;
        let clamped = run_projection(&inputs).expect("valid inputs");
        inputs.sell_at_peak1 = 100.0;
        let full = run_projection(&inputs).expect("valid inputs");
        assert_approx_tol(clamped.total_net_profit, full.total_net_profit, 1e-9);
    }

    #[test]
    fn combined_sale_crossing_threshold_is_not_double_taxed() {
        let mut inputs = sample_inputs();
        inputs.loan_amount = 600_000.0;
        let result = run_projection(&inputs).expect("valid inputs");
        let policy = TaxPolicy::default();
        assert!(result.total_gross_profit > policy.threshold);
        assert_approx_tol(
            result.peak1.tax + result.peak2.tax,
            policy.tax(result.total_gross_profit, true),
            1e-6,
        );
    }

    #[test]
    fn early_repayment_trims_interest_proportionally() {
        let inputs = sample_inputs();
        let with_payoff = run_projection(&inputs).expect("valid inputs");
        let mut no_payoff = inputs.clone();
        no_payoff.pay_off_loan = false;
        let without = run_projection(&no_payoff).expect("valid inputs");

        assert!(with_payoff.adjusted_interest < without.adjusted_interest);
        assert_approx_tol(without.adjusted_interest, without.total_interest, 1e-9);
        let expected_savings = (with_payoff.peak1.net_profit / inputs.loan_amount)
            * with_payoff.total_interest
            * 0.6;
        assert_approx_tol(
            with_payoff.adjusted_interest,
            with_payoff.total_interest - expected_savings,
            1e-6,
        );
    }

    #[test]
    fn cash_strategy_carries_no_interest_cost() {
        let mut inputs = sample_inputs();
        inputs.purchase_strategy = PurchaseStrategy::Cash;
        let result = run_projection(&inputs).expect("valid inputs");
        assert_approx_tol(result.adjusted_interest, 0.0, 1e-12);
        assert_approx_tol(result.final_profit, result.total_net_profit, 1e-9);
        // Break-even only has to recover the cash spent.
        let expected = break_even_price(
            inputs.savings_amount,
            0.0,
            result.btc_amount,
            inputs.usd_pln_rate,
            inputs.transaction_cost,
        );
        assert_approx_tol(result.break_even_price_usd, expected, 1e-9);
    }

    #[test]
    fn bonds_benchmark_reference_figures() {
        let result = run_projection(&sample_inputs()).expect("valid inputs");
        assert_approx_tol(result.bonds.compound_return, 63_267.82, 0.01);
        assert_approx_tol(result.bonds.tax, 63_267.82 * 0.19, 0.01);
        assert_approx_tol(
            result.bonds.net_return,
            result.bonds.compound_return - result.bonds.tax,
            1e-9,
        );
        let expected_real = purchasing_power(result.bonds.net_return, 4.0, 10);
        assert_approx_tol(result.bonds.net_return_real, expected_real, 1e-6);
        // Bonds are loan-financed in the comparison; equity is not.
        assert!(result.bonds.loan_interest > 0.0);
        assert_approx_tol(result.equity.loan_interest, 0.0, 1e-12);
        assert_approx_tol(result.equity.rate_percent, 8.0, 1e-12);
    }

    #[test]
    fn degenerate_inputs_produce_zeroes_not_nan() {
        let mut inputs = sample_inputs();
        inputs.btc_buy_price = 0.0;
        let result = run_projection(&inputs).expect("valid inputs");
        assert_approx_tol(result.btc_amount, 0.0, 1e-12);
        assert_approx_tol(result.break_even_price_usd, 0.0, 1e-12);
        assert_approx_tol(result.roi_btc_percent, 0.0, 1e-12);
        assert!(result.peak1.net_profit.is_finite());
        assert!(result.milestones.iter().all(|m| m.net_profit.is_finite()));
    }

    #[test]
    fn invalid_loan_years_is_rejected() {
        let mut inputs = sample_inputs();
        inputs.loan_years = 0;
        assert!(run_projection(&inputs).is_err());

        // Absurd terms must fail validation, not surface as NaN figures.
        inputs.loan_years = 100_000;
        assert!(run_projection(&inputs).is_err());
    }

    proptest! {
        #[test]
        fn projection_is_finite_and_consistent(
            loan in 10_000.0f64..1_000_000.0,
            rate in 0.0f64..20.0,
            years in 1u32..20,
            buy in 20_000.0f64..200_000.0,
            peak1_mult in 0.5f64..6.0,
            peak2_mult in 0.5f64..10.0,
            fx in 2.0f64..6.0,
            infl in 0.0f64..15.0,
            sell in 0.0f64..100.0,
        ) {
            let mut inputs = sample_inputs();
            inputs.loan_amount = loan;
            inputs.interest_rate = rate;
            inputs.loan_years = years;
            inputs.btc_buy_price = buy;
            inputs.btc_peak1 = buy * peak1_mult;
            inputs.btc_peak2 = buy * peak2_mult;
            inputs.usd_pln_rate = fx;
            inputs.inflation_rate = infl;
            inputs.sell_at_peak1 = sell;

            let result = run_projection(&inputs).expect("valid inputs");
            prop_assert!(result.total_net_profit.is_finite());
            prop_assert!(result.final_profit.is_finite());
            prop_assert!(
                (result.total_gross_profit
                    - result.peak1.gross_profit
                    - result.peak2.gross_profit)
                    .abs()
                    < 1e-6
            );
            // The partial strategy never beats both HODL baselines on gross.
            let best_gross = result
                .hodl_peak1
                .gross_profit
                .max(result.hodl_peak2.gross_profit);
            prop_assert!(result.total_gross_profit <= best_gross + 1e-6 * best_gross.abs().max(1.0));
            // Real profit never exceeds nominal under non-negative inflation.
            for (real, nominal) in [
                (result.peak1.net_profit_real, result.peak1.net_profit),
                (result.peak2.net_profit_real, result.peak2.net_profit),
            ] {
                if nominal >= 0.0 {
                    prop_assert!(real <= nominal + 1e-9);
                }
            }
        }
    }
}
