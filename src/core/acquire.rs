use super::tax::TaxPolicy;
use super::types::{Inputs, PurchaseStrategy};

/// BTC position produced by the selected purchase strategy, with the
/// per-funding-source breakdown. Amounts are BTC, prices USD, spend PLN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Acquisition {
    pub btc_amount: f64,
    pub average_cost_usd: f64,
    pub loan_btc: f64,
    pub dca_btc: f64,
    pub cash_btc: f64,
    pub dca_total_spent: f64,
    pub invested_pln: f64,
}

impl Acquisition {
    const EMPTY: Acquisition = Acquisition {
        btc_amount: 0.0,
        average_cost_usd: 0.0,
        loan_btc: 0.0,
        dca_btc: 0.0,
        cash_btc: 0.0,
        dca_total_spent: 0.0,
        invested_pln: 0.0,
    };
}

/// Runs the selected purchase strategy. Degenerate prices or FX rates yield
/// an empty position instead of propagating NaN/Infinity.
pub fn acquire(inputs: &Inputs) -> Acquisition {
    let fx = inputs.usd_pln_rate;
    let buy_price = inputs.btc_buy_price;
    if buy_price <= 0.0 || fx <= 0.0 {
        return Acquisition::EMPTY;
    }

    match inputs.purchase_strategy {
        PurchaseStrategy::LumpLoan => {
            let loan_btc = inputs.loan_amount / (buy_price * fx);
            Acquisition {
                btc_amount: loan_btc,
                average_cost_usd: buy_price,
                loan_btc,
                invested_pln: inputs.loan_amount,
                ..Acquisition::EMPTY
            }
        }
        PurchaseStrategy::Dca => {
            let (dca_btc, spent) = dca_leg(inputs);
            Acquisition {
                btc_amount: dca_btc,
                average_cost_usd: average_cost(spent, dca_btc, fx),
                dca_btc,
                dca_total_spent: spent,
                invested_pln: spent,
                ..Acquisition::EMPTY
            }
        }
        PurchaseStrategy::LoanPlusDca => {
            let loan_btc = inputs.loan_amount / (buy_price * fx);
            let (dca_btc, spent) = dca_leg(inputs);
            let combined = loan_btc + dca_btc;
            Acquisition {
                btc_amount: combined,
                average_cost_usd: average_cost(inputs.loan_amount + spent, combined, fx),
                loan_btc,
                dca_btc,
                cash_btc: 0.0,
                dca_total_spent: spent,
                invested_pln: inputs.loan_amount + spent,
            }
        }
        PurchaseStrategy::Cash => {
            let cash_btc = inputs.savings_amount / (buy_price * fx);
            Acquisition {
                btc_amount: cash_btc,
                average_cost_usd: buy_price,
                cash_btc,
                invested_pln: inputs.savings_amount,
                ..Acquisition::EMPTY
            }
        }
    }
}

/// Simulates the monthly DCA purchases. The per-month price interpolates
/// linearly from the buy price to the peak-1 price over the window, so later
/// instalments buy progressively less BTC.
fn dca_leg(inputs: &Inputs) -> (f64, f64) {
    let months = inputs.dca_years.saturating_mul(12);
    if months == 0 || inputs.dca_amount <= 0.0 {
        return (0.0, 0.0);
    }

    let fx = inputs.usd_pln_rate;
    let step = (inputs.btc_peak1 - inputs.btc_buy_price) / months as f64;
    let mut btc = 0.0;
    for month in 0..months {
        let price = inputs.btc_buy_price + step * month as f64;
        if price > 0.0 {
            btc += inputs.dca_amount / (price * fx);
        }
    }
    (btc, inputs.dca_amount * months as f64)
}

fn average_cost(spent_pln: f64, btc: f64, fx: f64) -> f64 {
    if btc > 0.0 && fx > 0.0 {
        spent_pln / (btc * fx)
    } else {
        0.0
    }
}

/// Future BTC price at which after-tax sale proceeds exactly cover the
/// principal plus financing cost. Returns 0 for an empty position or a
/// degenerate FX rate.
pub fn break_even_price(
    principal_pln: f64,
    total_interest: f64,
    btc_amount: f64,
    fx_rate: f64,
    transaction_cost_percent: f64,
) -> f64 {
    if btc_amount <= 0.0 || fx_rate <= 0.0 {
        return 0.0;
    }
    let keep = TaxPolicy::default().after_tax_factor() * (1.0 - transaction_cost_percent / 100.0);
    if keep <= 0.0 {
        return 0.0;
    }
    (principal_pln + total_interest) / (btc_amount * fx_rate * keep)
}
