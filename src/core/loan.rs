use std::error::Error;
use std::fmt;

/// Fraction of the proportional interest saved by an early repayment; early
/// capital shortens the schedule rather than cancelling interest one-to-one.
const TIME_REDUCTION_FACTOR: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidParameter {
    parameter: &'static str,
    reason: &'static str,
}

impl InvalidParameter {
    pub(crate) fn new(parameter: &'static str, reason: &'static str) -> Self {
        Self { parameter, reason }
    }
}

impl fmt::Display for InvalidParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid parameter {}: {}", self.parameter, self.reason)
    }
}

impl Error for InvalidParameter {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanCost {
    pub monthly_payment: f64,
    pub total_cost: f64,
    pub total_interest: f64,
}

impl LoanCost {
    pub const ZERO: LoanCost = LoanCost {
        monthly_payment: 0.0,
        total_cost: 0.0,
        total_interest: 0.0,
    };
}

/// Fixed-payment amortization: monthly payment, total cost, and total
/// interest for a loan of `principal` PLN at `annual_rate_percent` over
/// `years`. A zero rate degenerates to straight principal division.
pub fn amortize(
    principal: f64,
    annual_rate_percent: f64,
    years: u32,
) -> Result<LoanCost, InvalidParameter> {
    if !principal.is_finite() || principal < 0.0 {
        return Err(InvalidParameter::new(
            "principal",
            "must be finite and >= 0",
        ));
    }
    if !annual_rate_percent.is_finite() || annual_rate_percent < 0.0 {
        return Err(InvalidParameter::new(
            "annual_rate_percent",
            "must be finite and >= 0",
        ));
    }
    // Past ~100 years the growth factor overflows f64 into infinity and the
    // payment degenerates to NaN, so the term is capped rather than guarded
    // downstream.
    if !(1..=100).contains(&years) {
        return Err(InvalidParameter::new("years", "must be between 1 and 100"));
    }

    let months = (years * 12) as f64;
    let monthly_rate = annual_rate_percent / 100.0 / 12.0;
    let monthly_payment = if monthly_rate == 0.0 {
        principal / months
    } else {
        let growth = (1.0 + monthly_rate).powf(months);
        principal * monthly_rate * growth / (growth - 1.0)
    };

    let total_cost = monthly_payment * months;
    Ok(LoanCost {
        monthly_payment,
        total_cost,
        total_interest: total_cost - principal,
    })
}

/// Interest saved by repaying `early_payment` PLN ahead of schedule, as a
/// proportional share of the remaining interest scaled by the time-reduction
/// factor. Zero when there is no loan or no early payment.
pub fn interest_savings(early_payment: f64, loan_amount: f64, total_interest: f64) -> f64 {
    if early_payment <= 0.0 || loan_amount <= 0.0 {
        return 0.0;
    }
    (early_payment.min(loan_amount) / loan_amount) * total_interest * TIME_REDUCTION_FACTOR
}

/// Total interest after an optional early repayment.
pub fn adjusted_interest(early_payment: f64, loan_amount: f64, total_interest: f64) -> f64 {
    total_interest - interest_savings(early_payment, loan_amount, total_interest)
}
