mod acquire;
mod engine;
mod loan;
mod tax;
mod types;
mod value;

pub use acquire::{acquire, break_even_price, Acquisition};
pub use engine::run_projection;
pub use loan::{adjusted_interest, amortize, interest_savings, InvalidParameter, LoanCost};
pub use tax::TaxPolicy;
pub use types::{
    BenchmarkResult, HodlOutcome, Inputs, MilestoneResult, ProjectionResult, PurchaseStrategy,
    SaleLeg, Scenario, ScenarioPrices,
};
pub use value::{compound_growth, inflation_factor, purchasing_power, roi};
