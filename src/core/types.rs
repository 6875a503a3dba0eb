use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PurchaseStrategy {
    /// Single purchase at the buy price, funded entirely by the loan.
    LumpLoan,
    /// Equal monthly purchases over the DCA window, no loan.
    Dca,
    /// Loan-funded purchase plus a DCA leg on top.
    LoanPlusDca,
    /// Single purchase at the buy price, funded by savings.
    Cash,
}

impl PurchaseStrategy {
    pub fn uses_loan(self) -> bool {
        matches!(
            self,
            PurchaseStrategy::LumpLoan | PurchaseStrategy::LoanPlusDca
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Scenario {
    Bearish,
    Neutral,
    Bullish,
}

/// Preset price points for a market scenario, in USD per BTC.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScenarioPrices {
    pub peak1: f64,
    pub peak2: f64,
    pub year2030: f64,
    pub year2035: f64,
    pub year2040: f64,
}

impl Scenario {
    pub fn prices(self) -> ScenarioPrices {
        match self {
            Scenario::Bearish => ScenarioPrices {
                peak1: 150_000.0,
                peak2: 300_000.0,
                year2030: 200_000.0,
                year2035: 300_000.0,
                year2040: 500_000.0,
            },
            Scenario::Neutral => ScenarioPrices {
                peak1: 240_000.0,
                peak2: 500_000.0,
                year2030: 400_000.0,
                year2035: 800_000.0,
                year2040: 1_200_000.0,
            },
            Scenario::Bullish => ScenarioPrices {
                peak1: 350_000.0,
                peak2: 750_000.0,
                year2030: 600_000.0,
                year2035: 1_500_000.0,
                year2040: 2_500_000.0,
            },
        }
    }
}

/// Every parameter the projection depends on, passed by value into the pure
/// pipeline on each recomputation. Rates are annual percentages (12 means
/// 12%), amounts are PLN unless the name says USD.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub loan_years: u32,
    pub bonds_amount: f64,
    pub bonds_rate: f64,
    pub equity_rate: f64,
    pub btc_buy_price: f64,
    pub btc_peak1: f64,
    pub btc_peak2: f64,
    pub btc_peak2030: f64,
    pub btc_peak2035: f64,
    pub btc_peak2040: f64,
    pub usd_pln_rate: f64,
    pub inflation_rate: f64,
    pub transaction_cost: f64,
    pub purchase_strategy: PurchaseStrategy,
    pub sell_at_peak1: f64,
    pub pay_off_loan: bool,
    pub dca_years: u32,
    pub dca_amount: f64,
    pub savings_amount: f64,
}

/// One leg of the partial-sale strategy (sell some at peak 1, rest at peak 2).
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLeg {
    pub btc_sold: f64,
    pub sale_value: f64,
    pub gross_profit: f64,
    pub tax: f64,
    pub net_profit: f64,
    pub net_profit_real: f64,
}

/// Full liquidation at a single peak, for opportunity-cost comparison.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HodlOutcome {
    pub sale_value: f64,
    pub gross_profit: f64,
    pub tax: f64,
    pub net_profit: f64,
    pub net_profit_real: f64,
    pub final_profit: f64,
}

/// Valuation of the whole position at a long-horizon milestone year.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneResult {
    pub year: u32,
    pub price_usd: f64,
    pub value_pln: f64,
    pub total_cost: f64,
    pub gross_profit: f64,
    pub tax: f64,
    pub net_profit: f64,
    pub net_profit_real: f64,
}

/// Fixed-rate alternative (bonds or an equity index) over the loan horizon.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkResult {
    pub principal: f64,
    pub rate_percent: f64,
    pub years: u32,
    pub compound_return: f64,
    pub tax: f64,
    pub net_return: f64,
    pub net_return_real: f64,
    pub loan_interest: f64,
    pub final_profit: f64,
}

/// Flat result record; the UI renders these figures verbatim.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub btc_amount: f64,
    pub average_buy_price_usd: f64,
    pub loan_btc: f64,
    pub dca_btc: f64,
    pub cash_btc: f64,
    pub dca_total_spent: f64,
    pub invested_pln: f64,

    pub monthly_payment: f64,
    pub total_loan_cost: f64,
    pub total_interest: f64,
    pub adjusted_interest: f64,
    pub break_even_price_usd: f64,

    pub peak1: SaleLeg,
    pub peak2: SaleLeg,
    pub total_gross_profit: f64,
    pub total_net_profit: f64,
    pub total_net_profit_real: f64,
    pub final_profit: f64,

    pub hodl_peak1: HodlOutcome,
    pub hodl_peak2: HodlOutcome,

    pub milestones: Vec<MilestoneResult>,

    pub bonds: BenchmarkResult,
    pub equity: BenchmarkResult,
    pub roi_btc_percent: f64,
    pub roi_bonds_percent: f64,
    pub roi_equity_percent: f64,
}
