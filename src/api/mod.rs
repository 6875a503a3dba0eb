use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{Inputs, ProjectionResult, PurchaseStrategy, Scenario, run_projection};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliPurchaseStrategy {
    Lump,
    Dca,
    LoanDca,
    Savings,
}

impl From<CliPurchaseStrategy> for PurchaseStrategy {
    fn from(value: CliPurchaseStrategy) -> Self {
        match value {
            CliPurchaseStrategy::Lump => PurchaseStrategy::LumpLoan,
            CliPurchaseStrategy::Dca => PurchaseStrategy::Dca,
            CliPurchaseStrategy::LoanDca => PurchaseStrategy::LoanPlusDca,
            CliPurchaseStrategy::Savings => PurchaseStrategy::Cash,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliScenario {
    Bearish,
    Neutral,
    Bullish,
}

impl From<CliScenario> for Scenario {
    fn from(value: CliScenario) -> Self {
        match value {
            CliScenario::Bearish => Scenario::Bearish,
            CliScenario::Neutral => Scenario::Neutral,
            CliScenario::Bullish => Scenario::Bullish,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ApiPurchaseStrategy {
    #[serde(alias = "lumpLoan", alias = "lump_loan", alias = "loan")]
    Lump,
    Dca,
    #[serde(alias = "loanDca", alias = "loan_dca", alias = "loan-plus-dca")]
    LoanDca,
    #[serde(alias = "cash")]
    Savings,
}

impl From<ApiPurchaseStrategy> for CliPurchaseStrategy {
    fn from(value: ApiPurchaseStrategy) -> Self {
        match value {
            ApiPurchaseStrategy::Lump => CliPurchaseStrategy::Lump,
            ApiPurchaseStrategy::Dca => CliPurchaseStrategy::Dca,
            ApiPurchaseStrategy::LoanDca => CliPurchaseStrategy::LoanDca,
            ApiPurchaseStrategy::Savings => CliPurchaseStrategy::Savings,
        }
    }
}

impl From<PurchaseStrategy> for ApiPurchaseStrategy {
    fn from(value: PurchaseStrategy) -> Self {
        match value {
            PurchaseStrategy::LumpLoan => ApiPurchaseStrategy::Lump,
            PurchaseStrategy::Dca => ApiPurchaseStrategy::Dca,
            PurchaseStrategy::LoanPlusDca => ApiPurchaseStrategy::LoanDca,
            PurchaseStrategy::Cash => ApiPurchaseStrategy::Savings,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ApiScenario {
    #[serde(alias = "bear")]
    Bearish,
    #[serde(alias = "base")]
    Neutral,
    #[serde(alias = "bull")]
    Bullish,
}

impl From<ApiScenario> for CliScenario {
    fn from(value: ApiScenario) -> Self {
        match value {
            ApiScenario::Bearish => CliScenario::Bearish,
            ApiScenario::Neutral => CliScenario::Neutral,
            ApiScenario::Bullish => CliScenario::Bullish,
        }
    }
}

/// Web payload: every field optional; unknown keys are ignored. A `scenario`
/// preset is applied first, then explicit price fields override it.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    loan_amount: Option<f64>,
    interest_rate: Option<f64>,
    loan_years: Option<u32>,

    bonds_amount: Option<f64>,
    bonds_rate: Option<f64>,
    equity_rate: Option<f64>,

    scenario: Option<ApiScenario>,
    btc_buy_price: Option<f64>,
    btc_peak1: Option<f64>,
    btc_peak2: Option<f64>,
    btc_peak2030: Option<f64>,
    btc_peak2035: Option<f64>,
    btc_peak2040: Option<f64>,

    usd_pln_rate: Option<f64>,
    inflation_rate: Option<f64>,
    transaction_cost: Option<f64>,

    purchase_strategy: Option<ApiPurchaseStrategy>,
    sell_at_peak1: Option<f64>,
    pay_off_loan: Option<bool>,
    dca_years: Option<u32>,
    dca_amount: Option<f64>,
    savings_amount: Option<f64>,
}

#[derive(Parser, Debug)]
#[command(
    name = "hossa",
    about = "Leveraged BTC purchase planner (loan vs DCA vs savings, PLN tax and inflation aware)"
)]
struct Cli {
    #[arg(long, default_value_t = 100_000.0, help = "Loan principal in PLN")]
    loan_amount: f64,
    #[arg(
        long,
        default_value_t = 12.0,
        help = "Nominal annual loan interest rate in percent"
    )]
    interest_rate: f64,
    #[arg(long, default_value_t = 10, help = "Loan term in years")]
    loan_years: u32,
    #[arg(
        long,
        default_value_t = 80_000.0,
        help = "Principal for the bond and equity benchmarks in PLN"
    )]
    bonds_amount: f64,
    #[arg(
        long,
        default_value_t = 6.0,
        help = "Annual bond yield in percent"
    )]
    bonds_rate: f64,
    #[arg(
        long,
        default_value_t = 8.0,
        help = "Annual equity index return in percent"
    )]
    equity_rate: f64,
    #[arg(long, default_value_t = 80_000.0, help = "BTC purchase price in USD")]
    btc_buy_price: f64,
    #[arg(
        long,
        default_value_t = 240_000.0,
        help = "Assumed first cycle peak price in USD (2027)"
    )]
    btc_peak1: f64,
    #[arg(
        long,
        default_value_t = 500_000.0,
        help = "Assumed second cycle peak price in USD (2029)"
    )]
    btc_peak2: f64,
    #[arg(long, default_value_t = 400_000.0, help = "Assumed 2030 price in USD")]
    btc_peak2030: f64,
    #[arg(long, default_value_t = 800_000.0, help = "Assumed 2035 price in USD")]
    btc_peak2035: f64,
    #[arg(long, default_value_t = 1_200_000.0, help = "Assumed 2040 price in USD")]
    btc_peak2040: f64,
    #[arg(long, default_value_t = 3.75, help = "USD/PLN exchange rate")]
    usd_pln_rate: f64,
    #[arg(
        long,
        default_value_t = 4.0,
        help = "Expected annual inflation in percent"
    )]
    inflation_rate: f64,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Exchange transaction cost in percent of sale proceeds"
    )]
    transaction_cost: f64,
    #[arg(
        long,
        value_enum,
        default_value_t = CliPurchaseStrategy::Lump,
        help = "How the position is acquired: lump loan, DCA, loan+DCA, or savings"
    )]
    purchase_strategy: CliPurchaseStrategy,
    #[arg(
        long,
        default_value_t = 50.0,
        help = "Share of the position sold at the first peak in percent"
    )]
    sell_at_peak1: f64,
    #[arg(
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        help = "Repay the loan early out of first-peak proceeds"
    )]
    pay_off_loan: bool,
    #[arg(long, default_value_t = 2, help = "DCA window in years")]
    dca_years: u32,
    #[arg(long, default_value_t = 2_000.0, help = "Monthly DCA instalment in PLN")]
    dca_amount: f64,
    #[arg(
        long,
        default_value_t = 100_000.0,
        help = "Savings spent under the savings strategy in PLN"
    )]
    savings_amount: f64,
}

#[derive(Debug)]
struct ApiRequest {
    inputs: Inputs,
    scenario: Option<ApiScenario>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    purchase_strategy: ApiPurchaseStrategy,
    scenario: Option<ApiScenario>,
    #[serde(flatten)]
    result: ProjectionResult,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: Cli) -> Result<Inputs, String> {
    let strategy: PurchaseStrategy = cli.purchase_strategy.into();

    if !cli.loan_amount.is_finite() || cli.loan_amount < 0.0 {
        return Err("--loan-amount must be >= 0".to_string());
    }

    if strategy.uses_loan() && cli.loan_amount == 0.0 {
        return Err("--loan-amount must be > 0 for loan-funded strategies".to_string());
    }

    if !(0.0..=30.0).contains(&cli.interest_rate) {
        return Err("--interest-rate must be between 0 and 30".to_string());
    }

    if !(1..=50).contains(&cli.loan_years) {
        return Err("--loan-years must be between 1 and 50".to_string());
    }

    if cli.bonds_amount < 0.0 {
        return Err("--bonds-amount must be >= 0".to_string());
    }

    for (name, rate) in [
        ("--bonds-rate", cli.bonds_rate),
        ("--equity-rate", cli.equity_rate),
    ] {
        if !(0.0..=50.0).contains(&rate) {
            return Err(format!("{name} must be between 0 and 50"));
        }
    }

    for (name, price) in [
        ("--btc-buy-price", cli.btc_buy_price),
        ("--btc-peak1", cli.btc_peak1),
        ("--btc-peak2", cli.btc_peak2),
        ("--btc-peak2030", cli.btc_peak2030),
        ("--btc-peak2035", cli.btc_peak2035),
        ("--btc-peak2040", cli.btc_peak2040),
    ] {
        if !price.is_finite() || price <= 0.0 {
            return Err(format!("{name} must be > 0"));
        }
    }

    if !(1.0..=10.0).contains(&cli.usd_pln_rate) {
        return Err("--usd-pln-rate must be between 1 and 10".to_string());
    }

    if !(0.0..=50.0).contains(&cli.inflation_rate) {
        return Err("--inflation-rate must be between 0 and 50".to_string());
    }

    if !(0.0..=10.0).contains(&cli.transaction_cost) {
        return Err("--transaction-cost must be between 0 and 10".to_string());
    }

    if !cli.sell_at_peak1.is_finite() {
        return Err("--sell-at-peak1 must be a number".to_string());
    }

    let uses_dca = matches!(
        strategy,
        PurchaseStrategy::Dca | PurchaseStrategy::LoanPlusDca
    );
    if uses_dca {
        if !(1..=10).contains(&cli.dca_years) {
            return Err("--dca-years must be between 1 and 10 for DCA strategies".to_string());
        }
        if !cli.dca_amount.is_finite() || cli.dca_amount <= 0.0 {
            return Err("--dca-amount must be > 0 for DCA strategies".to_string());
        }
    }

    if strategy == PurchaseStrategy::Cash
        && (!cli.savings_amount.is_finite() || cli.savings_amount <= 0.0)
    {
        return Err("--savings-amount must be > 0 for the savings strategy".to_string());
    }

    Ok(Inputs {
        loan_amount: cli.loan_amount,
        interest_rate: cli.interest_rate,
        loan_years: cli.loan_years,
        bonds_amount: cli.bonds_amount,
        bonds_rate: cli.bonds_rate,
        equity_rate: cli.equity_rate,
        btc_buy_price: cli.btc_buy_price,
        btc_peak1: cli.btc_peak1,
        btc_peak2: cli.btc_peak2,
        btc_peak2030: cli.btc_peak2030,
        btc_peak2035: cli.btc_peak2035,
        btc_peak2040: cli.btc_peak2040,
        usd_pln_rate: cli.usd_pln_rate,
        inflation_rate: cli.inflation_rate,
        transaction_cost: cli.transaction_cost,
        purchase_strategy: strategy,
        sell_at_peak1: cli.sell_at_peak1.clamp(0.0, 100.0),
        pay_off_loan: cli.pay_off_loan,
        dca_years: cli.dca_years,
        dca_amount: cli.dca_amount,
        savings_amount: cli.savings_amount,
    })
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("Hossa HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let result = match run_projection(&request.inputs) {
        Ok(result) => result,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let response = SimulateResponse {
        purchase_strategy: request.inputs.purchase_strategy.into(),
        scenario: request.scenario,
        result,
    };
    json_response(StatusCode::OK, response)
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    // Scenario preset first, so explicit price fields win over it.
    if let Some(scenario) = payload.scenario {
        let prices = Scenario::from(CliScenario::from(scenario)).prices();
        cli.btc_peak1 = prices.peak1;
        cli.btc_peak2 = prices.peak2;
        cli.btc_peak2030 = prices.year2030;
        cli.btc_peak2035 = prices.year2035;
        cli.btc_peak2040 = prices.year2040;
    }

    if let Some(v) = payload.loan_amount {
        cli.loan_amount = v;
    }
    if let Some(v) = payload.interest_rate {
        cli.interest_rate = v;
    }
    if let Some(v) = payload.loan_years {
        cli.loan_years = v;
    }

    if let Some(v) = payload.bonds_amount {
        cli.bonds_amount = v;
    }
    if let Some(v) = payload.bonds_rate {
        cli.bonds_rate = v;
    }
    if let Some(v) = payload.equity_rate {
        cli.equity_rate = v;
    }

    if let Some(v) = payload.btc_buy_price {
        cli.btc_buy_price = v;
    }
    if let Some(v) = payload.btc_peak1 {
        cli.btc_peak1 = v;
    }
    if let Some(v) = payload.btc_peak2 {
        cli.btc_peak2 = v;
    }
    if let Some(v) = payload.btc_peak2030 {
        cli.btc_peak2030 = v;
    }
    if let Some(v) = payload.btc_peak2035 {
        cli.btc_peak2035 = v;
    }
    if let Some(v) = payload.btc_peak2040 {
        cli.btc_peak2040 = v;
    }

    if let Some(v) = payload.usd_pln_rate {
        cli.usd_pln_rate = v;
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.transaction_cost {
        cli.transaction_cost = v;
    }

    if let Some(v) = payload.purchase_strategy {
        cli.purchase_strategy = v.into();
    }
    if let Some(v) = payload.sell_at_peak1 {
        cli.sell_at_peak1 = v;
    }
    if let Some(v) = payload.pay_off_loan {
        cli.pay_off_loan = v;
    }
    if let Some(v) = payload.dca_years {
        cli.dca_years = v;
    }
    if let Some(v) = payload.dca_amount {
        cli.dca_amount = v;
    }
    if let Some(v) = payload.savings_amount {
        cli.savings_amount = v;
    }

    let inputs = build_inputs(cli)?;
    Ok(ApiRequest {
        inputs,
        scenario: payload.scenario,
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        loan_amount: 100_000.0,
        interest_rate: 12.0,
        loan_years: 10,
        bonds_amount: 80_000.0,
        bonds_rate: 6.0,
        equity_rate: 8.0,
        btc_buy_price: 80_000.0,
        btc_peak1: 240_000.0,
        btc_peak2: 500_000.0,
        btc_peak2030: 400_000.0,
        btc_peak2035: 800_000.0,
        btc_peak2040: 1_200_000.0,
        usd_pln_rate: 3.75,
        inflation_rate: 4.0,
        transaction_cost: 1.0,
        purchase_strategy: CliPurchaseStrategy::Lump,
        sell_at_peak1: 50.0,
        pay_off_loan: true,
        dca_years: 2,
        dca_amount: 2_000.0,
        savings_amount: 100_000.0,
    }
}
