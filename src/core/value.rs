/// Compound gain (not ending balance) of `principal` at `annual_rate_percent`
/// over `years`.
pub fn compound_growth(principal: f64, annual_rate_percent: f64, years: u32) -> f64 {
    principal * (1.0 + annual_rate_percent / 100.0).powi(years as i32) - principal
}

/// Cumulative inflation factor over `years` at `inflation_rate_percent`.
pub fn inflation_factor(inflation_rate_percent: f64, years: u32) -> f64 {
    (1.0 + inflation_rate_percent / 100.0).powi(years as i32)
}

/// Value of `nominal` expressed in base-year money. Zero years or zero rate
/// returns the nominal value unchanged exactly; a degenerate factor (rate at
/// or below -100%) is guarded to 0 rather than dividing by zero.
pub fn purchasing_power(nominal: f64, inflation_rate_percent: f64, years: u32) -> f64 {
    if years == 0 || inflation_rate_percent == 0.0 {
        return nominal;
    }
    let factor = inflation_factor(inflation_rate_percent, years);
    if factor <= 0.0 {
        return 0.0;
    }
    nominal / factor
}

/// Return on investment in percent; 0 for a zero or negative investment
/// rather than NaN/Infinity.
pub fn roi(profit: f64, investment: f64) -> f64 {
    if investment > 0.0 {
        profit / investment * 100.0
    } else {
        0.0
    }
}
