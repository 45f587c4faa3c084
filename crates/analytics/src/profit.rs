//! Profit estimates.

/// Estimated profit at a margin given in percent.
pub fn estimated_profit(price: f64, margin_pct: f64) -> f64 {
    price * margin_pct / 100.0
}
