//! Crypto <-> fiat conversion at a live token price
//!
//! Missing, zero, negative or non-finite prices disable conversion and
//! yield 0 so the form can show "unavailable" instead of failing. Results
//! are not rounded; rounding happens only for display.

/// Price usable for conversion, if any
pub fn usable_price(price: Option<f64>) -> Option<f64> {
    price.filter(|p| p.is_finite() && *p > 0.0)
}

pub fn convert_to_fiat(crypto_amount: f64, price: Option<f64>) -> f64 {
    match usable_price(price) {
        Some(p) => crypto_amount * p,
        None => 0.0,
    }
}

pub fn convert_from_fiat(fiat_amount: f64, price: Option<f64>) -> f64 {
    match usable_price(price) {
        Some(p) => fiat_amount / p,
        None => 0.0,
    }
}
