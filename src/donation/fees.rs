//! Processing-fee offset so the recipient gets the full intended amount

use crate::core::constants::{ FEE_PERCENTAGE, FIAT_DECIMALS };
use serde::{ Deserialize, Serialize };

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeOffset {
    pub fee: f64,
    pub total: f64,
}

/// Round to `decimals` places, halves away from zero
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Fee and total for a validated, non-negative amount
pub fn calculate_fee_offset(amount: f64) -> FeeOffset {
    calculate_fee_offset_with_rate(amount, FEE_PERCENTAGE)
}

pub fn calculate_fee_offset_with_rate(amount: f64, rate: f64) -> FeeOffset {
    let fee = round_to(amount * rate, FIAT_DECIMALS).max(0.0);
    FeeOffset {
        fee,
        total: amount + fee,
    }
}
