//! Donation arithmetic: fee offsets, crypto/fiat conversion and
//! minimum-donation checks
//!
//! Everything here is pure. Bad price data degrades to zero instead of
//! failing, since these values feed display fields.

pub mod amount;
pub mod conversion;
pub mod fees;

pub use amount::{ format_usd, sanitize_amount, AmountCheck, DonationAmount, InputMode, MinimumDonation };
pub use conversion::{ convert_from_fiat, convert_to_fiat, usable_price };
pub use fees::{ calculate_fee_offset, calculate_fee_offset_with_rate, round_to, FeeOffset };

use serde::Serialize;

/// Everything a confirmation screen shows for a crypto donation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonationQuote {
    pub crypto_amount: f64,
    pub token_price: Option<f64>,
    pub fiat_amount: f64,
    pub fee: FeeOffset,
    pub check: AmountCheck,
}

/// Quote a crypto amount at a live price against donation bounds
pub fn quote(crypto_amount: f64, token_price: Option<f64>, bounds: &MinimumDonation) -> DonationQuote {
    let mut amount = DonationAmount::new(token_price);
    amount.set_crypto_amount(crypto_amount);

    DonationQuote {
        crypto_amount: amount.crypto_amount(),
        token_price: amount.token_price(),
        fiat_amount: amount.fiat_amount(),
        fee: amount.fee_offset(),
        check: amount.check(bounds),
    }
}
