//! Donation form amount model
//!
//! Holds the amount a donor is entering in either crypto or fiat mode and
//! keeps the other representation in sync with the live token price. The
//! side the donor typed is authoritative; the other side is derived.
use super::conversion::{ convert_from_fiat, convert_to_fiat, usable_price };
use super::fees::{ calculate_fee_offset, FeeOffset };
use crate::config::DonationConfig;
use crate::core::constants::{ MIN_DONATION_EXTENDED_USD, MIN_DONATION_STANDARD_USD };
use crate::logger::{ self, LogTag };
use serde::{ Deserialize, Serialize };

/// Normalize raw form input: NaN, infinities and negatives become 0
pub fn sanitize_amount(raw: f64) -> f64 {
    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        0.0
    }
}

/// Display a USD value with two decimals, e.g. `$5.00`
pub fn format_usd(value: f64) -> String {
    format!("${:.2}", sanitize_amount(value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Crypto,
    Fiat,
}

/// Outcome of checking an amount against donation bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AmountCheck {
    Accepted,
    BelowMinimum {
        shortfall_usd: f64,
    },
    AboveMaximum {
        excess_usd: f64,
    },
    /// Crypto amount entered but no usable price to value it
    PriceUnavailable,
}

impl AmountCheck {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AmountCheck::Accepted)
    }
}

/// USD bounds a donation must respect before submission
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinimumDonation {
    pub floor_usd: f64,
    pub max_usd: Option<f64>,
}

impl MinimumDonation {
    /// Floor used by most donation targets
    pub fn standard() -> Self {
        Self { floor_usd: MIN_DONATION_STANDARD_USD, max_usd: None }
    }

    /// Floor for targets whose contract needs a larger minimum
    pub fn extended() -> Self {
        Self { floor_usd: MIN_DONATION_EXTENDED_USD, max_usd: None }
    }

    pub fn from_config(config: &DonationConfig) -> Self {
        Self {
            floor_usd: config.min_donation_usd.max(0.0),
            max_usd: (config.max_donation_usd > 0.0).then_some(config.max_donation_usd),
        }
    }

    /// Compare an unrounded USD value against the bounds
    pub fn check(&self, amount_usd: f64) -> AmountCheck {
        let amount_usd = sanitize_amount(amount_usd);
        if amount_usd < self.floor_usd {
            return AmountCheck::BelowMinimum { shortfall_usd: self.floor_usd - amount_usd };
        }
        match self.max_usd {
            Some(max) if amount_usd > max => AmountCheck::AboveMaximum { excess_usd: amount_usd - max },
            _ => AmountCheck::Accepted,
        }
    }
}

impl Default for MinimumDonation {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationAmount {
    mode: InputMode,
    crypto_amount: f64,
    fiat_amount: f64,
    token_price: Option<f64>,
}

impl DonationAmount {
    pub fn new(token_price: Option<f64>) -> Self {
        Self {
            mode: InputMode::Crypto,
            crypto_amount: 0.0,
            fiat_amount: 0.0,
            token_price: usable_price(token_price),
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn crypto_amount(&self) -> f64 {
        self.crypto_amount
    }

    pub fn fiat_amount(&self) -> f64 {
        self.fiat_amount
    }

    pub fn token_price(&self) -> Option<f64> {
        self.token_price
    }

    pub fn is_price_available(&self) -> bool {
        self.token_price.is_some()
    }

    /// Donor typed a crypto amount
    pub fn set_crypto_amount(&mut self, raw: f64) {
        self.mode = InputMode::Crypto;
        self.crypto_amount = sanitize_amount(raw);
        self.fiat_amount = convert_to_fiat(self.crypto_amount, self.token_price);
    }

    /// Donor typed a fiat amount
    pub fn set_fiat_amount(&mut self, raw: f64) {
        self.mode = InputMode::Fiat;
        self.fiat_amount = sanitize_amount(raw);
        self.crypto_amount = convert_from_fiat(self.fiat_amount, self.token_price);
    }

    /// Switch which side the donor edits; both values are kept
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            InputMode::Crypto => InputMode::Fiat,
            InputMode::Fiat => InputMode::Crypto,
        };
    }

    /// New price from the oracle (or token selection changed)
    ///
    /// Re-derives the non-authoritative side from the side the donor typed.
    pub fn set_price(&mut self, token_price: Option<f64>) {
        self.token_price = usable_price(token_price);
        if self.token_price.is_none() {
            logger::debug(LogTag::Donation, "Token price unavailable, conversion disabled");
        }

        match self.mode {
            InputMode::Crypto => {
                self.fiat_amount = convert_to_fiat(self.crypto_amount, self.token_price);
            }
            InputMode::Fiat => {
                self.crypto_amount = convert_from_fiat(self.fiat_amount, self.token_price);
            }
        }
    }

    /// Fiat display string, `unavailable` when a crypto amount cannot be valued
    pub fn fiat_display(&self) -> String {
        if self.mode == InputMode::Crypto && !self.is_price_available() {
            "unavailable".to_string()
        } else {
            format_usd(self.fiat_amount)
        }
    }

    /// Processor fee offset on the fiat value
    pub fn fee_offset(&self) -> FeeOffset {
        calculate_fee_offset(self.fiat_amount)
    }

    pub fn check(&self, bounds: &MinimumDonation) -> AmountCheck {
        if self.mode == InputMode::Crypto && !self.is_price_available() {
            return AmountCheck::PriceUnavailable;
        }
        bounds.check(self.fiat_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_donor_scenario() {
        // Token at $0.50, donor enters 10 tokens
        let mut amount = DonationAmount::new(Some(0.5));
        amount.set_crypto_amount(10.0);
        assert_eq!(amount.fiat_display(), "$5.00");

        // Switches to fiat mode and enters $25
        amount.toggle_mode();
        assert_eq!(amount.mode(), InputMode::Fiat);
        amount.set_fiat_amount(25.0);
        assert!((amount.crypto_amount() - 50.0).abs() < TOLERANCE);
        assert_eq!(amount.fee_offset(), FeeOffset { fee: 0.75, total: 25.75 });
        assert!(amount.check(&MinimumDonation::standard()).is_accepted());
    }

    #[test]
    fn test_price_update_recomputes_derived_side() {
        let mut amount = DonationAmount::new(Some(2.0));
        amount.set_fiat_amount(20.0);
        amount.set_price(Some(4.0));
        assert!((amount.crypto_amount() - 5.0).abs() < TOLERANCE);
        assert_eq!(amount.fiat_amount(), 20.0);

        amount.set_crypto_amount(3.0);
        amount.set_price(Some(10.0));
        assert!((amount.fiat_amount() - 30.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_missing_price_shows_unavailable() {
        let mut amount = DonationAmount::new(None);
        amount.set_crypto_amount(10.0);
        assert_eq!(amount.fiat_amount(), 0.0);
        assert_eq!(amount.fiat_display(), "unavailable");
        assert_eq!(amount.check(&MinimumDonation::standard()), AmountCheck::PriceUnavailable);

        // Fiat entry still works; crypto side degrades to zero
        amount.set_fiat_amount(15.0);
        assert_eq!(amount.crypto_amount(), 0.0);
        assert_eq!(amount.fiat_display(), "$15.00");
    }

    #[test]
    fn test_zero_price_treated_as_missing() {
        let amount = DonationAmount::new(Some(0.0));
        assert!(!amount.is_price_available());
    }

    #[test]
    fn test_invalid_input_normalized() {
        let mut amount = DonationAmount::new(Some(1.0));
        amount.set_crypto_amount(f64::NAN);
        assert_eq!(amount.crypto_amount(), 0.0);
        amount.set_fiat_amount(-12.0);
        assert_eq!(amount.fiat_amount(), 0.0);
        assert_eq!(sanitize_amount(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_minimum_check() {
        let bounds = MinimumDonation::extended();
        match bounds.check(40.0) {
            AmountCheck::BelowMinimum { shortfall_usd } => assert!((shortfall_usd - 2.0).abs() < TOLERANCE),
            other => panic!("unexpected {:?}", other),
        }
        assert!(bounds.check(42.0).is_accepted());
    }

    #[test]
    fn test_minimum_uses_unrounded_conversion() {
        // 19.9995 tokens at $0.50 = $9.99975, which displays as $10.00 but is below $10
        let mut amount = DonationAmount::new(Some(0.5));
        amount.set_crypto_amount(19.9995);
        assert_eq!(amount.fiat_display(), "$10.00");
        assert!(!amount.check(&MinimumDonation::standard()).is_accepted());
    }

    #[test]
    fn test_bounds_from_config() {
        let config = DonationConfig { min_donation_usd: 5.0, max_donation_usd: 1000.0 };
        let bounds = MinimumDonation::from_config(&config);
        assert!(matches!(bounds.check(1500.0), AmountCheck::AboveMaximum { .. }));
        assert!(bounds.check(5.0).is_accepted());

        let unlimited = MinimumDonation::from_config(&DonationConfig::default());
        assert_eq!(unlimited.max_usd, None);
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(5.0), "$5.00");
        assert_eq!(format_usd(1234.567), "$1234.57");
        assert_eq!(format_usd(f64::NAN), "$0.00");
    }
}
