//! Payment card input types.
//!
//! Checkout never stores a full card number: only the last four digits and
//! the detected network survive into an order or a saved payment method.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing card input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CardError {
    /// Card number is not exactly 16 digits.
    #[error("card number must be 16 digits")]
    InvalidNumber,
    /// Expiry is not `MM/YY`.
    #[error("expiry must use MM/YY format")]
    InvalidExpiry,
    /// CVV is not 3 or 4 digits.
    #[error("CVV must be 3 or 4 digits")]
    InvalidCvv,
}

/// Card network, detected from the leading digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Visa,
    Mastercard,
    #[serde(rename = "American Express")]
    AmericanExpress,
    #[serde(rename = "Generic Card")]
    Generic,
    Unknown,
}

impl CardType {
    /// Detect the network from raw input. Non-digits are ignored.
    #[must_use]
    pub fn detect(raw: &str) -> Self {
        match raw.chars().find(char::is_ascii_digit) {
            None => Self::Unknown,
            Some('4') => Self::Visa,
            Some('5') => Self::Mastercard,
            Some('3') => Self::AmericanExpress,
            Some(_) => Self::Generic,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visa => "Visa",
            Self::Mastercard => "Mastercard",
            Self::AmericanExpress => "American Express",
            Self::Generic => "Generic Card",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A card number of exactly 16 digits, with no separators.
///
/// `Debug` masks everything but the last four digits, and the type is
/// deliberately not `Serialize`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct CardNumber(String);

impl CardNumber {
    /// Parse a card number.
    ///
    /// # Errors
    ///
    /// Returns `CardError::InvalidNumber` unless the input is exactly 16
    /// ASCII digits.
    pub fn parse(raw: &str) -> Result<Self, CardError> {
        if raw.len() != 16 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CardError::InvalidNumber);
        }
        Ok(Self(raw.to_string()))
    }

    /// The last four digits.
    #[must_use]
    pub fn last4(&self) -> &str {
        self.0.get(12..).unwrap_or_default()
    }

    /// Detected card network.
    #[must_use]
    pub fn card_type(&self) -> CardType {
        CardType::detect(&self.0)
    }
}

impl fmt::Debug for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardNumber(****{})", self.last4())
    }
}

impl TryFrom<String> for CardNumber {
    type Error = CardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Card expiry month and two-digit year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardExpiry {
    month: u8,
    year: u8,
}

impl CardExpiry {
    /// Parse `MM/YY` (the slash is optional).
    ///
    /// # Errors
    ///
    /// Returns `CardError::InvalidExpiry` for any other shape or a month
    /// outside 01-12.
    pub fn parse(raw: &str) -> Result<Self, CardError> {
        let raw = raw.trim();
        let compact: String = raw.chars().filter(|&c| c != '/').collect();
        let slashes = raw.chars().filter(|&c| c == '/').count();
        if compact.len() != 4
            || slashes > 1
            || (slashes == 1 && raw.find('/') != Some(2))
            || !compact.chars().all(|c| c.is_ascii_digit())
        {
            return Err(CardError::InvalidExpiry);
        }

        let month = compact
            .get(..2)
            .and_then(|m| m.parse::<u8>().ok())
            .ok_or(CardError::InvalidExpiry)?;
        let year = compact
            .get(2..)
            .and_then(|y| y.parse::<u8>().ok())
            .ok_or(CardError::InvalidExpiry)?;
        if !(1..=12).contains(&month) {
            return Err(CardError::InvalidExpiry);
        }
        Ok(Self { month, year })
    }

    /// Two-digit month, `"01"`..`"12"`.
    #[must_use]
    pub fn month(&self) -> String {
        format!("{:02}", self.month)
    }

    /// Two-digit year.
    #[must_use]
    pub fn year(&self) -> String {
        format!("{:02}", self.year)
    }
}

impl fmt::Display for CardExpiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.year)
    }
}

impl TryFrom<String> for CardExpiry {
    type Error = CardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CardExpiry> for String {
    fn from(expiry: CardExpiry) -> Self {
        expiry.to_string()
    }
}

/// Card verification value. Checked, never stored.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Cvv(String);

impl Cvv {
    /// Parse a CVV.
    ///
    /// # Errors
    ///
    /// Returns `CardError::InvalidCvv` unless the input is 3 or 4 digits.
    pub fn parse(raw: &str) -> Result<Self, CardError> {
        let raw = raw.trim();
        if !(3..=4).contains(&raw.len()) || !raw.chars().all(|c| c.is_ascii_digit()) {
            return Err(CardError::InvalidCvv);
        }
        Ok(Self(raw.to_owned()))
    }
}

impl fmt::Debug for Cvv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cvv(***)")
    }
}

impl TryFrom<String> for Cvv {
    type Error = CardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}
