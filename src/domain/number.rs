//! Card number and verification code value objects.
//!
//! Card numbers are a 6-digit network prefix, 9 random digits and a trailing
//! check digit. The check digit uses a left-indexed Luhn variant: digits at
//! even positions counted from the left of the 15-digit partial number are
//! doubled. Numbers already issued depend on this exact convention, so
//! [`luhn_check_digit`] must not be replaced by a right-aligned implementation.

use super::card::CardType;
use crate::error::{CardError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CARD_NUMBER_LENGTH: usize = 16;
pub const CVV_LENGTH: usize = 3;

const PREFIX_LENGTH: usize = 6;
const RANDOM_DIGITS: usize = 9;

/// Computes the check digit over `digits`, each in `0..=9`.
pub fn luhn_check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(index, &digit)| {
            let digit = u32::from(digit);
            if index % 2 == 0 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();
    ((10 - (sum % 10)) % 10) as u8
}

fn to_digits(value: &str) -> Option<Vec<u8>> {
    value
        .bytes()
        .map(|b| b.is_ascii_digit().then(|| b - b'0'))
        .collect()
}

/// A 16-digit card number whose last digit is the check digit of the first 15.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardNumber(String);

impl CardNumber {
    /// Draws a fresh number on the network of `card_type`.
    pub fn generate<R: Rng + ?Sized>(card_type: CardType, rng: &mut R) -> Self {
        let mut digits: Vec<u8> = card_type
            .network_prefix()
            .bytes()
            .map(|b| b - b'0')
            .collect();
        digits.extend((0..RANDOM_DIGITS).map(|_| rng.gen_range(0..10u8)));
        digits.push(luhn_check_digit(&digits));

        Self(digits.into_iter().map(|d| char::from(b'0' + d)).collect())
    }

    /// Validates a stored or externally supplied card number.
    pub fn parse(value: &str) -> Result<Self> {
        let digits = to_digits(value)
            .filter(|digits| digits.len() == CARD_NUMBER_LENGTH)
            .ok_or_else(|| {
                CardError::InvalidArgument(format!(
                    "Card number must be {CARD_NUMBER_LENGTH} digits"
                ))
            })?;

        let (partial, check) = digits.split_at(CARD_NUMBER_LENGTH - 1);
        if luhn_check_digit(partial) != check[0] {
            return Err(CardError::InvalidArgument(
                "Card number check digit mismatch".to_string(),
            ));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The network prefix followed by stars and the last four digits.
    pub fn masked(&self) -> String {
        let hidden = CARD_NUMBER_LENGTH - PREFIX_LENGTH - 4;
        format!(
            "{}{}{}",
            &self.0[..PREFIX_LENGTH],
            "*".repeat(hidden),
            &self.0[CARD_NUMBER_LENGTH - 4..]
        )
    }
}

impl fmt::Display for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CardNumber {
    type Error = CardError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CardNumber> for String {
    fn from(number: CardNumber) -> Self {
        number.0
    }
}

/// A 3-digit card verification code, unrelated to the card number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cvv(String);

impl Cvv {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(100..1000u16).to_string())
    }

    pub fn parse(value: &str) -> Result<Self> {
        match to_digits(value) {
            Some(digits) if digits.len() == CVV_LENGTH => Ok(Self(value.to_string())),
            _ => Err(CardError::InvalidArgument(format!(
                "CVV must be {CVV_LENGTH} digits"
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Cvv {
    type Error = CardError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Cvv> for String {
    fn from(cvv: Cvv) -> Self {
        cvv.0
    }
}
