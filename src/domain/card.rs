use super::clock::Clock;
use super::money::{Amount, Balance};
use super::number::{CardNumber, Cvv};
use crate::error::{CardError, Result};
use chrono::{DateTime, Months, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const MAX_HOLDER_NAME_LENGTH: usize = 100;
pub const VALIDITY_MONTHS: u32 = 60;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum CardType {
    Debit,
    Credit,
}

impl CardType {
    pub fn network_prefix(&self) -> &'static str {
        match self {
            CardType::Debit => "400000",
            CardType::Credit => "510000",
        }
    }
}

impl FromStr for CardType {
    type Err = CardError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debit" => Ok(CardType::Debit),
            "credit" => Ok(CardType::Credit),
            other => Err(CardError::InvalidArgument(format!(
                "Unknown card type: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for CardType {
    type Error = CardError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardType::Debit => f.write_str("debit"),
            CardType::Credit => f.write_str("credit"),
        }
    }
}

/// Lifecycle status of a card.
///
/// Only `Active` and `Blocked` are ever stored. `Expired` is reported by
/// [`Card::effective_status`] once the expiry date has passed.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Active,
    Blocked,
    Expired,
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardStatus::Active => f.write_str("active"),
            CardStatus::Blocked => f.write_str("blocked"),
            CardStatus::Expired => f.write_str("expired"),
        }
    }
}

/// A payment card and its balance.
///
/// Every operation leaves `self` untouched and either returns the updated
/// card or the reason it was rejected. Callers persist the returned value.
/// Deserialized records go through the same invariants as issued cards.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(try_from = "CardRecord")]
pub struct Card {
    id: Uuid,
    card_number: CardNumber,
    card_holder_name: String,
    expiry_date: DateTime<Utc>,
    cvv: Cvv,
    balance: Balance,
    credit_limit: Decimal,
    card_type: CardType,
    status: CardStatus,
    account_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Wire shape of a stored card, checked before it becomes a [`Card`].
#[derive(Deserialize)]
struct CardRecord {
    id: Uuid,
    card_number: CardNumber,
    card_holder_name: String,
    expiry_date: DateTime<Utc>,
    cvv: Cvv,
    balance: Balance,
    credit_limit: Decimal,
    card_type: CardType,
    status: CardStatus,
    account_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CardRecord> for Card {
    type Error = CardError;

    fn try_from(record: CardRecord) -> Result<Self> {
        validate_holder_name(&record.card_holder_name)?;

        if record.status == CardStatus::Expired {
            return Err(CardError::InvalidArgument(
                "Stored card status cannot be expired".to_string(),
            ));
        }
        if !record
            .card_number
            .as_str()
            .starts_with(record.card_type.network_prefix())
        {
            return Err(CardError::InvalidArgument(format!(
                "Card number is not on the {} network",
                record.card_type
            )));
        }

        let floor = match record.card_type {
            CardType::Debit if record.credit_limit != Decimal::ZERO => {
                return Err(CardError::InvalidArgument(
                    "Debit cards cannot carry a credit limit".to_string(),
                ));
            }
            CardType::Debit => Balance::ZERO,
            CardType::Credit if record.credit_limit <= Decimal::ZERO => {
                return Err(CardError::InvalidArgument(
                    "Credit limit must be greater than 0 for credit cards".to_string(),
                ));
            }
            CardType::Credit => -Balance::new(record.credit_limit),
        };
        if record.balance < floor {
            return Err(CardError::InvalidArgument(
                "Stored balance is below the card's floor".to_string(),
            ));
        }

        Ok(Self {
            id: record.id,
            card_number: record.card_number,
            card_holder_name: record.card_holder_name,
            expiry_date: record.expiry_date,
            cvv: record.cvv,
            balance: record.balance,
            credit_limit: record.credit_limit,
            card_type: record.card_type,
            status: record.status,
            account_id: record.account_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

fn validate_holder_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CardError::InvalidArgument(
            "Card holder name cannot be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_HOLDER_NAME_LENGTH {
        return Err(CardError::InvalidArgument(format!(
            "Card holder name must not exceed {MAX_HOLDER_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

impl Card {
    /// Issues a new active card with a zero balance, valid for five years.
    ///
    /// `credit_limit` is required and must be positive for credit cards; it is
    /// ignored for debit cards.
    pub fn new<R: Rng + ?Sized>(
        card_holder_name: &str,
        card_type: CardType,
        account_id: Uuid,
        credit_limit: Option<Decimal>,
        clock: &dyn Clock,
        rng: &mut R,
    ) -> Result<Self> {
        validate_holder_name(card_holder_name)?;

        let credit_limit = match card_type {
            CardType::Credit => match credit_limit {
                Some(limit) if limit > Decimal::ZERO => limit,
                _ => {
                    return Err(CardError::InvalidArgument(
                        "Credit limit must be greater than 0 for credit cards".to_string(),
                    ));
                }
            },
            CardType::Debit => Decimal::ZERO,
        };

        let now = clock.now();
        let expiry_date = now
            .checked_add_months(Months::new(VALIDITY_MONTHS))
            .ok_or_else(|| {
                CardError::InvalidArgument("Expiry date is out of range".to_string())
            })?;

        let mut id_bytes = [0u8; 16];
        rng.fill(&mut id_bytes);

        Ok(Self {
            id: uuid::Builder::from_random_bytes(id_bytes).into_uuid(),
            card_number: CardNumber::generate(card_type, rng),
            card_holder_name: card_holder_name.to_string(),
            expiry_date,
            cvv: Cvv::generate(rng),
            balance: Balance::ZERO,
            credit_limit,
            card_type,
            status: CardStatus::Active,
            account_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn card_number(&self) -> &CardNumber {
        &self.card_number
    }

    pub fn card_holder_name(&self) -> &str {
        &self.card_holder_name
    }

    pub fn expiry_date(&self) -> DateTime<Utc> {
        self.expiry_date
    }

    pub fn cvv(&self) -> &Cvv {
        &self.cvv
    }

    pub fn balance(&self) -> Balance {
        self.balance
    }

    pub fn credit_limit(&self) -> Decimal {
        self.credit_limit
    }

    pub fn card_type(&self) -> CardType {
        self.card_type
    }

    /// The stored status, which is never `Expired`.
    pub fn status(&self) -> CardStatus {
        self.status
    }

    pub fn account_id(&self) -> Uuid {
        self.account_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_expired(&self, clock: &dyn Clock) -> bool {
        self.is_expired_at(clock.now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry_date
    }

    pub fn effective_status(&self, clock: &dyn Clock) -> CardStatus {
        if self.is_expired(clock) {
            CardStatus::Expired
        } else {
            self.status
        }
    }

    pub fn has_sufficient_funds(&self, amount: Decimal) -> bool {
        match self.card_type {
            CardType::Debit => self.balance.value() >= amount,
            // An unrepresentable sum exceeds every amount.
            CardType::Credit => self
                .balance
                .value()
                .checked_add(self.credit_limit)
                .is_none_or(|available| available >= amount),
        }
    }

    /// Funds that can still be withdrawn, saturating at `Decimal::MAX`.
    pub fn available_funds(&self) -> Decimal {
        match self.card_type {
            CardType::Debit => self.balance.value(),
            CardType::Credit => self.balance.value().saturating_add(self.credit_limit),
        }
    }

    /// Credits `amount` to the card.
    pub fn update_balance(&self, amount: Decimal, clock: &dyn Clock) -> Result<Self> {
        let now = clock.now();
        self.validate_card_operation(now)?;
        let amount = Amount::new(amount)?;

        let balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| CardError::InvalidArgument("Amount out of range".to_string()))?;
        // Unreachable for a positive amount unless the stored balance is
        // already below the floor.
        if self.card_type == CardType::Credit && balance < -Balance::new(self.credit_limit) {
            return Err(CardError::CreditLimitExceeded);
        }

        Ok(Self {
            balance,
            updated_at: now,
            ..self.clone()
        })
    }

    pub fn withdraw(&self, amount: Decimal, clock: &dyn Clock) -> Result<Self> {
        let now = clock.now();
        self.validate_card_operation(now)?;
        let amount = Amount::new(amount)?;

        if !self.has_sufficient_funds(amount.value()) {
            return Err(CardError::InsufficientFunds);
        }

        let balance = self
            .balance
            .checked_sub(amount)
            .ok_or_else(|| CardError::InvalidArgument("Amount out of range".to_string()))?;

        Ok(Self {
            balance,
            updated_at: now,
            ..self.clone()
        })
    }

    /// Blocks the card. Expired cards may still be blocked.
    pub fn block(&self, clock: &dyn Clock) -> Result<Self> {
        if self.status == CardStatus::Blocked {
            return Err(CardError::InvalidState(
                "Card is already blocked".to_string(),
            ));
        }

        Ok(Self {
            status: CardStatus::Blocked,
            updated_at: clock.now(),
            ..self.clone()
        })
    }

    /// Reactivates a blocked card. An expired card can never be reactivated.
    pub fn unblock(&self, clock: &dyn Clock) -> Result<Self> {
        let now = clock.now();
        if self.is_expired_at(now) {
            return Err(CardError::Expired);
        }
        if self.status == CardStatus::Active {
            return Err(CardError::InvalidState(
                "Card is already active".to_string(),
            ));
        }

        Ok(Self {
            status: CardStatus::Active,
            updated_at: now,
            ..self.clone()
        })
    }

    fn validate_card_operation(&self, now: DateTime<Utc>) -> Result<()> {
        if self.status != CardStatus::Active {
            return Err(CardError::InvalidState(format!("Card is {}", self.status)));
        }
        if self.is_expired_at(now) {
            return Err(CardError::Expired);
        }
        Ok(())
    }
}
