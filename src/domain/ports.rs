use super::card::Card;
use super::number::CardNumber;
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Persistence for issued cards.
///
/// Implementations keep a unique index on the card number: storing a card
/// whose number already belongs to a different card id fails with
/// `CardError::DuplicateCardNumber` and leaves the store unchanged.
#[async_trait]
pub trait CardStore: Send + Sync {
    async fn store(&self, card: Card) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Card>>;
    async fn find_by_number(&self, number: &CardNumber) -> Result<Option<Card>>;
    async fn get_by_account(&self, account_id: Uuid) -> Result<Vec<Card>>;
    async fn get_all(&self) -> Result<Vec<Card>>;
}

pub type CardStoreBox = Box<dyn CardStore>;
