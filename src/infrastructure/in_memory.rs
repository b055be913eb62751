use crate::domain::card::Card;
use crate::domain::number::CardNumber;
use crate::domain::ports::CardStore;
use crate::error::{CardError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    cards: HashMap<Uuid, Card>,
    numbers: HashMap<CardNumber, Uuid>,
}

/// A thread-safe in-memory store for issued cards.
///
/// Both the card table and the card-number index sit behind one lock so an
/// insert and its index entry are always visible together.
#[derive(Default, Clone)]
pub struct InMemoryCardStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryCardStore {
    /// Creates a new, empty in-memory card store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CardStore for InMemoryCardStore {
    async fn store(&self, card: Card) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(owner) = tables.numbers.get(card.card_number())
            && *owner != card.id()
        {
            return Err(CardError::DuplicateCardNumber(card.card_number().masked()));
        }

        tables.numbers.insert(card.card_number().clone(), card.id());
        tables.cards.insert(card.id(), card);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Card>> {
        let tables = self.tables.read().await;
        Ok(tables.cards.get(&id).cloned())
    }

    async fn find_by_number(&self, number: &CardNumber) -> Result<Option<Card>> {
        let tables = self.tables.read().await;
        Ok(tables
            .numbers
            .get(number)
            .and_then(|id| tables.cards.get(id))
            .cloned())
    }

    async fn get_by_account(&self, account_id: Uuid) -> Result<Vec<Card>> {
        let tables = self.tables.read().await;
        Ok(tables
            .cards
            .values()
            .filter(|card| card.account_id() == account_id)
            .cloned()
            .collect())
    }

    async fn get_all(&self) -> Result<Vec<Card>> {
        let tables = self.tables.read().await;
        Ok(tables.cards.values().cloned().collect())
    }
}
