use crate::domain::card::{Card, CardType};
use crate::domain::clock::Clock;
use crate::domain::ports::CardStoreBox;
use crate::error::{CardError, Result};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Input for issuing a new card.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueCard {
    pub card_holder_name: String,
    pub card_type: CardType,
    pub account_id: Uuid,
    pub credit_limit: Option<Decimal>,
}

/// Issues cards and applies balance and status changes to stored cards.
///
/// Each change loads the card, applies the domain operation and stores the
/// resulting copy. The whole sequence runs under one lock, so two changes to
/// the same card cannot interleave. A rejected change stores nothing.
pub struct CardService {
    store: CardStoreBox,
    clock: Arc<dyn Clock>,
    rng: Mutex<ChaCha8Rng>,
    writes: Mutex<()>,
}

impl CardService {
    /// Creates a service with an explicit clock and RNG. Seeding the RNG makes
    /// issued numbers, CVVs and ids reproducible.
    pub fn with_dependencies(store: CardStoreBox, clock: Arc<dyn Clock>, rng: ChaCha8Rng) -> Self {
        Self {
            store,
            clock,
            rng: Mutex::new(rng),
            writes: Mutex::new(()),
        }
    }

    pub async fn issue_card(&self, request: IssueCard) -> Result<Card> {
        let card = {
            let mut rng = self.rng.lock().await;
            Card::new(
                &request.card_holder_name,
                request.card_type,
                request.account_id,
                request.credit_limit,
                self.clock.as_ref(),
                &mut *rng,
            )
        }
        .inspect_err(|e| {
            tracing::debug!(account_id = %request.account_id, error = %e, "card issuance rejected")
        })?;

        let _guard = self.writes.lock().await;
        self.store.store(card.clone()).await?;

        tracing::info!(
            card_id = %card.id(),
            account_id = %card.account_id(),
            card_type = %card.card_type(),
            number = %card.card_number().masked(),
            "card issued"
        );
        Ok(card)
    }

    /// Credits `amount` to the card.
    pub async fn deposit(&self, id: Uuid, amount: Decimal) -> Result<Card> {
        self.apply(id, "deposit", |card, clock| card.update_balance(amount, clock))
            .await
    }

    pub async fn withdraw(&self, id: Uuid, amount: Decimal) -> Result<Card> {
        self.apply(id, "withdraw", |card, clock| card.withdraw(amount, clock))
            .await
    }

    pub async fn block(&self, id: Uuid) -> Result<Card> {
        self.apply(id, "block", |card, clock| card.block(clock)).await
    }

    pub async fn unblock(&self, id: Uuid) -> Result<Card> {
        self.apply(id, "unblock", |card, clock| card.unblock(clock))
            .await
    }

    pub async fn get(&self, id: Uuid) -> Result<Card> {
        self.store.get(id).await?.ok_or(CardError::NotFound(id))
    }

    pub async fn cards_for_account(&self, account_id: Uuid) -> Result<Vec<Card>> {
        self.store.get_by_account(account_id).await
    }

    pub async fn all_cards(&self) -> Result<Vec<Card>> {
        self.store.get_all().await
    }

    async fn apply<F>(&self, id: Uuid, operation: &'static str, change: F) -> Result<Card>
    where
        F: FnOnce(&Card, &dyn Clock) -> Result<Card> + Send,
    {
        let _guard = self.writes.lock().await;

        let card = self.get(id).await?;
        let updated = change(&card, self.clock.as_ref()).inspect_err(|e| {
            tracing::debug!(card_id = %id, operation, error = %e, "card operation rejected")
        })?;

        self.store.store(updated.clone()).await?;

        tracing::info!(
            card_id = %id,
            operation,
            number = %updated.card_number().masked(),
            status = %updated.status(),
            balance = %updated.balance(),
            "card updated"
        );
        Ok(updated)
    }
}
