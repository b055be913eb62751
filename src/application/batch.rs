use super::service::{CardService, IssueCard};
use crate::domain::card::Card;
use crate::domain::operation::{Operation, OperationType};
use crate::error::{CardError, Result};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Applies batch rows to a [`CardService`], resolving each row's card
/// reference to the card issued for it earlier in the same batch.
pub struct BatchProcessor {
    service: CardService,
    references: RwLock<BTreeMap<u32, Uuid>>,
}

impl BatchProcessor {
    pub fn new(service: CardService) -> Self {
        Self {
            service,
            references: RwLock::new(BTreeMap::new()),
        }
    }

    /// Applies a single operation.
    ///
    /// A rejected operation changes nothing; later rows are unaffected.
    pub async fn process(&self, operation: Operation) -> Result<Card> {
        match operation.op {
            OperationType::Issue => self.issue(operation).await,
            OperationType::Deposit => {
                let id = self.resolve(operation.card).await?;
                let amount = required_amount(&operation)?;
                self.service.deposit(id, amount).await
            }
            OperationType::Withdraw => {
                let id = self.resolve(operation.card).await?;
                let amount = required_amount(&operation)?;
                self.service.withdraw(id, amount).await
            }
            OperationType::Block => {
                let id = self.resolve(operation.card).await?;
                self.service.block(id).await
            }
            OperationType::Unblock => {
                let id = self.resolve(operation.card).await?;
                self.service.unblock(id).await
            }
        }
    }

    /// Consumes the processor and returns every issued card with its
    /// reference, in reference order.
    pub async fn into_results(self) -> Result<Vec<(u32, Card)>> {
        let references = self.references.into_inner();
        let mut results = Vec::with_capacity(references.len());
        for (reference, id) in references {
            results.push((reference, self.service.get(id).await?));
        }
        Ok(results)
    }

    async fn issue(&self, operation: Operation) -> Result<Card> {
        let mut references = self.references.write().await;
        if references.contains_key(&operation.card) {
            return Err(CardError::InvalidArgument(format!(
                "Card reference {} is already issued",
                operation.card
            )));
        }

        let request = IssueCard {
            card_holder_name: operation.holder.unwrap_or_default(),
            card_type: operation.r#type.ok_or_else(|| missing("type"))?,
            account_id: operation.account.ok_or_else(|| missing("account"))?,
            credit_limit: operation.limit,
        };

        let card = self.service.issue_card(request).await?;
        references.insert(operation.card, card.id());
        Ok(card)
    }

    async fn resolve(&self, reference: u32) -> Result<Uuid> {
        self.references
            .read()
            .await
            .get(&reference)
            .copied()
            .ok_or(CardError::UnknownReference(reference))
    }
}

fn required_amount(operation: &Operation) -> Result<Decimal> {
    operation.amount.ok_or_else(|| missing("amount"))
}

fn missing(column: &str) -> CardError {
    CardError::InvalidArgument(format!("Missing {column} column"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::{CardStatus, CardType};
    use crate::domain::clock::FixedClock;
    use crate::domain::money::Balance;
    use crate::infrastructure::in_memory::InMemoryCardStore;
    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn processor() -> BatchProcessor {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap());
        BatchProcessor::new(CardService::with_dependencies(
            Box::new(InMemoryCardStore::new()),
            Arc::new(clock),
            ChaCha8Rng::seed_from_u64(9),
        ))
    }

    fn issue(card: u32, card_type: CardType, limit: Option<Decimal>) -> Operation {
        Operation {
            op: OperationType::Issue,
            card,
            holder: Some("Jane Doe".to_string()),
            r#type: Some(card_type),
            account: Some(Uuid::from_u128(1)),
            limit,
            amount: None,
        }
    }

    fn op(op: OperationType, card: u32, amount: Option<Decimal>) -> Operation {
        Operation {
            op,
            card,
            holder: None,
            r#type: None,
            account: None,
            limit: None,
            amount,
        }
    }

    #[tokio::test]
    async fn test_credit_card_scenario() {
        let processor = processor();
        processor
            .process(issue(1, CardType::Credit, Some(dec!(500))))
            .await
            .unwrap();

        let card = processor
            .process(op(OperationType::Withdraw, 1, Some(dec!(500))))
            .await
            .unwrap();
        assert_eq!(card.balance(), Balance::new(dec!(-500)));

        let result = processor
            .process(op(OperationType::Withdraw, 1, Some(dec!(1))))
            .await;
        assert!(matches!(result, Err(CardError::InsufficientFunds)));

        let results = processor.into_results().await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].1.balance(), Balance::new(dec!(-500)));
    }

    #[tokio::test]
    async fn test_blocked_card_scenario() {
        let processor = processor();
        processor.process(issue(1, CardType::Debit, None)).await.unwrap();
        processor.process(op(OperationType::Block, 1, None)).await.unwrap();

        let result = processor
            .process(op(OperationType::Deposit, 1, Some(dec!(10))))
            .await;
        assert!(matches!(result, Err(CardError::InvalidState(_))));

        let results = processor.into_results().await.unwrap();
        assert_eq!(results[0].1.balance(), Balance::ZERO);
        assert_eq!(results[0].1.status(), CardStatus::Blocked);
    }

    #[tokio::test]
    async fn test_reference_errors() {
        let processor = processor();
        let result = processor.process(op(OperationType::Block, 3, None)).await;
        assert!(matches!(result, Err(CardError::UnknownReference(3))));

        processor.process(issue(3, CardType::Debit, None)).await.unwrap();
        let result = processor.process(issue(3, CardType::Debit, None)).await;
        assert!(matches!(result, Err(CardError::InvalidArgument(_))));

        let result = processor.process(op(OperationType::Deposit, 3, None)).await;
        assert!(matches!(result, Err(CardError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_issue_requires_type_and_account() {
        let processor = processor();
        let mut operation = issue(1, CardType::Debit, None);
        operation.r#type = None;
        assert!(matches!(
            processor.process(operation).await,
            Err(CardError::InvalidArgument(_))
        ));

        let mut operation = issue(1, CardType::Debit, None);
        operation.holder = None;
        assert!(matches!(
            processor.process(operation).await,
            Err(CardError::InvalidArgument(_))
        ));

        assert!(processor.into_results().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_results_sorted_by_reference() {
        let processor = processor();
        for reference in [5, 2, 9] {
            processor
                .process(issue(reference, CardType::Debit, None))
                .await
                .unwrap();
        }

        let references: Vec<u32> = processor
            .into_results()
            .await
            .unwrap()
            .into_iter()
            .map(|(reference, _)| reference)
            .collect();
        assert_eq!(references, vec![2, 5, 9]);
    }
}
