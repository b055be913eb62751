mod common;

use banking_cards::domain::card::{Card, CardType};
use banking_cards::domain::clock::FixedClock;
use banking_cards::domain::money::Balance;
use banking_cards::domain::number::{CardNumber, luhn_check_digit};
use chrono::Duration;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone)]
enum Step {
    Deposit(Decimal),
    Withdraw(Decimal),
    Block,
    Unblock,
}

fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

/// Non-negative decimals spanning the full 96-bit mantissa.
fn large(min_hi: u32, max_scale: u32) -> impl Strategy<Value = Decimal> {
    (any::<u32>(), any::<u32>(), min_hi..=u32::MAX, 0..=max_scale)
        .prop_map(|(lo, mid, hi, scale)| Decimal::from_parts(lo, mid, hi, false, scale))
}

/// Everyday amounts in cents, including zero and negatives, mixed with
/// values up to `Decimal::MAX`.
fn amount() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        6 => (-500i64..100_000).prop_map(cents),
        3 => large(0, 28),
        1 => Just(Decimal::MAX),
    ]
}

fn credit_limit() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        6 => (1i64..1_000_000).prop_map(cents),
        3 => large(1, 4),
        1 => Just(Decimal::MAX),
    ]
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => amount().prop_map(Step::Deposit),
        4 => amount().prop_map(Step::Withdraw),
        1 => Just(Step::Block),
        1 => Just(Step::Unblock),
    ]
}

fn apply(card: &Card, step: &Step, clock: &FixedClock) -> Option<Card> {
    match step {
        Step::Deposit(amount) => card.update_balance(*amount, clock),
        Step::Withdraw(amount) => card.withdraw(*amount, clock),
        Step::Block => card.block(clock),
        Step::Unblock => card.unblock(clock),
    }
    .ok()
}

fn new_card(seed: u64, card_type: CardType, limit: Option<Decimal>) -> Card {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Card::new("Prop Holder", card_type, Uuid::nil(), limit, &common::issued_at(), &mut rng)
        .unwrap()
}

proptest! {
    #[test]
    fn generated_numbers_pass_checksum(seed in any::<u64>(), credit in any::<bool>()) {
        let card_type = if credit { CardType::Credit } else { CardType::Debit };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let number = CardNumber::generate(card_type, &mut rng);

        let digits: Vec<u8> = number.as_str().bytes().map(|b| b - b'0').collect();
        prop_assert_eq!(digits.len(), 16);
        prop_assert_eq!(luhn_check_digit(&digits[..15]), digits[15]);
        prop_assert!(number.as_str().starts_with(card_type.network_prefix()));
        prop_assert!(CardNumber::parse(number.as_str()).is_ok());
    }

    #[test]
    fn debit_balance_never_negative(seed in any::<u64>(), steps in prop::collection::vec(step(), 0..60)) {
        let clock = common::issued_at();
        let mut card = new_card(seed, CardType::Debit, None);

        for step in &steps {
            if let Some(next) = apply(&card, step, &clock) {
                card = next;
            }
            prop_assert!(card.balance() >= Balance::ZERO);
        }
    }

    #[test]
    fn credit_balance_never_below_limit(
        seed in any::<u64>(),
        limit in credit_limit(),
        steps in prop::collection::vec(step(), 0..60),
    ) {
        let clock = common::issued_at();
        let mut card = new_card(seed, CardType::Credit, Some(limit));

        for step in &steps {
            if let Some(next) = apply(&card, step, &clock) {
                card = next;
            }
            prop_assert!(card.balance() >= Balance::new(-limit));
            prop_assert!(card.available_funds() >= Decimal::ZERO);
        }
    }

    #[test]
    fn rejected_operations_leave_card_unchanged(
        seed in any::<u64>(),
        limit in credit_limit(),
        steps in prop::collection::vec(step(), 0..40),
        expired in any::<bool>(),
    ) {
        let issued = common::issued_at();
        let mut card = new_card(seed, CardType::Credit, Some(limit));
        let clock = if expired {
            FixedClock::new(card.expiry_date() + Duration::seconds(1))
        } else {
            FixedClock::new(issued.0 + Duration::hours(1))
        };

        for step in &steps {
            let before = card.clone();
            let snapshot = serde_json::to_string(&card).unwrap();
            match apply(&card, step, &clock) {
                Some(next) => {
                    prop_assert_eq!(next.updated_at(), clock.0);
                    card = next;
                }
                None => {
                    prop_assert_eq!(&card, &before);
                    prop_assert_eq!(serde_json::to_string(&card).unwrap(), snapshot);
                }
            }
        }
    }

    #[test]
    fn unblock_after_expiry_always_fails(seed in any::<u64>(), block_first in any::<bool>(), days in 1i64..3650) {
        let issued = common::issued_at();
        let mut card = new_card(seed, CardType::Debit, None);
        if block_first {
            card = card.block(&issued).unwrap();
        }

        let expired = FixedClock::new(card.expiry_date() + Duration::days(days));
        let result = card.unblock(&expired);
        prop_assert!(matches!(result, Err(banking_cards::error::CardError::Expired)));
    }
}
