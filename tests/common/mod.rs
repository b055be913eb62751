#![allow(dead_code)]

use banking_cards::application::service::{CardService, IssueCard};
use banking_cards::domain::card::CardType;
use banking_cards::domain::clock::FixedClock;
use banking_cards::infrastructure::in_memory::InMemoryCardStore;
use chrono::{TimeZone, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

pub const HEADER: [&str; 7] = ["op", "card", "holder", "type", "account", "limit", "amount"];
pub const ACCOUNT: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

pub fn issued_at() -> FixedClock {
    FixedClock::new(Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap())
}

pub fn service(seed: u64) -> CardService {
    CardService::with_dependencies(
        Box::new(InMemoryCardStore::new()),
        Arc::new(issued_at()),
        ChaCha8Rng::seed_from_u64(seed),
    )
}

pub fn issue_request(card_type: CardType, credit_limit: Option<Decimal>) -> IssueCard {
    IssueCard {
        card_holder_name: "Jane Doe".to_string(),
        card_type,
        account_id: Uuid::parse_str(ACCOUNT).unwrap(),
        credit_limit,
    }
}

/// Writes an operations CSV with the standard header followed by `rows`.
pub fn write_operations(path: &Path, rows: &[&[&str]]) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    wtr.write_record(HEADER)?;
    for row in rows {
        wtr.write_record(*row)?;
    }
    wtr.flush()?;
    Ok(())
}
