use crate::domain::card::Card;
use crate::domain::number::CardNumber;
use crate::domain::ports::CardStore;
use crate::error::{CardError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Column Family for storing card records as JSON, keyed by card id.
pub const CF_CARDS: &str = "cards";
/// Column Family mapping card numbers to the id of the card that owns them.
pub const CF_CARD_NUMBERS: &str = "card_numbers";

/// A persistent card store backed by RocksDB.
///
/// `Clone` shares the underlying `Arc<DB>`. Writes go through a single lock so
/// the duplicate-number check and the batch that follows it cannot interleave.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_cards = ColumnFamilyDescriptor::new(CF_CARDS, Options::default());
        let cf_numbers = ColumnFamilyDescriptor::new(CF_CARD_NUMBERS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_cards, cf_numbers])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            CardError::IoError(std::io::Error::other(format!(
                "{name} column family not found"
            )))
        })
    }

    fn owner_of(&self, number: &CardNumber) -> Result<Option<Uuid>> {
        let cf = self.cf(CF_CARD_NUMBERS)?;
        match self.db.get_pinned_cf(cf, number.as_str())? {
            Some(bytes) => {
                let id = Uuid::from_slice(&bytes).map_err(|e| {
                    CardError::IoError(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("Corrupt card number index: {e}"),
                    ))
                })?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CardStore for RocksDBStore {
    async fn store(&self, card: Card) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        if let Some(owner) = self.owner_of(card.card_number())?
            && owner != card.id()
        {
            return Err(CardError::DuplicateCardNumber(card.card_number().masked()));
        }

        let value = serde_json::to_vec(&card)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_CARDS)?, card.id().as_bytes(), value);
        batch.put_cf(
            self.cf(CF_CARD_NUMBERS)?,
            card.card_number().as_str(),
            card.id().as_bytes(),
        );
        self.db.write(batch)?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Card>> {
        let cf = self.cf(CF_CARDS)?;
        match self.db.get_pinned_cf(cf, id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn find_by_number(&self, number: &CardNumber) -> Result<Option<Card>> {
        match self.owner_of(number)? {
            Some(id) => self.get(id).await,
            None => Ok(None),
        }
    }

    async fn get_by_account(&self, account_id: Uuid) -> Result<Vec<Card>> {
        let cards = self.get_all().await?;
        Ok(cards
            .into_iter()
            .filter(|card| card.account_id() == account_id)
            .collect())
    }

    async fn get_all(&self) -> Result<Vec<Card>> {
        let cf = self.cf(CF_CARDS)?;

        let mut cards = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            cards.push(serde_json::from_slice(&value)?);
        }

        Ok(cards)
    }
}
