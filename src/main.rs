use banking_cards::application::batch::BatchProcessor;
use banking_cards::application::service::CardService;
use banking_cards::domain::clock::{Clock, SystemClock};
use banking_cards::domain::ports::CardStoreBox;
use banking_cards::infrastructure::in_memory::InMemoryCardStore;
use banking_cards::interfaces::csv::card_writer::CardWriter;
use banking_cards::interfaces::csv::operation_reader::OperationReader;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input card operations CSV file
    input: PathBuf,

    /// Seed for card numbers, CVVs and ids. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[cfg(feature = "storage-rocksdb")]
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(cli: &Cli) -> Result<CardStoreBox> {
    use banking_cards::infrastructure::rocksdb::RocksDBStore;

    match &cli.db_path {
        Some(db_path) => Ok(Box::new(RocksDBStore::open(db_path).into_diagnostic()?)),
        None => Ok(Box::new(InMemoryCardStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(_cli: &Cli) -> Result<CardStoreBox> {
    Ok(Box::new(InMemoryCardStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let rng = match cli.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let service = CardService::with_dependencies(open_store(&cli)?, clock.clone(), rng);
    let processor = BatchProcessor::new(service);

    // Process operations
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = OperationReader::new(file);
    for (row, operation) in reader.operations().enumerate() {
        match operation {
            Ok(operation) => {
                let reference = operation.card;
                if let Err(e) = processor.process(operation).await {
                    tracing::warn!(row = row + 1, card = reference, "Rejected operation: {e}");
                }
            }
            Err(e) => {
                tracing::warn!(row = row + 1, "Error reading operation: {e}");
            }
        }
    }

    let cards = processor.into_results().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = CardWriter::new(stdout.lock(), clock.as_ref());
    writer.write_cards(cards).into_diagnostic()?;

    Ok(())
}
