use clap::Parser;
use miette::{IntoDiagnostic, Result};
use orderpay::application::engine::OrderEngine;
use orderpay::config::EngineConfig;
use orderpay::domain::identity::AccountId;
use orderpay::domain::ports::{PaymentProcessorBox, Stores};
use orderpay::infrastructure::in_memory::in_memory_stores;
use orderpay::infrastructure::processor::SimulatedProcessor;
#[cfg(feature = "storage-rocksdb")]
use orderpay::infrastructure::rocksdb::RocksDBStore;
use orderpay::interfaces::csv::seed_reader::SeedReader;
use orderpay::interfaces::csv::wallet_writer::WalletWriter;
use orderpay::interfaces::jsonl::order_writer::OrderWriter;
use orderpay::interfaces::jsonl::request::RequestReader;
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input requests, one JSON object per line
    requests: PathBuf,

    /// Catalog CSV (`id,name,price,quantity`) upserted before processing
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Wallet CSV (`owner,balance`) credited before processing
    #[arg(long)]
    wallets: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Write every order as JSON lines to this file after processing
    #[arg(long)]
    orders_out: Option<PathBuf>,

    /// Account credited by wallet payments
    #[arg(long, env = "ORDERPAY_STORE_ACCOUNT", default_value = "store")]
    store_account: String,

    /// Currency sent to the card processor
    #[arg(long, env = "ORDERPAY_CURRENCY", default_value = "usd")]
    currency: String,

    /// Upper bound on a single card-processor call, in milliseconds
    #[arg(long, env = "ORDERPAY_PROCESSOR_TIMEOUT_MS", default_value_t = 10_000)]
    processor_timeout_ms: u64,

    /// Stripe secret key. Without it charges go to the offline simulator.
    #[cfg(feature = "processor-stripe")]
    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
    stripe_secret_key: Option<String>,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            store_account: AccountId::from(self.store_account.as_str()),
            currency: self.currency.clone(),
            processor_timeout: Duration::from_millis(self.processor_timeout_ms),
            ..EngineConfig::default()
        }
    }

    #[cfg(feature = "processor-stripe")]
    fn processor(&self) -> PaymentProcessorBox {
        use orderpay::infrastructure::stripe::StripeProcessor;
        use secrecy::SecretString;
        match &self.stripe_secret_key {
            Some(key) => Box::new(StripeProcessor::new(SecretString::from(key.clone()))),
            None => Box::new(SimulatedProcessor::new()),
        }
    }

    #[cfg(not(feature = "processor-stripe"))]
    fn processor(&self) -> PaymentProcessorBox {
        Box::new(SimulatedProcessor::new())
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok(store.stores())
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(in_memory_stores())
        }
        None => Ok(in_memory_stores()),
    }
}

async fn seed(stores: &Stores, cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.catalog {
        let file = File::open(path).into_diagnostic()?;
        for product in SeedReader::new(file).products() {
            match product {
                Ok(product) => stores.products.store(product).await.into_diagnostic()?,
                Err(e) => warn!(error = %e, "skipping catalog row"),
            }
        }
    }
    if let Some(path) = &cli.wallets {
        let file = File::open(path).into_diagnostic()?;
        for wallet in SeedReader::new(file).wallets() {
            match wallet {
                Ok(wallet) => {
                    stores
                        .accounts
                        .credit(&wallet.owner, wallet.balance)
                        .await
                        .into_diagnostic()?;
                }
                Err(e) => warn!(error = %e, "skipping wallet row"),
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let stores = open_stores(cli.db_path.clone())?;
    seed(&stores, &cli).await?;
    let engine = OrderEngine::new(stores, cli.processor(), cli.engine_config());

    // Process requests
    let file = File::open(&cli.requests).into_diagnostic()?;
    for (line, request) in RequestReader::new(BufReader::new(file)).requests() {
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                error!(line, error = %e, "unreadable request");
                continue;
            }
        };
        let requester = request.requester().account.clone();
        match request.execute(&engine).await {
            Ok(response) => {
                let response = serde_json::to_string(&response).into_diagnostic()?;
                info!(line, %requester, %response, "request completed");
            }
            Err(e) => error!(line, %requester, error = %e, "request failed"),
        }
    }

    if let Some(path) = &cli.orders_out {
        let orders = engine.stores().orders.get_all().await.into_diagnostic()?;
        let file = File::create(path).into_diagnostic()?;
        OrderWriter::new(io::BufWriter::new(file))
            .write_orders(&orders)
            .into_diagnostic()?;
    }

    // Output final state
    let wallets = engine.stores().accounts.get_all().await.into_diagnostic()?;
    let stdout = io::stdout();
    WalletWriter::new(stdout.lock())
        .write_wallets(wallets)
        .into_diagnostic()?;

    Ok(())
}
