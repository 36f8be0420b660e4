//! Wellcart CLI - migrations, catalog and payment management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! wellcart migrate
//!
//! # Manage the catalog
//! wellcart product create --name "Vitamin C" --price 12.50 --category SP
//! wellcart product list
//!
//! # Manage payments
//! wellcart payment start --cart-code 3f0c... --username ada
//! wellcart payment complete <REF>
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `product` - Create and list catalog products
//! - `payment` - Start and resolve cart payments

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};

use wellcart_core::{Category, Price, TransactionStatus};

mod commands;

use commands::product::CreateArgs;

#[derive(Parser)]
#[command(name = "wellcart")]
#[command(author, version, about = "Wellcart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage catalog products
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage cart payments
    Payment {
        #[command(subcommand)]
        action: PaymentAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Create a new product
    Create(ProductCreate),
    /// List all products
    List,
}

#[derive(Args)]
struct ProductCreate {
    /// Product name
    #[arg(short, long)]
    name: String,

    /// Unit price, e.g. 12.50
    #[arg(short, long)]
    price: Price,

    /// Category code (SP, SC, HB, ETC)
    #[arg(short, long)]
    category: Option<Category>,

    /// Long description
    #[arg(short, long)]
    description: Option<String>,

    /// Image path
    #[arg(short, long)]
    image: Option<String>,

    /// Explicit slug (derived from the name when omitted)
    #[arg(short, long)]
    slug: Option<String>,
}

#[derive(Subcommand)]
enum PaymentAction {
    /// Start a pending payment for a cart
    Start {
        /// Cart code chosen by the client
        #[arg(short, long)]
        cart_code: String,

        /// Username of the paying customer
        #[arg(short, long)]
        username: String,

        /// Currency code (default: NGN)
        #[arg(long)]
        currency: Option<String>,
    },
    /// Mark a payment completed and its cart paid
    Complete {
        /// Transaction reference
        reference: String,
    },
    /// Mark a payment failed
    Fail {
        /// Transaction reference
        reference: String,
    },
    /// Mark a payment cancelled
    Cancel {
        /// Transaction reference
        reference: String,
    },
}

impl From<ProductCreate> for CreateArgs {
    fn from(args: ProductCreate) -> Self {
        Self {
            name: args.name,
            price: args.price,
            category: args.category,
            description: args.description,
            image: args.image,
            slug: args.slug,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Product { action } => match action {
            ProductAction::Create(args) => commands::product::create(args.into()).await?,
            ProductAction::List => commands::product::list().await?,
        },
        Commands::Payment { action } => match action {
            PaymentAction::Start {
                cart_code,
                username,
                currency,
            } => commands::payment::start(&cart_code, &username, currency.as_deref()).await?,
            PaymentAction::Complete { reference } => {
                commands::payment::resolve(&reference, TransactionStatus::Completed).await?;
            }
            PaymentAction::Fail { reference } => {
                commands::payment::resolve(&reference, TransactionStatus::Failed).await?;
            }
            PaymentAction::Cancel { reference } => {
                commands::payment::resolve(&reference, TransactionStatus::Cancelled).await?;
            }
        },
    }
    Ok(())
}
