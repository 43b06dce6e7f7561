//! Book Kart CLI - browse, buy and sell second-hand books from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in; the session is kept in BOOK_KART_STATE_PATH
//! bk-cli login -e asha@example.com
//!
//! # Browse and buy
//! bk-cli books list
//! bk-cli cart add 665f1c2e9b
//! bk-cli checkout --address 6660aa01f3
//!
//! # Admin dashboard
//! bk-cli admin orders --status shipped --page 2
//! ```
//!
//! # Environment Variables
//!
//! - `BOOK_KART_API_URL` - Backend base URL (default `http://localhost:8000/api`)
//! - `BOOK_KART_STATE_PATH` - Where the signed-in session is persisted
//! - `BOOK_KART_PASSWORD` - Password for `login` and `register` when not prompted
//! - `SENTRY_DSN` - Optional error tracking
//! - `RUST_LOG` - Log filter (default `info` for the Book Kart crates)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use book_kart_storefront::{
    ApiClient, ClientConfig, FileStorage, NotificationLevel, Persistor, Store, Storefront,
};
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::admin::AdminAction;
use commands::orders::AddressAction;
use commands::shop::{BookAction, CartAction, WishlistAction};

#[derive(Parser)]
#[command(name = "bk-cli")]
#[command(author, version, about = "Book Kart marketplace client")]
struct Cli {
    /// Override where the signed-in session is stored
    #[arg(long, global = true)]
    state_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(long, env = "BOOK_KART_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Print the URL that starts Google sign-in
    GoogleLogin,
    /// Create an account
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(long, env = "BOOK_KART_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Confirm an email address with the token from the verification mail
    VerifyEmail { token: String },
    /// Request a password reset mail
    ForgotPassword {
        #[arg(short, long)]
        email: String,
    },
    /// Set a new password with the token from the reset mail
    ResetPassword {
        token: String,
        #[arg(long, env = "BOOK_KART_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the signed-in account, checking the session with the backend
    Whoami,
    /// Sign out and forget the session
    Logout,
    /// Update the signed-in account's profile
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Hide contact details from buyers
        #[arg(long)]
        private: Option<bool>,
    },
    /// Browse and manage listings
    Books {
        #[command(subcommand)]
        action: BookAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// List orders, or show one
    Orders {
        /// Order to show in full
        id: Option<String>,
    },
    /// Place an order for the whole cart
    Checkout {
        /// Saved address to ship to
        #[arg(long)]
        address: String,
    },
    /// Record a completed gateway payment against an order
    ConfirmPayment {
        order_id: String,
        #[arg(long)]
        razorpay_order_id: String,
        #[arg(long)]
        razorpay_payment_id: String,
        #[arg(long)]
        razorpay_signature: String,
    },
    /// Manage shipping addresses
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Admin dashboard
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

impl Commands {
    /// Whether a restored session is confirmed with the backend first.
    /// Commands that start a new session, and `whoami` which checks it
    /// itself, skip that.
    const fn resumes_session(&self) -> bool {
        !matches!(
            self,
            Self::Login { .. }
                | Self::GoogleLogin
                | Self::Register { .. }
                | Self::Whoami
                | Self::Admin {
                    action: AdminAction::Login { .. }
                }
        )
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };
    if let Some(path) = cli.state_path.clone() {
        config.state_path = path;
    }

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays pipeable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "book_kart_cli=info,book_kart_storefront=info,book_kart_admin=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = ApiClient::new(config)?;
    let shop = Storefront::new(client, Store::new());
    shop.rehydrate(Persistor::open(FileStorage::new(config.state_path.clone())));
    if cli.command.resumes_session() {
        // A failed check keeps the restored session; the toast says why
        if let Err(e) = shop.resume().await {
            tracing::warn!("Session check failed: {e}");
        }
    } else {
        shop.store().wait_rehydrated().await;
    }

    let result = dispatch(&shop, cli.command).await;
    print_notifications(&shop);
    result
}

async fn dispatch(shop: &Storefront, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Login { email, password } => {
            commands::account::login(shop, email, password).await?;
        }
        Commands::GoogleLogin => commands::account::google_login(shop)?,
        Commands::Register {
            name,
            email,
            password,
        } => commands::account::register(shop, name, email, password).await?,
        Commands::VerifyEmail { token } => commands::account::verify_email(shop, &token).await?,
        Commands::ForgotPassword { email } => {
            commands::account::forgot_password(shop, email).await?;
        }
        Commands::ResetPassword { token, password } => {
            commands::account::reset_password(shop, token, password).await?;
        }
        Commands::Whoami => commands::account::whoami(shop).await?,
        Commands::Logout => shop.logout().await?,
        Commands::Profile {
            name,
            phone,
            private,
        } => commands::account::update_profile(shop, name, phone, private).await?,
        Commands::Books { action } => commands::shop::books(shop, action).await?,
        Commands::Cart { action } => commands::shop::cart(shop, action).await?,
        Commands::Wishlist { action } => commands::shop::wishlist(shop, action).await?,
        Commands::Orders { id } => commands::orders::orders(shop, id).await?,
        Commands::Checkout { address } => commands::orders::checkout(shop, &address).await?,
        Commands::ConfirmPayment {
            order_id,
            razorpay_order_id,
            razorpay_payment_id,
            razorpay_signature,
        } => {
            commands::orders::confirm_payment(
                shop,
                order_id,
                razorpay_order_id,
                razorpay_payment_id,
                razorpay_signature,
            )
            .await?;
        }
        Commands::Address { action } => commands::orders::address(shop, action).await?,
        Commands::Admin { action } => commands::admin::run(shop, action).await?,
    }
    Ok(())
}

#[allow(clippy::print_stderr)]
fn print_notifications(shop: &Storefront) {
    for notification in shop.toaster().drain() {
        let marker = match notification.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Info => "info",
            NotificationLevel::Error => "error",
        };
        eprintln!("[{marker}] {}", notification.message);
    }
}
