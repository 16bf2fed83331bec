#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line tools for the service marketplace.
//!
//! ```text
//! marketplace decompose "Rua 10, Setor Central, Goiânia, Goiás, Brasil" [--map-click]
//! marketplace search "avenida paulista"
//! marketplace reverse --lat -16.6869 --lon -49.2648
//! marketplace services
//! marketplace balance wallet.json
//! marketplace withdraw wallet.json --amount-cents 5000 --method pix-1
//! marketplace serve
//! ```
//!
//! Wallet files are JSON in the same shape the API accepts; pass `-` to
//! read from stdin.

use std::path::Path;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use marketplace_address::states::state_name;
use marketplace_address::{MAP_CLICK_EXTRA_DENYLIST, ParsedAddress, decompose, decompose_with};
use marketplace_address_models::Coordinates;
use marketplace_geocoder::PickedLocation;
use marketplace_geocoder::picker::LocationPicker;
use marketplace_geocoder::service_registry::{all_services, default_geocoder};
use marketplace_geocoder::session::{SearchSession, SearchState, debounce_from_env};
use marketplace_wallet::{compute_balance, validate_withdrawal};
use marketplace_wallet_models::{Cents, Wallet, WithdrawalPolicy, WithdrawalRequest};

#[derive(Parser)]
#[command(
    name = "marketplace",
    about = "Location and wallet tools for the service marketplace"
)]
struct Cli {
    /// Geocoding service ID (defaults to the highest-priority enabled one)
    #[arg(long, global = true)]
    service: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a comma-separated address into street, city and state
    Decompose {
        /// The raw address
        raw: String,
        /// Apply the map-click city denylist
        #[arg(long)]
        map_click: bool,
    },
    /// Search for places and show their decomposed addresses
    Search {
        /// Free-text query
        query: String,
    },
    /// Show the address at a point
    Reverse {
        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
    /// List configured geocoding services
    Services,
    /// Show the balance of a wallet file
    Balance {
        /// Wallet JSON file, or `-` for stdin
        wallet: String,
    },
    /// Validate a withdrawal request against a wallet file
    Withdraw {
        /// Wallet JSON file, or `-` for stdin
        wallet: String,
        /// Amount in centavos
        #[arg(long)]
        amount_cents: i64,
        /// Payment method ID
        #[arg(long)]
        method: String,
        /// Minimum withdrawal in centavos
        #[arg(long)]
        min_cents: Option<i64>,
        /// Withdrawals allowed to await review at once
        #[arg(long)]
        max_pending: Option<usize>,
    },
    /// Start the HTTP API server
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Decompose { raw, map_click } => {
            let address = if map_click {
                decompose_with(&raw, MAP_CLICK_EXTRA_DENYLIST)
            } else {
                decompose(&raw)
            };
            print_address(&address);
        }
        Commands::Search { query } => {
            let geocoder = Arc::new(default_geocoder(cli.service.as_deref())?);
            let session = SearchSession::new(geocoder, debounce_from_env());
            session.submit(query);

            match session.wait_settled().await {
                SearchState::Ready { places, .. } if !places.is_empty() => {
                    for (i, place) in places.iter().enumerate() {
                        if i > 0 {
                            println!();
                        }
                        print_location(&PickedLocation::from_search_result(place));
                    }
                }
                SearchState::Failed { message, .. } => return Err(message.into()),
                _ => println!("No results."),
            }
        }
        Commands::Reverse { lat, lon } => {
            let geocoder = Arc::new(default_geocoder(cli.service.as_deref())?);
            let picker = LocationPicker::new(geocoder);
            let location = picker.pick_on_map(Coordinates::new(lat, lon)).await?;
            print_location(&location);
        }
        Commands::Services => {
            println!("{:<24} {:<8} {:<9} URL", "ID", "ENABLED", "PRIORITY");
            println!("{}", "-".repeat(90));
            for svc in all_services() {
                println!(
                    "{:<24} {:<8} {:<9} {}",
                    svc.id,
                    if svc.enabled { "yes" } else { "no" },
                    svc.priority,
                    svc.base_url()
                );
            }
        }
        Commands::Balance { wallet } => {
            let wallet = read_wallet(&wallet)?;
            let balance = compute_balance(&wallet);
            println!("Credits:    {}", balance.total_credits_cents);
            println!("Debits:     {}", balance.total_debits_cents);
            println!("Withdrawn:  {}", balance.withdrawn_cents);
            println!("Pending:    {}", balance.pending_cents);
            println!("Available:  {}", balance.available_cents);
        }
        Commands::Withdraw {
            wallet,
            amount_cents,
            method,
            min_cents,
            max_pending,
        } => {
            let wallet = read_wallet(&wallet)?;
            let defaults = WithdrawalPolicy::default();
            let policy = WithdrawalPolicy {
                minimum_cents: min_cents.map_or(defaults.minimum_cents, Cents),
                max_pending: max_pending.unwrap_or(defaults.max_pending),
            };
            let request = WithdrawalRequest {
                amount_cents: Cents(amount_cents),
                payment_method_id: method,
            };

            match validate_withdrawal(&wallet, &request, &policy) {
                Ok(validated) => println!("{}", serde_json::to_string_pretty(&validated)?),
                Err(e) => {
                    eprintln!("Withdrawal rejected ({}): {e}", e.code());
                    std::process::exit(1);
                }
            }
        }
        Commands::Serve => {
            // The server uses actix-web's runtime, so it runs on its own
            // system in a blocking task.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(marketplace_server::run_server())
            })
            .await??;
        }
    }

    Ok(())
}

fn read_wallet(source: &str) -> Result<Wallet, Box<dyn std::error::Error>> {
    let json = if source == "-" {
        std::io::read_to_string(std::io::stdin())?
    } else {
        std::fs::read_to_string(Path::new(source))?
    };
    log::debug!("Read {} byte(s) of wallet JSON from {source}", json.len());
    Ok(serde_json::from_str(&json)?)
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() { "(unknown)" } else { value }
}

fn print_address(address: &ParsedAddress) {
    println!("Street: {}", or_unknown(&address.street));
    println!("City:   {}", or_unknown(&address.city));
    match state_name(&address.state) {
        Some(name) => println!("State:  {} ({name})", address.state),
        None => println!("State:  {}", or_unknown(&address.state)),
    }
}

fn print_location(location: &PickedLocation) {
    if let Some(display_name) = &location.display_name {
        println!("{display_name}");
    }
    println!("At:     {}", location.coordinates);
    print_address(&location.address);
    if let Some(hint) = manual_entry_hint(&location.address) {
        println!("{hint}");
    }
}

fn manual_entry_hint(address: &ParsedAddress) -> Option<&'static str> {
    if address.is_complete() {
        None
    } else if address.street.is_empty() {
        Some("No address found; enter it manually.")
    } else {
        Some("City or state unresolved; complete them manually.")
    }
}
