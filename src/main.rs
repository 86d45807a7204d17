//! `sweetshop` - command-line front end for the Sweet Shop API.
//!
//! ```bash
//! sweetshop login -u alice -p secret
//! sweetshop list
//! sweetshop search --category Chocolate --min-price 10
//! sweetshop purchase 3 --quantity 2
//! sweetshop add --name Fudge --category Chocolate --price 2.50 --quantity 40
//! ```
//!
//! Exit status: 0 on success, 1 when the action failed, 2 when the session
//! is missing or was rejected and the user needs to log in again.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use sweetshop_lib::api::{SearchFilter, StockChange, Sweet, SweetForm, SweetUpdate};
use sweetshop_lib::shop::{Route, ShopError, ShopManager};
use sweetshop_lib::storage::database::Database;
use sweetshop_lib::{config, logging};

#[derive(Parser)]
#[command(name = "sweetshop")]
#[command(author, version, about = "Sweet Shop inventory client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Log in and remember the session token
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the session token
    Logout,
    /// Show who is logged in
    Whoami,
    /// List every sweet
    List,
    /// Search sweets; with no filters this lists everything
    Search {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
    },
    /// Add a sweet (admin)
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        price: f64,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Change some fields of a sweet (admin)
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        quantity: Option<i64>,
    },
    /// Delete a sweet (admin)
    Delete { id: i64 },
    /// Buy some of a sweet
    Purchase {
        id: i64,
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Add stock to a sweet (admin)
    Restock {
        id: i64,
        #[arg(short, long, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Client settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Persist the API base URL (SWEETSHOP_API_URL still wins)
    SetUrl { url: String },
    /// Drop the persisted API base URL
    ResetUrl,
    /// Print the API base URL in use
    ShowUrl,
}

#[tokio::main]
async fn main() -> ExitCode {
    let data_dir = config::data_dir();
    logging::init(&data_dir);

    let cli = Cli::parse();

    let (db, shop) = match sweetshop_lib::open(&data_dir) {
        Ok(opened) => opened,
        Err(e) => {
            log::error!("Could not open settings database: {}", e);
            eprintln!("Could not open settings in {}: {}", data_dir.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match run(&db, &shop, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(ShopError::Notice(message)) => {
            eprintln!("{}", message);
            ExitCode::from(1)
        }
        Err(ShopError::Redirect(Route::Login)) => {
            eprintln!("Not logged in or session expired. Run `sweetshop login`.");
            ExitCode::from(2)
        }
        Err(e @ ShopError::Redirect(_)) => {
            eprintln!("{}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(db: &Database, shop: &ShopManager, command: Commands) -> Result<(), ShopError> {
    match command {
        Commands::Register {
            email,
            username,
            password,
        } => {
            shop.register(&email, &username, &password).await?;
            println!("Registered {}. Log in to continue.", username);
        }
        Commands::Login { username, password } => {
            shop.login(&username, &password).await?;
            let role = if shop.is_admin() { " (admin)" } else { "" };
            println!("Logged in as {}{}", username, role);
        }
        Commands::Logout => {
            shop.logout().await?;
            println!("Logged out");
        }
        Commands::Whoami => {
            shop.guard()?;
            let name = shop.username().unwrap_or_else(|| "(unknown)".to_string());
            let role = if shop.is_admin() { "admin" } else { "customer" };
            println!("{} [{}]", name, role);
        }
        Commands::List => {
            let sweets = shop.open().await?;
            print_sweets(&sweets);
        }
        Commands::Search {
            name,
            category,
            min_price,
            max_price,
        } => {
            shop.guard()?;
            let filter = SearchFilter {
                name: non_empty(name),
                category: non_empty(category),
                min_price,
                max_price,
            };
            let sweets = shop.browse(&filter).await?;
            print_sweets(&sweets);
        }
        Commands::Add {
            name,
            category,
            price,
            quantity,
        } => {
            let form = SweetForm {
                name,
                category,
                price,
                quantity,
            };
            let sweet = shop.save(form, None).await?;
            println!("Added #{} {}", sweet.id, sweet.name);
        }
        Commands::Edit {
            id,
            name,
            category,
            price,
            quantity,
        } => {
            let update = SweetUpdate {
                name,
                category,
                price,
                quantity,
            };
            let sweet = shop.edit(id, update).await?;
            println!("Updated #{} {}", sweet.id, sweet.name);
        }
        Commands::Delete { id } => {
            shop.delete(id).await?;
            println!("Deleted #{}", id);
        }
        Commands::Purchase { id, quantity } => {
            // Load the list first so the quantity can be checked locally.
            shop.open().await?;
            let change = shop.purchase(id, quantity).await?;
            print_change(&change);
        }
        Commands::Restock { id, quantity } => {
            let change = shop.restock(id, quantity).await?;
            print_change(&change);
        }
        Commands::Config { action } => run_config(db, shop, action)?,
    }
    Ok(())
}

fn run_config(db: &Database, shop: &ShopManager, action: ConfigAction) -> Result<(), ShopError> {
    let result: Result<(), String> = match action {
        ConfigAction::SetUrl { url } => match config::validate_base_url(&url) {
            Ok(url) => db
                .set_setting(config::API_URL_SETTING, &url)
                .map(|_| println!("API base URL set to {}", url))
                .map_err(|e| e.to_string()),
            Err(e) => Err(format!("Invalid URL {:?}: {}", url, e)),
        },
        ConfigAction::ResetUrl => db
            .delete_setting(config::API_URL_SETTING)
            .map(|_| println!("API base URL reset to {}", config::API_BASE_URL))
            .map_err(|e| e.to_string()),
        ConfigAction::ShowUrl => {
            println!("{}", shop.api().base_url());
            Ok(())
        }
    };
    result.map_err(ShopError::Notice)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn print_sweets(sweets: &[Sweet]) {
    if sweets.is_empty() {
        println!("No sweets found");
        return;
    }
    for sweet in sweets {
        let stock = if sweet.is_out_of_stock() {
            "out of stock".to_string()
        } else {
            format!("{} available", sweet.quantity)
        };
        println!(
            "#{:<4} {:<24} {:<16} ${:>8.2}  {}",
            sweet.id, sweet.name, sweet.category, sweet.price, stock
        );
    }
}

fn print_change(change: &StockChange) {
    println!(
        "{}: {} now has {} in stock",
        change.message, change.name, change.quantity
    );
}
