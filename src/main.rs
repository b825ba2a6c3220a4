use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use log::{error, info, warn};
use mealmate::api::{self, AppState};
use mealmate::commands::CommandHandler;
use mealmate::config::{AppConfig, CredentialsKind};
use mealmate::database::{Accounts, Database};
use mealmate::food::config::FoodConfig;
use mealmate::food::recipes::RecipeFinder;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tokio::net::TcpListener;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Find recipes from the ingredients you have", long_about = None)]
struct Args {
    /// Where the Spoonacular API key comes from: file or managed
    #[arg(long, default_value_t = CredentialsKind::Managed)]
    credentials: CredentialsKind,

    #[arg(long, default_value = "credentials.json")]
    credentials_file: PathBuf,

    #[arg(long, default_value = "data/mealmate.db")]
    database: PathBuf,

    #[arg(long)]
    api: bool,

    #[arg(long, default_value = "3000")]
    port: u16,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    Client(#[from] mealmate::food::api::ApiError),
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
    #[error("Terminal error: {0}")]
    Readline(#[from] ReadlineError),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    colored::control::set_override(true);

    // Load environment variables
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = AppConfig::new(args.credentials, args.credentials_file.clone(), args.database.clone());

    let food_config = match config.food() {
        Ok(food_config) => food_config,
        Err(e) => {
            error!("Failed to load Spoonacular credentials: {}", e);
            eprintln!("{}", format!("Credentials unavailable: {}. Recipe lookups will fail.", e).red());
            FoodConfig::new("")
        }
    };
    let finder = RecipeFinder::from_config(&food_config)
        .map_err(AppError::from)
        .context("Failed to build the Spoonacular client")?;

    let accounts = match Database::new(&config.database_path).await {
        Ok(db) => {
            info!("Using account database at {}", config.database_path.display());
            Some(Accounts::from_database(db))
        }
        Err(e) => {
            error!("Identity service initialization failed: {}", e);
            eprintln!("{}", format!("Identity service initialization failed: {}", e).red());
            warn!("Continuing without accounts");
            None
        }
    };

    if args.api {
        run_api_server(args.port, finder, accounts)
            .await
            .with_context(|| format!("API server on port {} stopped", args.port))?;
    } else {
        run_cli_mode(finder, accounts).await.context("Interactive session failed")?;
    }
    Ok(())
}

async fn run_cli_mode(finder: RecipeFinder, accounts: Option<Accounts>) -> Result<(), AppError> {
    println!("{}", "MealMate - Dynamic Recipe Generator 🍽️".bright_yellow().bold());
    println!("Enter your ingredients and let MealMate suggest delicious recipes!");

    let mut command_handler = CommandHandler::new(finder, accounts);
    if let Err(e) = command_handler.handle_command("help").await {
        println!("{}", e.red());
    }

    let mut rl = Editor::<(), DefaultHistory>::new()?;

    // Main input loop
    loop {
        match rl.readline("🥕 ") {
            Ok(line) => {
                let input = line.trim();
                let _ = rl.add_history_entry(input);

                if let Err(e) = command_handler.handle_command(input).await {
                    println!("{}", e.red());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}

async fn run_api_server(port: u16, finder: RecipeFinder, accounts: Option<Accounts>) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting API server on {}", addr);

    let app = api::create_api(AppState::new(finder, accounts));
    let listener = TcpListener::bind(&addr).await?;
    println!("Server successfully bound to {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
