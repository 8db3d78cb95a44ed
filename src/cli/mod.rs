pub mod commands;

use std::io::{self, Write};

use thiserror::Error;

use crate::chat::{ChatSession, ModelCatalog, SessionController, SetupError};
use crate::cli::commands::Commands;
use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to load config: {0}")]
    Config(#[from] ::config::ConfigError),
    #[error("Failed to initialize chat services: {0}")]
    Setup(#[from] SetupError),
    #[error("Unknown model. Choose one of: {0}")]
    UnknownModel(String),
}

pub async fn run_cli(command: Commands, config_path: String) -> Result<(), CliError> {
    let config = AppConfig::load(&config_path)?;
    let controller = SessionController::from_config(&config)?;

    match command {
        Commands::Serve => {
            eprintln!("The serve command is handled by the server entry point.");
        }
        Commands::History => {
            println!("{}", controller.retrieve_latest().await);
        }
        Commands::Chat { model } => {
            let catalog = ModelCatalog::new(config.llm.models.clone());
            let model = catalog
                .resolve(model.as_deref())
                .ok_or_else(|| CliError::UnknownModel(catalog.models().join(", ")))?;
            run_repl(&controller, model).await;
        }
    }
    Ok(())
}

async fn run_repl(controller: &SessionController, model: &str) {
    let mut session = ChatSession::new();

    println!("--- ChatRelay Terminal Chat ---");
    println!("Model: {}", model);
    println!("Type /save to save, /clear to start over, /exit to quit.");
    println!("-------------------------------");

    loop {
        print!("\nYou> ");
        let _ = io::stdout().flush();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Failed to read input: {}", e);
                break;
            }
        }
        let text = input.trim();

        match text {
            "" => continue,
            "/exit" | "/quit" => break,
            "/save" => println!("{}", controller.save(&session, model).await),
            "/clear" => {
                controller.clear(&mut session);
                println!("Conversation cleared.");
            }
            _ => {
                let turn = controller.respond(&mut session, text, model).await;
                println!("Bot> {}", turn.bot);
            }
        }
    }
}
