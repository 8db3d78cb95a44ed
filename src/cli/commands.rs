use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chatrelay", version, about = "ChatRelay chat server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the config file path globally
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web UI and its JSON API
    Serve,

    /// Chat from the terminal
    Chat {
        /// Model to use; defaults to the first configured model
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Print the most recently saved transcript
    History,
}
