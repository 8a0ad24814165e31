use clap::{Parser, Subcommand};

mod db;
mod token;

#[derive(Debug, Parser)]
#[command(name = "salon-app", about = "Salon booking operator CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Token(token::TokenCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Token(command) => token::run(command),
        }
    }
}
