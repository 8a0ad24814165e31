use clap::{Args, Subcommand};

mod create;

#[derive(Debug, Args)]
pub(crate) struct TokenCommand {
    #[command(subcommand)]
    command: TokenSubcommand,
}

#[derive(Debug, Subcommand)]
enum TokenSubcommand {
    /// Mint a bearer token signed with the shared secret
    Create(create::CreateTokenArgs),
}

pub(crate) fn run(command: TokenCommand) -> Result<(), String> {
    match command.command {
        TokenSubcommand::Create(args) => create::run(args),
    }
}
