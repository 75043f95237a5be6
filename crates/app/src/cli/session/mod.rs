use clap::{Args, Subcommand};
use storefront_app::identity::SessionKey;

#[derive(Debug, Args)]
pub(crate) struct SessionCommand {
    #[command(subcommand)]
    command: SessionSubcommand,
}

#[derive(Debug, Subcommand)]
enum SessionSubcommand {
    /// Print a freshly generated anonymous session key
    Issue,
}

pub(crate) fn run(command: SessionCommand) -> Result<(), String> {
    match command.command {
        SessionSubcommand::Issue => {
            println!("{}", SessionKey::generate());

            Ok(())
        }
    }
}
