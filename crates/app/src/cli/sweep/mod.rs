use clap::{Args, Subcommand};

mod run;

#[derive(Debug, Args)]
pub(crate) struct SweepCommand {
    #[command(subcommand)]
    command: SweepSubcommand,
}

#[derive(Debug, Subcommand)]
enum SweepSubcommand {
    /// Promote the carts of the most recent sweep window now
    Run(run::RunSweepArgs),
}

pub(crate) async fn run(command: SweepCommand) -> Result<(), String> {
    match command.command {
        SweepSubcommand::Run(args) => run::run(args).await,
    }
}
