use clap::{Parser, Subcommand};

mod db;
mod sweep;

#[derive(Debug, Parser)]
#[command(name = "brew-orders", about = "Brew Orders CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Sweep(sweep::SweepCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Sweep(command) => sweep::run(command).await,
        }
    }
}
