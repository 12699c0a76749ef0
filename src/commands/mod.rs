pub mod history;
pub mod init;
pub mod sum;
pub mod watch;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Count key presses and mouse clicks until interrupted")]
    Watch,
    #[command(about = "Display daily activity for recent days")]
    History(history::HistoryArgs),
    #[command(about = "Display totals across all recorded days")]
    Sum(sum::SumArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Watch => watch::cmd().await,
            Commands::History(args) => history::cmd(args),
            Commands::Sum(args) => sum::cmd(args),
        }
    }
}
