use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dimagram",
    about = "Daily photo publishing: queue, publish, unpublish",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Configuration file (defaults to ./dimagram.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the album HTTP server
    Serve(ServeArgs),
    /// Publish the next queued item
    Publish,
    /// Return the live item to the queue front
    Unpublish,
    /// Show the queue and the live item
    Status(StatusArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on, overriding the configuration file
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct StatusArgs {
    /// How many queued items to list
    #[arg(short = 'n', long, default_value_t = 5)]
    pub limit: usize,
}
