//! Command-line interface definitions and parsing

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(author, version, about = "Hearth backend runtime", long_about = None)]
pub struct Cli {
    /// Tenant module to run (echo, presence)
    #[arg(short, long)]
    pub tenant: Option<String>,

    /// Address to bind both endpoints on
    #[arg(long)]
    pub bind: Option<String>,

    /// Reply endpoint port; the broadcast endpoint binds at port + 1
    #[arg(long)]
    pub base_port: Option<u16>,

    /// Backend identity certificate (public and secret halves)
    #[arg(long)]
    pub backend_key: Option<PathBuf>,

    /// Certificate whose public half authorizes connecting frontends
    #[arg(long)]
    pub frontend_key: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
