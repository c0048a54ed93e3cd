use clap::{Parser, Subcommand};
use sift_core::config::Provider;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sift",
    version,
    about = "Multi-layer quality control for extracted content"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate items read from a JSON Lines file or a JSON array
    Validate(ValidateArgs),
    /// Print the effective configuration as YAML
    Config(ConfigArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Items to validate; `-` reads stdin
    #[arg(long, short)]
    pub input: PathBuf,

    #[arg(long, env = "SIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Maximum number of items validated concurrently
    #[arg(long, default_value_t = 4)]
    pub parallel: usize,

    /// Skip the semantic layer entirely
    #[arg(long)]
    pub no_semantic: bool,

    /// Override `semantic.provider` (openai, fake, none)
    #[arg(long)]
    pub judge: Option<Provider>,

    /// Write JSON Lines results here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Print run statistics as JSON to stderr
    #[arg(long)]
    pub summary: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(long, env = "SIFT_CONFIG")]
    pub config: Option<PathBuf>,
}
