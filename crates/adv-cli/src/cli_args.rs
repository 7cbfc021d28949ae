use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "adventure")]
#[command(about = "Play and check branching story graphs")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Play(PlayArgs),
    Check(CheckArgs),
}

#[derive(Debug, Args)]
pub(crate) struct PlayArgs {
    #[arg(long = "story")]
    pub(crate) story: String,
    #[arg(long = "entry")]
    pub(crate) entry: Option<String>,
    /// Wait for an input line after every passage of text.
    #[arg(long = "acknowledge")]
    pub(crate) acknowledge: bool,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub(crate) struct CheckArgs {
    #[arg(long = "story")]
    pub(crate) story: Option<String>,
    #[arg(long = "dir")]
    pub(crate) dir: Option<String>,
}
