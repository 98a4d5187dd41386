use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Clone, Debug, Parser)]
#[command(name = "arcio", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    #[command(subcommand)]
    pub cmd: Commands,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "p", name = "pack", about = "Write files and directories into an archive")]
    Pack(PackArg),
    #[command(alias = "u", name = "unpack", about = "Extract an archive into a directory")]
    Unpack(UnpackArg),
    #[command(alias = "f", name = "formats", about = "List supported archive extensions")]
    Formats,
}

#[derive(Args, Clone, Debug)]
pub struct PackArg {
    /// Archive to create; its suffix selects the format unless --format is given
    pub archive: PathBuf,

    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Entry names are taken relative to this directory
    #[arg(long, short)]
    pub base: Option<PathBuf>,

    /// Archive extension such as zip or .tar.gz
    #[arg(long, short)]
    pub format: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct UnpackArg {
    pub archive: PathBuf,

    /// Destination directory, created when missing
    pub destination: PathBuf,

    #[arg(long, short)]
    pub format: Option<String>,
}

impl App {
    /// Default filter directive for the given `-v` count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
