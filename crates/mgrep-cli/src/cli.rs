use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "mgrep",
    about = "Incremental grep backed by a crash-consistent match cache",
    version
)]
pub struct Cli {
    /// Cache store file, created on first use
    pub store: PathBuf,

    /// Pattern to show, or to scan for when PATH is given
    pub pattern: Option<String>,

    /// Regular file or directory to scan
    pub path: Option<PathBuf>,

    /// Worker threads for directory scans; values below 1 mean 1
    #[arg(
        short = 't',
        long = "threads",
        visible_alias = "nt",
        default_value_t = 1,
        allow_negative_numbers = true
    )]
    pub threads: i64,

    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Skip the fsync after each commit
    #[arg(long)]
    pub no_sync: bool,

    /// Maximum store file size in MiB
    #[arg(long, default_value_t = 256)]
    pub capacity_mib: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
