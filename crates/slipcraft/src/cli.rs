use std::path::PathBuf;

use clap::Parser;

#[derive(Clone, Debug, Parser)]
#[command(
    name = "slipcraft",
    version = env!("CARGO_PKG_VERSION"),
    about = "Build tar/zip archives that escape the extraction directory through chained symlinks",
    long_about = None,
)]
pub struct App {
    /// Payload file placed at the escape location
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Where the payload should land, relative to the extraction root (e.g. ../../tmp/pwn.sh)
    #[arg(value_name = "RELATIVE_PATH")]
    pub relative_path: String,

    /// Archive to create
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Archive type (zip, tar)
    #[arg(short = 't', long = "archive-type", default_value = "zip")]
    pub archive_type: String,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Fixed modification time (unix seconds) for directory and symlink records
    #[arg(long, value_name = "UNIX_SECONDS")]
    pub mtime: Option<u64>,

    /// Print the planned entries without writing the archive
    #[arg(long)]
    pub dry_run: bool,

    /// Re-read the written archive and check it against the planned entries
    #[arg(long, conflicts_with = "dry_run")]
    pub verify: bool,
}
