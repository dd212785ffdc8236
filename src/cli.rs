//! Command-line interface
//!
//! Flag names keep the underscore spelling (`--file_path`, `--unique_key`)
//! that existing deployment scripts already pass.

use clap::Parser;
use std::path::PathBuf;

/// OSS Uploadr - upload a file once per unique key
#[derive(Parser, Debug, Clone)]
#[command(name = "oss-uploadr")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The region in which the bucket is located
    #[arg(long, env = "OSS_REGION")]
    pub region: Option<String>,

    /// The name of the bucket
    #[arg(long, env = "OSS_BUCKET")]
    pub bucket: Option<String>,

    /// The name of the object
    #[arg(long)]
    pub key: String,

    /// The path of the file to upload
    #[arg(long = "file_path")]
    pub file_path: PathBuf,

    /// Identifier of the content (e.g. a commit id), stored as object metadata
    #[arg(long = "unique_key")]
    pub unique_key: Option<String>,

    /// Override the storage endpoint URL
    #[arg(long, env = "OSS_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Use path-style addressing (`--path_style false` turns it off)
    #[arg(
        long = "path_style",
        env = "OSS_PATH_STYLE",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub path_style: Option<bool>,

    /// Path to an optional YAML configuration file
    #[arg(long, env = "OSS_UPLOADR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log_level", default_value = "warn")]
    pub log_level: String,
}
