//! OSS Uploadr - upload a file to object storage once per unique key

use anyhow::Context;
use clap::Parser;
use oss_uploadr::cli::Args;
use oss_uploadr::storage::{EnvironmentCredentials, OssClient};
use oss_uploadr::{ConfigError, IdempotentUploader, UploadRequest};
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging; stdout is reserved for the result report
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    debug!("Starting OSS Uploadr v{}", oss_uploadr::VERSION);

    let request = match UploadRequest::from_args(&args) {
        Ok(request) => request,
        Err(ConfigError::Invalid(errors)) => {
            for error in &errors {
                println!("Error: {}", error);
            }
            return Ok(ExitCode::from(1));
        }
        Err(e) => return Err(e).context("failed to load configuration"),
    };

    let credentials = EnvironmentCredentials::new().context("failed to load OSS credentials")?;
    let client = OssClient::new(request.storage.clone(), &credentials).await;

    let outcome = IdempotentUploader::new(client)
        .run(&request)
        .await
        .with_context(|| {
            format!(
                "failed to upload {} to {}/{}",
                request.file_path.display(),
                request.storage.bucket,
                request.key
            )
        })?;

    println!("{}", outcome);
    Ok(ExitCode::SUCCESS)
}
