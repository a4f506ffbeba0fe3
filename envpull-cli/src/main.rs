use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use envpull_cloud::{PullConfig, PullMode, PullPipeline, PullReport};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "envpull",
    version,
    about = "Pull and decrypt the latest environment bundle for this workspace"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Where to write the decrypted document
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Marker file holding the workspace id
    #[arg(long, global = true)]
    workspace_file: Option<PathBuf>,

    /// Secrets API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Keys host the private key is stored under
    #[arg(long, global = true)]
    host: Option<String>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Pull the whole .env file
    File,
    /// Pull individual secrets and write them as NAME=value lines
    Secrets,
}

impl From<Commands> for PullMode {
    fn from(cmd: Commands) -> Self {
        match cmd {
            Commands::File => PullMode::File,
            Commands::Secrets => PullMode::Secrets,
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Splits `--output` into the sink directory and the bare file name.
fn split_output(output: &Path) -> Result<(PathBuf, String)> {
    let file_name = output
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("output path {} has no file name", output.display()))?
        .to_string();
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, file_name))
}

fn build_config(cli: &Cli) -> Result<(PullConfig, PathBuf)> {
    let mut config = PullConfig::from_env().context("failed to load configuration")?;

    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }
    if let Some(host) = &cli.host {
        config.keys_host = host.clone();
    }
    if let Some(path) = &cli.workspace_file {
        config.workspace_file = path.clone();
    }

    let output_dir = match &cli.output {
        Some(output) => {
            let (dir, file_name) = split_output(output)?;
            config.output_file = file_name;
            dir
        }
        None => PathBuf::from("."),
    };

    config.validate().context("invalid configuration")?;
    Ok((config, output_dir))
}

async fn run(cli: Cli) -> Result<PullReport> {
    let (config, output_dir) = build_config(&cli)?;
    tracing::debug!("resolved {config:?}, writing into {}", output_dir.display());
    let pipeline = PullPipeline::from_config(&config, &output_dir)?;

    println!("Pulling {}...", config.output_file);
    let report = pipeline.run(cli.command.into()).await?;
    Ok(report)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(report) => {
            println!(
                "✅ Successfully pulled latest {} ({} bytes)",
                report.file_name, report.bytes_written
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Error: Failed to pull: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn split_output_bare_name_uses_cwd() {
        let (dir, name) = split_output(Path::new(".env")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, ".env");
    }

    #[test]
    fn split_output_with_directory() {
        let (dir, name) = split_output(Path::new("deploy/prod.env")).unwrap();
        assert_eq!(dir, PathBuf::from("deploy"));
        assert_eq!(name, "prod.env");
    }

    #[test]
    fn split_output_rejects_directory_only() {
        assert!(split_output(Path::new("/")).is_err());
    }

    #[test]
    fn parses_secrets_subcommand_with_global_output() {
        let cli = Cli::try_parse_from(["envpull", "secrets", "--output", "out/.env"]).unwrap();
        assert!(matches!(cli.command, Commands::Secrets));
        assert_eq!(cli.output, Some(PathBuf::from("out/.env")));
    }
}
