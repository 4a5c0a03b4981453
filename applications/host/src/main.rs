/// Xz3r0 host - run the save nodes from the command line
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xz_ffmpeg::{FfmpegCli, FfmpegRunner};
use xz_host::{Host, HostConfig, MasterArgs};
use xz_nodes::NodeValue;

#[derive(Parser)]
#[command(name = "xz-host")]
#[command(about = "Run Xz3r0 save nodes outside the node editor", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every node schema as JSON
    Nodes,
    /// Master a WAV file into the output directory
    Master(MasterArgs),
    /// Archive a workflow JSON file into the output directory
    Workflow {
        /// Workflow JSON file
        input: PathBuf,
        /// Filename prefix
        #[arg(short, long, default_value = xz_nodes::DEFAULT_FILENAME_PREFIX)]
        prefix: String,
    },
    /// Check that ffmpeg can be started
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "xz_host=info,xz_nodes=info,xz_mastering=info,xz_video=info,xz_ffmpeg=warn"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = HostConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Nodes => {
            let host = host(&config)?;
            println!("{}", host.schemas_json()?);
        }
        Commands::Master(args) => {
            config.validate()?;
            let host = host(&config)?;
            let outputs = host.master(&args).await?;
            print_saved(&outputs);
            if let Some(loudness) = outputs.get("loudness").and_then(NodeValue::as_json) {
                println!("{}", serde_json::to_string_pretty(loudness)?);
            }
        }
        Commands::Workflow { input, prefix } => {
            config.validate()?;
            let text = tokio::fs::read_to_string(&input)
                .await
                .with_context(|| format!("reading {}", input.display()))?;
            let workflow: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", input.display()))?;
            let outputs = host(&config)?.save_workflow(workflow, &prefix).await?;
            print_saved(&outputs);
        }
        Commands::Check => {
            let ffmpeg = FfmpegCli::new(config.ffmpeg.path.clone());
            let version = ffmpeg.version().await?;
            println!("{}", version);
        }
    }

    Ok(())
}

fn host(config: &HostConfig) -> anyhow::Result<Host> {
    let ffmpeg: Arc<dyn FfmpegRunner> = Arc::new(FfmpegCli::new(config.ffmpeg.path.clone()));
    Ok(Host::new(config, ffmpeg)?)
}

fn print_saved(outputs: &xz_nodes::NodeOutputs) {
    for file in outputs.saved_files() {
        tracing::info!("Saved {}", file.absolute_path.display());
        println!("{}", file.display_path());
    }
}
