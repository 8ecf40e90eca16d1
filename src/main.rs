use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tokio::signal;

use imagefeed::classifier::server::ClassifierState;
use imagefeed::classifier::{ImageModel, ModelConfig, server as classifier_server};
use imagefeed::feed_state::{FeedConfig, FeedState};
use imagefeed::server;

#[derive(Parser)]
#[command(name = "imagefeed", about = "Random-image classification feed")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the feed orchestrator (trigger + latest-result endpoints).
    Feed(FeedArgs),
    /// Run the classification service (multipart /predict endpoint).
    Classifier(ClassifierArgs),
}

#[derive(Args)]
struct FeedArgs {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    #[arg(long, default_value_t = 8001)]
    port: u16,
    /// Directory holding the candidate source images.
    #[arg(long, default_value = "/images")]
    images_dir: PathBuf,
    /// Base URL of the classifier service.
    #[arg(long, default_value = "http://localhost:8000")]
    classifier_url: String,
    /// Classifier request timeout in seconds.
    #[arg(long, default_value_t = 60)]
    timeout: u64,
    /// Seconds between cache status log lines.
    #[arg(long, default_value_t = 60)]
    log_interval: u64,
}

#[derive(Args)]
struct ClassifierArgs {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    #[arg(long, default_value_t = 8000)]
    port: u16,
    /// Path to the ONNX classification model.
    #[arg(long)]
    model: PathBuf,
    /// Path to the labels file, one class name per line.
    #[arg(long)]
    labels: PathBuf,
}

fn init_logging() {
    // default level is info
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, log::LevelFilter::Info)
        .init();
}

fn run_feed(args: FeedArgs) -> anyhow::Result<()> {
    let feed_config = FeedConfig {
        host: args.host,
        port: args.port,
        images_dir: args.images_dir,
        classifier_url: args.classifier_url,
        timeout: args.timeout,
        log_interval: args.log_interval,
    };
    let feed_state = FeedState::new(&feed_config)?;

    actix_web::rt::System::new().block_on(async move {
        tokio::select! {
            _ = server::periodic_logging(feed_state.clone()) => {
                unreachable!()
            }
            res = server::startup(feed_config, feed_state) => {
                res?;
                Ok(())
            }
            _ = signal::ctrl_c() => {
                log::info!("received ctrl-c, shutting down");
                Ok(())
            }
        }
    })
}

fn run_classifier(args: ClassifierArgs) -> anyhow::Result<()> {
    let model_config = ModelConfig::new(args.model, args.labels);
    let model = ImageModel::load(model_config)?;
    let state = ClassifierState {
        model: Arc::new(model),
    };

    actix_web::rt::System::new().block_on(async move {
        tokio::select! {
            res = classifier_server::startup(args.host, args.port, state) => {
                res?;
                Ok(())
            }
            _ = signal::ctrl_c() => {
                log::info!("received ctrl-c, shutting down");
                Ok(())
            }
        }
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Command::Feed(args) => run_feed(args),
        Command::Classifier(args) => run_classifier(args),
    }
}
