use bili_remux::config::DEFAULT_BUFFER_SIZE;
use bili_remux::{Config, Converter, Event, TaskOptions, ToolsConfig, list_folder};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bili-remux",
    version,
    about = "Convert videos downloaded by the Bilibili desktop app into MP4 files",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Commands>,

    /// `bili-remux <input>` is shorthand for `bili-remux convert <input>`
    #[command(flatten)]
    convert: ConvertArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert downloaded videos
    Convert(ConvertArgs),

    /// List all videos without converting
    List {
        /// The folder that contains videos downloaded by the desktop app
        input: PathBuf,
    },
}

#[derive(Args)]
struct ConvertArgs {
    /// The folder that contains videos downloaded by the desktop app
    input: Option<PathBuf>,

    /// Where converted files are saved (default: current folder)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Prefix file names with the page number
    #[arg(short, long)]
    page_number: bool,

    /// Don't print progress
    #[arg(short, long)]
    silence: bool,

    /// Read-chunk size in bytes used while decrypting fragments
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,

    /// Skip downloads whose metadata says they are completed
    #[arg(long)]
    skip_completed: bool,

    /// Number of videos converted at the same time
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Path to the ffmpeg binary (default: search PATH)
    #[arg(long)]
    ffmpeg: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.cmd {
        Some(Commands::List { input }) => list(input).await,
        Some(Commands::Convert(args)) => convert(args).await,
        None => convert(cli.convert).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn list(input: PathBuf) -> bili_remux::Result<ExitCode> {
    let tasks = list_folder(&input).await?;
    if tasks.is_empty() {
        println!("No videos found in {}", input.display());
    }
    for task in &tasks {
        println!("{}", task);
    }
    Ok(ExitCode::SUCCESS)
}

async fn convert(args: ConvertArgs) -> bili_remux::Result<ExitCode> {
    let Some(input) = args.input else {
        return Err(bili_remux::Error::Config {
            message: "please specify the video folder path".to_string(),
            key: Some("input".to_string()),
        });
    };

    let config = Config {
        options: TaskOptions {
            output_dir: args.output.unwrap_or_else(|| PathBuf::from(".")),
            page_number: args.page_number,
            silence: args.silence,
            buffer_size: args.buffer_size,
            skip_completed: args.skip_completed,
            max_concurrent_tasks: args.jobs,
            scratch_dir: None,
        },
        tools: ToolsConfig {
            ffmpeg_path: args.ffmpeg,
            search_path: true,
        },
    };

    let converter = Converter::new(config)?;
    let mut events = converter.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(Event::TaskStarted { name, .. }) => {
                    println!("Decrypting and combining {}...", name);
                }
                Ok(Event::TaskComplete { path, .. }) => {
                    let filename = path.file_name().unwrap_or(path.as_os_str());
                    println!("Saved {}", filename.to_string_lossy());
                }
                Ok(Event::TaskSkipped { id, reason }) => {
                    println!("Skipped {} ({})", id, reason);
                }
                Ok(Event::TaskFailed { id, error }) => {
                    eprintln!("Failed {}: {}", id, error);
                }
                Ok(Event::RunComplete { .. }) | Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(_)) => continue,
            }
        }
    });

    let report = converter.convert_folder(&input).await;
    drop(converter);
    let _ = printer.await;
    let report = report?;

    if report.total() == 0 {
        println!("No videos found in {}", input.display());
    }
    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!(
            "{} of {} video(s) failed",
            report.failures.len(),
            report.total()
        );
        Ok(ExitCode::FAILURE)
    }
}
