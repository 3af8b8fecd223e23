use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use eduslide::config::{self, ClientConfig, ContractVersion};
use eduslide::download::{export_slides, save_binary, DirectoryTarget};
use eduslide::models::{GenerationRequest, UploadFile, DEFAULT_EDUCATION_LEVEL, DEFAULT_SLIDE_COUNT};
use eduslide::render::render_slides;
use eduslide::session::SessionState;
use eduslide::SlideClient;

#[derive(Debug, Parser)]
#[command(name = "eduslide", about = "Generate educational slides from a topic, a PDF or an image")]
struct Cli {
    /// Backend base URL (overrides EDUSLIDE_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Backend contract: `structured` or `binary` (overrides EDUSLIDE_API_CONTRACT)
    #[arg(long, global = true)]
    contract: Option<ContractVersion>,

    /// Directory saved presentations are written to (overrides EDUSLIDE_OUTPUT_DIR)
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate slides about a topic
    Topic {
        topic: String,
        /// Number of slides, 5 to 50 works best
        #[arg(long, default_value_t = DEFAULT_SLIDE_COUNT)]
        slides: u32,
        #[arg(long, default_value = DEFAULT_EDUCATION_LEVEL)]
        level: String,
        /// Export the generated slides to a .pptx file
        #[arg(long)]
        download: bool,
    },
    /// Generate slides from a PDF document
    Pdf {
        path: PathBuf,
        #[arg(long, default_value_t = DEFAULT_SLIDE_COUNT)]
        slides: u32,
        #[arg(long)]
        download: bool,
    },
    /// Generate slides from an image
    Image {
        path: PathBuf,
        #[arg(long, default_value_t = DEFAULT_SLIDE_COUNT)]
        slides: u32,
        #[arg(long)]
        download: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every step succeeded. Slide cards go to stdout; a failure
/// message goes to stderr.
async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let mut client_config = match cli.base_url.as_deref() {
        Some(base_url) => ClientConfig::new(base_url, config::contract_from_env()?)?,
        None => ClientConfig::from_env()?,
    };
    if let Some(contract) = cli.contract {
        client_config.contract = contract;
    }
    let client = SlideClient::new(client_config)?;
    let mut target = DirectoryTarget::new(cli.out.unwrap_or_else(config::output_dir_from_env))?;

    let (request, download) = build_request(cli.command)?;
    let seed = request.filename_seed().to_string();

    let mut state = SessionState::new();
    let ticket = state.begin_generation();
    let outcome = client.submit(&request).await;
    let mut ok = outcome.is_ok();
    state.finish_generation(ticket, outcome);

    if let Some(file) = state.take_file() {
        let saved = save_binary(&mut target, &file, &seed);
        ok &= saved.is_ok();
        state.finish_download(saved);
    } else if download && state.begin_download() {
        let slides = state.slides().to_vec();
        let saved = export_slides(&client, &mut target, &slides, &seed).await;
        ok &= saved.is_ok();
        state.finish_download(saved);
    }

    print!("{}", render_slides(&state));
    if let Some(message) = state.message() {
        if ok {
            println!("{}", message);
        } else {
            eprintln!("{}", message);
        }
    }
    Ok(ok)
}

fn build_request(command: Command) -> std::io::Result<(GenerationRequest, bool)> {
    Ok(match command {
        Command::Topic {
            topic,
            slides,
            level,
            download,
        } => (
            GenerationRequest::Topic {
                topic,
                slide_count: slides,
                education_level: level,
            },
            download,
        ),
        Command::Pdf {
            path,
            slides,
            download,
        } => (
            GenerationRequest::PdfUpload {
                file: UploadFile::from_path(&path)?,
                slide_count: slides,
            },
            download,
        ),
        Command::Image {
            path,
            slides,
            download,
        } => (
            GenerationRequest::ImageUpload {
                file: UploadFile::from_path(&path)?,
                slide_count: slides,
            },
            download,
        ),
    })
}
