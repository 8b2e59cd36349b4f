//! txt2svg CLI - serve or render text-to-SVG from the command line.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use txt2svg_core::host::InstancePolicy;
use txt2svg_core::marshal::DEFAULT_OUTPUT_CAPACITY;
use txt2svg_server::observability::{TracingConfig, init_tracing};
use txt2svg_server::wasm::DEFAULT_IMPORTED_MEMORY_PAGES;

/// txt2svg - render text to SVG with a sandboxed WebAssembly module.
#[derive(Parser)]
#[command(name = "txt2svg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, env = "TXT2SVG_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "TXT2SVG_PORT", default_value = "8080")]
        port: u16,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Render one SVG without starting a server
    Render {
        /// Text to render
        #[arg(short, long, default_value = "Hello World")]
        text: String,

        /// Font key (roboto, wendyone, alfaslabone)
        #[arg(short, long, default_value = "roboto")]
        font: String,

        /// Fill color, with or without a leading '#'
        #[arg(short, long, default_value = "#000000")]
        color: String,

        /// Write the SVG here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Show version information
    Version,
}

/// Settings shared by every command that loads the compute module.
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Path to the compute module
    #[arg(short, long, env = "TXT2SVG_MODULE", default_value = "txt2svg.wasm")]
    pub module: PathBuf,

    /// Directory holding static assets and fonts/
    #[arg(short, long, env = "TXT2SVG_ASSETS", default_value = "public")]
    pub assets: PathBuf,

    /// Instance policy: shared or per-request
    #[arg(long, env = "TXT2SVG_INSTANCE_POLICY", default_value = "shared")]
    pub policy: InstancePolicy,

    /// Bytes reserved for the generated SVG
    #[arg(long, env = "TXT2SVG_OUTPUT_CAPACITY", default_value_t = DEFAULT_OUTPUT_CAPACITY)]
    pub output_capacity: u32,

    /// Pages (64 KiB) given to an imported env.memory
    #[arg(long, env = "TXT2SVG_MEMORY_PAGES", default_value_t = DEFAULT_IMPORTED_MEMORY_PAGES)]
    pub memory_pages: u32,

    /// Budget for one generation in milliseconds (0 disables)
    #[arg(long, env = "TXT2SVG_TIMEOUT_MS", default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Fuel per generation (disabled when absent)
    #[arg(long, env = "TXT2SVG_FUEL")]
    pub fuel: Option<u64>,
}

fn setup_logging(verbosity: u8) -> Result<()> {
    let config = TracingConfig::from_env()
        .into_builder()
        .verbosity(verbosity)
        .build();

    init_tracing(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Serve { host, port, engine } => commands::serve::run(&host, port, &engine).await,
        Commands::Render {
            text,
            font,
            color,
            output,
            engine,
        } => commands::render::run(&text, &font, &color, output.as_deref(), &engine).await,
        Commands::Version => commands::version::run(),
    }
}
