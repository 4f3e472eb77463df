//! CCRN CLI - validate and convert Common Cloud Resource Names

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod error;
mod exit_codes;

use commands::DirectoryArgs;

#[derive(Parser)]
#[command(name = "ccrn")]
#[command(version)]
#[command(about = "Validate and convert Common Cloud Resource Names", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Type definition files (glob pattern, repeatable)
    #[arg(long = "crds", global = true)]
    crds: Vec<String>,

    /// Directory searched recursively for type definition files
    #[arg(long = "crd-dir", global = true)]
    crd_dir: Vec<PathBuf>,

    /// Naming authority filtering the type definitions
    #[arg(long, global = true)]
    authority: Option<String>,

    /// Mirror type definitions from the cluster in the current kube context
    #[arg(long, global = true, conflicts_with_all = ["crds", "crd_dir"])]
    live: bool,

    /// Namespace validation objects are created in (live only)
    #[arg(short, long, global = true, default_value = "default")]
    namespace: String,

    /// Directory configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter (e.g. `debug`, `ccrn_directory=trace`)
    #[arg(long, global = true, env = "RUST_LOG", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a resource name
    Validate {
        /// Field list (`ccrn=...`) or URN (`urn:ccrn:...`)
        input: String,

        /// URN template to parse with instead of the type's own
        #[arg(short, long)]
        template: Option<String>,

        /// Output the validation result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a resource name and print both surface forms
    Convert {
        /// Field list (`ccrn=...`) or URN (`urn:ccrn:...`)
        input: String,

        /// Output the conversion as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the known resource types
    Types {
        /// Output the type list as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> error::Result<()> {
    let args = DirectoryArgs {
        crds: cli.crds,
        crd_dirs: cli.crd_dir,
        authority: cli.authority,
        live: cli.live,
        namespace: cli.namespace,
        config: cli.config,
    };
    let directory = commands::build_directory(&args).await?;

    match cli.command {
        Commands::Validate {
            input,
            template,
            json,
        } => commands::validate::run(directory, &input, template.as_deref(), json).await,

        Commands::Convert { input, json } => commands::convert::run(directory, &input, json).await,

        Commands::Types { json } => commands::types::run(directory, json).await,
    }
}

#[tokio::main]
async fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let code = match run(cli).await {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{:?}", miette::Report::new(e));
            code
        }
    };
    std::process::exit(code);
}
