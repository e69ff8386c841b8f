use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use schema_validator::ConfigurationError;
use schema_validator::validation::{Outcome, ValidationOptions};

mod commands;

use commands::{corpus_command, validate_command};

#[derive(Parser)]
#[command(
    name = "schema-validator",
    about = "Validates EC schema files and the references between them",
    version,
    author,
    long_about = None,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Schema file or directory to validate
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Existing directory for per-schema validation artifacts
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Additional directory to search for referenced schemas (repeatable)
    #[arg(short = 'r', long = "ref")]
    reference_paths: Vec<PathBuf>,

    /// Also validate the parent schemas of each schema
    #[arg(short = 'a', long = "all")]
    validate_full_graph: bool,

    /// Enable verbose output (use -vv for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the whole corpus under $SCHEMA_VALIDATOR_CORPUS_ROOT (default ./schemas)
    Corpus {
        /// Existing directory for per-schema validation artifacts
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Additional directory to search for referenced schemas (repeatable)
        #[arg(short = 'r', long = "ref")]
        reference_paths: Vec<PathBuf>,

        /// Also validate the parent schemas of each schema
        #[arg(short = 'a', long = "all")]
        validate_full_graph: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    init_logging(cli.verbose);

    let working_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let result = match cli.command {
        Some(Commands::Corpus {
            output,
            reference_paths,
            validate_full_graph,
        }) => corpus_command(output, reference_paths, validate_full_graph, &working_dir),
        None => ValidationOptions::from_args(
            cli.input,
            cli.reference_paths,
            cli.validate_full_graph,
            cli.output,
        )
        .and_then(|options| validate_command(options, &working_dir)),
    };

    exit_code(result)
}

/// 0 for clean or warnings-only runs, 1 for validation failures, 2 for configuration errors
fn exit_code(result: Result<Outcome, ConfigurationError>) -> ExitCode {
    match result {
        Ok(outcome) if outcome.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbose {
        0 => EnvFilter::new("schema_validator=warn"), // Default: warnings and errors only
        1 => EnvFilter::new("schema_validator=info"), // -v: info messages
        _ => EnvFilter::new("schema_validator=debug"), // -vv or more: full debug
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
