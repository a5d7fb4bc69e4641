//! oxide-query CLI
//!
//! Command-line tool for rendering expression trees into query text.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use oxide_query_cli::{load_dialect, read_input, render_json, template_listing};
use oxide_query_core::BuiltinDialect;

/// Render dialect-independent query expressions.
#[derive(Parser)]
#[command(name = "oxide-query")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Built-in dialect (jpql, hql or sql).
    #[arg(short, long, env = "OXIDE_QUERY_DIALECT", default_value = "jpql")]
    dialect: BuiltinDialect,

    /// JSON dialect configuration; takes precedence over --dialect.
    #[arg(long)]
    dialect_config: Option<PathBuf>,

    /// Collapse line breaks in templates to single spaces.
    #[arg(long)]
    single_line: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render expression trees read as JSON.
    Render {
        /// Input file, `-` for standard input.
        #[arg(default_value = "-")]
        input: PathBuf,
    },

    /// List the dialect's templates.
    Templates,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let dialect = load_dialect(cli.dialect, cli.dialect_config.as_deref(), cli.single_line)?;

    match cli.command {
        Commands::Render { input } => {
            let json = read_input(&input)?;
            print!("{}", render_json(&dialect, &json)?);
        }
        Commands::Templates => {
            print!("{}", template_listing(&dialect));
        }
    }

    Ok(())
}
