//! cohortq command-line interface

use anyhow::Result;
use clap::{Parser, Subcommand};
use cohort_query::cli::{
    compile, domains, init_logging,
    output::{self, ColorMode},
    parse, validate,
};
use cohort_query::parser::DEFAULT_MAX_DEPTH;
use std::path::PathBuf;

/// Cohort filter query tool
#[derive(Parser)]
#[command(name = "cohortq")]
#[command(author, version, about = "Cohort filter query language tools", long_about = None)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a query and print its expression tree
    Parse {
        /// Query text
        query: String,

        /// Tree output format
        #[arg(short, long, value_enum, default_value_t)]
        format: parse::TreeFormat,

        /// Maximum expression nesting depth
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Compile a query to a filter document
    Compile {
        /// Query text
        query: String,

        /// Pretty-print output
        #[arg(short, long)]
        pretty: bool,

        /// Mapping table (JSON) replacing the built-in one
        #[arg(short, long)]
        mappings: Option<PathBuf>,

        /// Maximum expression nesting depth
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Lower a JSON expression tree to a filter document
    Lower {
        /// Expression tree file, as printed by `parse --format json`
        tree: PathBuf,

        /// Pretty-print output
        #[arg(short, long)]
        pretty: bool,

        /// Mapping table (JSON) replacing the built-in one
        #[arg(short, long)]
        mappings: Option<PathBuf>,
    },

    /// Check that every query in the given files compiles
    Validate {
        /// Query files, one query per line
        files: Vec<PathBuf>,

        /// Mapping table (JSON) replacing the built-in one
        #[arg(short, long)]
        mappings: Option<PathBuf>,

        /// Maximum expression nesting depth
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Print the domain mapping table
    Domains {
        /// Mapping table (JSON) replacing the built-in one
        #[arg(short, long)]
        mappings: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: domains::DomainsFormat,
    },
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(cli.color);
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let content = match cli.command {
        Commands::Parse {
            query,
            format,
            max_depth,
        } => parse::parse(&parse::ParseConfig {
            query,
            format,
            max_depth,
        })?,

        Commands::Compile {
            query,
            pretty,
            mappings,
            max_depth,
        } => compile::compile(&compile::CompileConfig {
            query,
            pretty,
            mappings,
            max_depth,
        })?,

        Commands::Lower {
            tree,
            pretty,
            mappings,
        } => compile::lower(&compile::LowerConfig {
            tree,
            pretty,
            mappings,
        })?,

        Commands::Validate {
            files,
            mappings,
            max_depth,
        } => {
            let report = validate::validate(&validate::ValidateConfig {
                files,
                mappings,
                max_depth,
                verbose: cli.verbose,
            })?;
            output::write_output(&report.render(), cli.output.as_deref())?;
            if !report.is_success() {
                std::process::exit(1);
            }
            return Ok(());
        }

        Commands::Domains { mappings, format } => {
            domains::domains(&domains::DomainsConfig { mappings, format })?
        }
    };

    output::write_output(&content, cli.output.as_deref())
}
