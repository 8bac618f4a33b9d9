mod commands;
mod output;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tier1_core::extraction::PageRange;

#[derive(Parser)]
#[command(
    name = "tier1",
    version,
    about = "Compare soil sample results with Alberta Tier 1 soil remediation guidelines"
)]
struct Cli {
    /// Log per-row detail (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract guideline records from the guideline document's tables
    Extract {
        /// Guideline PDF, or a table dump of it (JSON or XLSX)
        document: PathBuf,

        /// Pages holding the guideline tables
        #[arg(long, default_value = "43-48")]
        pages: PageRange,

        /// Input format: pdf, json or xlsx (default: from the file extension)
        #[arg(short, long)]
        format: Option<String>,

        /// Leading header rows to drop from every table (pdf tables have none)
        #[arg(long, default_value_t = 3)]
        header_rows: usize,

        /// Write the guideline CSV to a file instead of stdout
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Find guideline exceedances and write the report CSVs
    Exceedances {
        #[command(flatten)]
        input: InputArgs,

        /// Custom JSON comparison rule file (default: builtin tier1 rules)
        #[arg(short, long, value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Directory the report CSVs are written to
        #[arg(long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,

        /// Also write the full rated exceedance table to this file
        #[arg(long, value_name = "FILE")]
        full_table: Option<PathBuf>,

        /// Summary format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Rate every row of a joined CSV against its numeric guideline
    Ratio {
        /// Joined table with concentration_value and guideline_value columns
        input_csv: PathBuf,

        /// Where to write the rated table
        output_csv: PathBuf,
    },
    /// Inspect comparison rule sets
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct InputArgs {
    /// SQLite database with results, samples and guidelines tables
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Directory with results.csv, samples.csv and guidelines.csv
    #[arg(long, value_name = "DIR")]
    csv_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum RulesAction {
    /// List predefined rule sets
    List,
    /// Explain a rule set in plain language
    Explain {
        /// Preset name
        #[arg(default_value = "tier1")]
        preset: String,
    },
    /// Validate a custom rule file
    Validate {
        /// Path to JSON rule file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Extract {
            document,
            pages,
            format,
            header_rows,
            out,
        } => commands::extract::run(document, pages, format.as_deref(), header_rows, out),
        Commands::Exceedances {
            input,
            rules,
            out_dir,
            full_table,
            output,
        } => commands::exceedances::run(input.db, input.csv_dir, rules, out_dir, full_table, &output),
        Commands::Ratio {
            input_csv,
            output_csv,
        } => commands::ratio::run(&input_csv, &output_csv),
        Commands::Rules { action } => match action {
            RulesAction::List => commands::rules::list(),
            RulesAction::Explain { preset } => commands::rules::explain(&preset),
            RulesAction::Validate { file } => commands::rules::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
