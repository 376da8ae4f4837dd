mod commands;
mod output;
mod theme;

use anyhow::Result;
use clap::builder::styling::{AnsiColor, Styles};
use clap::{Parser, Subcommand};
use env_logger::Env;

use commands::list::handle_list;
use commands::run::{RunArgs, handle_run};
use output::{GlobalOptions, OutputFormat, OutputManager};

const HELP_STYLES: Styles = Styles::styled()
    .usage(AnsiColor::BrightBlue.on_default().bold())
    .header(AnsiColor::Cyan.on_default().bold())
    .literal(AnsiColor::Magenta.on_default())
    .placeholder(AnsiColor::BrightBlack.on_default())
    .error(AnsiColor::Red.on_default().bold());

const AFTER_HELP: &str = "\
Environment Variables:
  REDIS_URL  Redis connection URL used by `run`

Examples:
  fieldshift list
  fieldshift run normalize-cost            # preview changes (dry run, the default)
  fieldshift run normalize-cost --live     # persist changes
  fieldshift run drop-legacy-rubric-fields --live --prefix sunrise
";

#[derive(Parser)]
#[command(name = "fieldshift")]
#[command(version)]
#[command(
    about = "Field migration runner for document collections",
    long_about = "Runs idempotent, dry-run-capable field migrations over a document \
collection: adding fields, remapping values, normalizing encodings, and \
deleting deprecated fields. Migrations are declarative transform lists; \
rerunning one is always safe."
)]
#[command(styles = HELP_STYLES)]
#[command(subcommand_required = true, arg_required_else_help = true)]
#[command(after_long_help = AFTER_HELP)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered migrations
    List,

    /// Execute a migration against the document store
    Run(RunArgs),
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();

    match execute(cli).await {
        Ok(()) => {}
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(1);
        }
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let output = OutputManager::new(GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        no_color: cli.no_color,
    });

    match cli.command {
        Commands::List => handle_list(&output),
        Commands::Run(args) => handle_run(args, &output).await,
    }
}
