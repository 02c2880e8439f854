use std::process::ExitCode;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use uptime_archiver::app::{App, RunOptions};
use uptime_archiver::config::{ConfigLoader, ConfigOverrides};
use uptime_archiver::error::{ArchiverError, ErrorKind};
use uptime_archiver::nodeping::NodepingHttpClient;
use uptime_archiver::output::{JsonOutput, OutputMode, TextOutput};
use uptime_archiver::sheets::SheetsHttpClient;

#[derive(Parser)]
#[command(name = "uptime-archiver")]
#[command(about = "Write NodePing uptime results to Google Sheets")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Archive a contact group's uptime for one month")]
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Name of the NodePing contact group to retrieve uptime data for.
    #[arg(short = 'g', long)]
    contact_group: Option<String>,

    /// The ID of the spreadsheet as found in its url.
    #[arg(short = 's', long = "spreadsheet-id", alias = "spreadsheetID")]
    spreadsheet_id: Option<String>,

    /// Maximum number of results to write.
    #[arg(short = 'l', long, allow_negative_numbers = true)]
    count_limit: Option<i64>,

    /// LastMonth, ThisMonth, or YYYY-MM.
    #[arg(short = 'p', long)]
    period: Option<String>,

    #[arg(long)]
    config: Option<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<ArchiverError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &ArchiverError) -> u8 {
    match error.kind() {
        ErrorKind::Configuration | ErrorKind::NotFound => 2,
        ErrorKind::Transport => 3,
        ErrorKind::RemoteConsistency => 4,
        ErrorKind::MalformedData => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    match cli.command {
        Commands::Run(args) => run_archive(args, output_mode),
    }
}

fn run_archive(args: RunArgs, output_mode: OutputMode) -> miette::Result<()> {
    let overrides = ConfigOverrides {
        contact_group: args.contact_group,
        period: args.period,
        spreadsheet_id: args.spreadsheet_id,
        count_limit: args.count_limit,
    };
    let config = ConfigLoader::resolve(args.config.as_deref(), overrides)?;

    let nodeping = NodepingHttpClient::new(
        &config.nodeping_base_url,
        &config.nodeping_token,
        config.nodeping_customer_id.as_deref(),
    )?;
    let sheets = SheetsHttpClient::new(
        &config.sheets_base_url,
        &config.spreadsheet_id,
        &config.google_access_token,
    )?;
    let app = App::new(nodeping, sheets);
    let options = RunOptions::from(&config);

    match output_mode {
        OutputMode::Json => {
            let result = app.run(&options, Utc::now(), &JsonOutput)?;
            JsonOutput::print_run(&result).into_diagnostic()?;
        }
        OutputMode::Text => {
            let result = app.run(&options, Utc::now(), &TextOutput)?;
            TextOutput::print_run(&result).into_diagnostic()?;
        }
    }
    Ok(())
}
