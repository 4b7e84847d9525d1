use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Parser;

use personnel_pdf::{Error, RenderConfig};

/// Render a personnel questionnaire record into a paginated PDF.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Record as JSON
    record: PathBuf,

    /// Directory the PDF is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Render configuration as JSON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Generation date (YYYY-MM-DD), defaults to today
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| format!("{raw:?}: {e}"))
}

fn run(args: Args) -> Result<PathBuf, Error> {
    let config = match &args.config {
        Some(path) => RenderConfig::from_path(path)?,
        None => RenderConfig::default(),
    };
    match args.date {
        Some(date) => {
            personnel_pdf::convert_record_to_pdf_on(&args.record, &args.output_dir, &config, date)
        }
        None => personnel_pdf::convert_record_to_pdf(&args.record, &args.output_dir, &config),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
