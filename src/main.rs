use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, warn};

use domain_tally::utils::{setup_logging, validate_args};
use domain_tally::{count_email_domains, save_report_to_file, save_report_to_stdout, Args, Config};

fn run(args: &Args) -> Result<()> {
    let config = Config::from(args);
    let result = count_email_domains(&args.input, &config)
        .with_context(|| format!("Failed to import {:?}", args.input))?;

    let outcome = match &args.output {
        Some(path) => save_report_to_file(path, &result.domains)?,
        None => save_report_to_stdout(&result.domains),
    };

    if outcome.failed > 0 {
        warn!(
            action = "complete",
            component = "main",
            failed_lines = outcome.failed,
            "Report written with missing lines"
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    validate_args(&args)?;

    if let Err(e) = run(&args) {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
