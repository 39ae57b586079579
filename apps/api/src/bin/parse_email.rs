use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use jobtrack::config::Config;
use jobtrack::parser::{EmailParser, RawEmail};

#[derive(Parser, Debug)]
#[command(
    name = "parse-email",
    about = "Extract job application details from an email and print them as JSON",
    version
)]
struct Cli {
    /// Read the email body from this file instead of stdin
    #[arg(long)]
    file: Option<PathBuf>,
    /// Subject line of the email
    #[arg(long)]
    subject: Option<String>,
    /// Sender of the email
    #[arg(long)]
    sender: Option<String>,
    /// Fail when the overall confidence is below the cutoff
    #[arg(long)]
    strict: bool,
    /// Cutoff used by --strict (defaults to REVIEW_THRESHOLD)
    #[arg(long, requires = "strict", value_parser = parse_confidence)]
    min_confidence: Option<f64>,
}

fn parse_confidence(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is outside 0.0..=1.0"))
    }
}

fn read_body(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read email body from {}", path.display())),
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read email body from stdin")?;
            Ok(body)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    jobtrack::init_tracing(env!("CARGO_CRATE_NAME"), &config.rust_log);

    let email = RawEmail {
        subject: cli.subject,
        sender: cli.sender,
        body: read_body(cli.file.as_ref())?,
        ..RawEmail::default()
    };

    let parser = EmailParser::new()?.with_max_input_bytes(config.max_input_bytes);
    let result = parser.parse_email(&email);
    println!("{}", serde_json::to_string_pretty(&result)?);

    if cli.strict {
        let cutoff = cli.min_confidence.unwrap_or(config.review_threshold);
        if result.needs_review(cutoff) {
            bail!(
                "overall confidence {:.2} is below the strict cutoff {:.2}",
                result.confidence_score,
                cutoff
            );
        }
    }

    Ok(())
}
