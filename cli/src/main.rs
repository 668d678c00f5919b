//! GlutenScan CLI - classify ingredient text or a label photo for gluten risk.
//!
//! ```text
//! glutenscan [--locale L] [--product NAME] [--heuristics-only] [--sentences] [TEXT...]
//! glutenscan --photo PATH [--heuristics-only] [--sentences]
//! ```
//!
//! Text comes from the positional arguments, or stdin when there are none. The
//! JSON response is printed to stdout; logs go to stderr (`RUST_LOG`, default
//! `warn`).
//!
//! Exit codes: 0 success, 1 service or I/O failure, 2 usage error.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use glutenscan_engine::{AnalysisService, AnalyzeTextRequest, GlutenscanConfig, Settings};

const USAGE: &str = "\
Usage:
  glutenscan [--locale L] [--product NAME] [--heuristics-only] [--sentences] [TEXT...]
  glutenscan --photo PATH [--heuristics-only] [--sentences]

Options:
  --locale L          Locale for the explanation (default from config, else en-US)
  --product NAME      Product name passed to the refinement service
  --photo PATH        Run OCR on an image instead of reading text
  --heuristics-only   Skip the refinement service
  --sentences         Add the sentences that triggered a signal
  -h, --help          Show this help

Text is read from stdin when no TEXT is given.";

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    locale: Option<String>,
    product: Option<String>,
    photo: Option<PathBuf>,
    heuristics_only: bool,
    sentences: bool,
    help: bool,
    text: Vec<String>,
}

fn value_for(flag: &str, args: &mut impl Iterator<Item = String>) -> Result<String, String> {
    args.next()
        .filter(|v| !v.starts_with("--"))
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => parsed.help = true,
            "--heuristics-only" => parsed.heuristics_only = true,
            "--sentences" => parsed.sentences = true,
            "--locale" => parsed.locale = Some(value_for("--locale", &mut args)?),
            "--product" => parsed.product = Some(value_for("--product", &mut args)?),
            "--photo" => parsed.photo = Some(PathBuf::from(value_for("--photo", &mut args)?)),
            "--" => {
                parsed.text.extend(args.by_ref());
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("unknown option: {flag}"));
            }
            _ => parsed.text.push(arg),
        }
    }

    if parsed.photo.is_some() && !parsed.text.is_empty() {
        return Err("--photo cannot be combined with TEXT".to_string());
    }
    Ok(parsed)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries only the JSON response.
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(std::io::stderr),
        )
        .with(env_filter)
        .init();
}

fn load_settings() -> Settings {
    let config = match GlutenscanConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            tracing::warn!(path = %err.path().display(), "{err}; continuing with defaults");
            GlutenscanConfig::default()
        }
    };
    config.settings()
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("failed to read text from stdin")?;
    Ok(text)
}

async fn run(args: CliArgs) -> Result<Value> {
    let mut settings = load_settings();
    if args.heuristics_only {
        settings.refinement.api_key = None;
    }
    if let Some(locale) = &args.locale {
        settings.default_locale.clone_from(locale);
    }
    let service = AnalysisService::from_settings(&settings);

    let (mut output, raw_text) = if let Some(path) = &args.photo {
        let image =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let response = service.analyze_photo(&image).await?;
        (serde_json::to_value(&response)?, response.raw_text)
    } else {
        let text = if args.text.is_empty() {
            read_stdin()?
        } else {
            args.text.join(" ")
        };
        let request = AnalyzeTextRequest {
            text,
            locale: args.locale,
            product_name: args.product,
        };
        let response = service.analyze_text(request).await?;
        (serde_json::to_value(&response)?, response.raw_text)
    };

    if args.sentences {
        let sentences: Vec<&str> =
            glutenscan_engine::glutenscan_core::extract_relevant_sentences(&raw_text).collect();
        output["relevantSentences"] = json!(sentences);
    }
    Ok(output)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("glutenscan: {message}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };
    if args.help {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    match run(args).await {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("glutenscan: {err}");
                ExitCode::from(1)
            }
        },
        Err(err) => {
            eprintln!("glutenscan: {err:#}");
            ExitCode::from(1)
        }
    }
}
