use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};

use tts_service::synthesis::{
    synthesize_with_timeout, GoogleTtsClient, SynthesisClient, SynthesisOption,
};

/// Convert text to an MP3 file using text-to-speech
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input text to convert to speech
    #[arg(value_name = "TEXT")]
    input_text: String,

    /// Path to output MP3 file, parent directories are created
    #[arg(value_name = "OUTPUT")]
    output_file: PathBuf,

    /// Language of the text
    #[arg(short, long, default_value = "en")]
    lang: String,

    /// Top level domain of the translate host
    #[arg(long, default_value = "com")]
    tld: String,

    /// Read the text more slowly
    #[arg(short, long)]
    slow: bool,

    /// Base URL overriding the translate host
    #[arg(long)]
    endpoint: Option<String>,

    /// Seconds to wait for the synthesis to finish
    #[arg(short, long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let option = SynthesisOption {
        lang: args.lang,
        tld: args.tld,
        slow: args.slow,
        endpoint: args.endpoint,
        timeout_secs: args.timeout,
        ..Default::default()
    };
    option.validate()?;

    let client = GoogleTtsClient::new(reqwest::Client::new());
    info!(
        provider = %client.provider(),
        lang = option.lang.as_str(),
        "Synthesizing {} characters",
        args.input_text.chars().count()
    );
    let audio = synthesize_with_timeout(&client, &args.input_text, &option)
        .await
        .context("Speech synthesis failed")?;

    if let Some(parent) = args.output_file.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    tokio::fs::write(&args.output_file, &audio)
        .await
        .with_context(|| format!("Failed to write {}", args.output_file.display()))?;

    info!(
        "Audio file saved to: {} ({} bytes)",
        args.output_file.display(),
        audio.len()
    );
    Ok(())
}
