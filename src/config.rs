use crate::synthesis::SynthesisOption;
use anyhow::Error;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(version, about = "Text-to-speech HTTP service")]
pub struct Cli {
    /// Path to a TOML config file, built-in defaults are used when omitted
    #[clap(long)]
    pub conf: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub http_addr: String,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
    /// Directory that holds per-request audio artifacts until they are sent.
    pub artifact_dir: String,
    /// Upper bound on the number of characters accepted in one request.
    pub max_text_length: usize,
    /// Request paths that are not written to the access log, `/prefix*` matches a prefix.
    pub access_log_skip: Vec<String>,
    pub synthesis: SynthesisOption,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:8001".to_string(),
            log_level: Some("info".to_string()),
            log_file: None,
            artifact_dir: ".".to_string(),
            max_text_length: 5000,
            access_log_skip: vec!["/health".to_string()],
            synthesis: SynthesisOption::default(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(
            &std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("{}: {}", e, path))?,
        )?;
        config.synthesis.validate()?;
        Ok(config)
    }
}
