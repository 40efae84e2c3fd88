use anyhow::Result;
use clap::Parser;
use std::fs::File;
use tokio::select;
use tracing::{info, level_filters::LevelFilter};
use tts_service::app::{self, AppStateBuilder};
use tts_service::config::{Cli, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.conf {
        Some(ref conf) => Config::load(conf)?,
        None => Config::default(),
    };

    let mut log_fmt = tracing_subscriber::fmt();
    if let Some(ref level) = config.log_level {
        if let Ok(lv) = level.as_str().parse::<LevelFilter>() {
            log_fmt = log_fmt.with_max_level(lv);
        }
    }

    let _guard = if let Some(ref log_file) = config.log_file {
        let file = File::create(log_file)
            .map_err(|e| anyhow::anyhow!("Failed to create log file {}: {}", log_file, e))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        log_fmt.with_writer(non_blocking).try_init().ok();
        Some(guard)
    } else {
        log_fmt.try_init().ok();
        None
    };

    info!("{}", tts_service::version::get_version_info());
    let state = AppStateBuilder::new().config(config).build()?;
    let token = state.token.clone();

    info!("Starting tts-service on {}", state.config.http_addr);
    select! {
        result = app::run(state) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received CTRL+C, shutting down");
            token.cancel();
        }
    }
    Ok(())
}
