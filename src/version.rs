use chrono::{DateTime, Local};

fn build_time() -> DateTime<Local> {
    let build_timestamp: i64 = env!("BUILD_TIME").parse().unwrap_or(0);
    DateTime::from_timestamp(build_timestamp, 0)
        .map(|utc| utc.with_timezone(&Local))
        .unwrap_or_else(Local::now)
}

pub fn get_version_info() -> String {
    format!(
        "tts-service {}\n\
         Build Time: {}\n\
         Git Commit: {}",
        env!("CARGO_PKG_VERSION"),
        build_time().format("%Y-%m-%d %H:%M:%S %Z"),
        env!("GIT_COMMIT_HASH"),
    )
}

pub fn get_short_version() -> String {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_COMMIT_HASH")
    )
}

/// Sent as the `User-Agent` of outbound requests to a remote tts-service.
pub fn get_useragent() -> String {
    format!(
        "tts-service/{} (built {})",
        env!("CARGO_PKG_VERSION"),
        build_time().format("%Y-%m-%d")
    )
}
