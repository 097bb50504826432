use std::str::FromStr;
use tracing::Level;

// required to enable CloudWatch error logging by the runtime
pub fn setup_tracing() {
    let level = std::env::var("LMS_LOG_LEVEL").ok()
        .and_then(|lvl| Level::from_str(lvl.as_str()).ok())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        // disable printing the name of the module in every log line.
        .with_target(false)
        // this needs to be set to false, otherwise ANSI color codes will
        // show up in a confusing manner in CloudWatch logs.
        .with_ansi(false)
        // disabling time is handy because CloudWatch will add the ingestion time.
        .without_time()
        .json()
        .init();
}
