use env_logger::Builder;
use error_chain::ChainedError;
use errors::*;
use std::env;

// Job progress and counters are logged at info level unless RUST_LOG says otherwise.
const DEFAULT_LOG_CONFIG: &str = "info";

/// `log_config` picks the filter string used by `init_logger`.
fn log_config(rust_log: Option<String>) -> String {
    match rust_log {
        Some(ref log_config) if !log_config.trim().is_empty() => log_config.to_owned(),
        _ => DEFAULT_LOG_CONFIG.to_owned(),
    }
}

pub fn init_logger() -> Result<()> {
    let mut builder = Builder::new();
    builder.parse_filters(&log_config(env::var("RUST_LOG").ok()));

    builder.try_init().chain_err(|| "Failed to build env_logger")?;
    Ok(())
}

pub fn output_error<E: ChainedError>(err: &E) {
    error!("{}", err);

    for e in err.iter().skip(1) {
        error!("caused by: {}", e);
    }

    if let Some(backtrace) = err.backtrace() {
        error!("backtrace: {:?}", backtrace);
    }
}
