use anyhow::{Context, bail};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;

/// Directive applied unless `enable_tracing` is set: keeps per-keystroke and
/// per-transition debug events out of the logs.
const QUIET_ENGINE: &str = "ramp_engine=info";

fn filter_directives(config: &AppConfig) -> String {
    if config.enable_tracing {
        config.log_level.clone()
    } else {
        format!("{},{}", config.log_level, QUIET_ENGINE)
    }
}

fn rotation(name: &str) -> anyhow::Result<Rotation> {
    Ok(match name {
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        "never" => Rotation::NEVER,
        other => bail!("unknown log rotation {:?}, expected hourly, daily or never", other),
    })
}

/// Install the global subscriber: a rolling file layer (JSON or text) plus,
/// in text mode, a colored stdout layer.
///
/// Keep the returned guard alive for the process lifetime or buffered file
/// output is lost. `RUST_LOG` overrides the configured level.
pub fn init_logging(config: &AppConfig) -> anyhow::Result<WorkerGuard> {
    let file_appender =
        RollingFileAppender::new(rotation(&config.rotation)?, &config.log_dir, &config.log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.use_json {
        // Targets stay in JSON so log queries can filter by module
        let file_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(non_blocking)
            .with_ansi(false);
        registry.with(file_layer).try_init()
    } else {
        let file_layer = fmt::layer()
            .with_target(false)
            .with_writer(non_blocking)
            .with_ansi(false);
        let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
        registry.with(file_layer).with(stdout_layer).try_init()
    };
    installed.context("Failed to install tracing subscriber")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(level: &str, enable_tracing: bool) -> AppConfig {
        AppConfig {
            log_level: level.into(),
            log_dir: "./logs".into(),
            log_file: "ramp.log".into(),
            use_json: false,
            rotation: "never".into(),
            enable_tracing,
            engine: Default::default(),
        }
    }

    #[test]
    fn test_filter_directives() {
        assert_eq!(filter_directives(&config("debug", true)), "debug");
        assert_eq!(
            filter_directives(&config("debug", false)),
            "debug,ramp_engine=info"
        );
    }

    #[test]
    fn test_rotation_names() {
        assert_eq!(rotation("hourly").unwrap(), Rotation::HOURLY);
        assert_eq!(rotation("never").unwrap(), Rotation::NEVER);
        assert!(rotation("weekly").is_err());
    }
}
