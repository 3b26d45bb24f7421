//! stderr logging shared by both tools

use std::io;

use tracing::Level;

/// Environment variable overriding the log level (`error` .. `trace`)
pub const LOG_ENV: &str = "XXFB_LOG";

/// Install a `tracing` subscriber writing to stderr
///
/// `default` applies unless `XXFB_LOG` names a valid level.
pub fn init(default: Level) {
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| parse_level(&v))
        .unwrap_or(default);

    // 二重初期化はテストなどで起こり得るので無視する
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

fn parse_level(value: &str) -> Option<Level> {
    value.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!(parse_level("debug"), Some(Level::DEBUG));
        assert_eq!(parse_level(" WARN "), Some(Level::WARN));
        assert_eq!(parse_level("loud"), None);
    }
}
