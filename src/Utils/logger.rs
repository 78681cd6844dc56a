//! Terminal logging for blade discretization runs.
//!
//! The selector and the grid builder only emit `log` records; a binary or a test that wants to
//! see them installs a terminal logger once with [`init_term_logger`].
use crate::blade::errors::{BladeGridError, Result};
use log::debug;
use simplelog::*;

/// Maps a level name ("debug", "info", "warn", "error") to a filter; `None` means "info".
pub fn level_filter(loglevel: Option<&str>) -> Result<LevelFilter> {
    match loglevel {
        None => Ok(LevelFilter::Info),
        Some("debug") => Ok(LevelFilter::Debug),
        Some("info") => Ok(LevelFilter::Info),
        Some("warn") => Ok(LevelFilter::Warn),
        Some("error") => Ok(LevelFilter::Error),
        Some(other) => Err(BladeGridError::InvalidInput(format!(
            "loglevel must be debug, info, warn or error, got '{}'",
            other
        ))),
    }
}

/// Installs a terminal logger at `loglevel`. A logger that is already installed is kept.
pub fn init_term_logger(loglevel: Option<&str>) -> Result<()> {
    let level = level_filter(loglevel)?;
    let logger_instance = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
    match logger_instance {
        Ok(()) => debug!("terminal logger installed at {}", level),
        Err(_) => debug!("logger already installed, keeping it"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        assert_eq!(level_filter(None).unwrap(), LevelFilter::Info);
        assert_eq!(level_filter(Some("debug")).unwrap(), LevelFilter::Debug);
        assert_eq!(level_filter(Some("error")).unwrap(), LevelFilter::Error);
        assert!(matches!(
            level_filter(Some("verbose")),
            Err(BladeGridError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        assert!(init_term_logger(Some("warn")).is_ok());
        assert!(init_term_logger(Some("info")).is_ok());
        assert!(init_term_logger(Some("loud")).is_err());
    }
}
