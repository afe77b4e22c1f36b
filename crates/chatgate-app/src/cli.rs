//! CLI argument definitions.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// chatgate - support-chat front door with duplicate-message suppression.
#[derive(Parser, Debug)]
#[command(name = "chatgate", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Data directory for the conversation thread snapshot.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Priority: --config flag > CHATGATE_CONFIG env var > ~/.chatgate/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("CHATGATE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Priority: --port flag > CHATGATE_PORT env var > config file value > 3040.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        if let Ok(val) = std::env::var("CHATGATE_PORT") {
            if let Ok(p) = val.parse::<u16>() {
                return p;
            }
        }
        if config_port != 0 {
            return config_port;
        }
        3040
    }

    /// Returns `None` if not overridden.
    pub fn resolve_data_dir(&self) -> Option<String> {
        self.data_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }

    /// Returns `None` if not overridden.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home).join(rest),
            Err(_) => PathBuf::from(rest),
        },
        None => PathBuf::from(path),
    }
}

fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".chatgate").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("chatgate").chain(argv.iter().copied()))
    }

    #[test]
    fn test_flags_parse() {
        let cli = args(&["--config", "/tmp/c.toml", "-p", "8080", "--log-level", "debug"]);
        assert_eq!(cli.resolve_config_path(), PathBuf::from("/tmp/c.toml"));
        assert_eq!(cli.resolve_port(3040), 8080);
        assert_eq!(cli.resolve_log_level().as_deref(), Some("debug"));
        assert_eq!(cli.resolve_data_dir(), None);
    }

    #[test]
    fn test_port_falls_back_to_config() {
        let cli = args(&[]);
        // CHATGATE_PORT is not set in the test environment.
        if std::env::var("CHATGATE_PORT").is_err() {
            assert_eq!(cli.resolve_port(4000), 4000);
            assert_eq!(cli.resolve_port(0), 3040);
        }
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/srv/chatgate"), PathBuf::from("/srv/chatgate"));
        if let Ok(home) = std::env::var("HOME") {
            assert_eq!(expand_home("~/.chatgate"), PathBuf::from(home).join(".chatgate"));
        }
    }
}
