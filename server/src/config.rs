use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use connect4::Mode;

/// Serve a single Connect 4 match over HTTP.
#[derive(Debug, Parser)]
#[command(name = "server", about = "Serve a Connect 4 match over HTTP")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "CONNECT4_ADDR", default_value = "0.0.0.0:8080")]
    pub addr: SocketAddr,

    /// Directory served under /static
    #[arg(long, env = "CONNECT4_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Mode of the match created at startup: twoPlayer or ai
    #[arg(long, env = "CONNECT4_MODE", default_value = "twoPlayer")]
    pub mode: Mode,

    /// Tracing filter directive
    #[arg(long, env = "CONNECT4_LOG", default_value = "info,tower_http=debug")]
    pub log: String,

    /// Seed for the automated side's random fallback
    #[arg(long, env = "CONNECT4_SEED")]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["server"]).unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.mode, Mode::TwoPlayer);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "server",
            "--mode",
            "ai",
            "--addr",
            "127.0.0.1:3000",
            "--seed",
            "9",
        ])
        .unwrap();
        assert_eq!(config.mode, Mode::VsAutomated);
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(Config::try_parse_from(["server", "--mode", "solo"]).is_err());
    }
}
