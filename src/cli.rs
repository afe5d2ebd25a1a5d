//! Command-line and environment configuration
//!
//! The addon is deploy-anywhere: everything is configurable from the
//! environment so it runs unchanged under systemd, Docker or a PaaS.
//!
//! ```bash
//! titrari-addon --port 7000
//! PORT=8080 BASE_URL=https://subs.example.com titrari-addon
//! ```

use clap::Parser;

/// titrari-addon - Stremio subtitle addon for titrari.ro
#[derive(Parser, Debug)]
#[command(
    name = "titrari-addon",
    version,
    about = "Stremio addon serving Romanian subtitles from titrari.ro",
    long_about = "Scrapes titrari.ro for Romanian subtitles, filters series \
                  results down to the requested episode, and serves extracted, \
                  UTF-8 decoded subtitle text over HTTP for Stremio."
)]
pub struct Cli {
    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value = "7000")]
    pub port: u16,

    /// Externally reachable base URL, used in proxy download links
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<String>,
}

impl Cli {
    /// The base URL handed to players; defaults to the local listen address
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| format!("http://127.0.0.1:{}", self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["titrari-addon"]);
        assert_eq!(cli.port, 7000);
        assert_eq!(cli.effective_base_url(), "http://127.0.0.1:7000");
    }

    #[test]
    fn test_explicit_base_url_wins() {
        let cli = Cli::parse_from([
            "titrari-addon",
            "--port",
            "9000",
            "--base-url",
            "https://subs.example.com",
        ]);
        assert_eq!(cli.port, 9000);
        assert_eq!(cli.effective_base_url(), "https://subs.example.com");
    }
}
