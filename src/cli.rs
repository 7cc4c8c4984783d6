//! Command-line interface definition for Plotforge

use clap::Parser;

/// Command line arguments for the Plotforge dashboard server
#[derive(Parser, Debug, Clone)]
#[command(
    name = "plotforge",
    about = "LLM-assisted chart builder dashboard",
    version
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Address to bind the server to (overrides config)
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to bind the server to (overrides config)
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Provider to use: groq or ollama (overrides config)
    #[arg(long, value_name = "PROVIDER")]
    pub provider: Option<String>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Configuration file path, defaulting to `config/config.yaml`
    pub fn config_path(&self) -> &str {
        self.config.as_deref().unwrap_or("config/config.yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["plotforge"]);
        assert!(cli.config.is_none());
        assert_eq!(cli.config_path(), "config/config.yaml");
        assert!(!cli.verbose);
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "plotforge",
            "--config",
            "custom.yaml",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--provider",
            "ollama",
            "--verbose",
        ]);
        assert_eq!(cli.config_path(), "custom.yaml");
        assert_eq!(cli.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(cli.port, Some(9000));
        assert_eq!(cli.provider.as_deref(), Some("ollama"));
        assert!(cli.verbose);
    }
}
