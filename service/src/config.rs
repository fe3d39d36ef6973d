use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::time::Duration;

/// Default TCP port, matching the port MCP clients are usually pointed at.
pub const DEFAULT_PORT: u16 = 3001;

#[derive(Clone, Debug, Parser)]
#[command(author, version, about = "MCP server streaming tool results over Server-Sent Events", long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Seconds between heartbeat frames on an idle event stream
    #[arg(long, env, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub heartbeat_interval_secs: u64,

    /// Maximum number of concurrently connected event stream subscribers (unlimited when unset)
    #[arg(long, env)]
    pub max_sessions: Option<usize>,

    /// Number of register/unregister/broadcast requests the broker queues before producers wait
    #[arg(long, env, default_value_t = sse::manager::DEFAULT_QUEUE_DEPTH)]
    pub broker_queue_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn interface(&self) -> &str {
        self.interface.as_deref().unwrap_or("127.0.0.1")
    }

    /// `interface:port` to bind the listener to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.interface(), self.port)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn broker_config(&self) -> sse::BrokerConfig {
        sse::BrokerConfig {
            queue_depth: self.broker_queue_depth,
            max_sessions: self.max_sessions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_flags() {
        let config = Config::try_parse_from(["mcp_sse_server"]).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.listen_addr(), "127.0.0.1:3001");
        assert_eq!(config.heartbeat_interval(), Duration::from_secs(30));
        assert_eq!(config.log_level_filter, LevelFilter::Info);
        assert_eq!(config.broker_config(), sse::BrokerConfig::default());
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "mcp_sse_server",
            "--port",
            "8080",
            "--interface",
            "0.0.0.0",
            "--max-sessions",
            "10",
            "--broker-queue-depth",
            "4",
            "--heartbeat-interval-secs",
            "5",
            "--log-level-filter",
            "DEBUG",
        ])
        .unwrap();

        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
        assert_eq!(config.heartbeat_interval(), Duration::from_secs(5));
        assert_eq!(config.log_level_filter, LevelFilter::Debug);
        assert_eq!(
            config.broker_config(),
            sse::BrokerConfig {
                queue_depth: 4,
                max_sessions: Some(10),
            }
        );
    }

    #[test]
    fn zero_heartbeat_interval_is_rejected() {
        assert!(
            Config::try_parse_from(["mcp_sse_server", "--heartbeat-interval-secs", "0"]).is_err()
        );
    }
}
