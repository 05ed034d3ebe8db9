//! Lobby terminal client entry point.
//!
//! # Usage
//!
//! ```bash
//! # Public test broker, default namespace
//! lobby --username alice
//!
//! # Private broker
//! lobby --username alice --host 10.0.0.5 --port 1883 --namespace studio/chat
//! ```

use std::time::Duration;

use clap::Parser;
use lobby_cli::{Runtime, TerminalDriver};
use lobby_client::{Namespace, Session, Username, transport::BrokerConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Lobby presence and chat client
#[derive(Parser, Debug)]
#[command(name = "lobby")]
#[command(about = "Friends, presence and direct messages over MQTT")]
#[command(version)]
struct Args {
    /// Identity to appear as
    #[arg(short, long)]
    username: Username,

    /// Broker host
    #[arg(long, default_value = "broker.hivemq.com")]
    host: String,

    /// Broker port
    #[arg(short, long, default_value_t = 1883)]
    port: u16,

    /// Topic prefix shared by every client
    #[arg(long, default_value = Namespace::DEFAULT)]
    namespace: Namespace,

    /// MQTT keep-alive in seconds
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(5..))]
    keep_alive: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn broker_config(&self) -> BrokerConfig {
        BrokerConfig {
            host: self.host.clone(),
            port: self.port,
            keep_alive: Duration::from_secs(self.keep_alive),
            namespace: self.namespace.clone(),
            ..BrokerConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = args.broker_config();
    tracing::info!(
        host = %config.host,
        port = config.port,
        namespace = %config.namespace,
        "starting"
    );

    let session = Session::new(args.username, config.namespace.clone());
    let mut runtime = Runtime::new(TerminalDriver::new(config), session);

    if !runtime.connect().await? {
        tracing::warn!("broker unreachable; use /connect to retry");
    }

    runtime.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["lobby", "--username", "alice"]).unwrap();
        let config = args.broker_config();

        assert_eq!(args.username.as_str(), "alice");
        assert_eq!(config.host, "broker.hivemq.com");
        assert_eq!(config.port, 1883);
        assert_eq!(config.keep_alive, Duration::from_secs(60));
        assert_eq!(config.namespace, Namespace::default());
    }

    #[test]
    fn overrides() {
        let args = Args::try_parse_from([
            "lobby",
            "-u",
            "bob",
            "--host",
            "localhost",
            "-p",
            "1884",
            "--namespace",
            "studio/chat/",
            "--keep-alive",
            "30",
        ])
        .unwrap();
        let config = args.broker_config();

        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 1884);
        assert_eq!(config.namespace.as_str(), "studio/chat");
        assert_eq!(config.keep_alive, Duration::from_secs(30));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(Args::try_parse_from(["lobby"]).is_err());
        assert!(Args::try_parse_from(["lobby", "-u", "a/b"]).is_err());
        assert!(Args::try_parse_from(["lobby", "-u", "global"]).is_err());
        assert!(Args::try_parse_from(["lobby", "-u", "a", "--namespace", "x/+"]).is_err());
        assert!(Args::try_parse_from(["lobby", "-u", "a", "--keep-alive", "1"]).is_err());
    }
}
