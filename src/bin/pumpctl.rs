//! Valve and pump controller server.
//!
//! Drives the valve and pump relays, optionally runs the periodic open/run
//! cycle, and serves the HTTP API and web UI behind Basic auth.
//!
//! # Run
//!
//! ```bash
//! # Simulated relay, cycle every 30s for 5s
//! pumpctl --test --cycle --username admin --password secret
//!
//! # Hardware lines (ESP32 build)
//! pumpctl --valve-line GPIO2 --pump-line GPIO3 --username admin --password secret
//!
//! # HTTPS
//! pumpctl --test --tls-cert cert.pem --tls-key key.pem --port 8443
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pumpctl::hal::esp32::pins;
use pumpctl::hal::SimulatedRelay;
use pumpctl::services::{
    run_server, spawn_cycle, BasicAuth, HomePage, SharedPumpState, WebServerConfig,
};
use pumpctl::{
    AuthConfig, Config, ConfigError, CycleConfig, PumpController, Relay, RelayConfig, WebConfig,
};

/// Relay selected once at startup.
type DynRelay = Box<dyn Relay + Send>;

/// Valve and pump controller.
#[derive(Parser, Debug)]
#[command(name = "pumpctl")]
#[command(about = "Run the valve/pump controller and its HTTP API")]
#[command(version)]
struct Cli {
    /// How long the valve stays open each cycle, in seconds.
    #[arg(long, env = "PUMPCTL_DURATION", default_value_t = 5)]
    duration: u32,

    /// Time between cycles, in seconds.
    #[arg(long, env = "PUMPCTL_PERIOD", default_value_t = 30)]
    period: u32,

    /// Use the simulated relay instead of hardware lines.
    #[arg(long, env = "PUMPCTL_TEST")]
    test: bool,

    /// Username for HTTP authentication.
    #[arg(long, env = "PUMPCTL_USERNAME", default_value = "")]
    username: String,

    /// Password for HTTP authentication.
    #[arg(long, env = "PUMPCTL_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    /// Port to listen on.
    #[arg(long, env = "PUMPCTL_PORT", default_value_t = 8080)]
    port: u16,

    /// Run the periodic cycle.
    #[arg(long, env = "PUMPCTL_CYCLE")]
    cycle: bool,

    /// Output line driving the valve relay.
    #[arg(long, env = "PUMPCTL_VALVE_LINE", default_value = pins::VALVE)]
    valve_line: String,

    /// Output line driving the pump relay.
    #[arg(long, env = "PUMPCTL_PUMP_LINE", default_value = pins::PUMP)]
    pump_line: String,

    /// Allow cross-origin requests from any origin.
    #[arg(long, env = "PUMPCTL_CORS")]
    cors: bool,

    /// PEM certificate chain; serves HTTPS together with --tls-key.
    #[arg(long, env = "PUMPCTL_TLS_CERT", requires = "tls_key")]
    tls_cert: Option<PathBuf>,

    /// PEM private key for --tls-cert.
    #[arg(long, env = "PUMPCTL_TLS_KEY", requires = "tls_cert")]
    tls_key: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> Result<Config, ConfigError> {
        let config = Config::default()
            .with_cycle(
                CycleConfig::default()
                    .with_open_duration_secs(self.duration)
                    .with_period_secs(self.period),
            )
            .with_relay(
                RelayConfig::default()
                    .with_simulated(self.test)
                    .with_lines(&self.valve_line, &self.pump_line)?,
            )
            .with_web(
                WebConfig::default()
                    .with_port(self.port)
                    .with_cors(self.cors),
            )
            .with_auth(AuthConfig::new(&self.username, &self.password)?);
        config.validate()?;
        Ok(config)
    }

    fn web_server_config(&self, config: &WebConfig) -> WebServerConfig {
        let web = WebServerConfig::from_config(config);
        match (&self.tls_cert, &self.tls_key) {
            (Some(cert), Some(key)) => web.with_tls(cert, key),
            _ => web,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = cli.config().context("invalid configuration")?;

    let relay = open_relay(&config.relay).context("failed to bring up actuators")?;
    let state = Arc::new(SharedPumpState::new(PumpController::new(relay)));

    if config.auth.is_open() {
        warn!("HTTP credentials are empty; anyone who knows the username can control the pump");
    }

    if cli.cycle {
        spawn_cycle(Arc::clone(&state), config.cycle);
    } else {
        info!("periodic cycle not started");
    }

    let page = HomePage::render(&config.cycle);
    let auth = BasicAuth::new(&config.auth);
    let web_config = cli.web_server_config(&config.web);

    run_server(Arc::clone(&state), page, auth, web_config, shutdown_signal())
        .await
        .context("web server failed")?;

    info!("shutting down, de-energising actuators");
    state.stop();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

fn open_relay(config: &RelayConfig) -> Result<DynRelay, ConfigError> {
    if config.simulated {
        info!("using simulated relay");
        return Ok(Box::new(SimulatedRelay::new()));
    }
    open_hardware(config)
}

#[cfg(feature = "esp32")]
fn open_hardware(config: &RelayConfig) -> Result<DynRelay, ConfigError> {
    use pumpctl::hal::esp32::Esp32Lines;
    use pumpctl::hal::LineRelay;

    let relay = LineRelay::open(Esp32Lines::new(), &config.valve_line, &config.pump_line)?;
    Ok(Box::new(relay))
}

#[cfg(not(feature = "esp32"))]
fn open_hardware(_config: &RelayConfig) -> Result<DynRelay, ConfigError> {
    Err(ConfigError::Invalid(
        "no hardware line platform compiled in; use --test for the simulated relay".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lines_are_the_board_pins() {
        let cli = Cli::try_parse_from(["pumpctl"]).unwrap();
        let config = cli.config().unwrap();

        assert_eq!(config.relay.valve_line.as_str(), pins::VALVE);
        assert_eq!(config.relay.pump_line.as_str(), pins::PUMP);
        assert!(cli.web_server_config(&config.web).tls.is_none());
    }

    #[test]
    fn tls_needs_both_files() {
        assert!(Cli::try_parse_from(["pumpctl", "--tls-cert", "cert.pem"]).is_err());
        assert!(Cli::try_parse_from(["pumpctl", "--tls-key", "key.pem"]).is_err());

        let cli = Cli::try_parse_from([
            "pumpctl",
            "--tls-cert",
            "cert.pem",
            "--tls-key",
            "key.pem",
        ])
        .unwrap();
        let web = cli.web_server_config(&cli.config().unwrap().web);
        let tls = web.tls.unwrap();
        assert_eq!(tls.cert, PathBuf::from("cert.pem"));
        assert_eq!(tls.key, PathBuf::from("key.pem"));
    }
}
