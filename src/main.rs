use anyhow::{Context, Result};
use scope_config::AppConfig;
use scope_cycle::{LogPresenter, PeriodicTask, PipelineState};
use scope_egress::EgressForwarder;
use scope_telemetry::TelemetryListener;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Period between simulated telemetry datagrams.
const SIMULATOR_PERIOD: Duration = Duration::from_millis(20);

fn load_or_default_config() -> AppConfig {
    match scope_config::load_config() {
        Ok((config, true)) => config,
        Ok((config, false)) => {
            // First run: leave a template next to where the config is looked up.
            if let Err(e) = scope_config::save_config(&config) {
                warn!(?e, "Failed to write default config");
            }
            config
        }
        Err(e) => {
            warn!(?e, "Failed to load config, using defaults");
            AppConfig::default()
        }
    }
}

/// Where the simulator should send: the listener's own address, or loopback when it
/// listens on every interface.
fn simulator_target(listener: &TelemetryListener) -> Result<SocketAddr> {
    let mut target = listener.local_addr()?;
    if target.ip().is_unspecified() {
        let loopback = match target.ip() {
            IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
        };
        target.set_ip(loopback);
    }
    Ok(target)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "scope_tracker=info,scope_cycle=info,scope_telemetry=info,scope_egress=info,scope_config=info"
                    .into()
            }),
        )
        .init();

    info!("Scope tracker starting");

    let config = load_or_default_config();
    info!(
        listen = %config.telemetry.socket_addr(),
        egress = config.egress.enabled,
        tick_ms = config.cycle.tick_ms,
        "Config loaded"
    );

    let listener = TelemetryListener::bind(&config.telemetry)
        .with_context(|| format!("binding telemetry socket {}", config.telemetry.socket_addr()))?;

    // Egress is optional: without it the tracker still drives the display.
    let egress = if config.egress.enabled {
        match EgressForwarder::new(&config.egress) {
            Ok(forwarder) => Some(forwarder),
            Err(e) => {
                warn!(?e, "Egress unavailable, continuing without viewer sync");
                None
            }
        }
    } else {
        info!("Egress disabled");
        None
    };

    let simulator_cancel = Arc::new(AtomicBool::new(false));
    let simulator = if config.telemetry.simulate {
        let target = simulator_target(&listener)?;
        Some(tokio::spawn(scope_telemetry::sim::run_simulator(
            target,
            SIMULATOR_PERIOD,
            simulator_cancel.clone(),
        )))
    } else {
        None
    };

    let state = PipelineState::new(&config, listener, egress);
    let cycle = PeriodicTask::spawn(config.cycle.period(), state, LogPresenter::new());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    simulator_cancel.store(true, Ordering::Relaxed);
    cycle.cancel();

    let state = cycle.join().await?;
    if let Some(simulator) = simulator {
        if let Err(e) = simulator.await? {
            warn!(?e, "Simulator exited with error");
        }
    }

    info!(
        stats = ?state.stats(),
        datagrams = state.listener().received(),
        egress = ?state.egress().map(|e| e.stats()),
        "Scope tracker stopped"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scope_config::TelemetryConfig;

    fn listener_on(bind_addr: &str) -> TelemetryListener {
        TelemetryListener::bind(&TelemetryConfig {
            bind_addr: bind_addr.into(),
            port: 0,
            ..TelemetryConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn simulator_targets_loopback_for_wildcard_bind() {
        let listener = listener_on("0.0.0.0");
        let target = simulator_target(&listener).unwrap();
        assert_eq!(target.ip(), IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(target.port(), listener.local_addr().unwrap().port());
    }

    #[test]
    fn simulator_targets_the_bound_address() {
        let listener = listener_on("127.0.0.1");
        let target = simulator_target(&listener).unwrap();
        assert_eq!(target, listener.local_addr().unwrap());
    }
}
