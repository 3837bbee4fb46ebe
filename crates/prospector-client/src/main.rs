use prospector_client::{ClientConfig, FailureReason, ServerStatusInfo, SessionConfig, StatusSession};
use prospector_protocol_versions::{release_name, VersionTables};
use std::path::PathBuf;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config/client.toml"));
    let config = ClientConfig::load(&path)?;
    info!(
        "Config loaded: {} servers, protocol={}, timeout={}ms",
        config.servers.len(),
        config.protocol_version,
        config.timeout_ms
    );
    if config.servers.is_empty() {
        warn!("No servers configured in {}", path.display());
        return Ok(());
    }

    // Independent sessions, one task per server.
    let mut tasks = JoinSet::new();
    for session in config.sessions() {
        let fallbacks = config.fallback_protocol_versions.clone();
        tasks.spawn(ping_with_fallback(session, fallbacks));
    }

    let mut failed = 0usize;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((address, Ok(status))) => report(&address, &status),
            Ok((address, Err(reason))) => {
                failed += 1;
                error!("{}: {}", address, reason);
            }
            Err(e) => {
                failed += 1;
                error!("Status task panicked: {}", e);
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{} of {} servers could not be reached", failed, config.servers.len());
    }
    Ok(())
}

/// Ping at the primary version, then at each fallback with a fresh session.
async fn ping_with_fallback(
    primary: SessionConfig,
    fallbacks: Vec<i32>,
) -> (String, Result<ServerStatusInfo, FailureReason>) {
    let address = primary.address();
    let mut result = StatusSession::new(primary.clone()).run().await;
    for version in fallbacks {
        let Err(reason) = &result else { break };
        warn!("{}: {}, retrying with protocol {}", address, reason, version);
        result = StatusSession::new(primary.clone().with_protocol_version(version))
            .run()
            .await;
    }
    (address, result)
}

fn report(address: &str, status: &ServerStatusInfo) {
    info!(
        "{}: {} (protocol {}) {}/{} players, {}ms - {}",
        address,
        status.version_name,
        status.protocol_version,
        status.player_count,
        status.player_limit,
        status.latency_ms,
        status.description
    );
    match VersionTables::for_protocol(status.protocol_version) {
        Ok(tables) => info!(
            "{}: codec tables available for {} ({} components, {} particles)",
            address,
            release_name(tables.protocol()).unwrap_or("unknown release"),
            tables.components().len(),
            tables.particles().len()
        ),
        Err(e) => warn!("{}: {}", address, e),
    }
    if let Some(png) = status.favicon_png() {
        info!("{}: favicon {} bytes", address, png.len());
    }
}
