use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bus_server::cache::{CacheConfig, CachedDirections};
use bus_server::config::AppConfig;
use bus_server::directions::{DirectionsBackend, DirectionsClient, MockDirectionsClient};
use bus_server::service::ScheduleService;
use bus_server::store::{Catalog, SnapshotFile};
use bus_server::web::{AppState, create_router};

/// How often the stores are written to the snapshot file.
const SNAPSHOT_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bus_server=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    let catalog = Catalog::new();
    let snapshot = config.snapshot_path.clone().map(|p| Arc::new(SnapshotFile::new(p)));
    if let Some(file) = &snapshot {
        match file.load().expect("Failed to load snapshot") {
            Some(saved) => {
                catalog.restore(saved).await;
            }
            None => info!(path = %file.path().display(), "no snapshot yet, starting empty"),
        }
    }

    let backend = if let Some(dir) = &config.directions_mock_dir {
        let mock = MockDirectionsClient::from_dir(dir).expect("Failed to load mock directions");
        info!(responses = mock.len(), "using mock directions");
        DirectionsBackend::Mock(mock)
    } else if let Some(directions) = config.directions() {
        DirectionsBackend::Live(
            DirectionsClient::new(directions).expect("Failed to create directions client"),
        )
    } else {
        DirectionsBackend::Disabled
    };

    let external = config.directions_enabled && !matches!(backend, DirectionsBackend::Disabled);
    if config.directions_enabled && !external {
        warn!("DIRECTIONS_ENABLED is set but no API key or mock directory is configured");
    }

    let provider = CachedDirections::new(backend, &CacheConfig::default());
    let service = ScheduleService::new(catalog.clone(), config.matcher(), provider, config.ingest())
        .with_external_lookups(external);

    // Periodically persist the stores so discovered trips survive restarts.
    if let Some(file) = snapshot.clone() {
        let catalog = catalog.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SNAPSHOT_INTERVAL);
            interval.tick().await; // First tick is immediate, skip it
            loop {
                interval.tick().await;
                save_snapshot(&catalog, &file).await;
            }
        });
    }

    let app = create_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind");
    info!(
        addr = %config.bind_addr,
        external_lookups = external,
        "bus schedule server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    if let Some(file) = &snapshot {
        save_snapshot(&catalog, file).await;
    }
}

async fn save_snapshot(catalog: &Catalog, file: &Arc<SnapshotFile>) {
    let mut snapshot = catalog.snapshot().await;
    let file = Arc::clone(file);
    let result = tokio::task::spawn_blocking(move || {
        let trips = snapshot.trips.len();
        file.save(&mut snapshot).map(|_| trips)
    })
    .await;

    match result {
        Ok(Ok(trips)) => info!(trips, "saved snapshot"),
        Ok(Err(e)) => warn!(error = %e, "failed to save snapshot"),
        Err(e) => warn!(error = %e, "snapshot task failed"),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
