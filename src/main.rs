use fitdash::storage::{StoreSource, back_up_unreadable, persist_store};
use fitdash::{AppState, load_store, resolve_data_path, router, seed_defaults};
use std::{env, net::SocketAddr};
use tokio::{fs, signal};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let data_path = resolve_data_path();
    if let Some(parent) = data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let (mut store, source) = load_store(&data_path).await;
    match source {
        StoreSource::File => info!("loaded {}", data_path.display()),
        StoreSource::Missing => info!("no data file at {}, starting fresh", data_path.display()),
        StoreSource::Unreadable => {
            back_up_unreadable(&data_path).await?;
        }
    }
    if seed_defaults(&mut store)? {
        persist_store(&data_path, &store).await?;
    }

    let app = router(AppState::new(data_path, store));

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(err) = signal::ctrl_c().await {
                error!("failed to listen for shutdown signal: {err}");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(())
}
