use std::env;
use std::error::Error;
use std::time::Duration;

use reco::app;
use reco::config::{AppEnv, Config};
use reco::services::admin_users::ensure_default_admin_user;
use reco::utils::database_url::resolve_database_url;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("reco=info,tower_http=info"));

    let production = env::var("APP_ENV").is_ok_and(|v| v.eq_ignore_ascii_case("production"));
    if production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(JsonStorageLayer)
            .with(BunyanFormattingLayer::new("reco".into(), std::io::stdout))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;
    if config.app_env == AppEnv::Production {
        info!("Running in production mode");
    }

    let database_url = resolve_database_url(&|key: &str| env::var(key).ok())?;

    // Lazy so the server comes up even when the database does not.
    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy(&database_url)?;

    match sqlx::migrate!("./migrations").run(&db_pool).await {
        Ok(()) => {
            info!("Database migrations applied");
            if let Err(e) = ensure_default_admin_user(
                &db_pool,
                config.password_login_enabled,
                config.default_admin.as_ref(),
            )
            .await
            {
                error!(error = %e, "Default admin bootstrap failed");
            }
        }
        Err(e) => error!(error = %e, "Database unavailable at startup, migrations skipped"),
    }

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address).await?;
    info!("Server listening on {address}");

    axum::serve(listener, app(db_pool, config)).await?;
    Ok(())
}
