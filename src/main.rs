use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use waypost::auth::provider::{AuthProvider, RestAuthProvider};
use waypost::config::AppConfig;
use waypost::db::feedback_repository::{FeedbackRepository, MongoFeedbackRepository};
use waypost::db::repository::{MongoPageRepository, PageRepository};
use waypost::db::shell_repository::{MongoShellRepository, ShellRepository};
use waypost::mail::{HttpMailBridge, MailBridge};
use waypost::state::AppState;
use waypost::upload::client::{HttpUploadClient, UploadClient};

#[derive(Debug, Parser)]
#[command(name = "waypost", about = "Wiki content-management server")]
struct Args {
    /// Path to a configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the bind address from the configuration.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waypost=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    tracing::info!("Starting Waypost server...");

    // Connect to MongoDB
    let mongo_client = mongodb::Client::with_uri_str(&config.mongodb.uri)
        .await
        .context("Failed to connect to MongoDB")?;
    let db = mongo_client.database(&config.mongodb.database);

    let pages: Arc<dyn PageRepository> = Arc::new(MongoPageRepository::new(&db));
    let feedback: Arc<dyn FeedbackRepository> = Arc::new(MongoFeedbackRepository::new(&db));
    let shells: Arc<dyn ShellRepository> = Arc::new(MongoShellRepository::new(&db));

    tracing::info!("Connected to MongoDB at {}", config.mongodb.uri);

    // One HTTP client shared by every outbound collaborator
    let http = reqwest::Client::new();

    let auth: Arc<dyn AuthProvider> = Arc::new(RestAuthProvider::new(
        http.clone(),
        &config.auth.base_url,
        config.auth.api_key.clone(),
    )?);

    let uploader: Arc<dyn UploadClient> = Arc::new(HttpUploadClient::new(
        http.clone(),
        &config.upload.endpoint,
        config.upload.preset.clone(),
    )?);

    let mailer: Option<Arc<dyn MailBridge>> = match &config.mail {
        Some(mail) => Some(Arc::new(HttpMailBridge::new(http.clone(), &mail.endpoint)?)),
        None => {
            tracing::info!("No mail bridge configured; feedback notifications disabled");
            None
        }
    };

    let state = AppState {
        pages,
        feedback,
        shells,
        auth,
        uploader,
        mailer,
    };

    let mut app = waypost::app::router(state)
        .nest_service("/assets", ServeDir::new(&config.server.assets_dir));

    if let Some(origin) = &config.server.cors_origin {
        let origin = origin
            .parse::<axum::http::HeaderValue>()
            .context("Invalid CORS origin")?;
        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers([axum::http::header::CONTENT_TYPE]);
        app = app.layer(cors);
    }

    // Start the server
    tracing::info!("Listening on http://{}", config.server.bind);
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;

    Ok(())
}
