use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Application configuration, layered from defaults, an optional config
/// file, and `WAYPOST__`-prefixed environment variables
/// (e.g. `WAYPOST__MONGODB__URI`).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub mongodb: MongoConfig,
    pub auth: AuthConfig,
    pub upload: UploadConfig,
    /// Optional outbound mail bridge for feedback notifications.
    #[serde(default)]
    pub mail: Option<MailConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    /// Directory served under `/assets`.
    pub assets_dir: String,
    /// Origin allowed to call the feedback API cross-site, if any.
    #[serde(default)]
    pub cors_origin: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub endpoint: String,
    pub preset: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub endpoint: String,
}

impl AppConfig {
    /// Load configuration, optionally from an explicit file.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("server.bind", "127.0.0.1:3000")?
            .set_default("server.assets_dir", "public")?
            .set_default("mongodb.uri", "mongodb://localhost:27017")?
            .set_default("mongodb.database", "waypost")?
            .set_default("auth.base_url", "http://localhost:9099/")?
            .set_default("auth.api_key", "dev-key")?
            .set_default("upload.endpoint", "http://localhost:9199/upload")?
            .set_default("upload.preset", "waypost-dev")?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("WAYPOST")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .context("Failed to assemble configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}
