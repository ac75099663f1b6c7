//! Server configuration, parsed from flags and environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Runtime configuration for the HTTP server.
///
/// Every flag also reads from the environment, so containerised deployments
/// can configure the process without a command line.
#[derive(Debug, Clone, Parser)]
#[command(name = "backend", about = "Directory, review, and forum backend")]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// PostgreSQL connection URL; omit to run with volatile in-memory
    /// storage (development only).
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled database connections.
    #[arg(long, env = "DATABASE_POOL_SIZE", default_value_t = 10)]
    pub database_pool_size: u32,

    /// Secret used to sign access tokens.
    #[arg(
        long,
        env = "TOKEN_SECRET",
        hide_env_values = true,
        default_value = "change-me-in-production"
    )]
    pub token_secret: String,

    /// Directory uploaded images are stored in and served from.
    #[arg(long, env = "UPLOAD_DIR", default_value = "static/uploads")]
    pub upload_dir: PathBuf,

    /// Hold new reviews, articles, and comments for moderation instead of
    /// auto-approving them.
    #[arg(long, env = "REQUIRE_CONTENT_REVIEW", default_value_t = false)]
    pub require_content_review: bool,

    /// Email of the admin account to create at startup if missing.
    #[arg(long, env = "ADMIN_EMAIL")]
    pub admin_email: Option<String>,

    /// Password for the bootstrapped admin account.
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_run_without_a_database() {
        let config = ServerConfig::try_parse_from(["backend"]).expect("parses");
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(config.database_url.is_none());
        assert!(!config.require_content_review);
    }

    #[rstest]
    fn flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "backend",
            "--bind-addr",
            "127.0.0.1:9000",
            "--require-content-review",
            "--admin-email",
            "admin@example.net",
        ])
        .expect("parses");
        assert_eq!(config.bind_addr.port(), 9000);
        assert!(config.require_content_review);
        assert_eq!(config.admin_email.as_deref(), Some("admin@example.net"));
    }
}
