//! Auth Config

use clap::Args;

/// Bearer token verification settings.
#[derive(Debug, Args)]
pub struct AuthConfig {
    /// Shared HS256 secret used to verify bearer tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,
}
