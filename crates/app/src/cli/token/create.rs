use clap::Args;
use jiff::{SignedDuration, Timestamp};
use salon_app::auth::{Claims, issue_token};
use uuid::Uuid;

const MAX_TTL_HOURS: i64 = 24 * 366;

#[derive(Debug, Args)]
pub(crate) struct CreateTokenArgs {
    /// Shared HS256 secret
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Email recorded in the token
    #[arg(long)]
    email: String,

    /// Optional user UUID; generated when omitted
    #[arg(long)]
    user_uuid: Option<Uuid>,

    /// Grant administrator rights
    #[arg(long)]
    admin: bool,

    /// Lifetime in hours
    #[arg(long, default_value_t = 24)]
    ttl_hours: i64,
}

pub(crate) fn run(args: CreateTokenArgs) -> Result<(), String> {
    if args.jwt_secret.trim().is_empty() {
        return Err("jwt-secret cannot be empty".to_string());
    }

    if !(1..=MAX_TTL_HOURS).contains(&args.ttl_hours) {
        return Err(format!("ttl-hours must be between 1 and {MAX_TTL_HOURS}"));
    }

    let expires_at = Timestamp::now()
        .checked_add(SignedDuration::from_hours(args.ttl_hours))
        .map_err(|error| format!("invalid ttl-hours: {error}"))?;

    let exp = u64::try_from(expires_at.as_second())
        .map_err(|error| format!("invalid expiry: {error}"))?;

    let claims = Claims {
        sub: args.user_uuid.unwrap_or_else(Uuid::now_v7),
        email: args.email,
        is_admin: args.admin,
        exp,
    };

    let token = issue_token(&claims, args.jwt_secret.as_bytes())
        .map_err(|error| format!("failed to create token: {error}"))?;

    println!("user_uuid: {}", claims.sub);
    println!("token_expires_at: {expires_at}");
    println!("bearer_token: {token}");

    Ok(())
}
