use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub auth_jwt_secret: String, // HS256 secret shared with the auth provider
    pub auth_audience: String,
    pub request_timeout_secs: u64,
    pub read_retry_attempts: u32,
    pub allow_complete_unassigned: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            auth_jwt_secret: env::var("AUTH_JWT_SECRET").expect("AUTH_JWT_SECRET must be set (auth provider JWT secret)"),
            auth_audience: env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "authenticated".to_string()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS").unwrap_or_else(|_| "10".to_string()).parse().expect("REQUEST_TIMEOUT_SECS must be a number"),
            read_retry_attempts: env::var("READ_RETRY_ATTEMPTS").unwrap_or_else(|_| "2".to_string()).parse().expect("READ_RETRY_ATTEMPTS must be a number"),
            allow_complete_unassigned: parse_flag(env::var("ALLOW_COMPLETE_UNASSIGNED").ok().as_deref(), true),
        }
    }
}

fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
