use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub backend_url: String,
    pub backend_api_key: String,
    pub backend_jwt_secret: String,
    pub port: u16,
    pub oauth_redirect_delay: Duration,
    pub backend_timeout: Option<Duration>,
    pub cookie_secure: bool,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            backend_url: env::var("BACKEND_URL").expect("BACKEND_URL must be set"),
            backend_api_key: env::var("BACKEND_ANON_KEY").expect("BACKEND_ANON_KEY must be set"),
            backend_jwt_secret: env::var("BACKEND_JWT_SECRET").expect("BACKEND_JWT_SECRET must be set (HS256 secret)"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            oauth_redirect_delay: Duration::from_millis(
                env::var("OAUTH_REDIRECT_DELAY_MS")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .expect("OAUTH_REDIRECT_DELAY_MS must be a number of milliseconds"),
            ),
            backend_timeout: env::var("BACKEND_TIMEOUT_SECS")
                .ok()
                .map(|s| Duration::from_secs(s.parse().expect("BACKEND_TIMEOUT_SECS must be a number"))),
            cookie_secure: env::var("COOKIE_SECURE").map(|v| v != "false" && v != "0").unwrap_or(true),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string()),
        }
    }
}
