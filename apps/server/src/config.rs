/// Runtime configuration, read once at startup.
///
/// Credentials are optional: a missing quote-vendor key surfaces as a vendor
/// auth failure and the resolver falls back to the other vendor; a missing
/// central-bank token makes the rate resolver serve its documented fallback
/// constant.
pub struct Config {
    pub listen_addr: String,
    pub finnhub_api_key: Option<String>,
    pub polygon_api_key: Option<String>,
    pub banxico_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self {
            listen_addr: env_non_empty("CARTERA_LISTEN_ADDR")
                .unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            finnhub_api_key: env_non_empty("FINNHUB_API_KEY"),
            polygon_api_key: env_non_empty("POLYGON_API_KEY"),
            banxico_token: env_non_empty("BANXICO_API_TOKEN"),
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
