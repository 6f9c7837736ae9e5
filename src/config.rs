use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub platform_base_url: String,
    pub platform_api_key: String,
    pub platform_app_id: String,
    pub host: String,
    pub port: u16,
    pub app_base_url: String,
    pub platform_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            platform_base_url: required("PLATFORM_BASE_URL")?,
            platform_api_key: required("PLATFORM_API_KEY")?,
            platform_app_id: required("PLATFORM_APP_ID")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost".into()),
            platform_timeout_seconds: env::var("PLATFORM_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "30".into())
                .parse()?,
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}
