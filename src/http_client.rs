use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue};

use crate::config::AppConfig;

pub const API_TOKEN_HEADER: &str = "X-API-Token";
const USER_AGENT: &str = concat!("epl_terminal/", env!("CARGO_PKG_VERSION"));

pub fn build_http_client(config: &AppConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    let token =
        HeaderValue::from_str(&config.api_token).context("api token is not a valid header")?;
    headers.insert(API_TOKEN_HEADER, token);

    Client::builder()
        .timeout(config.request_timeout)
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()
        .context("failed to build http client")
}
