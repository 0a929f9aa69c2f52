use crate::config::Config;
use crate::datasource::{Result, TldSource};
use async_trait::async_trait;
use lazy_static::lazy_static;
use log::info;
use regex::Regex;
use simple_error::SimpleError;
use std::time::Duration;

pub const IANA_TLD_URL: &str = "https://data.iana.org/TLD/tlds-alpha-by-domain.txt";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub struct IanaTldSource {
    url: String,
    client: reqwest::Client,
}

impl IanaTldSource {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            url: config.tld_url.clone(),
            client,
        })
    }
}

#[async_trait]
impl TldSource for IanaTldSource {
    async fn fetch_delegated_tlds(&self) -> Result<Vec<String>> {
        info!("Grabbing the list of delegated TLDs from {}", self.url);
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let tlds = parse_tld_list(&body)?;
        info!("Registry publishes {} TLDs.", tlds.len());
        Ok(tlds)
    }
}

/// Drops comment and blank lines and lowercases the rest. Every remaining
/// line must be a single DNS label.
pub fn parse_tld_list(body: &str) -> Result<Vec<String>> {
    lazy_static! {
        static ref LABEL_REGEX: Regex = Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$").unwrap();
    }
    let mut tlds = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() || line.contains('#') {
            continue;
        }
        let tld = line.to_lowercase();
        if !LABEL_REGEX.is_match(&tld) {
            return Err(SimpleError::new(format!("unexpected entry in TLD list: {:?}", line)).into());
        }
        tlds.push(tld);
    }
    if tlds.is_empty() {
        return Err(SimpleError::new("TLD list is empty").into());
    }
    Ok(tlds)
}
