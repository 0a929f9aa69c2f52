use crate::config::{Config, Transport};
use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use std::time::Duration;

pub mod dig;
pub mod native;

/// Hard ceiling on one transfer, however steadily the server keeps sending.
pub const TRANSFER_LIMIT: Duration = Duration::from_secs(60 * 60);

/// Executes one AXFR exchange against one nameserver.
#[async_trait]
pub trait ZoneTransfer: Send + Sync {
    /// Returns whatever the exchange produced. Network problems never escape as
    /// errors: they show up in the text or as an empty response. `timeout`
    /// bounds how long the server may stay silent, not the whole transfer.
    async fn probe(&self, domain: &str, nameserver: &str, timeout: Duration) -> String;
}

pub fn build_transfer(config: &Config, resolver: TokioAsyncResolver) -> Box<dyn ZoneTransfer> {
    match config.transport {
        Transport::Dig => Box::new(dig::DigTransfer::new(config.dig_path.clone())),
        Transport::Native => Box::new(native::NativeTransfer::new(resolver)),
    }
}
