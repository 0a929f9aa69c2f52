use async_trait::async_trait;
use std::error::Error;

pub mod iana;
pub mod snapshot;

pub type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;

/// Where the list of delegated top-level domains comes from.
#[async_trait]
pub trait TldSource: Send + Sync {
    /// Lowercase TLD labels without trailing dot, e.g. `com`.
    async fn fetch_delegated_tlds(&self) -> Result<Vec<String>>;
}
