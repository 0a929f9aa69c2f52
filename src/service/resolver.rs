use crate::config::Config;
use crate::store::Store;
use crate::util::name::{is_malformed, normalize};
use async_trait::async_trait;
use hickory_proto::error::ProtoErrorKind;
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::RecordType;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::TokioAsyncResolver;
use log::{debug, error, info};
use std::io;
use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("NXDOMAIN - domain name doesn't exist")]
    NoSuchDomain,
    #[error("no nameservers returned")]
    NoNameserversAvailable,
    #[error("nameserver request timed out")]
    Timeout,
    #[error("no answer")]
    NoAnswer,
    #[error("malformed domain name")]
    MalformedName,
}

impl From<&ResolveError> for ResolutionError {
    fn from(err: &ResolveError) -> Self {
        match err.kind() {
            ResolveErrorKind::NoRecordsFound { response_code, .. } => match *response_code {
                ResponseCode::NXDomain => ResolutionError::NoSuchDomain,
                ResponseCode::NoError => ResolutionError::NoAnswer,
                _ => ResolutionError::NoNameserversAvailable,
            },
            ResolveErrorKind::Timeout => ResolutionError::Timeout,
            ResolveErrorKind::Io(e) if e.kind() == io::ErrorKind::TimedOut => {
                ResolutionError::Timeout
            }
            ResolveErrorKind::Proto(e) => match e.kind() {
                ProtoErrorKind::Timeout => ResolutionError::Timeout,
                _ => ResolutionError::NoNameserversAvailable,
            },
            _ => ResolutionError::NoNameserversAvailable,
        }
    }
}

/// Issues NS queries. Implementations return raw hostnames, unsorted.
#[async_trait]
pub trait NsLookup: Send + Sync {
    async fn query_ns(&self, domain: &str) -> Result<Vec<String>, ResolutionError>;
}

pub struct HickoryNsLookup {
    resolver: TokioAsyncResolver,
}

impl HickoryNsLookup {
    pub fn new(resolver: TokioAsyncResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl NsLookup for HickoryNsLookup {
    async fn query_ns(&self, domain: &str) -> Result<Vec<String>, ResolutionError> {
        let lookup = self
            .resolver
            .ns_lookup(domain)
            .await
            .map_err(|e| ResolutionError::from(&e))?;
        Ok(lookup.iter().map(|ns| ns.to_string()).collect())
    }
}

/// Recursive resolver used for NS and nameserver address lookups.
pub fn build_resolver(config: &Config) -> Result<TokioAsyncResolver, ResolveError> {
    match config.resolver {
        Some(addr) => {
            let group = NameServerConfigGroup::from_ips_clear(&[addr.ip()], addr.port(), true);
            Ok(TokioAsyncResolver::tokio(
                ResolverConfig::from_parts(None, vec![], group),
                ResolverOpts::default(),
            ))
        }
        None => TokioAsyncResolver::tokio_from_system_conf(),
    }
}

/// Authoritative nameserver lookups, answered from the run's cache when possible.
pub struct Resolver {
    lookup: Box<dyn NsLookup>,
    store: Box<dyn Store>,
}

impl Resolver {
    pub fn new(lookup: Box<dyn NsLookup>, store: Box<dyn Store>) -> Self {
        Self { lookup, store }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Lowercased, fully qualified, duplicate free and sorted. Successful
    /// answers are cached for the rest of the run, failures are not.
    pub async fn resolve_nameservers(&self, domain: &str) -> Result<Vec<String>, ResolutionError> {
        let domain = normalize(domain);
        info!("Grabbing nameserver list for {}", domain);
        if is_malformed(&domain) {
            return Err(ResolutionError::MalformedName);
        }
        if let Some(nameservers) = self.store.lookup(RecordType::NS, &domain) {
            debug!("{} answered from cache", domain);
            return Ok(nameservers);
        }
        let slot = self.store.slot(RecordType::NS, &domain);
        let nameservers = slot.get_or_try_init(|| self.query(&domain)).await?;
        Ok(nameservers.clone())
    }

    /// Like `resolve_nameservers`, but a failure is logged and yields no nameservers.
    pub async fn nameservers_or_empty(&self, domain: &str) -> Vec<String> {
        match self.resolve_nameservers(domain).await {
            Ok(nameservers) => nameservers,
            Err(e) => {
                error!("{}: {}", domain, e);
                Vec::new()
            }
        }
    }

    async fn query(&self, domain: &str) -> Result<Vec<String>, ResolutionError> {
        let mut nameservers: Vec<String> = self
            .lookup
            .query_ns(domain)
            .await?
            .iter()
            .map(|ns| normalize(ns))
            .collect();
        nameservers.sort();
        nameservers.dedup();
        if nameservers.is_empty() {
            return Err(ResolutionError::NoNameserversAvailable);
        }
        Ok(nameservers)
    }
}
