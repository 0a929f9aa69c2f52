use crate::config::Config;
use crate::datasource::{snapshot, TldSource};
use crate::resource::tld::TldMap;
use crate::resource::zone::{TransferAttempt, TransferableZone};
use crate::service::archive::Archiver;
use crate::service::report::write_report;
use crate::service::resolver::Resolver;
use crate::service::transfer::ZoneTransfer;
use crate::util::name::ROOT;
use futures_util::stream::{self, StreamExt};
use hickory_proto::rr::RecordType;
use log::{debug, error, info, warn};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::select;
use tokio_util::sync::CancellationToken;

pub const ROOT_NAMESERVERS: [&str; 13] = [
    "e.root-servers.net.",
    "h.root-servers.net.",
    "l.root-servers.net.",
    "i.root-servers.net.",
    "a.root-servers.net.",
    "d.root-servers.net.",
    "c.root-servers.net.",
    "b.root-servers.net.",
    "j.root-servers.net.",
    "k.root-servers.net.",
    "g.root-servers.net.",
    "m.root-servers.net.",
    "f.root-servers.net.",
];

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("unable to get the TLD list: {0}")]
    TldList(Box<dyn std::error::Error + Send + Sync>),
    #[error("unable to read cached TLD mapping {0}: {1}")]
    TldCache(PathBuf, Box<dyn std::error::Error + Send + Sync>),
    #[error("unable to write report {0}: {1}")]
    Report(PathBuf, io::Error),
    #[error("scan interrupted, no report written")]
    Cancelled,
}

/// Probes the root servers, then every TLD's nameservers, and writes the
/// report once both phases are done.
pub struct Scanner {
    resolver: Resolver,
    transfer: Box<dyn ZoneTransfer>,
    tlds: Box<dyn TldSource>,
    archiver: Archiver,
    timeout: Duration,
    concurrency: usize,
    report_path: PathBuf,
    tld_cache: PathBuf,
    from_cache: bool,
}

impl Scanner {
    pub fn new(
        config: &Config,
        resolver: Resolver,
        transfer: Box<dyn ZoneTransfer>,
        tlds: Box<dyn TldSource>,
    ) -> Self {
        Self {
            resolver,
            transfer,
            tlds,
            archiver: Archiver::new(config.archive_dir.clone(), config.compress_threshold),
            timeout: config.timeout(),
            concurrency: config.concurrency(),
            report_path: config.report.clone(),
            tld_cache: config.tld_cache.clone(),
            from_cache: config.from_cache,
        }
    }

    pub async fn run(&self, cancellation_token: &CancellationToken) -> Result<Vec<TransferableZone>, ScanError> {
        let zones = select! {
            biased;
            _ = cancellation_token.cancelled() => {
                return Err(ScanError::Cancelled);
            }
            zones = self.scan() => zones?,
        };
        write_report(&self.report_path, &zones, self.archiver.root())
            .await
            .map_err(|e| ScanError::Report(self.report_path.clone(), e))?;
        info!(
            "Wrote {} transferable zones to {}",
            zones.len(),
            self.report_path.display()
        );
        Ok(zones)
    }

    async fn scan(&self) -> Result<Vec<TransferableZone>, ScanError> {
        let mut zones = self.root_phase().await;
        zones.extend(self.tld_phase().await?);
        zones.sort();
        zones.dedup();
        Ok(zones)
    }

    async fn root_phase(&self) -> Vec<TransferableZone> {
        info!("Probing {} root nameservers", ROOT_NAMESERVERS.len());
        let targets = ROOT_NAMESERVERS
            .iter()
            .map(|nameserver| (ROOT.to_string(), nameserver.to_string()))
            .collect();
        self.probe_all(targets).await
    }

    async fn tld_phase(&self) -> Result<Vec<TransferableZone>, ScanError> {
        let tld_map = self.tld_nameservers().await?;
        let targets: Vec<(String, String)> = tld_map
            .iter()
            .flat_map(|(tld, nameservers)| {
                nameservers
                    .iter()
                    .map(move |nameserver| (format!("{}.", tld), nameserver.clone()))
            })
            .collect();
        info!(
            "Probing {} nameservers across {} TLDs",
            targets.len(),
            tld_map.len()
        );
        Ok(self.probe_all(targets).await)
    }

    async fn tld_nameservers(&self) -> Result<TldMap, ScanError> {
        if self.from_cache {
            let cached = snapshot::load(&self.tld_cache)
                .await
                .map_err(|e| ScanError::TldCache(self.tld_cache.clone(), e))?;
            info!(
                "Loaded nameservers of {} TLDs from {}",
                cached.len(),
                self.tld_cache.display()
            );
            for (tld, nameservers) in cached.iter() {
                self.resolver
                    .store()
                    .store(RecordType::NS, &format!("{}.", tld), nameservers.clone());
            }
            debug!("{} entries in the DNS cache", self.resolver.store().len());
            let tlds = cached.iter().map(|(tld, _)| tld.clone()).collect();
            return Ok(self.resolve_tlds(tlds).await);
        }
        let tlds = self
            .tlds
            .fetch_delegated_tlds()
            .await
            .map_err(ScanError::TldList)?;
        let tld_map = self.resolve_tlds(tlds).await;
        match snapshot::save(&self.tld_cache, &tld_map).await {
            Ok(()) => info!("Saved TLD nameservers to {}", self.tld_cache.display()),
            Err(e) => warn!("Unable to save {}: {}", self.tld_cache.display(), e),
        }
        Ok(tld_map)
    }

    async fn resolve_tlds(&self, tlds: Vec<String>) -> TldMap {
        let resolved: Vec<(String, Vec<String>)> = stream::iter(tlds)
            .map(|tld| async move {
                let nameservers = self.resolver.nameservers_or_empty(&format!("{}.", tld)).await;
                (tld, nameservers)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;
        let mut tld_map = TldMap::new();
        for (tld, nameservers) in resolved {
            tld_map.insert(&tld, nameservers);
        }
        tld_map
    }

    async fn probe_all(&self, targets: Vec<(String, String)>) -> Vec<TransferableZone> {
        let total = targets.len();
        let zones: Vec<TransferableZone> = stream::iter(targets)
            .map(|(domain, nameserver)| async move { self.attempt(&domain, &nameserver).await })
            .buffer_unordered(self.concurrency)
            .filter_map(|zone| async move { zone })
            .collect()
            .await;
        info!("{} of {} probes returned zone data", zones.len(), total);
        zones
    }

    async fn attempt(&self, domain: &str, nameserver: &str) -> Option<TransferableZone> {
        let response = self.transfer.probe(domain, nameserver, self.timeout).await;
        let attempt = TransferAttempt::new(domain, nameserver, response);
        if !attempt.succeeded() {
            info!("{} refused the transfer of {}", nameserver, domain);
            return None;
        }
        info!("{} allows zone transfers of {}!", nameserver, domain);
        let mut zone = TransferableZone::new(domain, nameserver);
        match self
            .archiver
            .archive(&attempt.domain, &attempt.nameserver, &attempt.response)
            .await
        {
            Ok(entry) => {
                debug!("Archived {} from {} to {}", domain, nameserver, entry.path.display());
                zone.compressed = entry.compressed;
            }
            Err(e) => error!("Unable to archive {} from {}: {}", domain, nameserver, e),
        }
        Some(zone)
    }
}
