use crate::datasource::iana::IanaTldSource;
use crate::datasource::TldSource;
use crate::service::resolver::{build_resolver, HickoryNsLookup, Resolver};
use crate::service::scan::Scanner;
use crate::service::transfer::build_transfer;
use crate::store::memory::MemoryStore;
use clap::Parser;
use config::Config;
use log::{info, warn};
use std::error::Error;
use tokio::signal;
use tokio_util::sync::CancellationToken;

mod config;
mod datasource;
mod resource;
mod service;
mod store;
mod util;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    env_logger::init();
    let config = Config::parse();
    let dns = build_resolver(&config)?;
    let resolver = Resolver::new(
        Box::new(HickoryNsLookup::new(dns.clone())),
        Box::new(MemoryStore::new()),
    );
    let transfer = build_transfer(&config, dns);
    let tlds: Box<dyn TldSource> = Box::new(IanaTldSource::new(&config)?);
    let scanner = Scanner::new(&config, resolver, transfer, tlds);

    let token = CancellationToken::new();
    let token_copy = token.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping scan...");
            token_copy.cancel();
        }
    });
    info!(
        "Starting scan with {:?} transport, {} probes at a time.",
        config.transport,
        config.concurrency()
    );
    let zones = scanner.run(&token).await?;
    info!("Scan finished, {} transferable zones.", zones.len());
    Ok(())
}
