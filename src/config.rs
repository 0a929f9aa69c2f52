use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    /// Run the external `dig` command
    Dig,
    /// Speak AXFR over TCP in-process
    Native,
}

#[derive(Parser, Clone, Debug)]
#[clap(about = "Finds root and TLD nameservers that allow unauthenticated zone transfers")]
pub struct Config {
    /// Directory archived zone data is written to
    #[clap(long, short = 'a', default_value = "archives", env = "ARCHIVE_DIR")]
    pub archive_dir: PathBuf,

    /// Markdown report path
    #[clap(long, short = 'r', default_value = "transferable_zones.md", env = "REPORT_PATH")]
    pub report: PathBuf,

    /// Published list of delegated TLDs
    #[clap(
        long,
        default_value = crate::datasource::iana::IANA_TLD_URL,
        env = "TLD_URL"
    )]
    pub tld_url: String,

    /// Cached TLD to nameserver mapping
    #[clap(long, default_value = "cache/tld_dict.yaml", env = "TLD_CACHE")]
    pub tld_cache: PathBuf,

    /// Take TLD nameservers from the cached mapping instead of the network
    #[clap(long, env = "FROM_CACHE")]
    pub from_cache: bool,

    /// Zone transfer timeout (in seconds)
    #[clap(long, short = 't', default_value = "15", env = "AXFR_TIMEOUT")]
    pub timeout: u64,

    /// Number of probes in flight at once
    #[clap(long, short = 'c', default_value = "16", env = "CONCURRENCY")]
    pub concurrency: usize,

    /// Zone transfer implementation
    #[clap(long, value_enum, default_value = "dig", env = "TRANSPORT")]
    pub transport: Transport,

    /// dig executable
    #[clap(long, default_value = "dig", env = "DIG_PATH")]
    pub dig_path: String,

    /// Recursive resolver address, system configuration when unset
    #[clap(long, env = "RESOLVER")]
    pub resolver: Option<SocketAddr>,

    /// Archives larger than this many bytes are gzipped
    #[clap(
        long,
        default_value_t = crate::service::archive::GITHUB_MAX_FILE_SIZE,
        env = "COMPRESS_THRESHOLD"
    )]
    pub compress_threshold: usize,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["axfr-scanner"]);
        assert_eq!(config.archive_dir, PathBuf::from("archives"));
        assert_eq!(config.report, PathBuf::from("transferable_zones.md"));
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.transport, Transport::Dig);
        assert_eq!(config.compress_threshold, 99614720);
        assert!(!config.from_cache);
        assert!(config.resolver.is_none());
    }

    #[test]
    fn test_flags() {
        let config = Config::parse_from([
            "axfr-scanner",
            "--transport",
            "native",
            "-c",
            "0",
            "--resolver",
            "9.9.9.9:53",
            "--from-cache",
        ]);
        assert_eq!(config.transport, Transport::Native);
        assert_eq!(config.concurrency(), 1);
        assert_eq!(config.resolver, Some("9.9.9.9:53".parse().unwrap()));
        assert!(config.from_cache);
    }
}
