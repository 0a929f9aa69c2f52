use crate::service::transfer::{ZoneTransfer, TRANSFER_LIMIT};
use async_trait::async_trait;
use log::{debug, error, warn};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::{self, Instant};

/// Extra silence tolerated beyond dig's own `+time` so its failure text reaches stdout.
const DIG_GRACE: Duration = Duration::from_secs(5);

pub struct DigTransfer {
    program: String,
    grace: Duration,
}

impl DigTransfer {
    pub fn new(program: String) -> Self {
        Self {
            program,
            grace: DIG_GRACE,
        }
    }
}

fn dig_args(domain: &str, nameserver: &str, timeout: Duration) -> Vec<String> {
    vec![
        "AXFR".to_string(),
        domain.to_string(),
        format!("@{}", nameserver),
        "+noall".to_string(),
        "+answer".to_string(),
        "+noidnout".to_string(),
        "+onesoa".to_string(),
        format!("+time={}", timeout.as_secs().max(1)),
    ]
}

#[async_trait]
impl ZoneTransfer for DigTransfer {
    /// Reads dig's stdout as it arrives. dig is killed once it has been silent
    /// for `timeout` plus the grace period, and whatever it printed is kept.
    async fn probe(&self, domain: &str, nameserver: &str, timeout: Duration) -> String {
        debug!("{} AXFR {} @{}", self.program, domain, nameserver);
        let child = Command::new(&self.program)
            .args(dig_args(domain, nameserver, timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();
        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                error!("Unable to run {}: {}", self.program, e);
                return String::new();
            }
        };
        let Some(mut stdout) = child.stdout.take() else {
            return String::new();
        };

        let idle = timeout + self.grace;
        let deadline = Instant::now() + TRANSFER_LIMIT;
        let mut output = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            let wait = (Instant::now() + idle).min(deadline);
            match time::timeout_at(wait, stdout.read(&mut chunk)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => output.extend_from_slice(&chunk[..n]),
                Ok(Err(e)) => {
                    warn!("{} for {} @{} failed: {}", self.program, domain, nameserver, e);
                    break;
                }
                Err(_) => {
                    warn!(
                        "AXFR of {} from {} stalled, keeping {} bytes",
                        domain,
                        nameserver,
                        output.len()
                    );
                    if let Err(e) = child.kill().await {
                        debug!("Unable to kill {}: {}", self.program, e);
                    }
                    break;
                }
            }
        }
        if let Err(e) = child.wait().await {
            debug!("Unable to reap {}: {}", self.program, e);
        }
        String::from_utf8_lossy(&output).into_owned()
    }
}
