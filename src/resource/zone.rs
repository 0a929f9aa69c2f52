use crate::service::classify::is_successful_transfer;
use crate::util::name::archive_dir_name;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferOutcome {
    Succeeded,
    Failed,
}

/// One AXFR probe of `domain` against `nameserver`, classified on creation.
#[derive(Debug)]
pub struct TransferAttempt {
    pub domain: String,
    pub nameserver: String,
    pub response: String,
    pub outcome: TransferOutcome,
}

impl TransferAttempt {
    pub fn new(domain: &str, nameserver: &str, response: String) -> Self {
        let outcome = if is_successful_transfer(&response) {
            TransferOutcome::Succeeded
        } else {
            TransferOutcome::Failed
        };
        Self {
            domain: domain.to_string(),
            nameserver: nameserver.to_string(),
            response,
            outcome,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.outcome == TransferOutcome::Succeeded
    }
}

/// A nameserver that handed out its zone. Ordered by domain, then nameserver.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TransferableZone {
    pub domain: String,
    pub nameserver: String,
    pub compressed: bool,
}

impl TransferableZone {
    pub fn new(domain: &str, nameserver: &str) -> Self {
        Self {
            domain: domain.to_string(),
            nameserver: nameserver.to_string(),
            compressed: false,
        }
    }

    /// Name shown in the report, `root` for the root zone.
    pub fn display_name(&self) -> String {
        archive_dir_name(&self.domain)
    }
}
