use hickory_proto::rr::RecordType;
use std::sync::Arc;
use tokio::sync::OnceCell;

pub mod memory;

/// A cache cell for one (record type, domain) key. Filled at most once.
pub type Slot = Arc<OnceCell<Vec<String>>>;

/// Run-scoped cache of resolved record values. Entries are never evicted.
pub trait Store: Send + Sync {
    fn lookup(&self, record_type: RecordType, domain: &str) -> Option<Vec<String>>;
    fn store(&self, record_type: RecordType, domain: &str, values: Vec<String>);
    fn slot(&self, record_type: RecordType, domain: &str) -> Slot;
    fn len(&self) -> usize;
    fn clone_dyn(&self) -> Box<dyn Store>;
}

impl Clone for Box<dyn Store> {
    fn clone(&self) -> Self {
        self.clone_dyn()
    }
}
