use crate::store::{Slot, Store};
use crate::util::name::normalize;
use hickory_proto::rr::RecordType;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Key = (RecordType, String);

#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<Key, Slot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<Key, Slot>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store for MemoryStore {
    fn lookup(&self, record_type: RecordType, domain: &str) -> Option<Vec<String>> {
        let entries = self.entries();
        entries
            .get(&(record_type, normalize(domain)))
            .and_then(|slot| slot.get().cloned())
    }

    fn store(&self, record_type: RecordType, domain: &str, values: Vec<String>) {
        // first write wins
        let _ = self.slot(record_type, domain).set(values);
    }

    fn slot(&self, record_type: RecordType, domain: &str) -> Slot {
        self.entries()
            .entry((record_type, normalize(domain)))
            .or_default()
            .clone()
    }

    fn len(&self) -> usize {
        self.entries()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    fn clone_dyn(&self) -> Box<dyn Store> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_store() {
        let store = MemoryStore::new();
        assert_eq!(store.lookup(RecordType::NS, "com."), None);
        store.store(RecordType::NS, "COM", vec!["a.gtld-servers.net.".into()]);
        assert_eq!(
            store.lookup(RecordType::NS, "com."),
            Some(vec!["a.gtld-servers.net.".to_string()])
        );
        assert_eq!(store.lookup(RecordType::A, "com."), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_never_overwritten() {
        let store = MemoryStore::new();
        store.store(RecordType::NS, "org.", vec!["first.".into()]);
        store.store(RecordType::NS, "org.", vec!["second.".into()]);
        assert_eq!(
            store.lookup(RecordType::NS, "org."),
            Some(vec!["first.".to_string()])
        );
    }

    #[test]
    fn test_clones_share_entries() {
        let store: Box<dyn Store> = Box::new(MemoryStore::new());
        let copy = store.clone();
        copy.store(RecordType::NS, "net.", vec![]);
        assert_eq!(store.lookup(RecordType::NS, "net."), Some(vec![]));
        assert!(Arc::ptr_eq(
            &store.slot(RecordType::NS, "net."),
            &copy.slot(RecordType::NS, "NET.")
        ));
    }
}
