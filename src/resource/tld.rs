use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// TLD (without trailing dot) to its authoritative nameservers.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct TldMap(pub BTreeMap<String, Vec<String>>);

impl TldMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, tld: &str, nameservers: Vec<String>) {
        self.0.insert(tld.trim_end_matches('.').to_string(), nameservers);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }
}
