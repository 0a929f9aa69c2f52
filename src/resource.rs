pub mod tld;
pub mod zone;
