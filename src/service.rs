pub mod archive;
pub mod classify;
pub mod report;
pub mod resolver;
pub mod scan;
pub mod transfer;
