pub mod analytics;
pub mod error;
pub mod ingest;
pub mod storage;
pub mod teardown;
pub mod utils;
