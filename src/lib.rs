// Library for tests to access modules

pub mod config;
pub mod counter_store;
pub mod error;
pub mod host_probe;
pub mod models;
pub mod report;
pub mod storage_scanner;
pub mod tenant;
