pub mod aggregate;
pub mod config;
pub mod logger;
pub mod record;
pub mod report;
pub mod server;
pub mod service;
