pub mod analytics;
pub mod config;
pub mod event;
pub mod geo;
pub mod ip;
pub mod store;
