pub mod account;
pub mod analytics;
pub mod catalog;
pub mod entries;
pub mod export;
pub mod goals;
pub mod health;
pub mod metrics;
pub mod ws;
