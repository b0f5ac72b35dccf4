pub mod analytics;
pub mod catalog;
pub mod export;
pub mod realtime;
pub mod rules;
pub mod search;
pub mod sentiment;
