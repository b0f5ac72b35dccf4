pub mod account;
pub mod entry;
pub mod goal;
pub mod metric;
