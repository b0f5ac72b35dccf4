pub mod account;
pub mod goals;
pub mod journal;
pub mod metrics;
mod pool;

pub use pool::create_pool;
#[cfg(test)]
pub use pool::create_lazy_pool;
