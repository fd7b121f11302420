//! Broadcast bus carrying `SearchEvent`s

mod core;
mod publishing;
mod shutdown;
mod subscription;

pub use self::core::SearchEventBus;
