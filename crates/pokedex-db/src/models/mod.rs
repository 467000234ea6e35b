//! Database models for persistent storage.

mod account;
mod catalog;

pub use account::*;
pub use catalog::*;
