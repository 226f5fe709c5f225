//! Route handlers.

pub mod brief;
pub mod generate;
pub mod health;
