//! Basic types shared by traco crates.

pub mod counter;
mod data;

pub use crate::{counter::Counter, data::Data};
