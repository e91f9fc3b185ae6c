pub mod collation;
mod error;
pub mod models;
pub mod ports;
pub mod queries;
pub mod services;

pub use error::*;
