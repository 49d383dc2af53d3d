pub mod assets;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod payments;
pub mod server;
pub mod utils;

pub use error::EmporiumError;
