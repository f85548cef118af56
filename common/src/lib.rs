pub mod config;
pub mod errors;
pub mod redis;
pub mod repository;
pub mod util;

pub use repository::*;

pub type UserId = String;
