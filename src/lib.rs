pub mod config;
pub mod enums;
pub mod error;
pub mod db;
pub mod api;

pub use config::Config;
pub use enums::TokenSource;
pub use error::{ AppError, Result };
