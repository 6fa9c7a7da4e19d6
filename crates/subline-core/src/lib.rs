pub mod allocate;
pub mod assign;
pub mod config;
pub mod db;
pub mod error;
pub mod io;
pub mod paths;
pub mod store;
pub mod types;
pub mod vtt;

pub use error::{ErrorKind, Result, SublineError};
