pub mod authority;
pub mod dto;
pub mod error;
pub mod ports;
pub mod sweeper;

pub use error::ApplicationResult;
