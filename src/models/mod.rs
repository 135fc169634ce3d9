pub mod assessment;
pub mod enums;

pub use assessment::*;
pub use enums::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid value '{value}' for {field}")]
    InvalidEnum { field: String, value: String },

    #[error("Patient age must be greater than zero")]
    InvalidAge,
}
