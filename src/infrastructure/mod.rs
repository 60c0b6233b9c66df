pub mod order_store;
pub mod product_store;

use crate::domain::errors::DomainError;

// Diesel and r2d2 error types stay confined to this layer.

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}
