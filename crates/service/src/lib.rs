//! Service layer providing business-record operations on top of models.
//! - Separates record lifecycle and query logic from data access.
//! - Reuses entity definitions and validation in the `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod pagination;
pub mod business_service;
#[cfg(test)]
pub mod test_support;
