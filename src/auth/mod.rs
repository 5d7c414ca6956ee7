//! Credential hashing and the write-authorization rule.

pub mod password;
pub mod policy;

pub use password::{PasswordError, PasswordHasher};
pub use policy::{can_modify, ensure_can_modify};
