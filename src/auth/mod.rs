//! Password hashing and token issuance for user and admin accounts.

mod password;
mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenIssuer};
