mod asset;
mod auth;
mod emporium;
mod payment;

pub use asset::AssetError;
pub use auth::AuthError;
pub use emporium::{ApiErrorBody, EmporiumError};
pub use payment::PaymentError;
