pub mod cloudinary;
pub mod stripe;

pub use cloudinary::{CloudinaryErrorBody, DestroyResponse, UploadResponse};
pub use stripe::{CheckoutSession, Customer, LineItem, StripeErrorBody, StripeList};
