//! HTTP surface: router, state, envelopes and extractors.
//!
//! Layout:
//! - `router.rs`: `EmporiumState`, access log, CORS and the `/api` tree
//! - `envelope.rs`: `{ success, ... }` response builder
//! - `extract.rs`: JSON / query / path / multipart extractors
//! - `routes/`: one module per resource prefix

pub mod envelope;
pub mod extract;
pub mod router;
pub mod routes;

pub use router::{EmporiumState, emporium_router};
