//! Core analysis building blocks: saliency estimation, the integral table,
//! composition scoring, and the crop search engine. These are internal
//! primitives consumed by the high-level `api` module.
pub mod composition;
pub mod integral;
pub mod params;
pub mod saliency;
pub mod search;
