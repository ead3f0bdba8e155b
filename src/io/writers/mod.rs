pub mod jpeg;
pub mod sidecar;
