//! I/O layer: the `ImageCodec` seam used to decode sources and persist outputs,
//! output path naming, and `writers` for JPEG crops and JSON sidecars.
pub mod codec;
pub use codec::{FsImageCodec, ImageCodec};

pub mod naming;
pub use naming::{crop_path, saliency_map_path};

#[cfg(feature = "seeta")]
pub mod detector;
#[cfg(feature = "seeta")]
pub use detector::SeetaObjectness;

pub mod writers;
