//! # gltfio
//!
//! An asset pipeline for glTF 2.0 scene graphs.
//!
//! The pipeline takes a parsed glTF asset (scenes, nodes, meshes, primitives,
//! accessors, buffer views, buffers, images, textures, materials) and produces
//! new asset values through three composable transformations:
//!
//! - **Buffer coalescing** — rewrite an asset so it references exactly one
//!   binary buffer.
//! - **Primitive flattening** — rewrite an asset so every drawable primitive
//!   lives under its own leaf node with identity transform, with world-space
//!   positions, normals, and tangents pre-baked into a fresh vertex buffer.
//! - **UV atlas parameterization** — drive an external charting/packing engine
//!   to compute a second, non-overlapping UV set per vertex, suitable as the
//!   target space for lightmap baking.
//!
//! # Example
//!
//! ```ignore
//! use gltfio::{Pipeline, FILTER_TRIANGLES};
//!
//! let mut pipeline = Pipeline::new();
//! let source = pipeline.load("model.gltf")?;
//! let flattened = pipeline.flatten(source, FILTER_TRIANGLES)?;
//! assert!(pipeline.is_flattened(flattened));
//! pipeline.save(flattened, "out.gltf", "out.bin")?;
//! ```

pub mod arena;
pub mod asset;
pub mod atlas;
pub mod coalesce;
pub mod codec;
mod error;
pub mod flatten;
pub mod math;
pub mod parameterize;
pub mod pipeline;

pub use arena::AssetHandle;
pub use error::{Malformed, PipelineError};
pub use flatten::FILTER_TRIANGLES;
pub use pipeline::{Pipeline, BAKED_UV_ATTRIB, BAKED_UV_ATTRIB_INDEX, GENERATOR_ID};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
