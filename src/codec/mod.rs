//! The external glTF codec.
//!
//! Reading parses `.gltf`/`.glb` bytes with `gltf_dep` and maps the document
//! into the asset model, resolving embedded blobs, base64 data URIs, and
//! external `.bin` files. Writing assembles a `gltf_dep::json::Root` from an
//! asset and serializes it; the binary payload is written separately by the
//! facade.

mod export;
mod import;

pub use export::export_json;
pub use import::{import_document, import_slice, resolve_buffers};
