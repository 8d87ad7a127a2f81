//! The pipeline facade.
//!
//! A [`Pipeline`] owns every asset it touches: sources registered through
//! [`load`](Pipeline::load) or [`register`](Pipeline::register) and the
//! outputs of [`flatten`](Pipeline::flatten) and
//! [`parameterize`](Pipeline::parameterize) all live in the pipeline's arena
//! and are addressed by [`AssetHandle`]s. Everything is released together
//! when the pipeline is dropped.

use std::path::Path;

use crate::arena::{Arena, AssetHandle};
use crate::asset::Asset;
use crate::atlas::{AtlasEngine, AtlasOptions};
use crate::coalesce::coalesce_buffers;
use crate::codec;
use crate::error::{Malformed, PipelineError};
use crate::flatten::flatten_primitives;
use crate::parameterize::parameterize_asset;

#[cfg(test)]
mod tests;

/// Default generator tag stamped into every produced asset; `is_flattened`
/// tests it as a witness.
pub const GENERATOR_ID: &str = "gltfio";

/// Default semantic name of the baked UV channel.
pub const BAKED_UV_ATTRIB: &str = "TEXCOORD_4";

/// Default semantic set index of the baked UV channel.
pub const BAKED_UV_ATTRIB_INDEX: u32 = 4;

/// Owns source assets and transformation outputs, and exposes the pipeline
/// operations.
///
/// A pipeline is single-threaded; independent pipelines over independent
/// assets may run concurrently.
pub struct Pipeline {
    arena: Arena,
    generator: String,
    baked_uv_set: u32,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Create a pipeline with the default generator tag and baked UV channel.
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            generator: GENERATOR_ID.to_string(),
            baked_uv_set: BAKED_UV_ATTRIB_INDEX,
        }
    }

    /// Override the generator tag stamped into produced assets.
    pub fn with_generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = generator.into();
        self
    }

    /// Override the baked UV semantic set index. The attribute name follows
    /// as `TEXCOORD_{set}`, keeping the two consistent.
    pub fn with_baked_uv_set(mut self, set: u32) -> Self {
        self.baked_uv_set = set;
        self
    }

    /// The configured generator tag.
    pub fn generator(&self) -> &str {
        &self.generator
    }

    /// The configured baked UV attribute name.
    pub fn baked_uv_attrib(&self) -> String {
        format!("TEXCOORD_{}", self.baked_uv_set)
    }

    /// Parse a `.gltf`/`.glb` file — or the first `.gltf` found in a
    /// directory — resolve its buffers, and register the asset.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<AssetHandle, PipelineError> {
        let mut file = path.as_ref().to_path_buf();
        if file.is_dir() {
            let mut candidates: Vec<_> = std::fs::read_dir(&file)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|p| p.extension().map(|e| e == "gltf").unwrap_or(false))
                .collect();
            candidates.sort();
            file = candidates.into_iter().next().ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no glTF file found in {}", path.as_ref().display()),
                )
            })?;
        }

        let data = std::fs::read(&file)?;
        let asset = codec::import_slice(&data, file.parent())?;
        log::info!(
            "loaded {} ({} nodes, {} meshes, {} buffers)",
            file.display(),
            asset.nodes.len(),
            asset.meshes.len(),
            asset.buffers.len()
        );
        Ok(self.arena.insert(asset))
    }

    /// Register an in-memory asset, taking ownership.
    pub fn register(&mut self, asset: Asset) -> AssetHandle {
        self.arena.insert(asset)
    }

    /// Look up an asset by handle.
    pub fn asset(&self, handle: AssetHandle) -> Option<&Asset> {
        self.arena.get(handle)
    }

    fn lookup(&self, handle: AssetHandle) -> Result<&Asset, PipelineError> {
        self.arena.get(handle).ok_or_else(|| {
            Malformed::DanglingReference {
                entity: "asset",
                index: handle.index(),
            }
            .into()
        })
    }

    /// Flatten an asset: coalesce if it has more than one buffer, split
    /// every eligible primitive into its own identity-transform leaf node,
    /// then coalesce again to fold the baked and preserved buffers into one.
    pub fn flatten(
        &mut self,
        source: AssetHandle,
        flags: u32,
    ) -> Result<AssetHandle, PipelineError> {
        let asset = self.lookup(source)?;
        let coalesced;
        let asset = if asset.buffers.len() > 1 {
            coalesced = coalesce_buffers(asset, &self.generator)?;
            &coalesced
        } else {
            asset
        };
        let baked = flatten_primitives(asset, flags, &self.generator)?;
        let result = coalesce_buffers(&baked, &self.generator)?;
        Ok(self.arena.insert(result))
    }

    /// Parameterize a flattened asset with the given atlas engine. The
    /// engine is consumed by this call and dropped before it returns.
    pub fn parameterize<E: AtlasEngine>(
        &mut self,
        source: AssetHandle,
        engine: E,
        options: &AtlasOptions,
    ) -> Result<AssetHandle, PipelineError> {
        let asset = self.lookup(source)?;
        let result = parameterize_asset(asset, engine, options, self.baked_uv_set, &self.generator)?;
        Ok(self.arena.insert(result))
    }

    /// Evaluate the flattened predicate for an asset.
    pub fn is_flattened(&self, handle: AssetHandle) -> bool {
        self.arena
            .get(handle)
            .map(|asset| asset.is_flattened(&self.generator))
            .unwrap_or(false)
    }

    /// Write a flattened asset to disk as a JSON manifest plus one binary
    /// blob, referenced by the binary path's basename.
    pub fn save(
        &self,
        source: AssetHandle,
        json_path: impl AsRef<Path>,
        bin_path: impl AsRef<Path>,
    ) -> Result<(), PipelineError> {
        let asset = self.lookup(source)?;
        if !asset.is_flattened(&self.generator) {
            return Err(Malformed::NotFlattened.into());
        }

        let bin_path = bin_path.as_ref();
        let bin_name = bin_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "binary path has no file name",
                )
            })?;

        let json = codec::export_json(asset, Some(bin_name))?;
        std::fs::write(json_path.as_ref(), json)?;
        std::fs::write(bin_path, &asset.buffers[0].data)?;
        Ok(())
    }
}
