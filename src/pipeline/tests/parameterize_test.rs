//! Facade-level parameterization scenarios.

use super::{two_buffer_scene, IdentityAtlas};
use crate::asset::types::{BufferViewKind, Semantic};
use crate::atlas::AtlasOptions;
use crate::error::{Malformed, PipelineError};
use crate::flatten::FILTER_TRIANGLES;
use crate::pipeline::Pipeline;

#[test]
fn parameterize_adds_one_baked_uv_per_primitive() {
    let mut pipeline = Pipeline::new();
    let source = pipeline.register(two_buffer_scene());
    let flattened = pipeline.flatten(source, FILTER_TRIANGLES).unwrap();
    let parameterized = pipeline
        .parameterize(flattened, IdentityAtlas::default(), &AtlasOptions::default())
        .unwrap();

    let asset = pipeline.asset(parameterized).unwrap();
    assert_eq!(asset.buffers.len(), 1);
    assert_eq!(asset.nodes.len(), 2);
    assert_eq!(asset.meshes.len(), 2);

    for mesh in &asset.meshes {
        let prim = &mesh.primitives[0];
        let baked: Vec<_> = prim
            .attributes
            .iter()
            .filter(|a| a.semantic == Semantic::TexCoord && a.set == 4)
            .collect();
        assert_eq!(baked.len(), 1, "mesh {:?}", mesh.name);

        // Source attributes were POSITION + TEXCOORD_0; stride covers
        // (3 + 2 + 2) floats.
        let vertex_view = asset.accessors[baked[0].accessor.unwrap()].view.unwrap();
        assert_eq!(asset.views[vertex_view].stride, Some(28));
        assert_eq!(asset.views[vertex_view].kind, Some(BufferViewKind::Vertices));

        // Every attribute of the primitive shares the interleaved view.
        for attr in &prim.attributes {
            assert_eq!(
                asset.accessors[attr.accessor.unwrap()].view,
                Some(vertex_view)
            );
        }
    }

    // The parameterized asset still satisfies the flattened predicate.
    assert!(pipeline.is_flattened(parameterized));
}

#[test]
fn parameterize_requires_a_flattened_asset() {
    let mut pipeline = Pipeline::new();
    let source = pipeline.register(two_buffer_scene());

    match pipeline.parameterize(source, IdentityAtlas::default(), &AtlasOptions::default()) {
        Err(PipelineError::MalformedInput(Malformed::NotFlattened)) => {}
        other => panic!("expected NotFlattened, got {other:?}"),
    }
    // No asset was produced.
    assert!(!pipeline.is_flattened(source));
}

#[test]
fn baked_uv_channel_is_configurable() {
    let mut pipeline = Pipeline::new().with_baked_uv_set(6);
    assert_eq!(pipeline.baked_uv_attrib(), "TEXCOORD_6");

    let source = pipeline.register(two_buffer_scene());
    let flattened = pipeline.flatten(source, FILTER_TRIANGLES).unwrap();
    let parameterized = pipeline
        .parameterize(flattened, IdentityAtlas::default(), &AtlasOptions::default())
        .unwrap();

    let asset = pipeline.asset(parameterized).unwrap();
    for mesh in &asset.meshes {
        assert!(mesh.primitives[0]
            .attributes
            .iter()
            .any(|a| a.semantic == Semantic::TexCoord && a.set == 6));
    }
}
