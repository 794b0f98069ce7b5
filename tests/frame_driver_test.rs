use common::test_utils::*;
use phong_gltf::{
    SceneError,
    config::Config,
    data_structures::{
        node_transform::NodeTransform,
        scene_graph::{IndexFormat, SceneDocument, Semantic, Topology},
    },
    flow::FrameDriver,
    render::{GpuScene, Renderer, TextureId},
};

mod common;

/// Two meshes side by side, each with its own material and texture.
fn two_material_document() -> SceneDocument {
    SceneDocument {
        nodes: vec![
            node(NodeTransform::from_trs(Some([-1.0, 0.0, 0.0]), None, None), Some(0), vec![]),
            node(NodeTransform::from_trs(Some([1.0, 0.0, 0.0]), None, None), Some(1), vec![]),
        ],
        meshes: vec![
            mesh(vec![triangle_primitive(true, true, Some(0))]),
            mesh(vec![triangle_primitive(true, true, Some(1))]),
        ],
        accessors: triangle_accessors(true, true),
        materials: vec![material(Some(0)), material(Some(1))],
        textures: vec![texture(0), texture(1)],
        images: vec![rgba_image([255, 0, 0, 255]), rgba_image([0, 0, 255, 255])],
        scenes: vec![scene(vec![0, 1])],
        ..Default::default()
    }
}

#[test]
fn each_material_binds_its_own_texture() {
    let document = two_material_document();
    document.validate().unwrap();
    let mut renderer = RecordingRenderer::new();
    let mut driver = FrameDriver::new(document, &mut renderer, &Config::default()).unwrap();

    assert_eq!(renderer.textures.len(), 2);
    assert_eq!(renderer.textures[0].0.pixels, vec![255, 0, 0, 255]);
    assert_eq!(renderer.textures[1].0.pixels, vec![0, 0, 255, 255]);
    assert_eq!(
        driver.gpu().material_textures,
        vec![Some(TextureId(0)), Some(TextureId(1))]
    );

    driver.render_frame(&mut renderer).unwrap();
    let bound: Vec<_> = renderer.draws.iter().map(|(_, call)| call.texture).collect();
    assert_eq!(bound, vec![Some(TextureId(0)), Some(TextureId(1))]);
}

#[test]
fn meshes_get_their_own_model_matrix() {
    let mut renderer = RecordingRenderer::new();
    let mut driver =
        FrameDriver::new(two_material_document(), &mut renderer, &Config::default()).unwrap();
    driver.render_frame(&mut renderer).unwrap();

    assert_eq!(renderer.uniforms.len(), 2);
    assert_eq!(renderer.draws[0].0.model[3][0], -1.0);
    assert_eq!(renderer.draws[1].0.model[3][0], 1.0);
}

#[test]
fn primitive_without_material_uses_default_texture() {
    let document = single_mesh_document(NodeTransform::default());
    let mut renderer = RecordingRenderer::new();
    let mut driver = FrameDriver::new(document, &mut renderer, &Config::default()).unwrap();
    driver.render_frame(&mut renderer).unwrap();

    assert!(renderer.textures.is_empty());
    assert_eq!(renderer.draws[0].1.texture, None);
}

#[test]
fn missing_streams_are_zero_filled() {
    let document = SceneDocument {
        nodes: vec![node(NodeTransform::default(), Some(0), vec![])],
        meshes: vec![mesh(vec![triangle_primitive(false, false, None)])],
        accessors: triangle_accessors(false, false),
        scenes: vec![scene(vec![0])],
        ..Default::default()
    };
    document.validate().unwrap();
    let mut renderer = RecordingRenderer::new();
    let gpu = GpuScene::upload(&document, &mut renderer).unwrap();

    let call = gpu.primitives[0][0].draw;
    let (semantic, _) = renderer.vertex_data(call.normals);
    assert_eq!(semantic, Semantic::Normal);
    assert_eq!(renderer.vertex_floats(call.normals), vec![0.0; 9]);
    let (semantic, _) = renderer.vertex_data(call.tex_coords);
    assert_eq!(semantic, Semantic::TexCoord0);
    assert_eq!(renderer.vertex_floats(call.tex_coords), vec![0.0; 6]);
    assert_eq!(
        renderer.vertex_floats(call.positions),
        vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
    );
}

#[test]
fn indexed_primitive_uploads_its_indices() {
    let document = single_mesh_document(NodeTransform::default());
    let mut renderer = RecordingRenderer::new();
    let gpu = GpuScene::upload(&document, &mut renderer).unwrap();

    let call = gpu.primitives[0][0].draw;
    let indexed = call.indices.unwrap();
    assert_eq!(indexed.format, IndexFormat::U16);
    assert_eq!(indexed.count, 3);
    assert_eq!(call.vertex_count, 3);
    assert_eq!(
        renderer.buffers[indexed.buffer.0],
        Upload::Index(IndexFormat::U16, [0u16, 1, 2].iter().flat_map(|i| i.to_ne_bytes()).collect())
    );
}

#[test]
fn primitive_without_indices_draws_vertices_in_order() {
    let mut document = single_mesh_document(NodeTransform::default());
    document.meshes[0].primitives[0].indices = None;
    document.meshes[0].primitives[0].mode = Topology::TriangleStrip;
    let mut renderer = RecordingRenderer::new();
    let mut driver = FrameDriver::new(document, &mut renderer, &Config::default()).unwrap();
    driver.render_frame(&mut renderer).unwrap();

    let call = renderer.draws[0].1;
    assert_eq!(call.indices, None);
    assert_eq!(call.vertex_count, 3);
    assert_eq!(call.topology, Topology::TriangleStrip);
}

#[test]
fn every_frame_is_begun_and_ended() {
    let mut renderer = RecordingRenderer::new();
    let mut driver =
        FrameDriver::new(two_material_document(), &mut renderer, &Config::default()).unwrap();
    for _ in 0..3 {
        driver.render_frame(&mut renderer).unwrap();
        assert_eq!(renderer.draws.len(), 2);
    }
    assert_eq!(renderer.frames_begun, 3);
    assert_eq!(renderer.frames_ended, 3);

    renderer.release();
    assert!(renderer.buffers.is_empty());
    assert!(renderer.released);
}

#[test]
fn light_and_material_come_from_config() {
    let mut config = Config::default();
    config.light.position = [4.0, 5.0, 6.0];
    config.material.shininess = 12.0;
    let document = single_mesh_document(NodeTransform::default());
    let mut renderer = RecordingRenderer::new();
    let mut driver = FrameDriver::new(document, &mut renderer, &config).unwrap();
    driver.render_frame(&mut renderer).unwrap();

    let uniforms = renderer.draws[0].0;
    assert_eq!(uniforms.light_position, [4.0, 5.0, 6.0]);
    assert_eq!(uniforms.material_shininess, 12.0);
    assert_eq!(uniforms.material_ambient, [0.3, 0.0, 0.0, 1.0]);
    assert_eq!(uniforms.light_diffuse, [1.0; 4]);
}

#[test]
fn out_of_range_material_fails_before_upload() {
    let mut document = single_mesh_document(NodeTransform::default());
    document.meshes[0].primitives[0].material = Some(7);
    let mut renderer = RecordingRenderer::new();

    let err = FrameDriver::new(document, &mut renderer, &Config::default()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<SceneError>(),
        Some(&SceneError::InvalidReference {
            owner: "mesh 0 primitive 0".to_string(),
            kind: "material",
            index: 7,
            len: 0,
        })
    );
    assert!(renderer.buffers.is_empty());
    assert!(renderer.textures.is_empty());
}

#[test]
fn out_of_range_image_fails_before_upload() {
    let mut document = two_material_document();
    document.textures[1].image = 9;
    let mut renderer = RecordingRenderer::new();

    let err = GpuScene::upload(&document, &mut renderer).unwrap_err();
    assert!(format!("{err}").contains("texture 1 references image 9"));
    assert!(renderer.textures.is_empty());
}
