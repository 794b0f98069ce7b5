use std::collections::{BTreeMap, HashMap};

use crate::data_structures::scene_graph::{Accessor, Indices, Mesh, Primitive, Semantic, Topology};

/// Decoded accessors, deduplicated by their glTF index so primitives that share
/// an accessor share the decoded data too.
#[derive(Default)]
struct AccessorTable {
    slots: HashMap<usize, usize>,
    accessors: Vec<Accessor>,
}

impl AccessorTable {
    fn get_or_decode(
        &mut self,
        gltf_index: usize,
        decode: impl FnOnce() -> Option<Accessor>,
    ) -> Option<usize> {
        if let Some(&slot) = self.slots.get(&gltf_index) {
            return Some(slot);
        }
        let accessor = decode()?;
        let slot = self.accessors.len();
        self.accessors.push(accessor);
        self.slots.insert(gltf_index, slot);
        Some(slot)
    }
}

pub fn topology(mode: gltf::mesh::Mode) -> Topology {
    match mode {
        gltf::mesh::Mode::Points => Topology::Points,
        gltf::mesh::Mode::Lines => Topology::Lines,
        gltf::mesh::Mode::LineLoop => Topology::LineLoop,
        gltf::mesh::Mode::LineStrip => Topology::LineStrip,
        gltf::mesh::Mode::Triangles => Topology::Triangles,
        gltf::mesh::Mode::TriangleStrip => Topology::TriangleStrip,
        gltf::mesh::Mode::TriangleFan => Topology::TriangleFan,
    }
}

/// Converts every glTF mesh and the accessors its primitives use.
///
/// Only POSITION, NORMAL and TEXCOORD_0 are read. u8 indices are widened to
/// u16 since GPUs do not take byte index buffers.
pub fn load_meshes(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> (Vec<Mesh>, Vec<Accessor>) {
    let mut table = AccessorTable::default();
    let meshes = document
        .meshes()
        .map(|mesh| {
            let primitives = mesh
                .primitives()
                .map(|primitive| load_primitive(&primitive, buffers, &mut table))
                .collect();
            Mesh {
                name: mesh.name().map(str::to_string),
                primitives,
            }
        })
        .collect();
    (meshes, table.accessors)
}

fn load_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    table: &mut AccessorTable,
) -> Primitive {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));
    let mut attributes = BTreeMap::new();

    if let Some(accessor) = primitive.get(&gltf::Semantic::Positions) {
        let slot = table.get_or_decode(accessor.index(), || {
            reader
                .read_positions()
                .map(|positions| Accessor::Vec3(positions.collect()))
        });
        if let Some(slot) = slot {
            attributes.insert(Semantic::Position, slot);
        }
    }
    if let Some(accessor) = primitive.get(&gltf::Semantic::Normals) {
        let slot = table.get_or_decode(accessor.index(), || {
            reader
                .read_normals()
                .map(|normals| Accessor::Vec3(normals.collect()))
        });
        if let Some(slot) = slot {
            attributes.insert(Semantic::Normal, slot);
        }
    }
    if let Some(accessor) = primitive.get(&gltf::Semantic::TexCoords(0)) {
        let slot = table.get_or_decode(accessor.index(), || {
            reader
                .read_tex_coords(0)
                .map(|coords| Accessor::Vec2(coords.into_f32().collect()))
        });
        if let Some(slot) = slot {
            attributes.insert(Semantic::TexCoord0, slot);
        }
    }

    let indices = primitive.indices().and_then(|accessor| {
        table.get_or_decode(accessor.index(), || {
            reader.read_indices().map(|indices| {
                let indices = match indices {
                    gltf::mesh::util::ReadIndices::U8(iter) => {
                        Indices::U16(iter.map(u16::from).collect())
                    }
                    gltf::mesh::util::ReadIndices::U16(iter) => Indices::U16(iter.collect()),
                    gltf::mesh::util::ReadIndices::U32(iter) => Indices::U32(iter.collect()),
                };
                Accessor::Indices(indices)
            })
        })
    });

    Primitive {
        attributes,
        indices,
        mode: topology(primitive.mode()),
        material: primitive.material().index(),
    }
}
