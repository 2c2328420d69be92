// Binary glTF (GLB) mesh extraction for the avatar.
//
// All triangle primitives of the default scene are flattened into a single
// indexed mesh in model space, then centred on the origin and scaled to a
// fixed bounding radius so the camera framing does not depend on the
// asset's units. Draco-compressed primitives are decoded outside this
// module and passed in.

use crate::core::constants::{DEFAULT_ALBEDO, MODEL_FIT_RADIUS};
use fnv::{FnvHashMap, FnvHashSet};
use glam::{Mat3, Mat4, Vec3};
use serde_json::Value;
use std::borrow::Cow;
use thiserror::Error;

pub const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[derive(Clone, Debug)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub albedo: [f32; 3],
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("glTF: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("buffer {0:?} is external; only self-contained GLB files are supported")]
    ExternalBuffer(String),
    #[error("primitive has no POSITION attribute")]
    MissingPositions,
    #[error("model contains no triangles")]
    NoMesh,
    #[error("malformed KHR_draco_mesh_compression: {0}")]
    Draco(String),
    #[error("mesh {mesh} primitive {primitive} is Draco-compressed and was not decoded")]
    UndecodedDraco { mesh: usize, primitive: usize },
}

/// Compressed bytes of one Draco primitive plus the Draco attribute ids
/// that hold its positions and normals.
#[derive(Clone, Debug, PartialEq)]
pub struct DracoPayload {
    pub mesh: usize,
    pub primitive: usize,
    pub data: Vec<u8>,
    pub position: u32,
    pub normal: Option<u32>,
}

/// Geometry a Draco decoder produced for one primitive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedPrimitive {
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub indices: Vec<u32>,
}

impl DecodedPrimitive {
    /// Build from flat xyz arrays as decoders hand them out.
    pub fn from_flat(positions: &[f32], normals: Option<&[f32]>, indices: Vec<u32>) -> Self {
        let triples = |flat: &[f32]| -> Vec<[f32; 3]> {
            flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
        };
        Self {
            positions: triples(positions),
            normals: normals.map(triples),
            indices,
        }
    }
}

/// Decoded primitives keyed by (mesh index, primitive index).
pub type DecodedPrimitives = FnvHashMap<(usize, usize), DecodedPrimitive>;

/// The JSON document and BIN chunk of a GLB, or a bare glTF JSON document.
fn split_glb(bytes: &[u8]) -> Result<(Cow<'_, [u8]>, Option<Cow<'_, [u8]>>), ModelError> {
    if bytes.starts_with(b"glTF") {
        let glb = gltf::Glb::from_slice(bytes)?;
        Ok((glb.json, glb.bin))
    } else {
        Ok((Cow::Borrowed(bytes), None))
    }
}

fn raw_document(json: &[u8]) -> Option<Value> {
    serde_json::from_slice(json).ok()
}

fn uses_draco(root: &Value) -> bool {
    ["extensionsUsed", "extensionsRequired"].iter().any(|key| {
        root[*key]
            .as_array()
            .is_some_and(|list| list.iter().any(|e| e.as_str() == Some(DRACO_EXTENSION)))
    })
}

/// Every primitive carrying the Draco extension, with the extension object.
fn draco_primitives(root: &Value) -> Vec<((usize, usize), &Value)> {
    let mut out = Vec::new();
    let Some(meshes) = root["meshes"].as_array() else {
        return out;
    };
    for (m, mesh) in meshes.iter().enumerate() {
        let Some(prims) = mesh["primitives"].as_array() else {
            continue;
        };
        for (p, prim) in prims.iter().enumerate() {
            let ext = &prim["extensions"][DRACO_EXTENSION];
            if ext.is_object() {
                out.push(((m, p), ext));
            }
        }
    }
    out
}

fn attribute_id(ext: &Value, name: &str) -> Option<u32> {
    ext["attributes"][name].as_u64().and_then(|id| u32::try_from(id).ok())
}

/// Slice the compressed bytes of every Draco primitive out of the BIN chunk.
/// Models without the extension yield an empty list.
pub fn draco_payloads(bytes: &[u8]) -> Result<Vec<DracoPayload>, ModelError> {
    let Ok((json, bin)) = split_glb(bytes) else {
        return Ok(Vec::new());
    };
    let Some(root) = raw_document(&json) else {
        return Ok(Vec::new());
    };
    if !uses_draco(&root) {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for ((mesh, primitive), ext) in draco_primitives(&root) {
        let view_index = ext["bufferView"]
            .as_u64()
            .ok_or_else(|| ModelError::Draco("missing bufferView".into()))?;
        let view = &root["bufferViews"][view_index as usize];
        if !view.is_object() {
            return Err(ModelError::Draco(format!("no bufferView {view_index}")));
        }
        let buffer = &root["buffers"][view["buffer"].as_u64().unwrap_or(0) as usize];
        if let Some(uri) = buffer["uri"].as_str() {
            return Err(ModelError::ExternalBuffer(uri.to_owned()));
        }
        let offset = view["byteOffset"].as_u64().unwrap_or(0) as usize;
        let length = view["byteLength"]
            .as_u64()
            .ok_or_else(|| ModelError::Draco(format!("bufferView {view_index} has no byteLength")))?
            as usize;
        let data = bin
            .as_deref()
            .and_then(|b| b.get(offset..offset.checked_add(length)?))
            .ok_or_else(|| ModelError::Draco(format!("bufferView {view_index} out of range")))?;
        out.push(DracoPayload {
            mesh,
            primitive,
            data: data.to_vec(),
            position: attribute_id(ext, "POSITION").ok_or(ModelError::MissingPositions)?,
            normal: attribute_id(ext, "NORMAL"),
        });
    }
    Ok(out)
}

struct Sources<'a> {
    blob: Option<&'a [u8]>,
    compressed: FnvHashSet<(usize, usize)>,
    decoded: &'a DecodedPrimitives,
}

/// Parse a GLB into one fitted mesh. Draco-compressed primitives are taken
/// from `decoded`, which must hold an entry for each of them.
pub fn parse_glb(bytes: &[u8], decoded: &DecodedPrimitives) -> Result<MeshData, ModelError> {
    let root = split_glb(bytes)
        .ok()
        .and_then(|(json, _)| raw_document(&json));
    let draco = root.as_ref().is_some_and(uses_draco);
    // Validation rejects the extension as unsupported
    let gltf = if draco {
        gltf::Gltf::from_slice_without_validation(bytes)?
    } else {
        gltf::Gltf::from_slice(bytes)?
    };
    for buffer in gltf.buffers() {
        if let gltf::buffer::Source::Uri(uri) = buffer.source() {
            return Err(ModelError::ExternalBuffer(uri.to_owned()));
        }
    }
    let compressed = match (&root, draco) {
        (Some(root), true) => draco_primitives(root).into_iter().map(|(k, _)| k).collect(),
        _ => FnvHashSet::default(),
    };
    let src = Sources {
        blob: gltf.blob.as_deref(),
        compressed,
        decoded,
    };
    let mut mesh = MeshData {
        vertices: Vec::new(),
        indices: Vec::new(),
        albedo: DEFAULT_ALBEDO,
    };
    match gltf.default_scene().or_else(|| gltf.scenes().next()) {
        Some(scene) => {
            for node in scene.nodes() {
                collect_node(&node, Mat4::IDENTITY, &src, &mut mesh)?;
            }
        }
        None => {
            for m in gltf.meshes() {
                collect_mesh(&m, Mat4::IDENTITY, &src, &mut mesh)?;
            }
        }
    }
    if mesh.indices.is_empty() {
        return Err(ModelError::NoMesh);
    }
    fit_to_radius(&mut mesh.vertices, MODEL_FIT_RADIUS);
    Ok(mesh)
}

fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    src: &Sources,
    out: &mut MeshData,
) -> Result<(), ModelError> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(m) = node.mesh() {
        collect_mesh(&m, world, src, out)?;
    }
    for child in node.children() {
        collect_node(&child, world, src, out)?;
    }
    Ok(())
}

/// Positions, optional normals and indices of one primitive in its own space.
fn read_primitive(
    mesh: &gltf::Mesh,
    prim: &gltf::Primitive,
    src: &Sources,
) -> Result<DecodedPrimitive, ModelError> {
    let key = (mesh.index(), prim.index());
    if src.compressed.contains(&key) {
        return src
            .decoded
            .get(&key)
            .cloned()
            .ok_or(ModelError::UndecodedDraco {
                mesh: key.0,
                primitive: key.1,
            });
    }
    let blob = src.blob;
    let reader = prim.reader(|buffer| match buffer.source() {
        gltf::buffer::Source::Bin => blob,
        gltf::buffer::Source::Uri(_) => None,
    });
    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or(ModelError::MissingPositions)?
        .collect();
    let indices = match reader.read_indices() {
        Some(idx) => idx.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    Ok(DecodedPrimitive {
        positions,
        normals: reader.read_normals().map(|it| it.collect()),
        indices,
    })
}

fn collect_mesh(
    mesh: &gltf::Mesh,
    world: Mat4,
    src: &Sources,
    out: &mut MeshData,
) -> Result<(), ModelError> {
    let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
    for prim in mesh.primitives() {
        if prim.mode() != gltf::mesh::Mode::Triangles {
            continue;
        }
        let raw = read_primitive(mesh, &prim, src)?;
        let positions: Vec<Vec3> = raw
            .positions
            .iter()
            .map(|p| world.transform_point3(Vec3::from(*p)))
            .collect();
        let normals: Vec<Vec3> = raw
            .normals
            .unwrap_or_default()
            .iter()
            .map(|n| (normal_matrix * Vec3::from(*n)).normalize_or_zero())
            .collect();
        let normals = if normals.len() == positions.len() {
            normals
        } else {
            vertex_normals(&positions, &raw.indices)
        };

        if out.vertices.is_empty() && prim.material().index().is_some() {
            let c = prim.material().pbr_metallic_roughness().base_color_factor();
            out.albedo = [c[0], c[1], c[2]];
        }

        let base = out.vertices.len() as u32;
        out.vertices
            .extend(positions.iter().zip(normals.iter()).map(|(p, n)| MeshVertex {
                position: p.to_array(),
                normal: n.to_array(),
            }));
        out.indices.extend(raw.indices.iter().map(|i| i + base));
    }
    Ok(())
}

/// Area-weighted smooth normals for primitives that ship without them.
pub fn vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter().map(Vec3::normalize_or_zero).collect()
}

/// Centre the bounding box on the origin and scale to `radius`.
pub fn fit_to_radius(vertices: &mut [MeshVertex], radius: f32) {
    if vertices.is_empty() {
        return;
    }
    let (min, max) = vertices.iter().fold(
        (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
        |(lo, hi), v| {
            let p = Vec3::from(v.position);
            (lo.min(p), hi.max(p))
        },
    );
    let center = (min + max) * 0.5;
    let extent = vertices
        .iter()
        .map(|v| (Vec3::from(v.position) - center).length())
        .fold(0.0_f32, f32::max);
    let scale = if extent > 0.0 { radius / extent } else { 1.0 };
    for v in vertices.iter_mut() {
        v.position = ((Vec3::from(v.position) - center) * scale).to_array();
    }
}
