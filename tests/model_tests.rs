// Host-side tests for GLB mesh extraction.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]

mod core {
    pub mod constants {
        include!("../src/core/constants.rs");
    }
    pub mod model {
        include!("../src/core/model.rs");
    }
}

use crate::core::constants::{DEFAULT_ALBEDO, MODEL_FIT_RADIUS};
use crate::core::model::*;
use glam::Vec3;

const TRIANGLE_JSON: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [ { "nodes": [0] } ],
  "nodes": [ { "mesh": 0 } ],
  "meshes": [ { "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1 } ] } ],
  "buffers": [ { "byteLength": 42 } ],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [2.0, 2.0, 0.0] },
    { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
  ]
}"#;

const DRACO_JSON: &str = r#"{
  "asset": { "version": "2.0" },
  "extensionsUsed": ["KHR_draco_mesh_compression"],
  "extensionsRequired": ["KHR_draco_mesh_compression"],
  "scene": 0,
  "scenes": [ { "nodes": [0] } ],
  "nodes": [ { "mesh": 0 } ],
  "meshes": [ { "primitives": [ {
    "attributes": { "POSITION": 0, "NORMAL": 1 },
    "indices": 2,
    "extensions": { "KHR_draco_mesh_compression": {
      "bufferView": 0, "attributes": { "POSITION": 3, "NORMAL": 7 } } }
  } ] } ],
  "buffers": [ { "byteLength": 8 } ],
  "bufferViews": [ { "buffer": 0, "byteOffset": 0, "byteLength": 8 } ],
  "accessors": [
    { "componentType": 5126, "count": 3, "type": "VEC3" },
    { "componentType": 5126, "count": 3, "type": "VEC3" },
    { "componentType": 5125, "count": 3, "type": "SCALAR" }
  ]
}"#;

const DRACO_BIN: [u8; 8] = *b"DRACO\x02\x02\x01";

fn none() -> DecodedPrimitives {
    DecodedPrimitives::default()
}

fn pad(mut bytes: Vec<u8>, fill: u8) -> Vec<u8> {
    while bytes.len() % 4 != 0 {
        bytes.push(fill);
    }
    bytes
}

/// Assemble a binary glTF container from a JSON document and BIN payload.
fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
    let json = pad(json.as_bytes().to_vec(), b' ');
    let bin = pad(bin.to_vec(), 0);
    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(b"BIN\0");
    out.extend_from_slice(&bin);
    out
}

fn triangle_bin() -> Vec<u8> {
    let mut bin = Vec::new();
    for p in [[0.0f32, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]] {
        for c in p {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    for i in [0u16, 1, 2] {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    bin
}

#[test]
fn triangle_is_centred_and_fitted() {
    let mesh = parse_glb(&glb(TRIANGLE_JSON, &triangle_bin()), &none()).expect("valid glb");
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert_eq!(mesh.vertices.len(), 3);
    assert_eq!(mesh.albedo, DEFAULT_ALBEDO);

    let positions: Vec<Vec3> = mesh.vertices.iter().map(|v| Vec3::from(v.position)).collect();
    let (lo, hi) = positions
        .iter()
        .fold((Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)), |(lo, hi), p| {
            (lo.min(*p), hi.max(*p))
        });
    assert!(((lo + hi) * 0.5).length() < 1e-5, "bbox centre {:?}", (lo + hi) * 0.5);
    let radius = positions.iter().map(|p| p.length()).fold(0.0f32, f32::max);
    assert!((radius - MODEL_FIT_RADIUS).abs() < 1e-5);
}

#[test]
fn missing_normals_are_generated() {
    let mesh = parse_glb(&glb(TRIANGLE_JSON, &triangle_bin()), &none()).expect("valid glb");
    for v in &mesh.vertices {
        assert!((Vec3::from(v.normal) - Vec3::Z).length() < 1e-5);
    }
}

#[test]
fn garbage_bytes_are_rejected() {
    assert!(matches!(
        parse_glb(b"definitely not a model", &none()),
        Err(ModelError::Gltf(_))
    ));
}

#[test]
fn external_buffers_are_rejected() {
    let json = TRIANGLE_JSON.replace(
        r#"{ "byteLength": 42 }"#,
        r#"{ "byteLength": 42, "uri": "stone.bin" }"#,
    );
    assert!(matches!(
        parse_glb(json.as_bytes(), &none()),
        Err(ModelError::ExternalBuffer(uri)) if uri == "stone.bin"
    ));
}

#[test]
fn document_without_meshes_is_rejected() {
    let json = r#"{ "asset": { "version": "2.0" } }"#;
    assert!(matches!(parse_glb(json.as_bytes(), &none()), Err(ModelError::NoMesh)));
}

#[test]
fn vertex_normals_average_adjacent_faces() {
    // Two triangles folded along the X axis
    let positions = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
    ];
    let indices = [0, 1, 2, 0, 3, 1];
    let normals = vertex_normals(&positions, &indices);
    assert!((normals[2] - Vec3::Z).length() < 1e-6);
    assert!((normals[3] - Vec3::Y).length() < 1e-6);
    let shared = Vec3::new(0.0, 1.0, 1.0).normalize();
    assert!((normals[0] - shared).length() < 1e-6);
    // Out-of-range indices are skipped
    assert_eq!(vertex_normals(&positions, &[0, 1, 9]).len(), 4);
}

#[test]
fn fit_to_radius_handles_degenerate_input() {
    let mut empty: Vec<MeshVertex> = Vec::new();
    fit_to_radius(&mut empty, 1.0);
    let mut single = vec![MeshVertex {
        position: [3.0, 4.0, 5.0],
        normal: [0.0, 1.0, 0.0],
    }];
    fit_to_radius(&mut single, 1.0);
    assert_eq!(single[0].position, [0.0, 0.0, 0.0]);
}

#[test]
fn plain_models_carry_no_draco_payloads() {
    let bytes = glb(TRIANGLE_JSON, &triangle_bin());
    assert!(draco_payloads(&bytes).expect("readable").is_empty());
    assert!(draco_payloads(b"definitely not a model")
        .expect("garbage is left to the parser")
        .is_empty());
}

#[test]
fn draco_payload_is_sliced_from_the_bin_chunk() {
    let payloads = draco_payloads(&glb(DRACO_JSON, &DRACO_BIN)).expect("payloads");
    assert_eq!(
        payloads,
        vec![DracoPayload {
            mesh: 0,
            primitive: 0,
            data: DRACO_BIN.to_vec(),
            position: 3,
            normal: Some(7),
        }]
    );
}

#[test]
fn draco_payload_outside_the_bin_chunk_is_malformed() {
    let json = DRACO_JSON.replace(
        r#""byteOffset": 0, "byteLength": 8"#,
        r#""byteOffset": 0, "byteLength": 64"#,
    );
    assert!(matches!(
        draco_payloads(&glb(&json, &DRACO_BIN)),
        Err(ModelError::Draco(_))
    ));
}

#[test]
fn undecoded_draco_primitive_is_reported() {
    assert!(matches!(
        parse_glb(&glb(DRACO_JSON, &DRACO_BIN), &none()),
        Err(ModelError::UndecodedDraco {
            mesh: 0,
            primitive: 0
        })
    ));
}

#[test]
fn decoded_draco_primitive_builds_the_mesh() {
    let mut decoded = none();
    decoded.insert(
        (0, 0),
        DecodedPrimitive::from_flat(
            &[0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0, 0.0],
            Some(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]),
            vec![0, 1, 2],
        ),
    );
    let mesh = parse_glb(&glb(DRACO_JSON, &DRACO_BIN), &decoded).expect("decoded mesh");
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert_eq!(mesh.vertices.len(), 3);
    for v in &mesh.vertices {
        assert_eq!(v.normal, [0.0, 0.0, 1.0]);
    }
    let radius = mesh
        .vertices
        .iter()
        .map(|v| Vec3::from(v.position).length())
        .fold(0.0f32, f32::max);
    assert!((radius - MODEL_FIT_RADIUS).abs() < 1e-5);
}

#[test]
fn decoded_primitive_groups_flat_components() {
    let prim = DecodedPrimitive::from_flat(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], None, vec![0, 1, 0]);
    assert_eq!(prim.positions, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    assert_eq!(prim.normals, None);
}
