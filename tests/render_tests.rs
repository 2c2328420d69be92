// Host-side tests for how the frame loop reacts to surface errors.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]

mod helpers {
    include!("../src/render/helpers.rs");
}

use helpers::{surface_recovery, SurfaceRecovery};

#[test]
fn lost_and_outdated_surfaces_are_reconfigured() {
    assert_eq!(
        surface_recovery(&wgpu::SurfaceError::Lost),
        SurfaceRecovery::Reconfigure
    );
    assert_eq!(
        surface_recovery(&wgpu::SurfaceError::Outdated),
        SurfaceRecovery::Reconfigure
    );
}

#[test]
fn timeout_only_skips_the_frame() {
    assert_eq!(
        surface_recovery(&wgpu::SurfaceError::Timeout),
        SurfaceRecovery::SkipFrame
    );
}

#[test]
fn out_of_memory_gives_up_on_the_gpu() {
    assert_eq!(
        surface_recovery(&wgpu::SurfaceError::OutOfMemory),
        SurfaceRecovery::Fatal
    );
}
