//! Ribbon mesh generation from a centerline polyline.
//!
//! Resamples the centerline at a fixed arc-length spacing, derives
//! per-sample tangents, and extrudes a quad strip of track width.

#![allow(dead_code)]

use bevy::prelude::*;
use bytemuck::{Pod, Zeroable};
use thiserror::Error;

/// Floats per vertex: position.xyz + uv.xy.
pub const VERTEX_STRIDE: usize = 5;

/// Errors from track mesh construction. Both leave the caller's
/// previous track untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackBuildError {
    #[error("track needs at least 2 centerline points and a positive width")]
    InvalidTrackData,
    #[error("resampled centerline collapsed below 2 points")]
    DegenerateResample,
}

/// One ribbon vertex. `#[repr(C)]` + Pod so the vertex buffer can be
/// viewed as a flat `&[f32]` with stride [`VERTEX_STRIDE`].
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct RibbonVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Triangle-list geometry for the drivable ribbon.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackMesh {
    /// Two vertices per centerline sample (left edge, right edge).
    pub vertices: Vec<RibbonVertex>,
    /// Two triangles per consecutive sample pair.
    pub indices: Vec<u32>,
}

impl TrackMesh {
    /// The vertex buffer as raw floats (5 per vertex).
    pub fn vertex_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Sampled centerline geometry kept alongside the mesh for runtime
/// nearest-point queries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackGeometry {
    /// Resampled centerline points, approximately arc-length spaced.
    pub samples: Vec<Vec2>,
    /// Unit tangent per sample, index-aligned with `samples`.
    pub tangents: Vec<Vec2>,
    /// Lane width in world units.
    pub width: f32,
    /// Total arc length of the resampled centerline.
    pub total_length: f32,
}

/// Cumulative arc length at each point, starting at 0.
fn cumulative_distances(points: &[Vec2]) -> Vec<f32> {
    let mut cumulative = vec![0.0; points.len()];
    for i in 1..points.len() {
        cumulative[i] = cumulative[i - 1] + points[i - 1].distance(points[i]);
    }
    cumulative
}

/// Redistribute points at approximately `spacing` arc-length intervals.
///
/// The first and last input points are always preserved exactly; tracks
/// shorter than half a spacing are returned unresampled.
fn resample(points: &[Vec2], spacing: f32) -> Vec<Vec2> {
    if points.len() < 2 || spacing <= 0.0 {
        return points.to_vec();
    }
    let cumulative = cumulative_distances(points);
    let total_length = *cumulative.last().unwrap_or(&0.0);
    if total_length < spacing * 0.5 {
        return points.to_vec();
    }

    let mut result = Vec::with_capacity((total_length / spacing) as usize + 2);
    result.push(points[0]);

    let sample_count = (total_length / spacing) as usize;
    for i in 1..=sample_count {
        let target = spacing * i as f32;
        if target >= total_length {
            break;
        }
        // First cumulative distance >= target, then back up one segment.
        let upper = cumulative.partition_point(|&d| d < target);
        let index = upper.saturating_sub(1);
        let next_index = (index + 1).min(points.len() - 1);
        let segment_length = (cumulative[next_index] - cumulative[index]).max(1e-4);
        let factor = (target - cumulative[index]) / segment_length;
        result.push(points[index].lerp(points[next_index], factor));
    }

    let last = *points.last().unwrap_or(&Vec2::ZERO);
    if result.last().is_some_and(|p| p.distance(last) > 1e-3) {
        result.push(last);
    }
    result
}

/// Unit tangent at `index`: forward difference at the first sample,
/// backward at the last, central elsewhere. Degenerate (duplicate
/// point) differences yield a zero vector, never NaN.
fn tangent_at(samples: &[Vec2], index: usize) -> Vec2 {
    if samples.len() < 2 {
        return Vec2::X;
    }
    if index == 0 {
        (samples[1] - samples[0]).normalize_or_zero()
    } else if index == samples.len() - 1 {
        (samples[index] - samples[index - 1]).normalize_or_zero()
    } else {
        (samples[index + 1] - samples[index - 1]).normalize_or_zero()
    }
}

/// Build the drivable ribbon mesh and its sampled geometry.
///
/// The centerline lies in the 2D track plane; emitted vertex positions
/// map it onto world XZ with Y up. Either both outputs are produced
/// consistently or the call fails with no partial output.
pub fn build_track_mesh(
    centerline: &[Vec2],
    width: f32,
) -> Result<(TrackMesh, TrackGeometry), TrackBuildError> {
    if centerline.len() < 2 || width <= 0.0 {
        return Err(TrackBuildError::InvalidTrackData);
    }

    let spacing = (width * 0.25).max(1.0);
    let samples = resample(centerline, spacing);
    if samples.len() < 2 {
        return Err(TrackBuildError::DegenerateResample);
    }
    let cumulative = cumulative_distances(&samples);

    let half_width = width * 0.5;
    let uv_scale = 1.0 / width.max(1.0);

    let mut mesh = TrackMesh {
        vertices: Vec::with_capacity(samples.len() * 2),
        indices: Vec::with_capacity((samples.len() - 1) * 6),
    };
    let mut tangents = Vec::with_capacity(samples.len());

    for (i, &center) in samples.iter().enumerate() {
        let tangent = tangent_at(&samples, i);
        tangents.push(tangent);
        let normal = Vec2::new(-tangent.y, tangent.x);

        let left = center + normal * half_width;
        let right = center - normal * half_width;
        let v = cumulative[i] * uv_scale;

        mesh.vertices.push(RibbonVertex {
            position: [left.x, 0.0, left.y],
            uv: [0.0, v],
        });
        mesh.vertices.push(RibbonVertex {
            position: [right.x, 0.0, right.y],
            uv: [1.0, v],
        });

        if i + 1 < samples.len() {
            let base = (i * 2) as u32;
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base + 1, base + 3, base + 2]);
        }
    }

    let geometry = TrackGeometry {
        total_length: *cumulative.last().unwrap_or(&0.0),
        samples,
        tangents,
        width,
    };
    Ok((mesh, geometry))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_centerline() -> Vec<Vec2> {
        (0..5).map(|i| Vec2::new(i as f32 * 10.0, 0.0)).collect()
    }

    #[test]
    fn straight_track_has_expected_buffer_sizes() {
        let (mesh, geometry) = build_track_mesh(&straight_centerline(), 8.0).unwrap();
        assert_eq!(geometry.samples.len(), geometry.tangents.len());
        assert!(geometry.samples.len() >= 2);
        assert_eq!(mesh.vertices.len(), geometry.samples.len() * 2);
        assert_eq!(mesh.indices.len(), 6 * (geometry.samples.len() - 1));
        assert_eq!(
            mesh.vertex_floats().len(),
            VERTEX_STRIDE * mesh.vertices.len()
        );
        assert!((geometry.total_length - 40.0).abs() < 1e-3);
    }

    #[test]
    fn resampling_preserves_endpoints() {
        let points = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 4.0),
            Vec2::new(3.0, 14.0),
            Vec2::new(-5.0, 20.0),
        ];
        let (_, geometry) = build_track_mesh(&points, 6.0).unwrap();
        assert!(geometry.samples[0].distance(points[0]) < 1e-4);
        assert!(
            geometry
                .samples
                .last()
                .unwrap()
                .distance(*points.last().unwrap())
                < 1e-3
        );
    }

    #[test]
    fn samples_are_spaced_near_target_interval() {
        let (_, geometry) = build_track_mesh(&straight_centerline(), 8.0).unwrap();
        let spacing = (8.0f32 * 0.25).max(1.0);
        // All interior gaps match the target; the final gap may be shorter.
        for pair in geometry.samples.windows(2).rev().skip(1) {
            assert!((pair[0].distance(pair[1]) - spacing).abs() < 1e-3);
        }
        let last_gap = geometry.samples[geometry.samples.len() - 2]
            .distance(*geometry.samples.last().unwrap());
        assert!(last_gap <= spacing + 1e-3);
    }

    #[test]
    fn tangents_are_unit_and_normals_orthogonal() {
        let points = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 2.0),
            Vec2::new(18.0, 9.0),
            Vec2::new(20.0, 20.0),
        ];
        let (_, geometry) = build_track_mesh(&points, 5.0).unwrap();
        for tangent in &geometry.tangents {
            assert!((tangent.length() - 1.0).abs() < 1e-4);
            let normal = Vec2::new(-tangent.y, tangent.x);
            assert!(tangent.dot(normal).abs() < 1e-6);
            assert!((normal.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let points = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(7.0, 3.0),
            Vec2::new(15.0, -2.0),
            Vec2::new(30.0, 5.0),
        ];
        let first = build_track_mesh(&points, 6.0).unwrap();
        let second = build_track_mesh(&points, 6.0).unwrap();
        assert_eq!(first.0, second.0);
        assert_eq!(first.1, second.1);
    }

    #[test]
    fn short_track_is_returned_unresampled() {
        // Total length 0.3 is below half the 1.0 minimum spacing.
        let points = vec![Vec2::new(0.0, 0.0), Vec2::new(0.3, 0.0)];
        let (_, geometry) = build_track_mesh(&points, 2.0).unwrap();
        assert_eq!(geometry.samples, points);
    }

    #[test]
    fn short_straight_centerline_yields_one_quad_per_segment() {
        // Total length 0.8 is under half the 2.0 spacing, so all five
        // input points survive as samples: 10 vertices, 24 indices.
        let points: Vec<Vec2> = (0..5).map(|i| Vec2::new(i as f32 * 0.2, 0.0)).collect();
        let (mesh, geometry) = build_track_mesh(&points, 8.0).unwrap();
        assert_eq!(geometry.samples.len(), 5);
        assert_eq!(mesh.vertices.len(), 10);
        assert_eq!(mesh.indices.len(), 24);
    }

    #[test]
    fn tiny_loop_collapses_to_degenerate_resample() {
        // Long enough to trigger resampling, but the loop closes within
        // endpoint tolerance and only one sample survives.
        let points = vec![Vec2::ZERO, Vec2::new(0.3, 0.0), Vec2::new(0.0005, 0.0)];
        assert_eq!(
            build_track_mesh(&points, 2.0),
            Err(TrackBuildError::DegenerateResample)
        );
    }

    #[test]
    fn rejects_degenerate_input() {
        assert_eq!(
            build_track_mesh(&[Vec2::ZERO], 8.0),
            Err(TrackBuildError::InvalidTrackData)
        );
        assert_eq!(
            build_track_mesh(&straight_centerline(), 0.0),
            Err(TrackBuildError::InvalidTrackData)
        );
        assert_eq!(
            build_track_mesh(&straight_centerline(), -3.0),
            Err(TrackBuildError::InvalidTrackData)
        );
    }

    #[test]
    fn winding_is_consistent_across_quads() {
        let (mesh, _) = build_track_mesh(&straight_centerline(), 8.0).unwrap();
        for (quad, chunk) in mesh.indices.chunks_exact(6).enumerate() {
            let base = (quad * 2) as u32;
            assert_eq!(
                chunk,
                &[base, base + 1, base + 2, base + 1, base + 3, base + 2]
            );
        }
    }
}
