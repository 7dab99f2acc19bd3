//! Scene setup and mesh mirroring for the preview.
//!
//! Converts the simulation's ribbon buffers into a renderable Bevy
//! mesh whenever a new track loads, and keeps a simple car marker in
//! sync with the simulated pose. All simulation math lives elsewhere;
//! this layer only uploads and positions.

use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};

use crate::sim::SimContext;
use crate::track::mesh::TrackMesh;
use crate::track::ActiveTrack;

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene)
            .add_systems(Update, (upload_track_mesh, sync_car_marker));
    }
}

/// Marker for the drivable ribbon entity.
#[derive(Component)]
pub struct TrackSurface;

/// Marker for the car box.
#[derive(Component)]
pub struct CarMarker;

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.9, 0.4, 0.0)),
    ));

    // Ground plane slightly below the ribbon so the track reads as raised.
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(600.0, 600.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.08, 0.12, 0.08),
            perceptual_roughness: 1.0,
            ..default()
        })),
        Transform::from_xyz(0.0, -0.05, 0.0),
    ));

    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(4.2, 1.2, 1.8))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.85, 0.2, 0.15),
            perceptual_roughness: 0.5,
            ..default()
        })),
        Transform::from_xyz(0.0, 0.6, 0.0),
        CarMarker,
    ));
}

/// Replace the track entity whenever a new track has been loaded.
fn upload_track_mesh(
    mut commands: Commands,
    active: Res<ActiveTrack>,
    mut last_revision: Local<u32>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    existing: Query<Entity, With<TrackSurface>>,
) {
    if active.revision == *last_revision {
        return;
    }
    let Some(track_mesh) = &active.mesh else {
        return;
    };
    *last_revision = active.revision;

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    commands.spawn((
        Mesh3d(meshes.add(to_render_mesh(track_mesh))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.3, 0.32, 0.36),
            perceptual_roughness: 0.9,
            double_sided: true,
            cull_mode: None,
            ..default()
        })),
        Transform::IDENTITY,
        TrackSurface,
    ));
}

/// Expand the packed ribbon buffers into Bevy mesh attributes.
fn to_render_mesh(track: &TrackMesh) -> Mesh {
    let positions: Vec<[f32; 3]> = track.vertices.iter().map(|v| v.position).collect();
    let uvs: Vec<[f32; 2]> = track.vertices.iter().map(|v| v.uv).collect();
    let normals = vec![[0.0, 1.0, 0.0]; track.vertices.len()];

    Mesh::new(PrimitiveTopology::TriangleList, default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_indices(Indices::U32(track.indices.clone()))
}

/// Mirror the simulated car pose: track-plane (x, y) maps to world
/// (x, 0, z), heading rotates about +Y.
fn sync_car_marker(sim: Res<SimContext>, mut markers: Query<&mut Transform, With<CarMarker>>) {
    let car = sim.car;
    for mut transform in &mut markers {
        transform.translation = Vec3::new(car.pos.x, 0.6, car.pos.y);
        transform.rotation = Quat::from_rotation_y(-car.heading);
    }
}
