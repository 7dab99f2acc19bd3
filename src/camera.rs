//! Chase camera entity, fed from the simulation's smoothed rig.
//!
//! The camera never computes its own pose; it mirrors what the
//! fixed-step loop produced, and picks up projection parameters
//! recomputed on window resize.

use bevy::prelude::*;
use bevy::window::WindowResized;

use crate::sim::SimContext;

pub struct ChaseCameraPlugin;

impl Plugin for ChaseCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_camera)
            .add_systems(Update, (handle_resize, sync_camera_pose).chain());
    }
}

/// Marker for the single preview camera.
#[derive(Component)]
pub struct ChaseCamera;

fn setup_camera(mut commands: Commands, sim: Res<SimContext>) {
    let rig = sim.camera;
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(rig.pos).looking_at(rig.target, Vec3::Y),
        ChaseCamera,
    ));
}

/// Push resize events into the context, then mirror the resulting
/// projection parameters onto the camera.
fn handle_resize(
    mut resize_events: EventReader<WindowResized>,
    mut sim: ResMut<SimContext>,
    mut cameras: Query<&mut Projection, With<ChaseCamera>>,
) {
    let Some(event) = resize_events.read().last() else {
        return;
    };
    sim.resize(event.width.max(0.0) as u32, event.height.max(0.0) as u32);

    let params = sim.projection;
    for mut projection in &mut cameras {
        *projection = Projection::Perspective(PerspectiveProjection {
            fov: params.fov_y,
            aspect_ratio: params.aspect,
            near: params.near,
            far: params.far,
        });
    }
}

fn sync_camera_pose(
    sim: Res<SimContext>,
    mut cameras: Query<&mut Transform, With<ChaseCamera>>,
) {
    let rig = sim.camera;
    for mut transform in &mut cameras {
        *transform = Transform::from_translation(rig.pos).looking_at(rig.target, Vec3::Y);
    }
}
