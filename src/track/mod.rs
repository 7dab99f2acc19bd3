//! Track loading: request events, geometry build, active-track swap.
//!
//! A `LoadTrackRequest` carries a raw centerline; validation and mesh
//! construction happen here, and a failed build leaves the previously
//! active track (and the car driving on it) untouched.

use bevy::prelude::*;

use crate::game_state::PreviewState;
use crate::sim::SimContext;

pub mod generator;
pub mod mesh;

use generator::TrackGenConfig;
use mesh::{build_track_mesh, TrackMesh};

pub struct TrackPlugin;

impl Plugin for TrackPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TrackGenConfig>()
            .init_resource::<ActiveTrack>()
            .add_event::<LoadTrackRequest>()
            .add_systems(Startup, request_initial_track)
            .add_systems(Update, (regenerate_on_key, load_requested_tracks).chain());
    }
}

/// Request to replace the active track with a new centerline.
#[derive(Event)]
pub struct LoadTrackRequest {
    pub centerline: Vec<Vec2>,
    pub width: f32,
}

/// The mesh of the currently loaded track, consumed by the render
/// layer. `revision` bumps on every successful load so stale entities
/// can be replaced.
#[derive(Resource, Default)]
pub struct ActiveTrack {
    pub mesh: Option<TrackMesh>,
    pub revision: u32,
}

/// Seed a generated circuit at startup so there is something to drive
/// before external track data arrives.
fn request_initial_track(
    config: Res<TrackGenConfig>,
    mut requests: EventWriter<LoadTrackRequest>,
) {
    requests.send(LoadTrackRequest {
        centerline: generator::generate_loop(&config, 0),
        width: config.track_width(),
    });
}

/// R: generate a fresh random circuit.
fn regenerate_on_key(
    keyboard: Res<ButtonInput<KeyCode>>,
    config: Res<TrackGenConfig>,
    mut counter: Local<u64>,
    mut requests: EventWriter<LoadTrackRequest>,
) {
    if keyboard.just_pressed(KeyCode::KeyR) {
        *counter += 1;
        requests.send(LoadTrackRequest {
            centerline: generator::generate_loop(&config, *counter),
            width: config.track_width(),
        });
    }
}

/// Build geometry for each request; on success swap the active track
/// and reseed the simulation, on failure log and keep the old state.
fn load_requested_tracks(
    mut requests: EventReader<LoadTrackRequest>,
    mut sim: ResMut<SimContext>,
    mut active: ResMut<ActiveTrack>,
    mut next_state: ResMut<NextState<PreviewState>>,
) {
    for request in requests.read() {
        match build_track_mesh(&request.centerline, request.width) {
            Ok((track_mesh, geometry)) => {
                info!(
                    "Loaded track: {} samples, {:.1} units long, width {:.1}",
                    geometry.samples.len(),
                    geometry.total_length,
                    geometry.width
                );
                sim.load_track(geometry);
                active.mesh = Some(track_mesh);
                active.revision += 1;
                next_state.set(PreviewState::Driving);
            }
            Err(err) => {
                warn!(
                    "Rejected track ({} points, width {}): {err}",
                    request.centerline.len(),
                    request.width
                );
            }
        }
    }
}
