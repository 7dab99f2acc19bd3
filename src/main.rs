//! TrackDay - drivable 3D preview of 2D centerline tracks
//!
//! Turns a centerline polyline into a ribbon mesh, simulates a
//! bicycle-model car on it at a fixed 60 Hz timestep, and follows it
//! with a smoothed chase camera. Drive with WASD/arrows, press R for
//! a fresh generated circuit.

use bevy::prelude::*;

mod camera;
mod game_state;
mod input;
mod render;
mod sim;
mod track;
mod vehicle;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "TrackDay".into(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(game_state::GameStatePlugin)
        .add_plugins(sim::SimPlugin)
        .add_plugins(track::TrackPlugin)
        .add_plugins(input::InputPlugin)
        .add_plugins(camera::ChaseCameraPlugin)
        .add_plugins(render::RenderPlugin)
        .run();
}
