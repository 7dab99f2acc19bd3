//! Top-level preview state.

use bevy::prelude::*;

pub struct GameStatePlugin;

impl Plugin for GameStatePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<PreviewState>();
    }
}

/// Whether a drivable track is loaded.
#[derive(States, Default, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum PreviewState {
    /// No geometry loaded yet; physics steps are no-ops.
    #[default]
    AwaitingTrack,
    /// A track is active and the full per-step pipeline runs.
    Driving,
}
