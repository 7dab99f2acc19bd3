//! Keyboard mapping into normalized steer/drive axes.
//!
//! WASD or arrow keys produce axes in [-1, 1]; releasing everything
//! clears all control channels, matching pointer-release semantics.

use bevy::prelude::*;

use crate::sim::SimContext;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, read_drive_input);
    }
}

fn read_drive_input(keyboard: Res<ButtonInput<KeyCode>>, mut sim: ResMut<SimContext>) {
    if !sim.is_active() {
        return;
    }

    let mut steer = 0.0;
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        steer -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        steer += 1.0;
    }

    let mut drive = 0.0;
    if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
        drive += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
        drive -= 1.0;
    }

    if steer == 0.0 && drive == 0.0 {
        sim.clear_input();
    } else {
        sim.set_input(steer, drive);
    }
}
