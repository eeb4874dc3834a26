// lib.rs - Public API for the game crate.
// main.rs only configures the window and adds `FlappyPlugin`; everything
// else lives in these modules so it can be tested without opening a window.

pub mod assets;
pub mod audio;
pub mod config;
pub mod driver;
pub mod entities;
pub mod hud;
pub mod physics;
pub mod render;
pub mod save_load;
pub mod session;

use bevy::prelude::*;

/// The whole game: persistence, the session driver, assets, drawing, HUD and
/// music.
pub struct FlappyPlugin;

impl Plugin for FlappyPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            save_load::SaveLoadPlugin,
            driver::DriverPlugin,
            assets::AssetStorePlugin,
            render::RenderPlugin,
            hud::HudPlugin,
            audio::AudioPlugin,
        ));
    }
}
