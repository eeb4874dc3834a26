// main.rs - Entry point.
//
// Opens the window, reads the optional tuning file and hands everything else
// to `FlappyPlugin`.

use std::path::Path;

use bevy::prelude::*;
use flappy_bevy::config::{GameConfig, CONFIG_FILE};
use flappy_bevy::FlappyPlugin;

fn main() {
    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Flappy".into(),
            resizable: false,
            ..default()
        }),
        ..default()
    }));

    // Loaded after DefaultPlugins so the logger is already up to report a bad file.
    let config = GameConfig::load_or_default(Path::new(CONFIG_FILE));

    app.insert_resource(ClearColor(Color::BLACK))
        .insert_resource(config)
        .add_plugins(FlappyPlugin)
        .run();
}
