// audio.rs - Looping background music that follows the run and the pause key.

use bevy::{audio::Volume, prelude::*};

use crate::config::GameConfig;
use crate::driver::{PauseToggled, RunStarted};

pub struct AudioPlugin;

impl Plugin for AudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_audio)
            .add_observer(start_music_on_first_run)
            .add_observer(pause_music_with_game);
    }
}

#[derive(Resource)]
pub struct GameAudio {
    /// Handle<T> is Bevy's way of referencing assets.
    pub music: Handle<AudioSource>,
    /// Music only starts on the first run so it never plays over the title.
    pub music_started: bool,
    /// Mirrors the game's pause state, including pauses that land before
    /// the track has finished loading.
    pub paused: bool,
}

impl GameAudio {
    pub fn new(music: Handle<AudioSource>) -> Self {
        GameAudio {
            music,
            music_started: false,
            paused: false,
        }
    }
}

/// Marker for the looping background track.
#[derive(Component)]
pub struct BackgroundMusic;

fn setup_audio(mut commands: Commands, asset_server: Res<AssetServer>) {
    // The actual loading happens in the background - asset_server.load()
    // returns immediately. If the file is missing, playing it does nothing.
    let music = asset_server.load("sounds/background-music.mp3");
    commands.insert_resource(GameAudio::new(music));
}

fn start_music_on_first_run(
    _trigger: On<RunStarted>,
    mut commands: Commands,
    audio: Option<ResMut<GameAudio>>,
    config: Res<GameConfig>,
) {
    let Some(mut audio) = audio else {
        return;
    };
    if audio.music_started {
        return;
    }
    audio.music_started = true;

    let mut settings = PlaybackSettings::LOOP.with_volume(Volume::Linear(config.music_volume));
    settings.paused = audio.paused;
    commands.spawn((
        BackgroundMusic,
        AudioPlayer::new(audio.music.clone()),
        settings,
    ));
}

/// Pauses or resumes the track. Until Bevy has attached an AudioSink the
/// playback settings are edited instead, so the sink starts in the right state.
fn pause_music_with_game(
    trigger: On<PauseToggled>,
    audio: Option<ResMut<GameAudio>>,
    mut players: Query<(Option<&AudioSink>, &mut PlaybackSettings), With<BackgroundMusic>>,
) {
    let paused = trigger.event().0;
    if let Some(mut audio) = audio {
        audio.paused = paused;
    }
    for (sink, mut settings) in &mut players {
        settings.paused = paused;
        match sink {
            Some(sink) if paused => sink.pause(),
            Some(sink) => sink.play(),
            None => {}
        }
    }
}
