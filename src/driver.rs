// driver.rs - Wires input and the fixed tick to the session.
//
// Input is read every rendered frame so a click is never missed; physics runs
// in FixedUpdate so the per-tick tuning behaves the same at any frame rate.
// After either one mutates the session, its queued events are triggered as
// observer events for the HUD, audio and save systems to react to.

use bevy::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use crate::config::GameConfig;
use crate::save_load::SaveData;
use crate::session::{Session, SessionEvent};

pub struct DriverPlugin;

impl Plugin for DriverPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameConfig>()
            .insert_resource(GameRng(StdRng::from_entropy()))
            .add_systems(Startup, (init_session, configure_tick_rate))
            .add_systems(Update, (read_input, dispatch_events).chain())
            .add_systems(FixedUpdate, (tick_session, dispatch_events).chain());
    }
}

/// Random source for pipe placement. A resource so tests can seed it.
#[derive(Resource)]
pub struct GameRng(pub StdRng);

// Observer events. Triggered with `commands.trigger(...)`, handled with
// `On<T>` observers registered through `.add_observer(...)`.

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChanged(pub u32);

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStarted;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunEnded {
    pub final_score: u32,
    pub best_score: u32,
    pub new_best: bool,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseToggled(pub bool);

fn init_session(
    mut commands: Commands,
    config: Res<GameConfig>,
    save_data: Option<Res<SaveData>>,
) {
    let high_score = save_data.map(|s| s.high_score).unwrap_or(0);
    commands.insert_resource(Session::new(config.clone(), high_score));
}

fn configure_tick_rate(config: Res<GameConfig>, mut fixed: ResMut<Time<Fixed>>) {
    fixed.set_timestep_hz(config.tick_hz);
}

/// Left click or Space flaps; P toggles pause.
fn read_input(
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut session: ResMut<Session>,
) {
    if mouse.just_pressed(MouseButton::Left) || keys.just_pressed(KeyCode::Space) {
        session.flap();
    }
    if keys.just_pressed(KeyCode::KeyP) {
        session.toggle_pause();
    }
}

fn tick_session(mut session: ResMut<Session>, mut rng: ResMut<GameRng>) {
    session.step(&mut rng.0);
}

fn dispatch_events(mut commands: Commands, mut session: ResMut<Session>) {
    for event in session.drain_events() {
        match event {
            SessionEvent::ScoreChanged(score) => commands.trigger(ScoreChanged(score)),
            SessionEvent::RunStarted => {
                info!("Run started");
                commands.trigger(RunStarted);
            }
            SessionEvent::RunEnded {
                final_score,
                best_score,
                new_best,
            } => {
                info!(final_score, best_score, new_best, "Run ended");
                commands.trigger(RunEnded {
                    final_score,
                    best_score,
                    new_best,
                });
            }
            SessionEvent::PauseToggled(paused) => {
                info!(paused, "Pause toggled");
                commands.trigger(PauseToggled(paused));
            }
        }
    }
}
