// hud.rs - Score readout and the start / game-over / pause overlays.
//
// The HUD never reads the session. It only reacts to the observer events the
// driver triggers.

use bevy::prelude::*;

use crate::driver::{PauseToggled, RunEnded, RunStarted, ScoreChanged};

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_hud)
            .add_observer(on_score_changed)
            .add_observer(on_run_started)
            .add_observer(on_run_ended)
            .add_observer(on_pause_toggled);
    }
}

#[derive(Component)]
struct ScoreText;

#[derive(Component)]
struct StartOverlay;

#[derive(Component)]
struct GameOverOverlay;

#[derive(Component)]
struct FinalScoreText;

#[derive(Component)]
struct BestScoreText;

#[derive(Component)]
struct PauseOverlay;

const OVERLAY_BACKGROUND: Color = Color::srgba(0.0, 0.0, 0.0, 0.5);

fn full_screen_overlay(visibility: Visibility) -> impl Bundle {
    (
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            position_type: PositionType::Absolute,
            flex_direction: FlexDirection::Column,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            row_gap: Val::Px(12.0),
            ..default()
        },
        BackgroundColor(OVERLAY_BACKGROUND),
        visibility,
    )
}

fn label(text: impl Into<String>, font_size: f32) -> impl Bundle {
    (
        Text::new(text),
        TextFont {
            font_size,
            ..default()
        },
        TextColor(Color::WHITE),
        TextLayout::new_with_justify(Justify::Center),
    )
}

fn spawn_hud(mut commands: Commands) {
    // Score readout, top centre, always visible.
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            position_type: PositionType::Absolute,
            top: Val::Px(20.0),
            justify_content: JustifyContent::Center,
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((ScoreText, label("0", 48.0)));
        });

    commands
        .spawn((StartOverlay, full_screen_overlay(Visibility::Visible)))
        .with_children(|parent| {
            parent.spawn(label("Flappy", 56.0));
            parent.spawn(label("Click or press Space to flap", 22.0));
            parent.spawn(label("P pauses", 18.0));
        });

    commands
        .spawn((GameOverOverlay, full_screen_overlay(Visibility::Hidden)))
        .with_children(|parent| {
            parent.spawn(label("Game Over", 56.0));
            parent.spawn((FinalScoreText, label("Score: 0", 28.0)));
            parent.spawn((BestScoreText, label("Best: 0", 28.0)));
            parent.spawn(label("Click or press Space to play again", 20.0));
        });

    commands
        .spawn((PauseOverlay, full_screen_overlay(Visibility::Hidden)))
        .with_children(|parent| {
            parent.spawn(label("Paused", 56.0));
            parent.spawn(label("Press P to resume", 22.0));
        });
}

fn on_score_changed(trigger: On<ScoreChanged>, mut texts: Query<&mut Text, With<ScoreText>>) {
    let score = trigger.event().0;
    for mut text in &mut texts {
        **text = score.to_string();
    }
}

fn on_run_started(
    _trigger: On<RunStarted>,
    mut overlays: Query<&mut Visibility, Or<(With<StartOverlay>, With<GameOverOverlay>)>>,
) {
    for mut visibility in &mut overlays {
        *visibility = Visibility::Hidden;
    }
}

fn on_run_ended(
    trigger: On<RunEnded>,
    mut overlay: Query<&mut Visibility, With<GameOverOverlay>>,
    mut finals: Query<&mut Text, (With<FinalScoreText>, Without<BestScoreText>)>,
    mut bests: Query<&mut Text, (With<BestScoreText>, Without<FinalScoreText>)>,
) {
    let ended = trigger.event();
    for mut text in &mut finals {
        **text = format!("Score: {}", ended.final_score);
    }
    for mut text in &mut bests {
        **text = format!("Best: {}", ended.best_score);
    }
    for mut visibility in &mut overlay {
        *visibility = Visibility::Visible;
    }
}

fn on_pause_toggled(
    trigger: On<PauseToggled>,
    mut overlay: Query<&mut Visibility, With<PauseOverlay>>,
) {
    let paused = trigger.event().0;
    for mut visibility in &mut overlay {
        *visibility = if paused {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::time::TimeUpdateStrategy;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::driver::DriverPlugin;
    use crate::entities::{Pipe, PipeColor};
    use crate::save_load::SaveData;
    use crate::session::{Phase, Session};

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            // Time stands still, so FixedUpdate never steps on its own.
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::ZERO))
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<ButtonInput<MouseButton>>()
            .insert_resource(SaveData { high_score: 4 })
            .add_plugins((DriverPlugin, HudPlugin));
        app.update();
        app
    }

    fn tap(app: &mut App, key: KeyCode) {
        {
            let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
            keys.release_all();
            keys.clear();
            keys.press(key);
        }
        app.update();
    }

    fn tick(app: &mut App) {
        {
            let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
            keys.release_all();
            keys.clear();
        }
        let mut rng = StdRng::seed_from_u64(7);
        app.world_mut().resource_mut::<Session>().step(&mut rng);
        app.update();
    }

    fn visible<M: Component>(app: &mut App) -> bool {
        let world = app.world_mut();
        let mut query = world.query_filtered::<&Visibility, With<M>>();
        query.iter(world).all(|v| *v == Visibility::Visible)
    }

    fn text<M: Component>(app: &mut App) -> String {
        let world = app.world_mut();
        let mut query = world.query_filtered::<&Text, With<M>>();
        query
            .iter(world)
            .map(|t| t.0.clone())
            .collect::<Vec<_>>()
            .join("")
    }

    fn overlays(app: &mut App) -> (bool, bool, bool) {
        (
            visible::<StartOverlay>(app),
            visible::<GameOverOverlay>(app),
            visible::<PauseOverlay>(app),
        )
    }

    #[test]
    fn overlays_follow_the_run() {
        let mut app = app();
        assert_eq!(overlays(&mut app), (true, false, false));
        assert_eq!(text::<ScoreText>(&mut app), "0");

        tap(&mut app, KeyCode::Space);
        assert_eq!(overlays(&mut app), (false, false, false));

        tap(&mut app, KeyCode::KeyP);
        assert_eq!(overlays(&mut app), (false, false, true));
        tap(&mut app, KeyCode::KeyP);
        assert_eq!(overlays(&mut app), (false, false, false));

        // Clear one pipe, then drop onto the floor.
        {
            let mut session = app.world_mut().resource_mut::<Session>();
            let config = session.config.clone();
            session
                .pipes
                .push(Pipe::new(99, 11.0, 50.0, PipeColor::Green, &config));
            session.bird.y = 100.0;
            session.bird.velocity = -0.045;
        }
        tick(&mut app);
        assert_eq!(text::<ScoreText>(&mut app), "1");

        {
            let mut session = app.world_mut().resource_mut::<Session>();
            let floor = session.config.canvas_height;
            session.bird.y = floor;
            session.bird.velocity = 5.0;
        }
        tick(&mut app);
        assert_eq!(app.world().resource::<Session>().phase(), Phase::GameOver);
        assert_eq!(overlays(&mut app), (false, true, false));
        assert_eq!(text::<FinalScoreText>(&mut app), "Score: 1");
        assert_eq!(text::<BestScoreText>(&mut app), "Best: 4");

        tap(&mut app, KeyCode::Space);
        assert_eq!(overlays(&mut app), (false, false, false));
        assert_eq!(text::<ScoreText>(&mut app), "0");
    }

    #[test]
    fn a_new_best_shows_on_the_game_over_screen() {
        let mut app = app();
        tap(&mut app, KeyCode::Space);
        {
            let mut session = app.world_mut().resource_mut::<Session>();
            let config = session.config.clone();
            for id in 0..5 {
                session
                    .pipes
                    .push(Pipe::new(100 + id, 11.0, 50.0, PipeColor::Pink, &config));
            }
            session.bird.y = 100.0;
            session.bird.velocity = -0.045;
        }
        tick(&mut app);
        assert_eq!(text::<ScoreText>(&mut app), "5");

        {
            let mut session = app.world_mut().resource_mut::<Session>();
            session.bird.y = session.config.canvas_height;
            session.bird.velocity = 5.0;
        }
        tick(&mut app);
        assert_eq!(text::<FinalScoreText>(&mut app), "Score: 5");
        assert_eq!(text::<BestScoreText>(&mut app), "Best: 5");
    }
}
