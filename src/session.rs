// session.rs - The game-state machine and everything a run owns.
//
// One `Session` resource replaces what would otherwise be scattered globals:
// the phase, the score, the bird and the pipes all live here. Input and the
// fixed tick call into it; the renderer and HUD only read it.
//
// Transitions never talk to the rest of the app directly. They push a
// `SessionEvent` into an outbox, and the driver turns those into Bevy
// observer events after the call returns.

use bevy::prelude::*;
use rand::Rng;

use crate::config::GameConfig;
use crate::entities::{Bird, Pipe};
use crate::physics::{self, Boundary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Start,
    Playing,
    GameOver,
    Paused,
}

/// Something the outside world may want to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    ScoreChanged(u32),
    RunStarted,
    RunEnded {
        final_score: u32,
        best_score: u32,
        /// The run beat the previous best and the best should be persisted.
        new_best: bool,
    },
    PauseToggled(bool),
}

#[derive(Resource, Debug, Clone)]
pub struct Session {
    phase: Phase,
    score: u32,
    high_score: u32,
    frame_count: u64,
    next_pipe_id: u64,
    pub bird: Bird,
    pub pipes: Vec<Pipe>,
    pub config: GameConfig,
    events: Vec<SessionEvent>,
}

impl Session {
    pub fn new(config: GameConfig, high_score: u32) -> Self {
        Session {
            phase: Phase::Start,
            score: 0,
            high_score,
            frame_count: 0,
            next_pipe_id: 0,
            bird: Bird::new(&config),
            pipes: Vec::new(),
            config,
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The single "go" input: starts the first run, lifts the bird while
    /// playing, and restarts after a game over. Ignored while paused.
    pub fn flap(&mut self) {
        match self.phase {
            Phase::Start => {
                self.phase = Phase::Playing;
                self.events.push(SessionEvent::RunStarted);
                self.bird.flap(&self.config);
            }
            Phase::Playing => self.bird.flap(&self.config),
            Phase::GameOver => self.restart(),
            Phase::Paused => {}
        }
    }

    /// Clears everything run-scoped and goes straight back to playing.
    ///
    /// The flap that triggers a restart does not lift the bird; it starts
    /// from rest at the centre.
    fn restart(&mut self) {
        self.score = 0;
        self.frame_count = 0;
        self.pipes.clear();
        self.bird.reset();
        self.phase = Phase::Playing;
        self.events.push(SessionEvent::ScoreChanged(0));
        self.events.push(SessionEvent::RunStarted);
    }

    pub fn toggle_pause(&mut self) {
        let paused = match self.phase {
            Phase::Playing => true,
            Phase::Paused => false,
            _ => return,
        };
        self.phase = if paused { Phase::Paused } else { Phase::Playing };
        self.events.push(SessionEvent::PauseToggled(paused));
    }

    fn end_run(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        self.phase = Phase::GameOver;

        let new_best = self.score > self.high_score;
        if new_best {
            self.high_score = self.score;
        }
        self.events.push(SessionEvent::RunEnded {
            final_score: self.score,
            best_score: self.high_score,
            new_best,
        });
    }

    /// Advances the run by one fixed tick. Does nothing unless playing.
    pub fn step<R: Rng>(&mut self, rng: &mut R) {
        if self.phase != Phase::Playing {
            return;
        }

        if physics::integrate_bird(&mut self.bird, &self.config) == Boundary::Floor {
            self.end_run();
            return;
        }

        if physics::should_spawn(self.frame_count, &self.config) {
            let pipe = physics::random_pipe(self.next_pipe_id, &self.config, rng);
            self.next_pipe_id += 1;
            self.pipes.push(pipe);
        }

        // Walk backwards so removing a pipe doesn't shift the ones still to visit.
        for i in (0..self.pipes.len()).rev() {
            self.pipes[i].x -= self.config.pipe_speed;

            if self.pipes[i].is_off_screen(&self.config) {
                self.pipes.remove(i);
                continue;
            }
            if self.phase != Phase::Playing {
                continue;
            }

            let pipe = &self.pipes[i];
            if physics::collides(&self.bird, pipe, &self.config) {
                self.end_run();
            } else if !pipe.scored && physics::has_passed(&self.bird, pipe, &self.config) {
                self.pipes[i].scored = true;
                self.score += 1;
                self.events.push(SessionEvent::ScoreChanged(self.score));
            }
        }

        if self.phase == Phase::Playing {
            self.frame_count += 1;
        }
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PipeColor;
    use rand::{rngs::StdRng, SeedableRng};

    fn session() -> Session {
        Session::new(GameConfig::default(), 0)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1)
    }

    fn playing() -> Session {
        let mut session = session();
        session.flap();
        session.drain_events();
        session
    }

    #[test]
    fn first_flap_starts_the_run() {
        let mut session = session();
        assert_eq!(session.phase(), Phase::Start);

        session.flap();

        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.score(), 0);
        assert_eq!(session.frame_count(), 0);
        assert_eq!(session.bird.velocity, -3.0);
        assert_eq!(session.drain_events(), vec![SessionEvent::RunStarted]);
    }

    #[test]
    fn one_flap_then_one_tick() {
        let mut session = session();
        session.flap();
        assert_eq!(session.bird.velocity, -3.0);

        session.step(&mut rng());

        assert!((session.bird.velocity - -2.955).abs() < 1e-5);
        assert_eq!(session.frame_count(), 1);
    }

    #[test]
    fn nothing_moves_before_the_first_flap() {
        let mut session = session();
        let before = session.bird.clone();
        session.step(&mut rng());
        assert_eq!(session.bird, before);
        assert_eq!(session.frame_count(), 0);
        assert!(session.pipes.is_empty());
    }

    #[test]
    fn first_tick_spawns_a_pipe_at_the_right_edge() {
        let mut session = playing();
        session.step(&mut rng());
        assert_eq!(session.pipes.len(), 1);
        assert!((session.pipes[0].x - (400.0 - 1.35)).abs() < 1e-4);
    }

    #[test]
    fn pipes_spawn_every_interval() {
        let mut session = playing();
        let mut rng = rng();
        // Pipes need ~225 ticks to reach the bird, so hovering is enough.
        for _ in 0..186 {
            session.bird.y = 300.0;
            session.bird.velocity = 0.0;
            session.step(&mut rng);
        }
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.pipes.len(), 2);
        assert_ne!(session.pipes[0].id, session.pipes[1].id);
    }

    #[test]
    fn hitting_the_floor_ends_the_run() {
        let mut session = playing();
        session.bird.y = 584.0;
        session.bird.velocity = 2.0;

        session.step(&mut rng());

        assert_eq!(session.phase(), Phase::GameOver);
        assert_eq!(session.bird.y, 585.0);
        assert_eq!(session.frame_count(), 0);
        assert!(matches!(
            session.drain_events().as_slice(),
            [SessionEvent::RunEnded { .. }]
        ));
    }

    #[test]
    fn hitting_the_ceiling_does_not() {
        let mut session = playing();
        session.bird.y = 16.0;

        session.step(&mut rng());

        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.bird.y, 15.0);
        assert_eq!(session.bird.velocity, 0.0);
    }

    #[test]
    fn pipe_collision_ends_the_run() {
        let mut session = playing();
        session.frame_count = 1;
        session.bird.velocity = -0.045;
        // Bird at y = 300 sits well above this opening.
        let config = session.config.clone();
        session
            .pipes
            .push(Pipe::new(99, 60.0, 350.0, PipeColor::Pink, &config));

        session.step(&mut rng());

        assert_eq!(session.phase(), Phase::GameOver);
    }

    #[test]
    fn passing_a_pipe_scores_once() {
        let mut session = playing();
        session.frame_count = 1;
        let config = session.config.clone();
        // Right edge lands at 79.65 after this tick, just past the bird.
        session
            .pipes
            .push(Pipe::new(5, 11.0, 50.0, PipeColor::Green, &config));
        session.bird.y = 100.0;
        session.bird.velocity = -0.045;

        session.step(&mut rng());
        assert_eq!(session.score(), 1);
        assert!(session.pipes[0].scored);
        assert_eq!(
            session.drain_events(),
            vec![SessionEvent::ScoreChanged(1)]
        );

        session.bird.velocity = -0.045;
        session.step(&mut rng());
        assert_eq!(session.score(), 1);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn pipes_leave_only_when_fully_off_screen() {
        let mut session = playing();
        session.frame_count = 1;
        let config = session.config.clone();
        session.pipes.push(Pipe::new(1, -68.0, 50.0, PipeColor::Green, &config));
        session.pipes.push(Pipe::new(2, -69.0, 50.0, PipeColor::Green, &config));
        session.bird.velocity = -0.045;

        session.step(&mut rng());

        // -69.35 + 70 >= 0 stays, -70.35 + 70 < 0 goes.
        assert_eq!(session.pipes.len(), 1);
        assert_eq!(session.pipes[0].id, 1);
    }

    #[test]
    fn restart_clears_the_run() {
        let mut session = playing();
        let config = session.config.clone();
        session.score = 4;
        session.frame_count = 300;
        session.pipes.push(Pipe::new(1, 200.0, 50.0, PipeColor::Green, &config));
        session.bird.y = 584.0;
        session.bird.velocity = 2.0;
        session.step(&mut rng());
        assert_eq!(session.phase(), Phase::GameOver);
        session.drain_events();

        session.flap();

        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.score(), 0);
        assert_eq!(session.frame_count(), 0);
        assert!(session.pipes.is_empty());
        assert_eq!(session.bird.y, 300.0);
        assert_eq!(session.bird.velocity, 0.0);
        assert_eq!(
            session.drain_events(),
            vec![SessionEvent::ScoreChanged(0), SessionEvent::RunStarted]
        );
    }

    #[test]
    fn pause_only_toggles_between_playing_and_paused() {
        let mut session = session();
        session.toggle_pause();
        assert_eq!(session.phase(), Phase::Start);

        session.flap();
        session.drain_events();
        session.toggle_pause();
        assert_eq!(session.phase(), Phase::Paused);
        session.toggle_pause();
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(
            session.drain_events(),
            vec![
                SessionEvent::PauseToggled(true),
                SessionEvent::PauseToggled(false)
            ]
        );

        session.bird.y = 590.0;
        session.step(&mut rng());
        assert_eq!(session.phase(), Phase::GameOver);
        session.toggle_pause();
        assert_eq!(session.phase(), Phase::GameOver);
    }

    #[test]
    fn paused_session_ignores_flaps_and_ticks() {
        let mut session = playing();
        session.toggle_pause();
        let bird = session.bird.clone();

        session.flap();
        session.step(&mut rng());

        assert_eq!(session.phase(), Phase::Paused);
        assert_eq!(session.bird, bird);
        assert_eq!(session.frame_count(), 0);
    }

    #[test]
    fn beating_the_best_raises_it() {
        let mut session = Session::new(GameConfig::default(), 5);
        session.flap();
        session.drain_events();
        session.score = 7;
        session.end_run();

        assert_eq!(session.high_score(), 7);
        assert_eq!(
            session.drain_events(),
            vec![SessionEvent::RunEnded {
                final_score: 7,
                best_score: 7,
                new_best: true
            }]
        );
    }

    #[test]
    fn a_worse_run_keeps_the_best() {
        let mut session = Session::new(GameConfig::default(), 5);
        session.flap();
        session.drain_events();
        session.score = 3;
        session.end_run();

        assert_eq!(session.high_score(), 5);
        assert_eq!(
            session.drain_events(),
            vec![SessionEvent::RunEnded {
                final_score: 3,
                best_score: 5,
                new_best: false
            }]
        );
    }

    #[test]
    fn a_run_ends_only_once() {
        let mut session = playing();
        session.end_run();
        session.end_run();
        assert_eq!(session.drain_events().len(), 1);
    }
}
