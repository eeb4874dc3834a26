// physics.rs - Per-tick movement, boundary checks, spawning and collision.
//
// These are free functions over the plain entity data so they can be tested
// without a Bevy world. `Session::step` decides the order they run in.

use rand::Rng;

use crate::config::GameConfig;
use crate::entities::{Bird, Pipe, PipeColor};

/// Axis-aligned box in canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Hitbox {
    pub fn around(bird: &Bird, config: &GameConfig) -> Self {
        let half = config.bird_hitbox_size / 2.0;
        Hitbox {
            left: bird.x - half,
            right: bird.x + half,
            top: bird.y - half,
            bottom: bird.y + half,
        }
    }
}

/// What the bird touched after moving this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    None,
    /// Soft bound: the bird is stopped, the run continues.
    Ceiling,
    /// Lethal.
    Floor,
}

/// Applies gravity, moves the bird and resolves the canvas edges.
///
/// Velocity is updated before position. The floor check runs first; if it
/// hits, the ceiling check is skipped.
pub fn integrate_bird(bird: &mut Bird, config: &GameConfig) -> Boundary {
    bird.velocity += config.gravity;
    bird.y += bird.velocity;
    bird.rotation = banking(bird.velocity);

    let half = config.bird_hitbox_size / 2.0;
    if bird.y + half >= config.canvas_height {
        bird.y = config.canvas_height - half;
        return Boundary::Floor;
    }
    if bird.y - half <= 0.0 {
        bird.y = half;
        bird.velocity = 0.0;
        return Boundary::Ceiling;
    }
    Boundary::None
}

pub fn banking(velocity: f32) -> f32 {
    (velocity * 3.0).clamp(-25.0, 90.0)
}

pub fn should_spawn(frame_count: u64, config: &GameConfig) -> bool {
    frame_count % config.spawn_interval() == 0
}

/// A new pipe at the right edge with a random opening and colour.
///
/// The top height is a whole number of pixels, uniform over the allowed range.
pub fn random_pipe<R: Rng>(id: u64, config: &GameConfig, rng: &mut R) -> Pipe {
    let min = config.pipe_min_height.ceil() as i32;
    let max = (config.max_top_height().floor() as i32).max(min);
    let top_height = rng.gen_range(min..=max) as f32;
    let color = PipeColor::random(rng);
    Pipe::new(id, config.canvas_width, top_height, color, config)
}

/// True when the bird's hitbox overlaps the pipe horizontally and pokes into
/// either the top or the bottom segment.
pub fn collides(bird: &Bird, pipe: &Pipe, config: &GameConfig) -> bool {
    let hitbox = Hitbox::around(bird, config);
    let overlaps_x = hitbox.right > pipe.x && hitbox.left < pipe.right(config);
    overlaps_x && (hitbox.top < pipe.top_height || hitbox.bottom > pipe.bottom_y)
}

/// The pipe's right edge is past the bird's centre.
pub fn has_passed(bird: &Bird, pipe: &Pipe, config: &GameConfig) -> bool {
    pipe.right(config) < bird.x
}
