// entities.rs - The two pieces of per-run data: the bird and the pipes.
//
// These are plain data. The session owns them and the physics step mutates
// them; the renderer only reads them.

use rand::Rng;

use crate::config::GameConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    /// Horizontal position of the bird's centre. Never changes.
    pub x: f32,
    /// Vertical position of the bird's centre, in canvas units (y down).
    pub y: f32,
    pub velocity: f32,
    /// Banking angle in degrees, purely cosmetic.
    pub rotation: f32,
    start_y: f32,
}

impl Bird {
    pub fn new(config: &GameConfig) -> Self {
        let start_y = config.canvas_height / 2.0;
        Bird {
            x: config.bird_x,
            y: start_y,
            velocity: 0.0,
            rotation: 0.0,
            start_y,
        }
    }

    pub fn reset(&mut self) {
        self.y = self.start_y;
        self.velocity = 0.0;
        self.rotation = 0.0;
    }

    pub fn flap(&mut self, config: &GameConfig) {
        self.velocity = config.flap_strength;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipeColor {
    Pink,
    Purple,
    Green,
}

impl PipeColor {
    pub const ALL: [PipeColor; 3] = [PipeColor::Pink, PipeColor::Purple, PipeColor::Green];

    /// Lowercase name, as used in asset file names.
    pub fn name(&self) -> &'static str {
        match self {
            PipeColor::Pink => "pink",
            PipeColor::Purple => "purple",
            PipeColor::Green => "green",
        }
    }

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// A top and bottom obstacle pair with a gap between them.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    /// Unique per session, lets the renderer track the pipe's visuals.
    pub id: u64,
    /// Left edge.
    pub x: f32,
    /// Lower edge of the top segment.
    pub top_height: f32,
    /// Upper edge of the bottom segment. Always `top_height + pipe_gap`.
    pub bottom_y: f32,
    pub scored: bool,
    pub color: PipeColor,
}

impl Pipe {
    pub fn new(id: u64, x: f32, top_height: f32, color: PipeColor, config: &GameConfig) -> Self {
        Pipe {
            id,
            x,
            top_height,
            bottom_y: top_height + config.pipe_gap,
            scored: false,
            color,
        }
    }

    pub fn right(&self, config: &GameConfig) -> f32 {
        self.x + config.pipe_width
    }

    pub fn is_off_screen(&self, config: &GameConfig) -> bool {
        self.right(config) < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn bird_starts_centred_and_resets_there() {
        let config = GameConfig::default();
        let mut bird = Bird::new(&config);
        assert_eq!(bird.x, 80.0);
        assert_eq!(bird.y, 300.0);

        bird.y = 12.0;
        bird.velocity = 4.0;
        bird.rotation = 12.0;
        bird.reset();
        assert_eq!(bird.y, 300.0);
        assert_eq!(bird.velocity, 0.0);
        assert_eq!(bird.rotation, 0.0);
    }

    #[test]
    fn flap_sets_velocity_rather_than_adding() {
        let config = GameConfig::default();
        let mut bird = Bird::new(&config);
        bird.velocity = 2.0;
        bird.flap(&config);
        assert_eq!(bird.velocity, -3.0);
        bird.flap(&config);
        assert_eq!(bird.velocity, -3.0);
    }

    #[test]
    fn pipe_gap_is_fixed_at_creation() {
        let config = GameConfig::default();
        let pipe = Pipe::new(0, 400.0, 120.0, PipeColor::Green, &config);
        assert_eq!(pipe.bottom_y - pipe.top_height, config.pipe_gap);
        assert!(!pipe.scored);
    }

    #[test]
    fn off_screen_only_once_fully_past_the_left_edge() {
        let config = GameConfig::default();
        let mut pipe = Pipe::new(0, -70.0, 120.0, PipeColor::Pink, &config);
        assert!(!pipe.is_off_screen(&config));
        pipe.x = -70.5;
        assert!(pipe.is_off_screen(&config));
    }

    #[test]
    fn random_colors_cover_every_variant() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(PipeColor::random(&mut rng));
        }
        assert_eq!(seen.len(), 3);
    }
}
