//! Side-scrolling obstacle course.
//!
//! The runner moves right at a constant speed over flat ground dotted with obstacles and
//! may jump while on the ground. Touching an obstacle ends the episode; fitness is the
//! distance covered. The course is generated once from the seed and replayed unchanged
//! for every episode, so agents of a generation are compared on the same course.

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use super::Environment;

const SPEED: f64 = 6.0;
const GRAVITY: f64 = 0.8;
const JUMP_VELOCITY: f64 = 12.0;
const OBSTACLE_HALF_WIDTH: f64 = 10.0;
const COURSE_LENGTH: f64 = 6000.0;
const FIRST_OBSTACLE: f64 = 300.0;
const MAX_STEPS: usize = 2000;
/// Network output above which the runner jumps.
const JUMP_THRESHOLD: f64 = 0.5;
/// Distance reported when no obstacle is ahead.
const FAR_AWAY: f64 = 2000.0;

#[derive(Debug, Clone, Copy)]
struct Obstacle {
    x: f64,
    height: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct Runner {
    obstacles: Vec<Obstacle>,
    x: f64,
    y: f64,
    vy: f64,
    steps: usize,
}

impl Runner {
    pub(crate) const INPUT_SIZE: usize = 5;

    pub(crate) fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut obstacles = vec![];
        let mut x = FIRST_OBSTACLE;
        while x < COURSE_LENGTH {
            obstacles.push(Obstacle {
                x,
                height: rng.random_range(20.0..=60.0),
            });
            x += rng.random_range(220.0..=450.0);
        }
        Self {
            obstacles,
            x: 0.0,
            y: 0.0,
            vy: 0.0,
            steps: 0,
        }
    }

    fn next_obstacle(&self) -> Option<&Obstacle> {
        self.obstacles
            .iter()
            .find(|o| o.x + OBSTACLE_HALF_WIDTH > self.x)
    }

    fn collided(&self) -> bool {
        self.obstacles
            .iter()
            .any(|o| (o.x - self.x).abs() < OBSTACLE_HALF_WIDTH && self.y < o.height)
    }
}

impl Environment for Runner {
    fn input_size(&self) -> usize {
        Self::INPUT_SIZE
    }

    fn output_size(&self) -> usize {
        1
    }

    fn reset(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
        self.vy = 0.0;
        self.steps = 0;
    }

    fn observe(&self) -> Vec<f64> {
        let (distance, height, present) = match self.next_obstacle() {
            Some(o) => (o.x - self.x, o.height, 1.0),
            None => (FAR_AWAY, 0.0, 0.0),
        };
        vec![
            self.y / 100.0,
            self.vy / JUMP_VELOCITY,
            distance / 1000.0,
            height / 100.0,
            present,
        ]
    }

    fn step(&mut self, outputs: &[f64]) -> Option<f64> {
        let on_ground = self.y <= 0.0;
        if on_ground && outputs[0] > JUMP_THRESHOLD {
            self.vy = JUMP_VELOCITY;
        }
        self.x += SPEED;
        self.vy -= GRAVITY;
        self.y += self.vy;
        if self.y <= 0.0 {
            self.y = 0.0;
            self.vy = 0.0;
        }
        self.steps += 1;

        if self.collided() || self.x >= COURSE_LENGTH || self.steps >= MAX_STEPS {
            return Some(self.x);
        }
        None
    }
}
