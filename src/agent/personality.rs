//! Personality traits
//!
//! Sampled once at agent creation, immutable afterwards. Discipline
//! doubles as conscientiousness and sociability as extraversion; the
//! duplicated Big-Five aliases are collapsed into single fields.

use serde::{Deserialize, Serialize};

/// Trait vector, each scalar in [0, 1]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Personality {
    pub discipline: f32,
    pub sociability: f32,
    pub ambition: f32,
    pub creativity: f32,
    pub openness: f32,
    pub agreeableness: f32,
    pub neuroticism: f32,
}

impl Personality {
    /// Sample traits uniformly within the seeded mid-range [0.2, 0.8]
    pub fn sample(rng: &mut impl rand::Rng) -> Self {
        let mut t = || rng.gen_range(0.2..0.8);
        Self {
            discipline: t(),
            sociability: t(),
            ambition: t(),
            creativity: t(),
            openness: t(),
            agreeableness: t(),
            neuroticism: t(),
        }
    }
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            discipline: 0.5,
            sociability: 0.5,
            ambition: 0.5,
            creativity: 0.5,
            openness: 0.5,
            agreeableness: 0.5,
            neuroticism: 0.5,
        }
    }
}
