//! The world agents live in: clock, locations, weather, social graph
//!
//! Agents only read environment state; occupancy and the social graph
//! are written exclusively by the orchestrator. The decision core
//! itself never blocks on any of this.

use ahash::AHashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, Vec2};

/// Simulated hours that pass per simulation time unit
const HOURS_PER_TIME_UNIT: f64 = 1.0;

/// The day starts at 08:00
const STARTING_HOUR: f64 = 8.0;

/// Chance per environment update that the weather shifts
const WEATHER_CHANGE_CHANCE: f64 = 0.05;

/// Kinds of places agents seek out per action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationKind {
    Home,
    Workplace,
    Restaurant,
    SocialArea,
    Park,
}

/// A named place with bounded occupancy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub kind: LocationKind,
    pub position: Vec2,
    pub capacity: usize,
    pub occupants: Vec<AgentId>,
    /// Baseline comfort in [0, 1]
    pub comfort: f32,
}

impl Location {
    fn new(name: &str, kind: LocationKind, position: Vec2, capacity: usize, comfort: f32) -> Self {
        Self {
            name: name.to_string(),
            kind,
            position,
            capacity,
            occupants: Vec::new(),
            comfort,
        }
    }

    pub fn can_accommodate(&self, agent: AgentId) -> bool {
        self.occupants.len() < self.capacity || self.occupants.contains(&agent)
    }

    pub fn crowding(&self) -> f32 {
        if self.capacity == 0 {
            0.0
        } else {
            self.occupants.len() as f32 / self.capacity as f32
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weather {
    Sunny,
    Rainy,
    Cloudy,
    Stormy,
}

impl Weather {
    const ALL: [Weather; 4] = [Weather::Sunny, Weather::Rainy, Weather::Cloudy, Weather::Stormy];

    /// Additive comfort shift for this weather
    pub fn comfort_shift(self) -> f32 {
        match self {
            Weather::Sunny => 0.1,
            Weather::Cloudy => 0.0,
            Weather::Rainy => -0.1,
            Weather::Stormy => -0.2,
        }
    }
}

/// World state: 24-hour clock, fixed locations, weather, and the
/// agent social-connection graph
#[derive(Debug, Clone)]
pub struct Environment {
    current_hour: f64,
    pub weather: Weather,
    /// Temperature in [0, 1], follows a daily sinusoid
    pub temperature: f32,
    locations: Vec<Location>,
    social: AHashMap<AgentId, AHashMap<AgentId, f32>>,
}

impl Environment {
    pub fn new() -> Self {
        let locations = vec![
            Location::new("Home District", LocationKind::Home, Vec2::new(20.0, 20.0), 50, 0.7),
            Location::new("Office Complex", LocationKind::Workplace, Vec2::new(80.0, 30.0), 30, 0.5),
            Location::new("Central Restaurant", LocationKind::Restaurant, Vec2::new(50.0, 50.0), 20, 0.6),
            Location::new("Cafe Corner", LocationKind::Restaurant, Vec2::new(40.0, 30.0), 15, 0.8),
            Location::new("Community Center", LocationKind::SocialArea, Vec2::new(30.0, 70.0), 40, 0.6),
            Location::new("Sports Club", LocationKind::SocialArea, Vec2::new(60.0, 20.0), 25, 0.5),
            Location::new("City Park", LocationKind::Park, Vec2::new(70.0, 80.0), 100, 0.8),
        ];

        Self {
            current_hour: STARTING_HOUR,
            weather: Weather::Sunny,
            temperature: 0.6,
            locations,
            social: AHashMap::new(),
        }
    }

    /// Time of day in [0, 1): 0 = midnight, 0.5 = noon
    pub fn time_of_day(&self) -> f32 {
        ((self.current_hour % 24.0) / 24.0) as f32
    }

    pub fn current_hour(&self) -> f64 {
        self.current_hour % 24.0
    }

    /// Advance the clock and environmental conditions by dt time units
    pub fn update(&mut self, dt: f64, rng: &mut impl Rng) {
        self.current_hour += dt * HOURS_PER_TIME_UNIT;

        if rng.gen::<f64>() < WEATHER_CHANGE_CHANCE {
            self.weather = Weather::ALL[rng.gen_range(0..Weather::ALL.len())];
        }

        // Daily sinusoid, coolest before dawn, shifted by the weather
        let phase = self.time_of_day() as f64 * std::f64::consts::TAU - std::f64::consts::FRAC_PI_2;
        let base = 0.3 + 0.4 * (1.0 + phase.sin()) / 2.0;
        self.temperature = ((base as f32) + self.weather.comfort_shift()).clamp(0.0, 1.0);
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Closest location of `kind` that can take the agent
    pub fn find_suitable_location(
        &self,
        agent: AgentId,
        kind: LocationKind,
        position: Vec2,
    ) -> Option<&Location> {
        self.locations
            .iter()
            .filter(|loc| loc.kind == kind && loc.can_accommodate(agent))
            .min_by(|a, b| {
                a.position
                    .distance(&position)
                    .total_cmp(&b.position.distance(&position))
            })
    }

    pub fn location_of(&self, agent: AgentId) -> Option<&Location> {
        self.locations.iter().find(|loc| loc.occupants.contains(&agent))
    }

    /// Move an agent to the named location; false if unknown or full
    pub fn move_agent(&mut self, agent: AgentId, target: &str) -> bool {
        let Some(idx) = self.locations.iter().position(|loc| loc.name == target) else {
            return false;
        };
        if !self.locations[idx].can_accommodate(agent) {
            return false;
        }

        for loc in &mut self.locations {
            loc.occupants.retain(|id| *id != agent);
        }
        self.locations[idx].occupants.push(agent);
        true
    }

    /// Named effect magnitudes for a location (comfort, crowding)
    pub fn zone_effects(&self, name: &str) -> AHashMap<String, f32> {
        let mut effects = AHashMap::new();
        if let Some(loc) = self.locations.iter().find(|loc| loc.name == name) {
            let comfort = (loc.comfort + self.weather.comfort_shift()).clamp(0.0, 1.0);
            effects.insert("comfort".to_string(), comfort);
            effects.insert("crowding".to_string(), loc.crowding());
        }
        effects
    }

    /// Strengthen the symmetric social edge between two agents
    pub fn strengthen_connection(&mut self, a: AgentId, b: AgentId, amount: f32) {
        let forward = self.social.entry(a).or_default().entry(b).or_insert(0.0);
        *forward = (*forward + amount).min(1.0);
        let backward = self.social.entry(b).or_default().entry(a).or_insert(0.0);
        *backward = (*backward + amount).min(1.0);
    }

    pub fn connection(&self, a: AgentId, b: AgentId) -> f32 {
        self.social
            .get(&a)
            .and_then(|edges| edges.get(&b))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn connections_of(&self, agent: AgentId) -> impl Iterator<Item = (AgentId, f32)> + '_ {
        self.social
            .get(&agent)
            .into_iter()
            .flat_map(|edges| edges.iter().map(|(id, strength)| (*id, *strength)))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
