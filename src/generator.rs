use crate::error::Error;
use crate::vehicle::VehicleConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp};

/// Countdowns at or below this value, in s, have elapsed.
const ELAPSED_EPSILON: f64 = 1e-9;

/// A vehicle template and how often it is emitted.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorEntry {
    /// The time between emissions in s, or the mean time for [Arrivals::Poisson].
    pub interval: f64,
    /// The vehicle to emit.
    pub template: VehicleConfig,
}

/// How the time between emissions is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Arrivals {
    /// Vehicles are emitted at the configured interval.
    #[default]
    Fixed,
    /// Intervals are drawn from an exponential distribution whose mean is the configured interval.
    Poisson,
}

/// What happens to the time by which a countdown overshoots zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OvershootPolicy {
    /// The countdown restarts from the full interval; at most one vehicle per entry per step.
    #[default]
    Reset,
    /// The overshoot is deducted from the next interval, so the long-run
    /// rate is exact and several vehicles may be emitted in one step.
    CarryOver,
}

/// The configuration of a vehicle generator.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct GeneratorConfig {
    /// The vehicles to emit.
    pub entries: Vec<GeneratorEntry>,
    /// How the time between emissions is chosen.
    pub arrivals: Arrivals,
    /// How countdowns restart after an emission.
    pub overshoot: OvershootPolicy,
    /// Seed for [Arrivals::Poisson]; drawn from the OS when absent.
    pub seed: Option<u64>,
}

impl GeneratorConfig {
    /// Checks the intervals and vehicle templates.
    pub fn validate(&self) -> Result<(), Error> {
        for entry in &self.entries {
            if !entry.interval.is_finite() || entry.interval <= 0.0 {
                return Err(Error::InvalidGenerator("interval must be finite and positive"));
            }
            if entry.template.validate().is_err() {
                return Err(Error::InvalidGenerator("vehicle template is invalid"));
            }
        }
        Ok(())
    }
}

/// A source of new vehicles.
#[derive(Clone, Debug)]
pub struct VehicleGenerator {
    entries: Vec<GeneratorEntry>,
    /// The time until each entry next emits a vehicle, in s.
    countdowns: Vec<f64>,
    arrivals: Arrivals,
    overshoot: OvershootPolicy,
    rng: StdRng,
    /// The number of vehicles emitted so far.
    emitted: usize,
}

impl VehicleGenerator {
    /// Creates a new vehicle generator.
    pub fn new(config: &GeneratorConfig) -> Result<Self, Error> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let countdowns = config
            .entries
            .iter()
            .map(|entry| Self::next_interval(config.arrivals, entry.interval, &mut rng))
            .collect();
        Ok(Self {
            entries: config.entries.clone(),
            countdowns,
            arrivals: config.arrivals,
            overshoot: config.overshoot,
            rng,
            emitted: 0,
        })
    }

    /// The generator's entries.
    pub fn entries(&self) -> &[GeneratorEntry] {
        &self.entries
    }

    /// The number of vehicles emitted so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Advances the generator by `dt` seconds, calling `emit` with
    /// the template of each vehicle due in this step.
    pub fn update(&mut self, dt: f64, mut emit: impl FnMut(&VehicleConfig)) {
        for (entry, countdown) in self.entries.iter().zip(&mut self.countdowns) {
            *countdown -= dt;
            while *countdown <= ELAPSED_EPSILON {
                emit(&entry.template);
                self.emitted += 1;
                let next = Self::next_interval(self.arrivals, entry.interval, &mut self.rng);
                match self.overshoot {
                    OvershootPolicy::Reset => {
                        *countdown = next;
                        break;
                    }
                    OvershootPolicy::CarryOver => *countdown += next,
                }
            }
        }
    }

    /// Chooses the time until the next emission of an entry.
    fn next_interval(arrivals: Arrivals, interval: f64, rng: &mut StdRng) -> f64 {
        match arrivals {
            Arrivals::Fixed => interval,
            Arrivals::Poisson => Exp::new(1.0 / interval)
                .map(|distr| distr.sample(rng))
                .unwrap_or(interval),
        }
    }
}
