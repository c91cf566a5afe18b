//! Schedule generation strategies
//!
//! A strategy maps an intersection's incoming streets, plus global route
//! statistics, to an ordered list of green phases. Strategies are pure:
//! the same input always yields the same schedule.

use clap::ValueEnum;
use std::collections::HashMap;

use super::car::SimCar;
use super::street::SimStreet;
use super::types::{Phase, StreetId, Tick};

/// Share of the simulated duration given to the most popular street
const POPULARITY_BUDGET_SHARE: f64 = 0.1;

/// Global information a strategy may consult
#[derive(Debug, Clone, Default)]
pub struct ScheduleContext {
    /// How many times each street appears across all car routes
    popularity: HashMap<StreetId, u32>,
    min_popularity: u32,
    max_popularity: u32,
    /// Simulated duration `D`
    time_budget: Tick,
}

impl ScheduleContext {
    /// Count street usage over the given routes
    pub fn from_routes<'a, I>(routes: I, time_budget: Tick) -> Self
    where
        I: IntoIterator<Item = &'a [StreetId]>,
    {
        let mut popularity: HashMap<StreetId, u32> = HashMap::new();
        for route in routes {
            for street in route {
                *popularity.entry(*street).or_default() += 1;
            }
        }

        let min_popularity = popularity.values().copied().min().unwrap_or(0);
        let max_popularity = popularity.values().copied().max().unwrap_or(0);

        Self {
            popularity,
            min_popularity,
            max_popularity,
            time_budget,
        }
    }

    /// Count street usage over the cars' full routes
    pub fn from_cars(cars: &[SimCar], time_budget: Tick) -> Self {
        Self::from_routes(cars.iter().map(|car| car.full_route()), time_budget)
    }

    pub fn popularity(&self, street: StreetId) -> u32 {
        self.popularity.get(&street).copied().unwrap_or(0)
    }

    pub fn popularity_range(&self) -> (u32, u32) {
        (self.min_popularity, self.max_popularity)
    }

    pub fn time_budget(&self) -> Tick {
        self.time_budget
    }
}

/// Anything that can turn an intersection's incoming streets into a schedule
pub trait ScheduleStrategy {
    fn name(&self) -> &'static str;

    fn schedule(&self, incoming: &[&SimStreet], context: &ScheduleContext) -> Vec<Phase>;
}

/// Every street gets the same green time, in input order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uniform {
    pub duration: Tick,
}

impl Default for Uniform {
    fn default() -> Self {
        Self { duration: 1 }
    }
}

impl ScheduleStrategy for Uniform {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn schedule(&self, incoming: &[&SimStreet], _context: &ScheduleContext) -> Vec<Phase> {
        incoming
            .iter()
            .map(|street| Phase::new(street.id, self.duration))
            .collect()
    }
}

/// Longest streets first, each held green for its rank plus one
///
/// The longest street gets a single tick and the shortest street gets the
/// most, so short streets drain more per cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InverseDuration;

impl ScheduleStrategy for InverseDuration {
    fn name(&self) -> &'static str {
        "inverse-duration"
    }

    fn schedule(&self, incoming: &[&SimStreet], _context: &ScheduleContext) -> Vec<Phase> {
        let mut longest_first = incoming.to_vec();
        // Stable, so equal lengths keep input order
        longest_first.sort_by(|a, b| b.length.cmp(&a.length));

        longest_first
            .iter()
            .enumerate()
            .map(|(rank, street)| Phase::new(street.id, rank as Tick + 1))
            .collect()
    }
}

/// Green time scaled linearly with how many routes use the street
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopularityWeighted;

impl PopularityWeighted {
    fn green_time(popularity: u32, context: &ScheduleContext) -> Tick {
        let (min, max) = context.popularity_range();
        if max <= min || popularity <= min {
            return 1;
        }

        let max_green = (POPULARITY_BUDGET_SHARE * context.time_budget() as f64)
            .round()
            .max(1.0);
        let fraction = (popularity - min) as f64 / (max - min) as f64;
        let green = (1.0 + (max_green - 1.0) * fraction).round();
        (green as Tick).max(1)
    }
}

impl ScheduleStrategy for PopularityWeighted {
    fn name(&self) -> &'static str {
        "popularity"
    }

    fn schedule(&self, incoming: &[&SimStreet], context: &ScheduleContext) -> Vec<Phase> {
        incoming
            .iter()
            .map(|street| {
                let popularity = context.popularity(street.id);
                Phase::new(street.id, Self::green_time(popularity, context))
            })
            .collect()
    }
}

/// Named strategy variants, selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StrategyKind {
    #[default]
    Uniform,
    InverseDuration,
    Popularity,
}

/// Which strategy to use and how to parameterise it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub strategy: StrategyKind,
    /// Green time per street for the uniform strategy
    pub uniform_duration: Tick,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Uniform,
            uniform_duration: 1,
        }
    }
}

impl SchedulerConfig {
    pub fn build(&self) -> Box<dyn ScheduleStrategy> {
        match self.strategy {
            StrategyKind::Uniform => Box::new(Uniform {
                duration: self.uniform_duration,
            }),
            StrategyKind::InverseDuration => Box::new(InverseDuration),
            StrategyKind::Popularity => Box::new(PopularityWeighted),
        }
    }
}
