//! Standalone traffic simulation module
//!
//! Streets, intersections and cars, the schedule strategies that drive the
//! lights, and the tick loop that scores a schedule.

mod car;
mod intersection;
mod scheduler;
mod stats;
mod street;
mod street_network;
mod types;
mod world;

pub use car::SimCar;
pub use intersection::SimIntersection;
pub use scheduler::{
    InverseDuration, PopularityWeighted, ScheduleContext, ScheduleStrategy, SchedulerConfig,
    StrategyKind, Uniform,
};
pub use stats::SimulationStats;
pub use street::{SimStreet, StreetTickResult};
pub use street_network::{SimNetwork, TickOutcome};
pub use types::{
    CarId, CarRecord, NodeId, Parameters, Phase, SimId, StreetId, StreetRecord, Tick,
};
pub use world::SimWorld;
