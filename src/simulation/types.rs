//! Core types for the traffic simulation
//!
//! Identifiers, parsed input records and schedule phases. Nothing here
//! owns simulation state.

/// Discrete unit of simulated time
pub type Tick = u32;

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimId(pub usize);

/// A wrapper type for street IDs (index into the network's street table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreetId(pub SimId);

impl StreetId {
    pub fn index(self) -> usize {
        self.0 .0
    }
}

/// A wrapper type for car IDs (index into the world's car list)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CarId(pub SimId);

impl CarId {
    pub fn index(self) -> usize {
        self.0 .0
    }
}

/// A network node, as numbered in the input description
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

/// Global parameters from the problem header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameters {
    /// Simulated duration `D`
    pub duration: Tick,
    /// Number of intersections announced by the header (informational)
    pub intersection_count: usize,
    pub street_count: usize,
    pub car_count: usize,
    /// Bonus `F` awarded to every car that finishes before `D`
    pub bonus: u64,
}

/// One street as described by the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetRecord {
    pub start: NodeId,
    pub end: NodeId,
    pub name: String,
    /// Traversal duration in ticks
    pub length: Tick,
}

/// One car as described by the input: the street names it drives, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarRecord {
    pub route: Vec<String>,
}

/// One entry of an intersection's cyclic schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    pub street: StreetId,
    /// Number of consecutive ticks the street stays green
    pub duration: Tick,
}

impl Phase {
    pub fn new(street: StreetId, duration: Tick) -> Self {
        Self { street, duration }
    }
}
