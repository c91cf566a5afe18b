//! Street logic for the traffic simulation
//!
//! A street is a one-way edge with a fixed traversal time. Cars entering it
//! drive for `length` ticks, then queue at the light at its far end.

use anyhow::Result;
use std::collections::VecDeque;

use super::car::SimCar;
use super::types::{CarId, NodeId, StreetId, Tick};

/// A car still driving along the street
#[derive(Debug, Clone, Copy)]
struct InTransit {
    car: CarId,
    /// Local tick at which the car reaches the light
    arrival: Tick,
    /// The street is the last one on the car's route
    last_hop: bool,
}

/// What one street produced during a tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreetTickResult {
    /// Car that went through the green light and needs its next street
    pub released: Option<CarId>,
    /// Cars that reached the end of their final street this tick
    pub finished: Vec<CarId>,
}

/// A street in the traffic simulation
#[derive(Debug, Clone)]
pub struct SimStreet {
    pub id: StreetId,
    pub name: String,
    pub start: NodeId,
    pub end: NodeId,
    /// Traversal duration in ticks, at least 1
    pub length: Tick,
    /// Ordered by arrival tick, stable for equal arrivals
    in_transit: VecDeque<InTransit>,
    /// Cars queued at the light, first come first served
    waiting: VecDeque<CarId>,
    green: bool,
    /// Number of ticks this street has processed
    now: Tick,
}

impl SimStreet {
    pub fn new(id: StreetId, name: String, start: NodeId, end: NodeId, length: Tick) -> Self {
        Self {
            id,
            name,
            start,
            end,
            length,
            in_transit: VecDeque::new(),
            waiting: VecDeque::new(),
            green: false,
            now: 0,
        }
    }

    /// Car enters from the upstream intersection and drives the full length
    pub fn enqueue(&mut self, car: &mut SimCar) -> Result<()> {
        let arrival = self.now + self.length;
        self.admit(car, arrival)
    }

    /// Car starts the run already at the end of the street, queued for the light
    pub fn enqueue_at_light(&mut self, car: &mut SimCar) -> Result<()> {
        let arrival = self.now;
        self.admit(car, arrival)
    }

    fn admit(&mut self, car: &mut SimCar, arrival: Tick) -> Result<()> {
        let last_hop = car.enter_street(self.id)?;
        let entry = InTransit {
            car: car.id,
            arrival,
            last_hop,
        };
        let position = self.in_transit.partition_point(|e| e.arrival <= arrival);
        self.in_transit.insert(position, entry);
        Ok(())
    }

    /// Advance the street by one tick
    pub fn tick(&mut self) -> StreetTickResult {
        let mut result = StreetTickResult::default();

        // Entries are sorted by arrival, so the due ones form a prefix
        let due = self
            .in_transit
            .iter()
            .take_while(|entry| entry.arrival <= self.now)
            .count();

        for entry in self.in_transit.drain(..due) {
            if entry.last_hop {
                result.finished.push(entry.car);
            } else {
                self.waiting.push_back(entry.car);
            }
        }

        if self.green {
            result.released = self.waiting.pop_front();
        }

        self.now += 1;
        result
    }

    pub fn set_signal(&mut self, green: bool) {
        self.green = green;
    }

    pub fn is_green(&self) -> bool {
        self.green
    }

    /// Number of ticks processed so far
    pub fn local_tick(&self) -> Tick {
        self.now
    }

    pub fn in_transit_count(&self) -> usize {
        self.in_transit.len()
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    /// Cars queued at the light, front of the queue first
    pub fn waiting_cars(&self) -> impl Iterator<Item = CarId> + '_ {
        self.waiting.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.in_transit.is_empty() && self.waiting.is_empty()
    }
}
