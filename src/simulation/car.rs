//! Car bookkeeping for the traffic simulation
//!
//! A car only knows its route and how far along it is. Streets hold the
//! car's id while it drives or waits, never the car itself.

use anyhow::{bail, Result};

use super::types::{CarId, StreetId, Tick};

/// A car in the traffic simulation
#[derive(Debug, Clone)]
pub struct SimCar {
    pub id: CarId,
    /// Full route, kept intact for scheduling statistics
    route: Vec<StreetId>,
    /// Index of the next street to enter; everything before it is consumed
    next: usize,
    /// Street the car is currently driving along or waiting at
    current_street: Option<StreetId>,
    /// Tick at which the car reached the end of its route
    finished_at: Option<Tick>,
}

impl SimCar {
    pub fn new(id: CarId, route: Vec<StreetId>) -> Self {
        Self {
            id,
            route,
            next: 0,
            current_street: None,
            finished_at: None,
        }
    }

    /// The complete route, including streets already driven
    pub fn full_route(&self) -> &[StreetId] {
        &self.route
    }

    /// Streets still to be entered
    pub fn remaining_route(&self) -> &[StreetId] {
        &self.route[self.next..]
    }

    /// The street the car will enter next, if any
    pub fn next_street(&self) -> Option<StreetId> {
        self.route.get(self.next).copied()
    }

    pub fn current_street(&self) -> Option<StreetId> {
        self.current_street
    }

    pub fn finished_at(&self) -> Option<Tick> {
        self.finished_at
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Consume the head of the route as the car enters `street`
    /// Returns true when that was the last street of the route
    pub(crate) fn enter_street(&mut self, street: StreetId) -> Result<bool> {
        match self.next_street() {
            Some(head) if head == street => {
                self.next += 1;
                self.current_street = Some(street);
                Ok(self.next == self.route.len())
            }
            Some(head) => bail!(
                "Car {:?} cannot enter street {:?}: next street on its route is {:?}",
                self.id,
                street,
                head
            ),
            None => bail!(
                "Car {:?} cannot enter street {:?}: route already exhausted",
                self.id,
                street
            ),
        }
    }

    /// Mark the car as done; it leaves every street queue
    pub(crate) fn finish(&mut self, tick: Tick) {
        self.current_street = None;
        self.finished_at = Some(tick);
    }
}
