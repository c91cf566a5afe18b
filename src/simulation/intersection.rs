//! Intersection logic for the traffic simulation
//!
//! An intersection cycles the green light through its incoming streets
//! following a fixed schedule. It is the only writer of those streets'
//! signals.

use anyhow::{bail, ensure, Context, Result};
use std::collections::HashSet;

use super::scheduler::{ScheduleContext, ScheduleStrategy};
use super::street::SimStreet;
use super::types::{NodeId, Phase, StreetId, Tick};

/// An intersection in the traffic simulation
#[derive(Debug, Clone)]
pub struct SimIntersection {
    pub node: NodeId,
    /// Streets ending at this node, in input order
    incoming: Vec<StreetId>,
    schedule: Vec<Phase>,
    /// Index of the phase currently green
    cursor: usize,
    /// Ticks spent in the current phase
    phase_elapsed: Tick,
}

impl SimIntersection {
    pub fn new(node: NodeId, incoming: Vec<StreetId>) -> Self {
        Self {
            node,
            incoming,
            schedule: Vec::new(),
            cursor: 0,
            phase_elapsed: 0,
        }
    }

    pub fn incoming(&self) -> &[StreetId] {
        &self.incoming
    }

    pub fn schedule(&self) -> &[Phase] {
        &self.schedule
    }

    pub fn has_schedule(&self) -> bool {
        !self.schedule.is_empty()
    }

    /// Total length of one schedule cycle
    pub fn cycle_length(&self) -> Tick {
        self.schedule.iter().map(|phase| phase.duration).sum()
    }

    /// The street currently holding the green light
    pub fn green_street(&self) -> Option<StreetId> {
        self.schedule.get(self.cursor).map(|phase| phase.street)
    }

    /// Run `strategy` over the incoming streets and install the result
    pub fn build_schedule(
        &mut self,
        strategy: &dyn ScheduleStrategy,
        context: &ScheduleContext,
        streets: &mut [SimStreet],
    ) -> Result<()> {
        ensure!(
            !self.incoming.is_empty(),
            "Intersection {:?} has no incoming streets to schedule",
            self.node
        );

        let incoming = self
            .incoming
            .iter()
            .map(|id| {
                streets
                    .get(id.index())
                    .with_context(|| format!("Street {:?} not found", id))
            })
            .collect::<Result<Vec<&SimStreet>>>()?;

        let phases = strategy.schedule(&incoming, context);
        self.set_schedule(phases, streets)
            .with_context(|| format!("Strategy '{}' produced an invalid schedule", strategy.name()))
    }

    /// Install a schedule, reset the cycle and light the first phase
    ///
    /// Every phase must name a distinct incoming street and last at least
    /// one tick. An empty schedule leaves every incoming street red.
    pub fn set_schedule(&mut self, phases: Vec<Phase>, streets: &mut [SimStreet]) -> Result<()> {
        let mut seen = HashSet::new();
        for phase in &phases {
            ensure!(
                phase.duration >= 1,
                "Intersection {:?}: street {:?} scheduled for {} ticks",
                self.node,
                phase.street,
                phase.duration
            );
            if !self.incoming.contains(&phase.street) {
                bail!(
                    "Intersection {:?}: street {:?} does not end here",
                    self.node,
                    phase.street
                );
            }
            if !seen.insert(phase.street) {
                bail!(
                    "Intersection {:?}: street {:?} scheduled twice",
                    self.node,
                    phase.street
                );
            }
        }

        for id in &self.incoming {
            streets
                .get_mut(id.index())
                .with_context(|| format!("Street {:?} not found", id))?
                .set_signal(false);
        }

        self.schedule = phases;
        self.cursor = 0;
        self.phase_elapsed = 0;

        if let Some(first) = self.schedule.first() {
            streets[first.street.index()].set_signal(true);
        }
        Ok(())
    }

    /// Advance the light by one tick
    ///
    /// Runs before the streets tick, so the street left green here is the
    /// one allowed to release a car during this tick.
    pub fn tick(&mut self, streets: &mut [SimStreet]) {
        let Some(current) = self.schedule.get(self.cursor) else {
            return;
        };

        if self.phase_elapsed == current.duration {
            // Red before green so a one-phase schedule stays green
            streets[current.street.index()].set_signal(false);
            self.cursor = (self.cursor + 1) % self.schedule.len();
            streets[self.schedule[self.cursor].street.index()].set_signal(true);
            self.phase_elapsed = 0;
        }

        self.phase_elapsed += 1;
    }
}
