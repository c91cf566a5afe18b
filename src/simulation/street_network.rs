//! Street network: every street and intersection of one problem
//!
//! Streets are edges of a petgraph directed graph whose nodes are the
//! input's node ids. Intersections are formed by grouping streets by the
//! node they end at.

use anyhow::{anyhow, bail, ensure, Context, Result};
use log::{info, warn};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::car::SimCar;
use super::intersection::SimIntersection;
use super::scheduler::{ScheduleContext, ScheduleStrategy};
use super::street::SimStreet;
use super::types::{CarId, NodeId, Phase, SimId, StreetId, StreetRecord};
use crate::submission::{IntersectionSchedule, Submission};

/// Cars that changed state during one network tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Cars released through a green light, in street order
    pub moved: Vec<CarId>,
    /// Cars that reached the end of their route
    pub finished: Vec<CarId>,
}

/// The streets and intersections of one problem
#[derive(Debug, Default)]
pub struct SimNetwork {
    /// Node weights are node ids, edge weights are the streets on that edge
    graph: DiGraph<NodeId, StreetId>,

    /// Maps input node ids to graph node indices
    node_index: HashMap<NodeId, NodeIndex>,

    /// Street storage, indexed by `StreetId`
    streets: Vec<SimStreet>,

    /// Maps street names to their ids
    street_ids: HashMap<String, StreetId>,

    /// Intersections keyed by node, ordered for stable output
    intersections: BTreeMap<NodeId, SimIntersection>,
}

impl SimNetwork {
    /// Build the network from parsed street records
    pub fn from_records(records: &[StreetRecord]) -> Result<Self> {
        let mut network = Self::default();

        for record in records {
            network.add_street(record)?;
        }

        for (&node, &index) in &network.node_index {
            let mut incoming: Vec<StreetId> = network
                .graph
                .edges_directed(index, Direction::Incoming)
                .map(|edge| *edge.weight())
                .collect();
            if incoming.is_empty() {
                continue;
            }
            // petgraph yields edges newest first; restore input order
            incoming.sort();
            network
                .intersections
                .insert(node, SimIntersection::new(node, incoming));
        }

        info!(
            "Built network: {} streets, {} intersections",
            network.streets.len(),
            network.intersections.len()
        );
        Ok(network)
    }

    fn add_street(&mut self, record: &StreetRecord) -> Result<StreetId> {
        ensure!(
            record.length >= 1,
            "Street '{}' has traversal duration {}, expected at least 1",
            record.name,
            record.length
        );
        if self.street_ids.contains_key(&record.name) {
            bail!("Duplicate street name '{}'", record.name);
        }

        let id = StreetId(SimId(self.streets.len()));
        let start = self.node(record.start);
        let end = self.node(record.end);
        self.graph.add_edge(start, end, id);

        self.streets.push(SimStreet::new(
            id,
            record.name.clone(),
            record.start,
            record.end,
            record.length,
        ));
        self.street_ids.insert(record.name.clone(), id);
        Ok(id)
    }

    fn node(&mut self, node: NodeId) -> NodeIndex {
        if let Some(index) = self.node_index.get(&node) {
            return *index;
        }
        let index = self.graph.add_node(node);
        self.node_index.insert(node, index);
        index
    }

    pub fn street_id(&self, name: &str) -> Option<StreetId> {
        self.street_ids.get(name).copied()
    }

    pub fn street(&self, id: StreetId) -> Option<&SimStreet> {
        self.streets.get(id.index())
    }

    pub fn streets(&self) -> &[SimStreet] {
        &self.streets
    }

    pub fn street_count(&self) -> usize {
        self.streets.len()
    }

    pub fn intersection(&self, node: NodeId) -> Option<&SimIntersection> {
        self.intersections.get(&node)
    }

    pub fn intersections(&self) -> impl Iterator<Item = &SimIntersection> {
        self.intersections.values()
    }

    pub fn intersection_count(&self) -> usize {
        self.intersections.len()
    }

    /// Translate a route of street names into street ids
    ///
    /// Fails on an empty route, an unknown name, or two consecutive streets
    /// that do not meet at a node.
    pub fn resolve_route(&self, names: &[String]) -> Result<Vec<StreetId>> {
        ensure!(!names.is_empty(), "Route is empty");

        let mut route = Vec::with_capacity(names.len());
        let mut previous: Option<&SimStreet> = None;
        for name in names {
            let id = self
                .street_id(name)
                .with_context(|| format!("Route uses unknown street '{}'", name))?;
            let street = &self.streets[id.index()];
            if let Some(previous) = previous {
                ensure!(
                    previous.end == street.start,
                    "Route leaves '{}' at node {:?} but '{}' starts at node {:?}",
                    previous.name,
                    previous.end,
                    street.name,
                    street.start
                );
            }
            previous = Some(street);
            route.push(id);
        }
        Ok(route)
    }

    /// Give every intersection a schedule from `strategy`
    pub fn assign_schedules(
        &mut self,
        strategy: &dyn ScheduleStrategy,
        context: &ScheduleContext,
    ) -> Result<()> {
        for intersection in self.intersections.values_mut() {
            intersection.build_schedule(strategy, context, &mut self.streets)?;
        }
        info!(
            "Assigned '{}' schedules to {} intersections",
            strategy.name(),
            self.intersections.len()
        );
        Ok(())
    }

    /// Install the schedules listed in a submission
    ///
    /// Intersections the submission does not mention are left all red.
    pub fn apply_submission(&mut self, submission: &Submission) -> Result<()> {
        let mut scheduled = HashSet::new();
        for entry in &submission.intersections {
            if !scheduled.insert(entry.node) {
                bail!("Submission schedules intersection {:?} twice", entry.node);
            }

            let intersection = self
                .intersections
                .get_mut(&entry.node)
                .ok_or_else(|| anyhow!("Submission schedules unknown intersection {:?}", entry.node))?;

            let phases = entry
                .phases
                .iter()
                .map(|(name, duration)| {
                    self.street_ids
                        .get(name)
                        .map(|id| Phase::new(*id, *duration))
                        .with_context(|| format!("Submission uses unknown street '{}'", name))
                })
                .collect::<Result<Vec<Phase>>>()?;

            intersection.set_schedule(phases, &mut self.streets)?;
        }

        let mut unscheduled = 0;
        for intersection in self.intersections.values_mut() {
            if !scheduled.contains(&intersection.node) {
                intersection.set_schedule(Vec::new(), &mut self.streets)?;
                unscheduled += 1;
            }
        }
        if unscheduled > 0 {
            warn!(
                "{} intersections have no schedule; their streets stay red",
                unscheduled
            );
        }
        Ok(())
    }

    /// The schedule of every intersection that has one, in node order
    pub fn submission(&self) -> Submission {
        let intersections = self
            .intersections
            .values()
            .filter(|intersection| intersection.has_schedule())
            .map(|intersection| IntersectionSchedule {
                node: intersection.node,
                phases: intersection
                    .schedule()
                    .iter()
                    .map(|phase| (self.streets[phase.street.index()].name.clone(), phase.duration))
                    .collect(),
            })
            .collect();
        Submission { intersections }
    }

    /// Put a car on `street`, driving its full length
    pub fn enqueue(&mut self, street: StreetId, car: &mut SimCar) -> Result<()> {
        self.streets
            .get_mut(street.index())
            .with_context(|| format!("Street {:?} not found", street))?
            .enqueue(car)
    }

    /// Put a car at the light at the end of `street`
    pub fn enqueue_at_light(&mut self, street: StreetId, car: &mut SimCar) -> Result<()> {
        self.streets
            .get_mut(street.index())
            .with_context(|| format!("Street {:?} not found", street))?
            .enqueue_at_light(car)
    }

    /// Advance every traffic light by one tick
    pub fn tick_intersections(&mut self) {
        for intersection in self.intersections.values_mut() {
            intersection.tick(&mut self.streets);
        }
    }

    /// Advance every street by one tick and collect what came out
    pub fn tick_streets(&mut self) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        for street in &mut self.streets {
            let result = street.tick();
            outcome.moved.extend(result.released);
            outcome.finished.extend(result.finished);
        }
        outcome
    }

    /// Cars currently driving along any street
    pub fn in_transit_count(&self) -> usize {
        self.streets.iter().map(SimStreet::in_transit_count).sum()
    }

    /// Cars currently queued at any light
    pub fn waiting_count(&self) -> usize {
        self.streets.iter().map(SimStreet::waiting_count).sum()
    }
}
