//! Seeded random problem generator
//!
//! Produces a strongly connected street network (a ring through every node
//! plus random chords) and random-walk car routes. The same config always
//! yields the same problem.

use anyhow::{ensure, Result};
use log::info;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

use crate::problem::Problem;
use crate::simulation::{CarRecord, NodeId, Parameters, StreetRecord, Tick};

/// Shape of the generated problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub nodes: usize,
    pub streets: usize,
    pub cars: usize,
    pub duration: Tick,
    pub bonus: u64,
    /// Street lengths are drawn from `1..=max_street_length`
    pub max_street_length: Tick,
    /// Route lengths are drawn from `1..=max_route_streets`
    pub max_route_streets: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            nodes: 8,
            streets: 16,
            cars: 20,
            duration: 60,
            bonus: 100,
            max_street_length: 4,
            max_route_streets: 6,
        }
    }
}

/// Generate a problem from `config`
pub fn generate(config: &GeneratorConfig) -> Result<Problem> {
    ensure!(config.nodes >= 2, "Need at least 2 nodes, got {}", config.nodes);
    ensure!(
        config.streets >= config.nodes,
        "Need at least {} streets to connect {} nodes",
        config.nodes,
        config.nodes
    );
    ensure!(
        config.streets <= config.nodes * (config.nodes - 1),
        "At most {} streets fit between {} nodes",
        config.nodes * (config.nodes - 1),
        config.nodes
    );
    ensure!(config.max_street_length >= 1, "Street length must be at least 1");
    ensure!(config.max_route_streets >= 1, "Routes need at least 1 street");

    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut pairs: HashSet<(usize, usize)> = HashSet::new();
    let mut streets = Vec::with_capacity(config.streets);
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); config.nodes];

    let mut add_street = |start: usize, end: usize, rng: &mut StdRng| {
        let index = streets.len();
        outgoing[start].push(index);
        streets.push(StreetRecord {
            start: NodeId(start),
            end: NodeId(end),
            name: street_name(index),
            length: rng.random_range(1..=config.max_street_length),
        });
    };

    for start in 0..config.nodes {
        let end = (start + 1) % config.nodes;
        pairs.insert((start, end));
        add_street(start, end, &mut rng);
    }

    while pairs.len() < config.streets {
        let start = rng.random_range(0..config.nodes);
        let end = rng.random_range(0..config.nodes);
        if start != end && pairs.insert((start, end)) {
            add_street(start, end, &mut rng);
        }
    }

    let mut cars = Vec::with_capacity(config.cars);
    for _ in 0..config.cars {
        let length = rng.random_range(1..=config.max_route_streets);
        let mut current = rng.random_range(0..streets.len());
        let mut route = vec![streets[current].name.clone()];
        while route.len() < length {
            let node = streets[current].end.0;
            // The ring gives every node at least one way out
            let Some(&next) = outgoing[node].choose(&mut rng) else {
                break;
            };
            current = next;
            route.push(streets[current].name.clone());
        }
        cars.push(CarRecord { route });
    }

    info!(
        "Generated problem: {} nodes, {} streets, {} cars (seed {})",
        config.nodes,
        streets.len(),
        cars.len(),
        config.seed
    );

    Ok(Problem {
        parameters: Parameters {
            duration: config.duration,
            intersection_count: config.nodes,
            street_count: streets.len(),
            car_count: cars.len(),
            bonus: config.bonus,
        },
        streets,
        cars,
    })
}

/// Spreadsheet-style names: a, b, ..., z, aa, ab, ...
fn street_name(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'a' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}
