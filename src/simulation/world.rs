//! Main simulation world that ties everything together
//!
//! Owns the network and the cars, runs the tick loop and keeps the score.

use anyhow::{ensure, Context, Result};
use log::{debug, info, warn};

use super::car::SimCar;
use super::scheduler::{ScheduleContext, ScheduleStrategy};
use super::stats::SimulationStats;
use super::street_network::SimNetwork;
use super::types::{CarId, SimId, Tick};
use crate::problem::Problem;
use crate::submission::Submission;

/// The main simulation world
pub struct SimWorld {
    /// Streets and intersections
    network: SimNetwork,

    /// All cars, indexed by `CarId`
    cars: Vec<SimCar>,

    /// Simulated duration `D`
    duration: Tick,

    /// Bonus `F` per finished car
    bonus: u64,

    /// Next tick to simulate
    time: Tick,

    score: u64,

    /// Whether the cars have been put on their first street
    cars_placed: bool,
}

impl SimWorld {
    /// Create a world from an already built network and car list
    pub fn new(network: SimNetwork, cars: Vec<SimCar>, duration: Tick, bonus: u64) -> Result<Self> {
        for (index, car) in cars.iter().enumerate() {
            ensure!(
                car.id.index() == index,
                "Car {:?} stored at position {}",
                car.id,
                index
            );
        }

        Ok(Self {
            network,
            cars,
            duration,
            bonus,
            time: 0,
            score: 0,
            cars_placed: false,
        })
    }

    /// Build the network and cars of a parsed problem; no schedule yet
    pub fn from_problem(problem: &Problem) -> Result<Self> {
        let network = SimNetwork::from_records(&problem.streets)?;

        let cars = problem
            .cars
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let route = network
                    .resolve_route(&record.route)
                    .with_context(|| format!("Invalid route for car {}", index))?;
                Ok(SimCar::new(CarId(SimId(index)), route))
            })
            .collect::<Result<Vec<SimCar>>>()?;

        Self::new(
            network,
            cars,
            problem.parameters.duration,
            problem.parameters.bonus,
        )
    }

    /// Route statistics for the strategies, taken from the full routes
    pub fn schedule_context(&self) -> ScheduleContext {
        ScheduleContext::from_cars(&self.cars, self.duration)
    }

    /// Give every intersection a schedule from `strategy`
    pub fn assign_schedules(&mut self, strategy: &dyn ScheduleStrategy) -> Result<()> {
        let context = self.schedule_context();
        self.network.assign_schedules(strategy, &context)
    }

    /// Install a schedule read from a submission
    pub fn apply_submission(&mut self, submission: &Submission) -> Result<()> {
        self.network.apply_submission(submission)
    }

    pub fn network(&self) -> &SimNetwork {
        &self.network
    }

    pub fn cars(&self) -> &[SimCar] {
        &self.cars
    }

    pub fn car(&self, id: CarId) -> Option<&SimCar> {
        self.cars.get(id.index())
    }

    pub fn duration(&self) -> Tick {
        self.duration
    }

    pub fn bonus(&self) -> u64 {
        self.bonus
    }

    /// Number of ticks simulated so far
    pub fn time(&self) -> Tick {
        self.time
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn is_done(&self) -> bool {
        self.time >= self.duration
    }

    /// Put every car at the light of its first street
    ///
    /// Happens once, before tick 0. The first street costs no travel time.
    pub fn place_cars(&mut self) -> Result<()> {
        if self.cars_placed {
            return Ok(());
        }

        let mut hopeless = 0;
        for car in &mut self.cars {
            let first = car
                .next_street()
                .with_context(|| format!("Car {:?} has an empty route", car.id))?;

            // Each later street costs its length plus the tick spent crossing
            let minimum_travel: u64 = car.remaining_route()[1..]
                .iter()
                .map(|id| {
                    self.network
                        .street(*id)
                        .map(|street| u64::from(street.length) + 1)
                        .unwrap_or(0)
                })
                .sum();
            if minimum_travel >= u64::from(self.duration) {
                hopeless += 1;
            }

            self.network.enqueue_at_light(first, car)?;
        }

        if hopeless > 0 {
            warn!(
                "{} of {} cars cannot finish within {} ticks even on all-green lights",
                hopeless,
                self.cars.len(),
                self.duration
            );
        }

        self.cars_placed = true;
        Ok(())
    }

    /// Main simulation tick
    pub fn tick(&mut self) -> Result<()> {
        ensure!(
            !self.is_done(),
            "Simulation already ran all {} ticks",
            self.duration
        );
        self.place_cars()?;

        let tick = self.time;

        self.network.tick_intersections();
        let outcome = self.network.tick_streets();

        for car_id in &outcome.moved {
            let car = self
                .cars
                .get_mut(car_id.index())
                .with_context(|| format!("Car {:?} not found", car_id))?;
            let next = car
                .next_street()
                .with_context(|| format!("Car {:?} released with no street left", car_id))?;
            self.network.enqueue(next, car)?;
        }

        for car_id in &outcome.finished {
            let car = self
                .cars
                .get_mut(car_id.index())
                .with_context(|| format!("Car {:?} not found", car_id))?;
            car.finish(tick);
            self.score += self.bonus + u64::from(self.duration - tick);
            debug!("Car {:?} finished at tick {}", car_id, tick);
        }

        if !outcome.moved.is_empty() || !outcome.finished.is_empty() {
            debug!(
                "Tick {}: {} cars moved, {} finished",
                tick,
                outcome.moved.len(),
                outcome.finished.len()
            );
        }

        self.time += 1;
        Ok(())
    }

    /// Run all remaining ticks and return the final score
    pub fn run(&mut self) -> Result<u64> {
        info!(
            "Simulating {} cars for {} ticks",
            self.cars.len(),
            self.duration
        );
        self.place_cars()?;
        while !self.is_done() {
            self.tick()?;
        }
        self.stats().log_summary();
        Ok(self.score)
    }

    pub fn stats(&self) -> SimulationStats {
        let finish_ticks = self.cars.iter().filter_map(SimCar::finished_at);
        SimulationStats {
            elapsed_ticks: self.time,
            total_cars: self.cars.len(),
            cars_finished: self.cars.iter().filter(|car| car.is_finished()).count(),
            cars_in_transit: self.network.in_transit_count(),
            cars_waiting: self.network.waiting_count(),
            score: self.score,
            first_finish: finish_ticks.clone().min(),
            last_finish: finish_ticks.max(),
        }
    }
}
