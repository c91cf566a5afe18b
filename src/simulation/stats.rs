//! End-of-run statistics

use log::info;

use super::types::Tick;

/// Snapshot of a simulation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationStats {
    pub elapsed_ticks: Tick,
    pub total_cars: usize,
    pub cars_finished: usize,
    /// Cars still driving along a street
    pub cars_in_transit: usize,
    /// Cars queued at a light
    pub cars_waiting: usize,
    pub score: u64,
    pub first_finish: Option<Tick>,
    pub last_finish: Option<Tick>,
}

impl SimulationStats {
    /// Percentage of cars that reached the end of their route
    pub fn success_rate(&self) -> f32 {
        if self.total_cars > 0 {
            (self.cars_finished as f32 / self.total_cars as f32) * 100.0
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Elapsed ticks: {}", self.elapsed_ticks);
        info!("Total cars: {}", self.total_cars);
        info!("Cars finished: {}", self.cars_finished);
        info!("Cars still driving: {}", self.cars_in_transit);
        info!("Cars waiting: {}", self.cars_waiting);
        if let (Some(first), Some(last)) = (self.first_finish, self.last_finish) {
            info!("Finish ticks: first {}, last {}", first, last);
        }
        info!("Score: {}", self.score);
        info!("Success rate: {:.1}%", self.success_rate());
    }
}
