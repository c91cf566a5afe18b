//! Traffic Light Scheduling Library
//!
//! Builds a street network from a problem description, assigns each
//! intersection a cyclic green-light schedule and scores it by simulating
//! every car tick by tick.

pub mod generator;
pub mod problem;
pub mod simulation;
pub mod submission;
