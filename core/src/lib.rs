//! gravity-core — synthetic traffic generator for the Gravity Farms
//! experimentation demo.
//!
//! The engine drives repeated simulated user journeys against a
//! flag-evaluation client: generate a profile, evaluate flags, roll
//! config-driven conversion probabilities, and forward the events that
//! fire. One logical run at a time; all randomness flows through SimRng.

pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod flags;
pub mod journey;
pub mod profile;
pub mod results;
pub mod rng;
pub mod sink;
pub mod store;
pub mod types;
