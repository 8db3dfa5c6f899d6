//! geotutor-core — Mastery tracking, difficulty policy, and problem generation.
//!
//! This crate holds the adaptive core of the geometry-area tutor: the data
//! model, the mastery update rules, the difficulty state machine, the
//! randomized problem generator, and the session controller that ties them
//! to an injected record store.

pub mod config;
pub mod error;
pub mod generator;
pub mod mastery;
pub mod model;
pub mod policy;
pub mod progress;
pub mod session;
pub mod store;
