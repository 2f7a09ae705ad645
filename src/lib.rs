//! SafeRoad: road-travel risk assessment with per-user adaptive learning.
//!
//! Live weather and traffic signals are scored by a fixed pair of
//! heuristic rules, while each user accumulates a history of checks that
//! eventually trains a personal classifier. The learned model is preferred
//! for the verdict; the rules remain the fallback and the explanation.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod features;
pub mod labeler;
pub mod ml;
pub mod models;
pub mod processing;
pub mod providers;
pub mod rules;
pub mod state;
