//! Career recommendation service: encodes a student profile, scores it with a
//! trained random forest and returns ranked careers with gap analysis and a
//! roadmap for the student's current year.

pub mod classifier;
pub mod config;
pub mod errors;
pub mod models;
pub mod persistence;
pub mod recommendation;
pub mod routes;
pub mod state;
