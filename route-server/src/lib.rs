//! Household trip planner server.
//!
//! A web application that answers: "I'm going from here to there,
//! what should I stop for on the way, and when do I need to leave?"

pub mod cache;
pub mod domain;
pub mod navigation;
pub mod planner;
pub mod resolver;
pub mod web;
