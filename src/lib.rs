//! A deterministic-plus-Monte Carlo rest-of-season simulator for fantasy football leagues.
//! Reconciles completed weeks against recorded results, projects the remaining schedule from
//! weekly point projections, and estimates playoff seeding odds by repeated sampling of the
//! projected matchups. Hypothetical "scenario" overlays can transparently substitute lineups
//! and results without touching the underlying league data.

pub mod config;
pub mod dataset;
pub mod domain;
pub mod file;
pub mod mc;
pub mod merge;
pub mod overlay;
pub mod print;
pub mod sim;
pub mod store;
pub mod summary;
pub mod winprob;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
