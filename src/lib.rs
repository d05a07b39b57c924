//! H100 Oracle Library
//!
//! Market-anchored GPU rental price feed for an on-chain oracle

pub mod config;
pub mod control;
pub mod market;
pub mod publisher;
pub mod scheduler;
pub mod simulator;
pub mod types;
