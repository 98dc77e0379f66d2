//! Tick engine and intent executor for the Formic simulation.
//!
//! The per-tick pipeline for every agent is
//! `reset → pre-sense → behavior tree → apply intents → post-sense`,
//! followed by one lifecycle pass (energy, egg laying, maturation, death
//! removal) and exactly one global pheromone advance. Everything is
//! single-threaded and deterministic: agents are processed in registry
//! insertion order and all randomness flows from one seeded RNG.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod config;
mod executor;
mod lifecycle;
mod sensors;
mod sim;
mod tick;

pub use config::{
    AgentSetupConfig, BehaviorTreeConfig, ColonyConfig, ConfigError, EnvironmentConfig,
    FoodSourceConfig, NestType, PheromoneConfig, QueenEnergyConfig, SimulationConfig,
    TimingConfig,
};
pub use executor::{
    CustomHandler, ExecutedIntent, ExecutionReport, IntentExecutor, RejectedIntent,
};
pub use lifecycle::{EnergyOutcome, EnergyRates};
pub use sensors::SensorRunner;
pub use sim::Simulation;
pub use tick::{AgentTickReport, TickEngine, TickReport};
