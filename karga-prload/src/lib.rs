//! Karga load scenario for the pull request / team management service.
//!
//! A run provisions a bounded pool of teams once, then lets simulated users
//! bound to those teams issue a weighted mix of requests while the karga
//! executor schedules them and folds their samples into a [`LoadReport`].

pub mod behavior;
pub mod client;
pub mod config;
pub mod error;
pub mod ids;
pub mod metrics;
pub mod payload;
pub mod pool;
pub mod provision;
pub mod run;
pub mod user;

pub use behavior::{Behavior, BehaviorMix};
pub use client::ServiceClient;
pub use config::{LoadConfig, DEFAULT_HOST};
pub use error::{BootstrapError, ConfigError, LoadError, PoolError};
pub use metrics::{ActionMetric, LoadAggregate, LoadReport, RequestSample};
pub use pool::{TeamPool, TeamRecord};
pub use provision::{HttpProvisioner, TeamProvisioner};
pub use run::{summarize, LoadTest};
pub use user::{Crowd, SimulatedUser, ThinkTime};
