use std::{sync::Arc, time::Duration};

/// Fatal failures of the provisioning pass. Any of them aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("invalid target address {host:?}: {reason}")]
    InvalidHost { host: String, reason: String },

    #[error("failed to create team {team}: {status} {body}")]
    TeamRejected {
        team: String,
        status: u16,
        body: String,
    },

    #[error("failed to create team {team}: {source}")]
    Transport {
        team: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unable to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("could not generate a unique team name after {attempts} attempts")]
    NameExhausted { attempts: usize },
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PoolError {
    #[error("team pool not initialized; bootstrap must complete before users start")]
    NotInitialized,

    #[error("team pool bootstrap failed: {0}")]
    Bootstrap(Arc<BootstrapError>),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("pool size must be at least 1")]
    EmptyPool,

    #[error("at least one worker is required")]
    NoWorkers,

    #[error("minimum think time {min:?} exceeds maximum {max:?}")]
    InvertedThinkTime { min: Duration, max: Duration },
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Setup(#[from] BootstrapError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Client(#[from] reqwest::Error),

    #[error("load execution failed: {0}")]
    Execution(String),
}
