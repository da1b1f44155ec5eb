//! Pre-provisioned teams shared by every simulated user of a run.
//!
//! The pool is filled once, before load starts, so that high-concurrency runs
//! do not fight over team creation. Population goes through a compute-once
//! cell that stores the outcome of the single pass: callers racing the pass
//! wait for it, callers arriving later get the stored result (or the stored
//! failure) without touching the network.

use std::{collections::HashSet, sync::Arc};

use rand::{seq::SliceRandom, Rng};
use reqwest::Url;
use tokio::sync::OnceCell;

use crate::{
    config::{LoadConfig, DEFAULT_HOST},
    error::{BootstrapError, PoolError},
    ids::{member_ids, random_id, team_name, SUFFIX_LEN},
    provision::TeamProvisioner,
};

const NAME_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeamRecord {
    pub name: String,
    pub members: Arc<[String]>,
}

type Outcome = Result<Arc<[TeamRecord]>, Arc<BootstrapError>>;

pub struct TeamPool {
    provisioner: Arc<dyn TeamProvisioner>,
    pool_size: usize,
    member_count: usize,
    teams: OnceCell<Outcome>,
}

impl TeamPool {
    pub fn new(
        provisioner: Arc<dyn TeamProvisioner>,
        pool_size: usize,
        member_count: usize,
    ) -> Self {
        Self {
            provisioner,
            pool_size,
            member_count,
            teams: OnceCell::new(),
        }
    }

    pub fn from_config(config: &LoadConfig, provisioner: Arc<dyn TeamProvisioner>) -> Self {
        Self::new(provisioner, config.pool_size, config.member_count)
    }

    /// Provisions the pool against `host`, at most once per `TeamPool`.
    ///
    /// An empty or absent host falls back to [`DEFAULT_HOST`]. The first
    /// rejected team aborts the pass; that failure is kept and returned to
    /// every later caller.
    pub async fn bootstrap(&self, host: Option<&str>) -> Result<Arc<[TeamRecord]>, PoolError> {
        let outcome = self.teams.get_or_init(|| self.populate(host)).await;
        outcome.clone().map_err(PoolError::Bootstrap)
    }

    /// A uniformly random team. Fails until a bootstrap has succeeded.
    pub fn pick_team(&self) -> Result<TeamRecord, PoolError> {
        let teams = self.snapshot()?;
        choose_team(&teams, &mut rand::thread_rng())
            .cloned()
            .ok_or(PoolError::NotInitialized)
    }

    /// The completed pool, for workers to capture once at startup.
    pub fn snapshot(&self) -> Result<Arc<[TeamRecord]>, PoolError> {
        match self.teams.get() {
            Some(Ok(teams)) if !teams.is_empty() => Ok(teams.clone()),
            _ => Err(PoolError::NotInitialized),
        }
    }

    pub fn is_populated(&self) -> bool {
        self.snapshot().is_ok()
    }

    async fn populate(&self, host: Option<&str>) -> Outcome {
        let base = resolve_host(host).map_err(Arc::new)?;
        tracing::info!(
            host = %base,
            pool_size = self.pool_size,
            member_count = self.member_count,
            "Bootstrapping team pool"
        );

        let mut names = HashSet::with_capacity(self.pool_size);
        let mut teams = Vec::with_capacity(self.pool_size);
        for _ in 0..self.pool_size {
            let team = self.generate_team(&mut names).map_err(Arc::new)?;
            if let Err(err) = self.provisioner.create_team(&base, &team).await {
                tracing::error!("Team pool bootstrap aborted: {err}");
                return Err(Arc::new(err));
            }
            tracing::debug!(team = %team.name, "Created team");
            teams.push(team);
        }

        tracing::info!(teams = teams.len(), "Team pool ready");
        Ok(teams.into())
    }

    fn generate_team(&self, taken: &mut HashSet<String>) -> Result<TeamRecord, BootstrapError> {
        let mut rng = rand::thread_rng();
        for _ in 0..NAME_ATTEMPTS {
            let name = team_name(&random_id(&mut rng, SUFFIX_LEN));
            if taken.insert(name.clone()) {
                let members = member_ids(&name, self.member_count).into();
                return Ok(TeamRecord { name, members });
            }
        }
        Err(BootstrapError::NameExhausted {
            attempts: NAME_ATTEMPTS,
        })
    }
}

/// Uniform pick over an immutable snapshot.
pub fn choose_team<'a, R: Rng + ?Sized>(
    teams: &'a [TeamRecord],
    rng: &mut R,
) -> Option<&'a TeamRecord> {
    teams.choose(rng)
}

pub fn resolve_host(host: Option<&str>) -> Result<Url, BootstrapError> {
    let host = match host.map(str::trim) {
        Some(h) if !h.is_empty() => h,
        _ => DEFAULT_HOST,
    };
    Url::parse(host).map_err(|e| BootstrapError::InvalidHost {
        host: host.to_string(),
        reason: e.to_string(),
    })
}
