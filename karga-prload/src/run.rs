use std::sync::Arc;

use karga::{Executor, Scenario, Stage, StageExecutor};
use reqwest::Client;

use crate::{
    client::{build_client, ServiceClient},
    config::LoadConfig,
    error::LoadError,
    metrics::{LoadAggregate, LoadReport},
    pool::{resolve_host, TeamPool, TeamRecord},
    provision::{HttpProvisioner, TeamProvisioner},
    user::{Crowd, ThinkTime},
};

/// One load run against the service: bootstrap, hammer, report.
pub struct LoadTest {
    config: LoadConfig,
    client: Client,
    pool: Arc<TeamPool>,
}

impl LoadTest {
    pub fn new(config: LoadConfig) -> Result<Self, LoadError> {
        config.validate()?;
        let client = build_client(config.workers)?;
        let provisioner = HttpProvisioner::new(client.clone(), config.request_timeout);
        Ok(Self::with_provisioner(config, client, Arc::new(provisioner)))
    }

    pub fn with_provisioner(
        config: LoadConfig,
        client: Client,
        provisioner: Arc<dyn TeamProvisioner>,
    ) -> Self {
        let pool = Arc::new(TeamPool::from_config(&config, provisioner));
        Self {
            config,
            client,
            pool,
        }
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<TeamPool> {
        &self.pool
    }

    /// Run-start hook. Idempotent; a failure here means no load is generated.
    pub async fn start(&self) -> Result<Arc<[TeamRecord]>, LoadError> {
        tracing::info!(host = %self.config.host, "Starting load test");
        Ok(self.pool.bootstrap(Some(self.config.host.as_str())).await?)
    }

    pub fn crowd(&self) -> Result<Crowd, LoadError> {
        let base = resolve_host(Some(self.config.host.as_str()))?;
        let client = ServiceClient::new(self.client.clone(), base, self.config.request_timeout);
        let think = ThinkTime {
            min: self.config.wait_min,
            max: self.config.wait_max,
        };
        Ok(Crowd::new(client, self.pool.snapshot()?, think)?)
    }

    pub async fn run(&self) -> Result<LoadReport, LoadError> {
        self.start().await?;
        let crowd = self.crowd()?;

        let scenario = Scenario::builder()
            .name("PR service users")
            .action(move || {
                // karga gives no per-worker start hook, so every iteration is
                // one step of a user freshly bound to a team from the snapshot.
                let user = crowd.user();
                async move { user.step().await }
            })
            .build();

        let results: LoadAggregate = StageExecutor::builder()
            .stages(vec![
                Stage::new(std::time::Duration::ZERO, f64::MAX),
                Stage::new(self.config.duration, f64::MAX),
            ])
            .workers(self.config.workers as _)
            .build()
            .exec(&scenario)
            .await
            .map_err(|err| LoadError::Execution(format!("{err:?}")))?;

        let report = LoadReport::from(results);
        summarize(&report);
        Ok(report)
    }
}

/// Run-stop hook: aggregate counters to the log.
pub fn summarize(report: &LoadReport) {
    tracing::info!(
        actions = report.actions,
        requests = report.reqs_total,
        failures = report.failures_total,
        "Tests completed"
    );
    if let Some(rate) = report.success_rate {
        tracing::info!("Success rate: {rate:.2}%");
    }
    for (name, endpoint) in &report.endpoints {
        tracing::debug!(
            request = %name,
            requests = endpoint.reqs_total,
            failures = endpoint.failures,
            p95 = ?endpoint.req_duration.p95,
            "Endpoint summary"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use async_trait::async_trait;
    use reqwest::Url;

    use super::*;
    use crate::{error::BootstrapError, metrics::ActionMetric, user::SimulatedUser};

    #[derive(Default)]
    struct CountingProvisioner {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TeamProvisioner for CountingProvisioner {
        async fn create_team(&self, _base: &Url, _team: &TeamRecord) -> Result<(), BootstrapError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn config() -> LoadConfig {
        LoadConfig::builder()
            .host("http://127.0.0.1:9")
            .pool_size(2)
            .member_count(3)
            .wait_min(Duration::ZERO)
            .wait_max(Duration::ZERO)
            .request_timeout(Duration::from_millis(200))
            .build()
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = LoadConfig::builder().workers(0).build();
        assert!(matches!(LoadTest::new(config), Err(LoadError::Config(_))));
    }

    #[test]
    fn crowd_before_start_is_lifecycle_error() {
        let test = LoadTest::with_provisioner(
            config(),
            Client::new(),
            Arc::new(CountingProvisioner::default()),
        );
        assert!(matches!(test.crowd(), Err(LoadError::Pool(_))));
    }

    #[tokio::test]
    async fn start_is_idempotent() {
        let provisioner = Arc::new(CountingProvisioner::default());
        let test = LoadTest::with_provisioner(config(), Client::new(), provisioner.clone());

        let first = test.start().await.unwrap();
        let second = test.start().await.unwrap();

        assert_eq!(first.len(), 2);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provisioner.calls.load(Ordering::SeqCst), 2);
        assert!(test.crowd().is_ok());
    }

    #[test]
    fn action_compatibility() {
        let test = LoadTest::with_provisioner(
            config(),
            Client::new(),
            Arc::new(CountingProvisioner::default()),
        );
        let teams: Arc<[TeamRecord]> = Arc::from(vec![TeamRecord {
            name: "team-a".into(),
            members: Arc::from(vec!["user-team-a-0".to_string()]),
        }]);
        let client = ServiceClient::new(
            test.client.clone(),
            Url::parse("http://127.0.0.1:9").unwrap(),
            Duration::from_millis(10),
        );
        let think = ThinkTime {
            min: Duration::ZERO,
            max: Duration::ZERO,
        };
        let crowd = Crowd::new(client, teams, think).unwrap();

        let _: Scenario<LoadAggregate, _, _> = Scenario::builder()
            .name("random")
            .action(move || {
                let user: SimulatedUser = crowd.user();
                async move {
                    let metric: ActionMetric = user.step().await;
                    metric
                }
            })
            .build();
    }
}
