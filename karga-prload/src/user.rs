use std::{sync::Arc, time::Duration};

use rand::{seq::SliceRandom, Rng};

use crate::{
    behavior::{Behavior, BehaviorMix},
    client::ServiceClient,
    error::PoolError,
    ids::{merge_pull_request_id, pull_request_id},
    metrics::{ActionMetric, RequestSample},
    payload::{CreatePullRequest, MergePullRequest, SetIsActive},
    pool::TeamRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkTime {
    pub min: Duration,
    pub max: Duration,
}

impl ThinkTime {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min >= self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Hands out simulated users bound to teams from a completed pool snapshot.
#[derive(Clone)]
pub struct Crowd {
    client: ServiceClient,
    teams: Arc<[TeamRecord]>,
    mix: Arc<BehaviorMix>,
    think: ThinkTime,
}

impl Crowd {
    pub fn new(
        client: ServiceClient,
        teams: Arc<[TeamRecord]>,
        think: ThinkTime,
    ) -> Result<Self, PoolError> {
        if teams.is_empty() {
            return Err(PoolError::NotInitialized);
        }
        Ok(Self {
            client,
            teams,
            mix: Arc::new(BehaviorMix::new()),
            think,
        })
    }

    pub fn user(&self) -> SimulatedUser {
        let idx = rand::thread_rng().gen_range(0..self.teams.len());
        SimulatedUser {
            client: self.client.clone(),
            team: self.teams[idx].clone(),
            mix: self.mix.clone(),
            think: self.think,
        }
    }
}

pub struct SimulatedUser {
    client: ServiceClient,
    team: TeamRecord,
    mix: Arc<BehaviorMix>,
    think: ThinkTime,
}

impl SimulatedUser {
    pub fn team(&self) -> &TeamRecord {
        &self.team
    }

    /// One weighted step followed by the user's think time.
    pub async fn step(&self) -> ActionMetric {
        let behavior = self.mix.sample(&mut rand::thread_rng());
        let metric = self.perform(behavior).await;
        let pause = self.think.sample(&mut rand::thread_rng());
        tokio::time::sleep(pause).await;
        metric
    }

    pub async fn perform(&self, behavior: Behavior) -> ActionMetric {
        let mut samples = Vec::with_capacity(2);
        if behavior.needs_member() && self.team.members.is_empty() {
            return ActionMetric { samples };
        }

        match behavior {
            Behavior::FetchStatistics => {
                samples.push(self.client.get("/statistics", "/statistics", &[]).await);
            }
            Behavior::FetchTeam => {
                let query = [("team_name", self.team.name.as_str())];
                samples.push(self.client.get("/team/get", "/team/get", &query).await);
            }
            Behavior::CreatePullRequest => {
                let pr_id = pull_request_id(&mut rand::thread_rng());
                let name = format!("Feature {pr_id}");
                samples.push(self.create_pull_request("/pullRequest/create", pr_id, name).await);
            }
            Behavior::FetchUserReviews => {
                let reviewer = self.pick_member();
                let query = [("user_id", reviewer.as_str())];
                samples.push(
                    self.client
                        .get("/users/getReview", "/users/getReview", &query)
                        .await,
                );
            }
            Behavior::MergePullRequest => {
                let pr_id = merge_pull_request_id(&mut rand::thread_rng());
                let name = format!("Hotfix {pr_id}");
                let created = self
                    .create_pull_request("/pullRequest/create (merge)", pr_id.clone(), name)
                    .await;
                let merge = created.status == Some(201);
                samples.push(created);
                if merge {
                    let body = MergePullRequest {
                        pull_request_id: pr_id,
                    };
                    samples.push(
                        self.client
                            .post("/pullRequest/merge", "/pullRequest/merge", &body)
                            .await,
                    );
                }
            }
            Behavior::ToggleUserActivity => {
                let body = SetIsActive {
                    user_id: self.pick_member(),
                    is_active: rand::thread_rng().gen(),
                };
                samples.push(
                    self.client
                        .post("/users/setIsActive", "/users/setIsActive", &body)
                        .await,
                );
            }
        }
        ActionMetric { samples }
    }

    async fn create_pull_request(
        &self,
        name: &'static str,
        pr_id: String,
        title: String,
    ) -> RequestSample {
        let body = CreatePullRequest {
            pull_request_id: pr_id,
            pull_request_name: title,
            author_id: self.pick_member(),
        };
        self.client.post(name, "/pullRequest/create", &body).await
    }

    // Callers have checked the team has members.
    fn pick_member(&self) -> String {
        self.team
            .members
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use reqwest::{Client, Url};

    use super::*;

    fn client() -> ServiceClient {
        ServiceClient::new(
            Client::new(),
            Url::parse("http://127.0.0.1:9").unwrap(),
            Duration::from_millis(200),
        )
    }

    fn team(name: &str, members: usize) -> TeamRecord {
        TeamRecord {
            name: name.to_string(),
            members: crate::ids::member_ids(name, members).into(),
        }
    }

    #[test]
    fn think_time_stays_in_bounds() {
        let think = ThinkTime {
            min: Duration::from_millis(50),
            max: Duration::from_millis(300),
        };
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let pause = think.sample(&mut rng);
            assert!(pause >= think.min && pause <= think.max);
        }

        let fixed = ThinkTime {
            min: Duration::from_millis(5),
            max: Duration::from_millis(5),
        };
        assert_eq!(fixed.sample(&mut rng), Duration::from_millis(5));
    }

    #[test]
    fn crowd_requires_populated_snapshot() {
        let think = ThinkTime {
            min: Duration::ZERO,
            max: Duration::ZERO,
        };
        let empty: Arc<[TeamRecord]> = Arc::from(Vec::new());
        assert!(matches!(
            Crowd::new(client(), empty, think),
            Err(PoolError::NotInitialized)
        ));
    }

    #[test]
    fn users_are_bound_to_snapshot_teams() {
        let think = ThinkTime {
            min: Duration::ZERO,
            max: Duration::ZERO,
        };
        let teams: Arc<[TeamRecord]> = Arc::from(vec![team("team-a", 3), team("team-b", 3)]);
        let crowd = Crowd::new(client(), teams.clone(), think).unwrap();
        for _ in 0..50 {
            let user = crowd.user();
            assert!(teams.contains(user.team()));
            let member = user.pick_member();
            assert!(user.team().members.contains(&member));
        }
    }

    #[tokio::test]
    async fn memberless_team_skips_member_steps() {
        let think = ThinkTime {
            min: Duration::ZERO,
            max: Duration::ZERO,
        };
        let teams: Arc<[TeamRecord]> = Arc::from(vec![team("team-empty", 0)]);
        let user = Crowd::new(client(), teams, think).unwrap().user();

        for behavior in Behavior::ALL.into_iter().filter(|b| b.needs_member()) {
            assert!(user.perform(behavior).await.samples.is_empty());
        }
    }

    #[tokio::test]
    async fn failed_create_skips_merge() {
        let think = ThinkTime {
            min: Duration::ZERO,
            max: Duration::ZERO,
        };
        let teams: Arc<[TeamRecord]> = Arc::from(vec![team("team-m", 2)]);
        let user = Crowd::new(client(), teams, think).unwrap().user();

        let metric = user.perform(Behavior::MergePullRequest).await;
        assert_eq!(metric.samples.len(), 1);
        assert_eq!(metric.samples[0].name, "/pullRequest/create (merge)");
        assert!(metric.samples[0].is_failure());
    }
}
