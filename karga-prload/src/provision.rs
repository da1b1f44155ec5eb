use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::{
    client::endpoint,
    error::BootstrapError,
    ids::member_username,
    payload::{CreateTeam, TeamMember},
    pool::TeamRecord,
};

/// Creates teams on the service under test during bootstrap.
#[async_trait]
pub trait TeamProvisioner: Send + Sync {
    async fn create_team(&self, base: &Url, team: &TeamRecord) -> Result<(), BootstrapError>;
}

impl From<&TeamRecord> for CreateTeam {
    fn from(team: &TeamRecord) -> Self {
        Self {
            team_name: team.name.clone(),
            members: team
                .members
                .iter()
                .enumerate()
                .map(|(idx, user_id)| TeamMember {
                    user_id: user_id.clone(),
                    username: member_username(idx),
                    is_active: true,
                })
                .collect(),
        }
    }
}

/// `POST /team/add` against the real service.
#[derive(Clone)]
pub struct HttpProvisioner {
    client: Client,
    timeout: Duration,
}

impl HttpProvisioner {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl TeamProvisioner for HttpProvisioner {
    async fn create_team(&self, base: &Url, team: &TeamRecord) -> Result<(), BootstrapError> {
        let transport = |source| BootstrapError::Transport {
            team: team.name.clone(),
            source,
        };

        let res = self
            .client
            .post(endpoint(base, "/team/add"))
            .timeout(self.timeout)
            .json(&CreateTeam::from(team))
            .send()
            .await
            .map_err(transport)?;

        let status = res.status();
        if status == StatusCode::CREATED {
            return Ok(());
        }
        let body = match res.text().await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(team = %team.name, "Unable to read rejection body: {err}");
                format!("<unreadable body: {err}>")
            }
        };
        Err(BootstrapError::TeamRejected {
            team: team.name.clone(),
            status: status.as_u16(),
            body,
        })
    }
}
