//! Request bodies sent to the service under test.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CreateTeam {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CreatePullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MergePullRequest {
    pub pull_request_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SetIsActive {
    pub user_id: String,
    pub is_active: bool,
}
