use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde_json::Value;
use tracing::info;

use crate::api::{ChefClient, NodeRunList};
use crate::error::ApiError;

/// Named operations an orchestrator can trigger.
///
/// Parsed from the kebab-case name (`node-create`) or the original name
/// (`NodeCreate`), case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    #[value(alias = "ClientCreate")]
    ClientCreate,
    #[value(alias = "ClientGet")]
    ClientGet,
    #[value(alias = "ClientDelete")]
    ClientDelete,
    #[value(alias = "NodeCreate")]
    NodeCreate,
    #[value(alias = "NodeGet")]
    NodeGet,
    #[value(alias = "NodeDelete")]
    NodeDelete,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::ClientCreate,
        Action::ClientGet,
        Action::ClientDelete,
        Action::NodeCreate,
        Action::NodeGet,
        Action::NodeDelete,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Action::ClientCreate => "ClientCreate",
            Action::ClientGet => "ClientGet",
            Action::ClientDelete => "ClientDelete",
            Action::NodeCreate => "NodeCreate",
            Action::NodeGet => "NodeGet",
            Action::NodeDelete => "NodeDelete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no matching action {0:?} (expected one of ClientCreate, ClientGet, ClientDelete, NodeCreate, NodeGet, NodeDelete)")]
pub struct ParseActionError(String);

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Action as ValueEnum>::from_str(s, false).map_err(|_| ParseActionError(s.to_string()))
    }
}

/// An action, the resource it targets and optional extra data
/// (a run list or policy for `NodeCreate`).
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub action: Action,
    pub target: String,
    pub target_data: Option<Value>,
}

pub async fn dispatch(client: &ChefClient, request: &ActionRequest) -> Result<Value, ApiError> {
    info!(action = %request.action, target = %request.target, org = client.organization(), "dispatching action");
    let target = request.target.as_str();
    match request.action {
        Action::ClientCreate => client.client_create(target).await,
        Action::ClientGet => client.client_get(target).await,
        Action::ClientDelete => client.client_delete(target).await,
        Action::NodeCreate => {
            let run_list = NodeRunList::from_target_data(request.target_data.as_ref())?;
            client.node_create(target, &run_list).await
        }
        Action::NodeGet => client.node_get(target).await,
        Action::NodeDelete => client.node_delete(target).await,
    }
}
