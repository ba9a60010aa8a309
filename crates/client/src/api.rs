//! Client and node endpoints of the Chef Infra Server API.
//!
//! Each call builds `/organizations/<org>/<collection>[/<name>]`, serializes
//! the body once, signs those exact bytes and sends a single request.

use std::sync::Arc;

use chef_signer::{Identity, Method, RequestDescriptor, RequestSigner};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::error::ApiError;
use crate::transport::{ApiRequest, ReqwestTransport, Transport};

/// Run list or Policyfile assignment for a new node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRunList {
    RunList(Vec<String>),
    Policy { name: String, group: String },
}

impl NodeRunList {
    /// Interpret free-form target data.
    ///
    /// An object carrying `policy_name` selects a policy (and its
    /// `policy_group`), an array of strings is a run list, and nothing at all
    /// (or an empty string) is an empty run list.
    pub fn from_target_data(data: Option<&Value>) -> Result<Self, ApiError> {
        match data {
            None | Some(Value::Null) => Ok(NodeRunList::RunList(Vec::new())),
            Some(Value::String(s)) if s.is_empty() => Ok(NodeRunList::RunList(Vec::new())),
            Some(Value::Object(map)) if map.contains_key("policy_name") => {
                let field = |key: &str| {
                    map.get(key)
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .ok_or_else(|| ApiError::InvalidTargetData(format!("{key} must be a string")))
                };
                Ok(NodeRunList::Policy {
                    name: field("policy_name")?,
                    group: field("policy_group")?,
                })
            }
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ApiError::InvalidTargetData(format!("run list entry {item} is not a string"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(NodeRunList::RunList),
            Some(other) => Err(ApiError::InvalidTargetData(format!(
                "expected a run list array or a policy object, got {other}"
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
struct NewClient<'a> {
    name: &'a str,
    clientname: &'a str,
    create_key: bool,
    validator: bool,
}

#[derive(Debug, Serialize)]
struct NewNode<'a> {
    name: &'a str,
    json_class: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    run_list: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    policy_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    policy_group: Option<&'a str>,
}

impl<'a> NewNode<'a> {
    fn new(name: &'a str, run_list: &'a NodeRunList) -> Self {
        let mut node = NewNode {
            name,
            json_class: "Chef::Node",
            run_list: None,
            policy_name: None,
            policy_group: None,
        };
        match run_list {
            NodeRunList::RunList(items) => node.run_list = Some(items.as_slice()),
            NodeRunList::Policy { name, group } => {
                node.policy_name = Some(name.as_str());
                node.policy_group = Some(group.as_str());
            }
        }
        node
    }
}

#[derive(Debug, Clone, Copy)]
enum Collection {
    Clients,
    Nodes,
}

impl Collection {
    fn as_str(self) -> &'static str {
        match self {
            Collection::Clients => "clients",
            Collection::Nodes => "nodes",
        }
    }
}

/// Signed access to one organization on one Chef server.
#[derive(Clone)]
pub struct ChefClient {
    base_url: Url,
    organization: String,
    signer: Arc<RequestSigner>,
    transport: Arc<dyn Transport>,
}

impl ChefClient {
    pub fn new(
        base_url: Url,
        organization: impl Into<String>,
        identity: Identity,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url,
            organization: organization.into(),
            signer: Arc::new(RequestSigner::new(identity)),
            transport,
        }
    }

    /// `server` is either a bare host (`chef.example.com[:port]`, reached
    /// over HTTPS) or a full base URL.
    pub fn for_server(server: &str, organization: impl Into<String>, identity: Identity) -> Result<Self, ApiError> {
        let base_url = server_url(server)?;
        Ok(Self::new(
            base_url,
            organization,
            identity,
            Arc::new(ReqwestTransport::new()),
        ))
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub async fn client_get(&self, name: &str) -> Result<Value, ApiError> {
        self.call(Method::Get, Collection::Clients, Some(name), None).await
    }

    pub async fn client_create(&self, name: &str) -> Result<Value, ApiError> {
        let body = encode(&NewClient {
            name,
            clientname: name,
            create_key: true,
            validator: false,
        })?;
        self.call(Method::Post, Collection::Clients, None, Some(body)).await
    }

    pub async fn client_delete(&self, name: &str) -> Result<Value, ApiError> {
        self.call(Method::Delete, Collection::Clients, Some(name), None).await
    }

    pub async fn node_get(&self, name: &str) -> Result<Value, ApiError> {
        self.call(Method::Get, Collection::Nodes, Some(name), None).await
    }

    pub async fn node_create(&self, name: &str, run_list: &NodeRunList) -> Result<Value, ApiError> {
        let body = encode(&NewNode::new(name, run_list))?;
        self.call(Method::Post, Collection::Nodes, None, Some(body)).await
    }

    pub async fn node_delete(&self, name: &str) -> Result<Value, ApiError> {
        self.call(Method::Delete, Collection::Nodes, Some(name), None).await
    }

    fn resource_url(&self, collection: Collection, name: Option<&str>) -> Result<Url, ApiError> {
        let mut resource = self.base_url.clone();
        {
            let mut segments = resource
                .path_segments_mut()
                .map_err(|_| ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            segments
                .pop_if_empty()
                .extend(["organizations", self.organization.as_str(), collection.as_str()]);
            if let Some(name) = name {
                segments.push(name);
            }
        }
        Ok(resource)
    }

    async fn call(
        &self,
        method: Method,
        collection: Collection,
        name: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> Result<Value, ApiError> {
        let url = self.resource_url(collection, name)?;
        let mut descriptor = RequestDescriptor::from_url(method, &url);
        descriptor.body = body;
        let headers = self.signer.sign(&descriptor)?;

        info!(%method, path = %descriptor.path, "calling Chef server");
        let response = self
            .transport
            .send(ApiRequest {
                method,
                url,
                headers,
                body: descriptor.body,
            })
            .await?;
        debug!(status = response.status, bytes = response.body.len(), "Chef server responded");

        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }
        if response.body.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&response.body).map_err(ApiError::InvalidJson)
    }
}

impl std::fmt::Debug for ChefClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChefClient")
            .field("base_url", &self.base_url.as_str())
            .field("organization", &self.organization)
            .field("user_id", &self.signer.identity().user_id())
            .finish_non_exhaustive()
    }
}

fn server_url(server: &str) -> Result<Url, ApiError> {
    if server.contains("://") {
        Ok(Url::parse(server)?)
    } else {
        Ok(Url::parse(&format!("https://{server}"))?)
    }
}

fn encode<T: Serialize>(body: &T) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(body).map_err(ApiError::Encode)
}
