use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use url::Url;

use chef_api_client::{
    Action, ActionRequest, ApiError, ApiRequest, ApiResponse, ChefClient, NodeRunList, Transport,
    TransportError, dispatch,
};
use chef_signer::{Identity, Method, RequestDescriptor, Verifier};

const TEST_KEY: &str = include_str!("../../signer/tests/fixtures/test-client.pem");

/// Answers every request with a canned response and keeps what it was sent.
struct RecordingTransport {
    requests: Mutex<Vec<ApiRequest>>,
    response: Result<ApiResponse, String>,
}

impl RecordingTransport {
    fn replying(status: u16, body: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            response: Ok(ApiResponse {
                status,
                body: body.to_vec(),
            }),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            response: Err(message.to_string()),
        })
    }

    fn only_request(&self) -> ApiRequest {
        let requests = self.requests.lock().unwrap();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests[0].clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.response.clone().map_err(|message| TransportError::InvalidHeader {
            name: "Host".to_string(),
            message,
        })
    }
}

fn identity() -> Identity {
    Identity::from_pem("test-client", TEST_KEY).unwrap()
}

fn client(transport: Arc<RecordingTransport>) -> ChefClient {
    let base = Url::parse("https://chef.example.com").unwrap();
    ChefClient::new(base, "acme", identity(), transport)
}

/// Check the request the way the Chef server would.
fn assert_verifies(request: &ApiRequest) {
    let mut descriptor = RequestDescriptor::from_url(request.method, &request.url);
    descriptor.body = request.body.clone();
    Verifier::new(identity().public_key())
        .verify(&descriptor, &request.headers, Utc::now())
        .unwrap();
}

fn sent_json(request: &ApiRequest) -> Value {
    serde_json::from_slice(request.body.as_deref().unwrap()).unwrap()
}

// ── Clients ──────────────────────────────────────────────────────────

#[tokio::test]
async fn client_get_is_signed_get() {
    let transport = RecordingTransport::replying(200, br#"{"name":"web01","validator":false}"#);
    let response = client(transport.clone()).client_get("web01").await.unwrap();
    assert_eq!(response["name"], "web01");

    let request = transport.only_request();
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url.path(), "/organizations/acme/clients/web01");
    assert!(request.body.is_none());
    assert_eq!(request.headers.content_hash(), Some("2jmj7l5rSw0yVb/vlWAYkK/YBwk="));
    assert_eq!(request.headers.get("Host"), Some("chef.example.com"));
    assert_verifies(&request);
}

#[tokio::test]
async fn client_create_posts_new_client() {
    let transport = RecordingTransport::replying(201, br#"{"uri":"https://chef.example.com/organizations/acme/clients/web01"}"#);
    client(transport.clone()).client_create("web01").await.unwrap();

    let request = transport.only_request();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url.path(), "/organizations/acme/clients");
    assert_eq!(
        sent_json(&request),
        json!({"name": "web01", "clientname": "web01", "create_key": true, "validator": false})
    );
    assert_verifies(&request);
}

#[tokio::test]
async fn client_delete_is_signed_delete() {
    let transport = RecordingTransport::replying(200, br#"{"name":"web01"}"#);
    client(transport.clone()).client_delete("web01").await.unwrap();

    let request = transport.only_request();
    assert_eq!(request.method, Method::Delete);
    assert_eq!(request.url.path(), "/organizations/acme/clients/web01");
    assert_verifies(&request);
}

// ── Nodes ────────────────────────────────────────────────────────────

#[tokio::test]
async fn node_create_with_run_list_posts_to_nodes() {
    let transport = RecordingTransport::replying(201, br#"{"uri":"https://chef.example.com/organizations/acme/nodes/web01"}"#);
    let run_list = NodeRunList::RunList(vec!["recipe[base]".into(), "role[web]".into()]);
    client(transport.clone()).node_create("web01", &run_list).await.unwrap();

    let request = transport.only_request();
    assert_eq!(request.url.path(), "/organizations/acme/nodes");
    assert_eq!(
        sent_json(&request),
        json!({"name": "web01", "json_class": "Chef::Node", "run_list": ["recipe[base]", "role[web]"]})
    );
    assert_verifies(&request);
}

#[tokio::test]
async fn node_create_with_policy() {
    let transport = RecordingTransport::replying(201, b"{}");
    let policy = NodeRunList::Policy {
        name: "webserver".into(),
        group: "prod".into(),
    };
    client(transport.clone()).node_create("web01", &policy).await.unwrap();

    let body = sent_json(&transport.only_request());
    assert_eq!(body["policy_name"], "webserver");
    assert_eq!(body["policy_group"], "prod");
    assert!(body.get("run_list").is_none());
}

#[tokio::test]
async fn node_get_and_delete_paths() {
    let transport = RecordingTransport::replying(200, br#"{"name":"web01"}"#);
    client(transport.clone()).node_get("web01").await.unwrap();
    let request = transport.only_request();
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url.path(), "/organizations/acme/nodes/web01");

    let transport = RecordingTransport::replying(200, br#"{"name":"web01"}"#);
    client(transport.clone()).node_delete("web01").await.unwrap();
    let request = transport.only_request();
    assert_eq!(request.method, Method::Delete);
    assert_eq!(request.url.path(), "/organizations/acme/nodes/web01");
    assert_verifies(&request);
}

#[tokio::test]
async fn base_url_with_port_reaches_host_header() {
    let transport = RecordingTransport::replying(200, b"{}");
    let base = Url::parse("https://chef.example.com:8443").unwrap();
    let client = ChefClient::new(base, "acme", identity(), transport.clone());
    client.node_get("web01").await.unwrap();

    let request = transport.only_request();
    assert_eq!(request.headers.get("Host"), Some("chef.example.com:8443"));
    assert_verifies(&request);
}

// ── Failures ─────────────────────────────────────────────────────────

#[tokio::test]
async fn non_success_status_is_reported() {
    let transport = RecordingTransport::replying(404, br#"{"error":["Cannot load node missing"]}"#);
    let error = client(transport).node_get("missing").await.unwrap_err();
    match error {
        ApiError::Status { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("Cannot load node"));
        }
        other => panic!("expected Status, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_json_is_reported() {
    let transport = RecordingTransport::replying(200, b"<html>proxy error</html>");
    let error = client(transport).node_get("web01").await.unwrap_err();
    assert!(matches!(error, ApiError::InvalidJson(_)));
}

#[tokio::test]
async fn empty_success_body_is_null() {
    let transport = RecordingTransport::replying(200, b"");
    let response = client(transport).node_delete("web01").await.unwrap();
    assert_eq!(response, Value::Null);
}

#[tokio::test]
async fn transport_failure_is_distinct_from_signing() {
    let transport = RecordingTransport::failing("connection refused");
    let error = client(transport).client_get("web01").await.unwrap_err();
    assert!(matches!(error, ApiError::Transport(_)));
}

// ── Dispatch ─────────────────────────────────────────────────────────

#[tokio::test]
async fn dispatch_node_create_uses_target_data() {
    let transport = RecordingTransport::replying(201, b"{}");
    let request = ActionRequest {
        action: "NodeCreate".parse().unwrap(),
        target: "web01".into(),
        target_data: Some(json!({"policy_name": "webserver", "policy_group": "prod"})),
    };
    dispatch(&client(transport.clone()), &request).await.unwrap();

    let sent = transport.only_request();
    assert_eq!(sent.url.path(), "/organizations/acme/nodes");
    assert_eq!(sent_json(&sent)["policy_group"], "prod");
}

#[tokio::test]
async fn dispatch_rejects_bad_target_data_before_sending() {
    let transport = RecordingTransport::replying(201, b"{}");
    let request = ActionRequest {
        action: Action::NodeCreate,
        target: "web01".into(),
        target_data: Some(json!(42)),
    };
    let error = dispatch(&client(transport.clone()), &request).await.unwrap_err();
    assert!(matches!(error, ApiError::InvalidTargetData(_)));
    assert!(transport.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn dispatch_covers_every_action() {
    let expected = [
        (Action::ClientCreate, Method::Post, "/organizations/acme/clients"),
        (Action::ClientGet, Method::Get, "/organizations/acme/clients/web01"),
        (Action::ClientDelete, Method::Delete, "/organizations/acme/clients/web01"),
        (Action::NodeCreate, Method::Post, "/organizations/acme/nodes"),
        (Action::NodeGet, Method::Get, "/organizations/acme/nodes/web01"),
        (Action::NodeDelete, Method::Delete, "/organizations/acme/nodes/web01"),
    ];
    for (action, method, path) in expected {
        let transport = RecordingTransport::replying(200, b"{}");
        let request = ActionRequest {
            action,
            target: "web01".into(),
            target_data: None,
        };
        dispatch(&client(transport.clone()), &request).await.unwrap();
        let sent = transport.only_request();
        assert_eq!(sent.method, method, "{action}");
        assert_eq!(sent.url.path(), path, "{action}");
    }
}
