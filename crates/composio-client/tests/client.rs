use composio_client::{ClientConfig, ClientError, ComposioClient};
use composio_core::{
    ActionCatalog, ActionName, AppName, ConnectionSource, CoreError, EntityId, ExecuteRequest,
    ExecutionBackend,
};
use httpmock::prelude::*;
use serde_json::json;

const API_KEY: &str = "ak_test_key";

fn client_for(server: &MockServer) -> ComposioClient {
    ComposioClient::new(ClientConfig::new(API_KEY).with_base_url(server.base_url())).unwrap()
}

fn issue_request() -> ExecuteRequest {
    ExecuteRequest::new(ActionName::parse("GITHUB_CREATE_AN_ISSUE").unwrap()).with_params(json!({
        "owner": "composiohq",
        "repo": "agi",
        "title": "New Issue",
        "body": "This is a test issue created using Composio"
    }))
}

#[tokio::test]
async fn execute_sends_default_entity_and_returns_data() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v2/actions/GITHUB_CREATE_AN_ISSUE/execute")
                .header("x-api-key", API_KEY)
                .json_body(json!({
                    "entityId": "default",
                    "appName": "github",
                    "input": {
                        "owner": "composiohq",
                        "repo": "agi",
                        "title": "New Issue",
                        "body": "This is a test issue created using Composio"
                    }
                }));
            then.status(200).json_body(json!({
                "data": {"html_url": "https://github.com/composiohq/agi/issues/42"},
                "error": null,
                "successfull": true,
                "successful": true
            }));
        })
        .await;

    let resp = client_for(&server)
        .execute_action(&issue_request())
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(resp.is_successful());
    assert_eq!(resp.data().unwrap()["html_url"], "https://github.com/composiohq/agi/issues/42");
}

#[tokio::test]
async fn execute_passes_explicit_connected_account_through() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v2/actions/GITHUB_CREATE_AN_ISSUE/execute")
                .json_body(json!({
                    "entityId": "alice",
                    "connectedAccountId": "ca_pinned",
                    "appName": "github",
                    "input": {
                        "owner": "composiohq",
                        "repo": "agi",
                        "title": "New Issue",
                        "body": "This is a test issue created using Composio"
                    }
                }));
            then.status(200).json_body(json!({"successful": true, "data": {}}));
        })
        .await;

    let request = issue_request()
        .with_entity_id("alice")
        .with_connected_account_id("ca_pinned");
    let resp = client_for(&server).execute(request).await.unwrap();

    mock.assert_async().await;
    assert!(resp.is_successful());
}

#[tokio::test]
async fn reported_failures_are_structured() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v2/actions/GITHUB_CREATE_AN_ISSUE/execute");
            then.status(200).json_body(json!({
                "successful": false,
                "data": null,
                "error": "Resource not accessible by integration"
            }));
        })
        .await;

    let resp = client_for(&server)
        .execute_action(&issue_request())
        .await
        .unwrap();
    assert!(!resp.is_successful());
    assert_eq!(resp.error(), Some("Resource not accessible by integration"));
}

#[tokio::test]
async fn client_errors_become_failures_and_server_errors_raise() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v2/actions/GITHUB_CREATE_AN_ISSUE/execute");
            then.status(400).json_body(json!({
                "message": "Could not find a connection with app='github' and entity='default'"
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v2/actions/GMAIL_SEND_EMAIL/execute");
            then.status(502).body("bad gateway");
        })
        .await;
    let client = client_for(&server);

    let resp = client.execute_action(&issue_request()).await.unwrap();
    assert!(!resp.is_successful());
    let error = resp.error().unwrap();
    assert!(error.contains("Could not find a connection"));

    let err = client
        .execute(ExecuteRequest::new(ActionName::parse("GMAIL_SEND_EMAIL").unwrap()))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Transport(ref msg) if msg.contains("502")));
}

#[tokio::test]
async fn client_errors_without_error_body_raise() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v2/actions/GITHUB_CREATE_AN_ISSUE/execute");
            then.status(404).body("<html>Not Found</html>");
        })
        .await;

    let err = client_for(&server)
        .execute_action(&issue_request())
        .await
        .unwrap_err();

    mock.assert_async().await;
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 404);
            assert!(message.contains("Not Found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn configured_default_entity_is_not_applied_by_client() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v2/actions/GITHUB_CREATE_AN_ISSUE/execute")
                .json_body_partial(r#"{"entityId": "default"}"#);
            then.status(200).json_body(json!({"successful": true, "data": {}}));
        })
        .await;

    let mut config = ClientConfig::new(API_KEY).with_base_url(server.base_url());
    config.default_entity_id = Some("team".to_string());
    let client = ComposioClient::new(config).unwrap();

    let resp = client.execute_action(&issue_request()).await.unwrap();

    mock.assert_async().await;
    assert!(resp.is_successful());
}

#[tokio::test]
async fn bad_api_key_is_unauthorized() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v2/actions/GITHUB_CREATE_AN_ISSUE/execute");
            then.status(401).json_body(json!({"message": "API key is invalid"}));
        })
        .await;

    let err = client_for(&server)
        .execute_action(&issue_request())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(ref msg) if msg == "API key is invalid"));
}

#[tokio::test]
async fn local_resolution_pins_most_recent_active_account() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v2/actions/GITHUB_CREATE_AN_ISSUE");
            then.status(200).json_body(json!({
                "name": "GITHUB_CREATE_AN_ISSUE",
                "appKey": "github",
                "description": "Create an issue",
                "parameters": {"type": "object"}
            }));
        })
        .await;
    let listing = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/connectedAccounts")
                .query_param("user_uuid", "default")
                .query_param("appNames", "github");
            then.status(200).json_body(json!({
                "items": [
                    {"id": "ca_old", "appName": "github", "status": "ACTIVE",
                     "clientUniqueUserId": "default", "createdAt": "2024-01-01T00:00:00Z"},
                    {"id": "ca_new", "appName": "github", "status": "ACTIVE",
                     "clientUniqueUserId": "default", "createdAt": "2024-03-01T00:00:00Z"},
                    {"id": "ca_expired", "appName": "github", "status": "EXPIRED",
                     "clientUniqueUserId": "default", "createdAt": "2024-06-01T00:00:00Z"}
                ],
                "totalPages": 1,
                "page": 1
            }));
        })
        .await;
    let execute = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v2/actions/GITHUB_CREATE_AN_ISSUE/execute")
                .json_body_partial(r#"{"connectedAccountId": "ca_new", "entityId": "default"}"#);
            then.status(200).json_body(json!({"successful": true, "data": {"number": 7}}));
        })
        .await;

    let client = ComposioClient::new(
        ClientConfig::new(API_KEY)
            .with_base_url(server.base_url())
            .with_resolve_locally(true),
    )
    .unwrap();
    let resp = client.execute_action(&issue_request()).await.unwrap();

    listing.assert_async().await;
    execute.assert_async().await;
    assert_eq!(resp.data().unwrap()["number"], 7);
}

#[tokio::test]
async fn local_resolution_without_connection_fails_before_sending() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v2/actions/GITHUB_CREATE_AN_ISSUE");
            then.status(404);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/connectedAccounts");
            then.status(200).json_body(json!({"items": [], "totalPages": 1}));
        })
        .await;
    let execute = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v2/actions/GITHUB_CREATE_AN_ISSUE/execute");
            then.status(200).json_body(json!({"successful": true, "data": {}}));
        })
        .await;

    let client = ComposioClient::new(
        ClientConfig::new(API_KEY)
            .with_base_url(server.base_url())
            .with_resolve_locally(true),
    )
    .unwrap();
    let resp = client.execute_action(&issue_request()).await.unwrap();

    assert!(!resp.is_successful());
    assert!(resp.error().unwrap().contains("no active connection"));
    execute.assert_hits_async(0).await;
}

#[tokio::test]
async fn connected_account_listing_follows_pages() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/connectedAccounts")
                .query_param("page", "1");
            then.status(200).json_body(json!({
                "items": [{"id": "ca_1", "appName": "gmail", "status": "ACTIVE",
                           "clientUniqueUserId": "alice", "createdAt": "2024-01-01T00:00:00Z"}],
                "totalPages": 2
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/connectedAccounts")
                .query_param("page", "2");
            then.status(200).json_body(json!({
                "items": [{"id": "ca_2", "appName": "slack", "status": "INITIATED",
                           "clientUniqueUserId": "alice", "createdAt": "2024-02-01T00:00:00Z"}],
                "totalPages": 2
            }));
        })
        .await;

    let accounts = client_for(&server)
        .list_accounts(&EntityId::new("alice"), None)
        .await
        .unwrap();
    let ids: Vec<&str> = accounts.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["ca_1", "ca_2"]);
}

#[tokio::test]
async fn missing_resources_are_none() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/connectedAccounts/ca_gone");
            then.status(404).json_body(json!({"message": "not found"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v2/actions/NOTION_CREATE_PAGE");
            then.status(404);
        })
        .await;
    let client = client_for(&server);

    assert!(client
        .get_account(&"ca_gone".into())
        .await
        .unwrap()
        .is_none());
    assert!(client
        .get_action(&ActionName::parse("NOTION_CREATE_PAGE").unwrap())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn lists_actions_for_app() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v2/actions")
                .query_param("apps", "github");
            then.status(200).json_body(json!({
                "items": [
                    {"name": "GITHUB_CREATE_AN_ISSUE", "appKey": "github",
                     "description": "Create an issue",
                     "parameters": {"type": "object", "required": ["owner", "repo", "title"]}},
                    {"name": "GITHUB_STAR_A_REPOSITORY_FOR_THE_AUTHENTICATED_USER",
                     "appKey": "github", "description": "Star a repository"}
                ]
            }));
        })
        .await;

    let schemas = ActionCatalog::list_actions(&client_for(&server), Some(&AppName::new("github")))
        .await
        .unwrap();
    assert_eq!(schemas.len(), 2);
    assert_eq!(schemas[0].required_params(), vec!["owner", "repo", "title"]);
    assert_eq!(schemas[1].parameters["type"], "object");
}
