//! Integration tests for `GraphClient` against a mock graph server.

use ripple::{Config, DatabaseEntityType, Error, GraphClient};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server: &MockServer) -> Config {
    Config {
        server_url: server.uri(),
        username: "tester".to_string(),
        password: "secret".to_string(),
        workspace_name: "test-workspace".to_string(),
        debug: false,
        token_cache_ttl: Duration::from_secs(3600),
        search_cache_ttl: Duration::from_secs(300),
        impact_cache_ttl: Duration::from_secs(300),
        request_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(5),
    }
}

fn client(server: &MockServer) -> GraphClient {
    GraphClient::new(test_config(server)).unwrap()
}

async fn mount_auth(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/authenticate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "token-1"})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_authenticate_reuses_cached_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/authenticate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "token-1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    assert_eq!(client.authenticate().await.unwrap(), "token-1");
    assert_eq!(client.authenticate().await.unwrap(), "token-1");
}

#[tokio::test]
async fn test_authenticate_rejected_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/authenticate"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server).authenticate().await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn test_resolve_view_chains_definition_and_latest() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("GET"))
        .and(path("/materialized-view-definition/name"))
        .and(query_param("name", "test-workspace"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "def-7"}})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/materialized-view/latest"))
        .and(query_param("definitionId", "def-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "view-9"}})))
        .mount(&server)
        .await;

    let view_id = client(&server).resolve_view("test-workspace").await.unwrap();
    assert_eq!(view_id, "view-9");
}

#[tokio::test]
async fn test_resolve_view_unknown_workspace() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("GET"))
        .and(path("/materialized-view-definition/name"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server).resolve_view("missing").await.unwrap_err();
    match err {
        Error::Lookup { context, status } => {
            assert_eq!(context, "workspace definition");
            assert_eq!(status, 404);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_method_search_recovers_from_server_error() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("POST"))
        .and(path("/ai-retrieval/search/shortname"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let nodes = client(&server).find_method_nodes("view-1", "addPrefix").await;
    assert!(nodes.is_empty());
}

#[tokio::test]
async fn test_method_search_recovers_from_timeout() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("POST"))
        .and(path("/ai-retrieval/search/shortname"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = Config {
        request_timeout: Duration::from_millis(250),
        ..test_config(&server)
    };
    let client = GraphClient::new(config).unwrap();

    let nodes = client.find_method_nodes("view-1", "slowMethod").await;
    assert!(nodes.is_empty());
}

#[tokio::test]
async fn test_method_search_caches_successful_results() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("POST"))
        .and(path("/ai-retrieval/search/shortname"))
        .and(query_param("shortname", "addPrefix"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "n1",
                "identity": "com.example.CompanyInfo.addPrefix",
                "name": "addPrefix",
                "primaryLabel": "JavaMethodEntity",
                "properties": {"id": "agent-n1"}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let first = client.find_method_nodes("view-1", "addPrefix").await;
    let second = client.find_method_nodes("view-1", "addPrefix").await;
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(first[0].entity_id(), "agent-n1");
}

#[tokio::test]
async fn test_database_search_filters_by_label_and_owner() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("POST"))
        .and(path("/ai-retrieval/search/shortname"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "id": "c1",
                    "identity": "mydb.public.users.email",
                    "name": "email",
                    "primaryLabel": "SqlColumnEntity",
                    "properties": {}
                },
                {
                    "id": "c2",
                    "identity": "mydb.public.orders.email",
                    "name": "email",
                    "primaryLabel": "SqlColumnEntity",
                    "properties": {}
                },
                {
                    "id": "t1",
                    "identity": "mydb.public.email",
                    "name": "email",
                    "primaryLabel": "SqlTableEntity",
                    "properties": {}
                }
            ]
        })))
        .mount(&server)
        .await;

    let entities = client(&server)
        .find_database_entities("view-1", DatabaseEntityType::Column, "email", Some("users"))
        .await;
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].id, "c1");
}

#[tokio::test]
async fn test_get_impact_strips_internal_properties() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("GET"))
        .and(path("/dependency/impact/full/agent-n1/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "nodes": [{
                    "id": "agent-n1",
                    "identity": "com.example.CompanyInfo.addPrefix",
                    "name": "addPrefix",
                    "primaryLabel": "JavaMethodEntity",
                    "properties": {
                        "statistics.cyclomaticComplexity": 12,
                        "scanContextId": "volatile",
                        "agentIds": ["a", "b"]
                    }
                }],
                "relationships": []
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let graph = client.get_impact("agent-n1").await.unwrap();
    let node = graph.find_node("agent-n1").unwrap();
    assert_eq!(node.complexity(), Some(12.0));
    assert!(!node.properties.contains_key("scanContextId"));
    assert!(!node.properties.contains_key("agentIds"));

    // Second fetch is served from the impact cache.
    let cached = client.get_impact("agent-n1").await.unwrap();
    assert_eq!(cached.nodes.len(), 1);
}

#[tokio::test]
async fn test_get_impact_propagates_server_error() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("GET"))
        .and(path("/dependency/impact/full/bad-id/list"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server).get_impact("bad-id").await.unwrap_err();
    assert!(matches!(err, Error::Http(_)), "unexpected error: {err}");
}
