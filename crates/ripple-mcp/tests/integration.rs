//! End-to-end tool tests against a mock graph server.

use ripple::{Config, DatabaseEntityType, GraphClient};
use ripple_mcp::tools::Tools;
use ripple_mcp::Error;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tools_for(server: &MockServer) -> Tools {
    let config = Config {
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
    };
    Tools::new(Arc::new(GraphClient::new(config).unwrap()))
}

async fn mount_auth_and_view(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/authenticate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "token-1"})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/materialized-view-definition/name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "def-1"}})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/materialized-view/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "view-1"}})))
        .mount(server)
        .await;
}

fn method_node(id: &str, identity: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "identity": identity,
        "name": name,
        "primaryLabel": "JavaMethodEntity",
        "properties": {"id": format!("agent-{id}")}
    })
}

#[tokio::test]
async fn test_method_impact_full_report() {
    let server = MockServer::start().await;
    mount_auth_and_view(&server).await;

    Mock::given(method("POST"))
        .and(path("/ai-retrieval/search/shortname"))
        .and(query_param("shortname", "addPrefix"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [method_node("m1", "com.example.CompanyInfo.addPrefix", "addPrefix")]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dependency/impact/full/agent-m1/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "nodes": [
                    {
                        "id": "n1",
                        "identity": "com.example.CompanyInfo.addPrefix",
                        "name": "addPrefix",
                        "primaryLabel": "JavaMethodEntity",
                        "properties": {
                            "statistics.cyclomaticComplexity": 12,
                            "statistics.instructionCount": 88
                        }
                    },
                    {
                        "id": "n2",
                        "identity": "com.example.ReportService.buildReport",
                        "name": "buildReport",
                        "primaryLabel": "JavaMethodEntity",
                        "properties": {}
                    }
                ],
                "relationships": [
                    {"startId": "n2", "endId": "n1", "type": "INVOKES"}
                ]
            }
        })))
        .mount(&server)
        .await;

    let tools = tools_for(&server);
    let report = tools
        .method_impact("addPrefix", "com.example.CompanyInfo")
        .await
        .unwrap();

    assert!(report.contains("# Impact Analysis for Method: `addPrefix`"));
    assert!(report.contains("exceeds threshold of 10"));
    assert!(report.contains("buildReport"));
}

#[tokio::test]
async fn test_method_impact_reports_dependents_when_graph_lacks_method_node() {
    let server = MockServer::start().await;
    mount_auth_and_view(&server).await;

    Mock::given(method("POST"))
        .and(path("/ai-retrieval/search/shortname"))
        .and(query_param("shortname", "addPrefix"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [method_node("m1", "com.example.CompanyInfo.addPrefix", "addPrefix")]
        })))
        .mount(&server)
        .await;
    // The graph identifies the target only by a non-method label, so
    // dependents must be keyed on the search node's queryable id.
    Mock::given(method("GET"))
        .and(path("/dependency/impact/full/agent-m1/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "nodes": [
                    {
                        "id": "agent-m1",
                        "identity": "com.example.CompanyInfo.addPrefix",
                        "name": "addPrefix",
                        "primaryLabel": "JavaMethod",
                        "properties": {}
                    },
                    {
                        "id": "n2",
                        "identity": "com.example.ReportService.buildReport",
                        "name": "buildReport",
                        "primaryLabel": "JavaMethodEntity",
                        "properties": {}
                    }
                ],
                "relationships": [
                    {"startId": "n2", "endId": "agent-m1", "type": "INVOKES"}
                ]
            }
        })))
        .mount(&server)
        .await;

    let tools = tools_for(&server);
    let report = tools
        .method_impact("addPrefix", "com.example.CompanyInfo")
        .await
        .unwrap();

    assert!(report.contains("- `buildReport` (JavaMethodEntity) via `INVOKES`"));
}

#[tokio::test]
async fn test_method_impact_unable_to_analyze_on_search_failure() {
    let server = MockServer::start().await;
    mount_auth_and_view(&server).await;
    Mock::given(method("POST"))
        .and(path("/ai-retrieval/search/shortname"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let tools = tools_for(&server);
    let report = tools.method_impact("ghost", "Nowhere").await.unwrap();
    assert!(report.contains("# Unable to Analyze Method: `ghost`"));
}

#[tokio::test]
async fn test_method_impact_class_mismatch_is_an_error() {
    let server = MockServer::start().await;
    mount_auth_and_view(&server).await;
    Mock::given(method("POST"))
        .and(path("/ai-retrieval/search/shortname"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [method_node("m1", "com.example.Other.addPrefix", "addPrefix")]
        })))
        .mount(&server)
        .await;

    let tools = tools_for(&server);
    let err = tools
        .method_impact("addPrefix", "CompanyInfo")
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::Core(ripple::Error::ClassNotFound(_))),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn test_database_impact_column_requires_table() {
    // No mocks mounted: validation must reject the call before any
    // network traffic happens.
    let server = MockServer::start().await;
    let tools = tools_for(&server);

    let err = tools
        .database_impact(DatabaseEntityType::Column, "email", None)
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            Error::MissingArgument {
                field: "table_or_view",
                ..
            }
        ),
        "unexpected error: {err}"
    );
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_database_impact_tolerates_partial_batch_failure() {
    let server = MockServer::start().await;
    mount_auth_and_view(&server).await;

    Mock::given(method("POST"))
        .and(path("/ai-retrieval/search/shortname"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "id": "t1",
                    "identity": "mydb.public.orders",
                    "name": "orders",
                    "primaryLabel": "SqlTableEntity",
                    "properties": {"id": "agent-t1"}
                },
                {
                    "id": "t2",
                    "identity": "mydb.archive.orders",
                    "name": "orders",
                    "primaryLabel": "SqlTableEntity",
                    "properties": {"id": "agent-t2"}
                }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dependency/impact/full/agent-t1/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "nodes": [
                    {
                        "id": "t1",
                        "identity": "mydb.public.orders",
                        "name": "orders",
                        "primaryLabel": "SqlTableEntity",
                        "properties": {"schemaName": "public"}
                    },
                    {
                        "id": "m1",
                        "identity": "com.example.OrderDao.loadOrders",
                        "name": "loadOrders",
                        "primaryLabel": "JavaMethodEntity",
                        "properties": {}
                    }
                ],
                "relationships": [
                    {"startId": "m1", "endId": "t1", "type": "REFERENCES"}
                ]
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dependency/impact/full/agent-t2/list"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let tools = tools_for(&server);
    let report = tools
        .database_impact(DatabaseEntityType::Table, "orders", None)
        .await
        .unwrap();

    assert!(report.contains("# Database Impact Analysis: table `orders`"));
    assert!(report.contains("Matched 2 table(s); analyzed 2."));
    assert!(report.contains("Impact retrieval failed for 1"));
    assert!(report.contains("loadOrders"));
}

#[tokio::test]
async fn test_database_impact_no_matches() {
    let server = MockServer::start().await;
    mount_auth_and_view(&server).await;
    Mock::given(method("POST"))
        .and(path("/ai-retrieval/search/shortname"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let tools = tools_for(&server);
    let report = tools
        .database_impact(DatabaseEntityType::View, "missing_view", None)
        .await
        .unwrap();
    assert!(report.contains("# No views found matching 'missing_view'"));
}
