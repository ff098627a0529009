//! HTTP client for the graph server.
//!
//! One fixed call ordering serves every report: authenticate → resolve
//! view → search nodes → fetch impact. Each step feeds the next; nothing
//! fans out in parallel because the graphs are small enough that
//! sequential processing is not a bottleneck.
//!
//! Failure behavior is deliberately asymmetric: node searches recover
//! into an empty result list (the caller renders an "unable to analyze"
//! report), while impact fetches propagate errors — impact data is the
//! whole point of the tool, so its absence must be visible.

use crate::cache::Caches;
use crate::config::Config;
use crate::debug;
use crate::error::{Error, Result};
use crate::graph::{GraphNode, ImpactGraph};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Transport-level retry attempts for idempotent requests.
const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(200);

/// Kind of database entity to search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseEntityType {
    /// A table column; searches must also name the owning table or view.
    Column,
    /// A database table.
    Table,
    /// A database view.
    View,
}

impl DatabaseEntityType {
    /// Lowercase label used in reports and label matching.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Column => "column",
            Self::Table => "table",
            Self::View => "view",
        }
    }

    /// Whether a node's type tag marks it as this kind of entity.
    fn matches_label(self, primary_label: &str) -> bool {
        primary_label.to_lowercase().contains(self.label())
    }
}

impl fmt::Display for DatabaseEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct IdData {
    id: String,
}

/// Client for the graph server's impact-analysis API.
///
/// Holds the HTTP connection pool, configuration, and the shared TTL
/// caches. Cheap to clone behind an `Arc`; all methods take `&self`.
#[derive(Debug)]
pub struct GraphClient {
    http: reqwest::Client,
    config: Config,
    caches: Arc<Caches>,
}

impl GraphClient {
    /// Build a client with connect/total timeouts from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;
        let caches = Arc::new(Caches::new(&config));

        Ok(Self {
            http,
            config,
            caches,
        })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.server_url)
    }

    /// Obtain a bearer token, reusing the cached one while it is fresh.
    ///
    /// Two concurrent expirations may both trigger a credential exchange;
    /// that is acceptable since both resulting tokens are valid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] when the exchange is rejected or the server
    /// is unreachable.
    pub async fn authenticate(&self) -> Result<String> {
        if let Some(token) = self.caches.token().await {
            tracing::debug!("using cached authentication token");
            return Ok(token);
        }

        let response = self
            .http
            .post(self.url("/authenticate"))
            .form(&[
                ("grant_type", "password"),
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .send()
            .await
            .map_err(|err| Error::Auth(err.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Auth(format!(
                "credential exchange returned HTTP {}",
                response.status()
            )));
        }

        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|err| Error::Auth(err.to_string()))?;

        self.caches.store_token(auth.access_token.clone()).await;
        tracing::debug!("new authentication token cached");
        Ok(auth.access_token)
    }

    /// Resolve a workspace name to its latest materialized-view id.
    ///
    /// Two chained lookups, neither cached: workspace identity rarely
    /// changes within a session and the requests are cheap to repeat.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lookup`] with the HTTP status if either step fails,
    /// or [`Error::Auth`] if no token can be obtained.
    pub async fn resolve_view(&self, workspace_name: &str) -> Result<String> {
        let token = self.authenticate().await?;

        let definition_id = self
            .lookup_id(
                "/materialized-view-definition/name",
                &[("name", workspace_name)],
                &token,
                "workspace definition",
            )
            .await?;

        self.lookup_id(
            "/materialized-view/latest",
            &[("definitionId", definition_id.as_str())],
            &token,
            "latest view",
        )
        .await
    }

    async fn lookup_id(
        &self,
        path: &str,
        query: &[(&str, &str)],
        token: &str,
        context: &str,
    ) -> Result<String> {
        let response = self.get_with_retry(&self.url(path), query, token).await?;
        if !response.status().is_success() {
            return Err(Error::Lookup {
                context: context.to_string(),
                status: response.status().as_u16(),
            });
        }
        let envelope: DataEnvelope<IdData> = response.json().await?;
        Ok(envelope.data.id)
    }

    /// Search the view for method nodes matching a short name.
    ///
    /// FAIL-SOFT: a timeout, HTTP error, or decode failure is logged and
    /// recovered into an empty list so the caller can render a graceful
    /// "unable to analyze" report. An empty result is therefore
    /// indistinguishable from a transient failure — callers must not treat
    /// it as proof the method does not exist. Only successful searches are
    /// cached.
    pub async fn find_method_nodes(&self, view_id: &str, short_name: &str) -> Vec<GraphNode> {
        let key = (view_id.to_string(), short_name.to_string());
        if let Some(nodes) = self.caches.search_results(&key).await {
            tracing::debug!(short_name, "node search cache hit");
            return nodes;
        }

        match self.search_shortname(view_id, short_name).await {
            Ok(nodes) => {
                self.caches.store_search_results(key, nodes.clone()).await;
                nodes
            }
            Err(err) => {
                tracing::warn!(short_name, error = %err, "node search failed, returning no results");
                Vec::new()
            }
        }
    }

    /// Search the view for database entities of a given kind.
    ///
    /// Shares the shortname search and its fail-soft contract with
    /// [`Self::find_method_nodes`]; results are filtered to nodes whose
    /// type tag matches the entity kind, and column results are narrowed
    /// to the owning table or view when one is named. The cache key scopes
    /// the view id with the entity kind and owner so differently filtered
    /// searches never collide.
    pub async fn find_database_entities(
        &self,
        view_id: &str,
        entity_type: DatabaseEntityType,
        name: &str,
        table_or_view: Option<&str>,
    ) -> Vec<GraphNode> {
        let scope = match table_or_view {
            Some(owner) => format!("{view_id}|{entity_type}|{}", owner.to_lowercase()),
            None => format!("{view_id}|{entity_type}"),
        };
        let key = (scope, name.to_string());
        if let Some(nodes) = self.caches.search_results(&key).await {
            tracing::debug!(name, "database entity search cache hit");
            return nodes;
        }

        match self.search_shortname(view_id, name).await {
            Ok(nodes) => {
                let owner = table_or_view.map(str::to_lowercase);
                let entities: Vec<GraphNode> = nodes
                    .into_iter()
                    .filter(|node| entity_type.matches_label(&node.primary_label))
                    .filter(|node| {
                        owner.as_ref().is_none_or(|owner| {
                            node.identity.to_lowercase().contains(owner)
                        })
                    })
                    .collect();
                self.caches
                    .store_search_results(key, entities.clone())
                    .await;
                entities
            }
            Err(err) => {
                tracing::warn!(name, error = %err, "database entity search failed, returning no results");
                Vec::new()
            }
        }
    }

    async fn search_shortname(&self, view_id: &str, short_name: &str) -> Result<Vec<GraphNode>> {
        let token = self.authenticate().await?;
        let started = std::time::Instant::now();

        let response = self
            .http
            .post(self.url("/ai-retrieval/search/shortname"))
            .query(&[("materializedViewId", view_id), ("shortname", short_name)])
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?
            .error_for_status()?;

        let envelope: DataEnvelope<Vec<GraphNode>> = response.json().await?;
        tracing::debug!(
            short_name,
            elapsed = ?started.elapsed(),
            count = envelope.data.len(),
            "node search completed"
        );
        Ok(envelope.data)
    }

    /// Fetch the full transitive impact graph for a node.
    ///
    /// FAIL-HARD: impact data is central to the tool's purpose, so HTTP
    /// errors propagate rather than degrade. Volatile internal properties
    /// are stripped from every node before the graph is cached or
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] for transport/status failures,
    /// [`Error::Json`] for malformed payloads, or [`Error::Auth`] when no
    /// token can be obtained.
    pub async fn get_impact(&self, node_id: &str) -> Result<ImpactGraph> {
        if let Some(graph) = self.caches.impact(node_id).await {
            tracing::debug!(node_id, "impact cache hit");
            return Ok(graph);
        }

        let token = self.authenticate().await?;
        let started = std::time::Instant::now();
        let url = self.url(&format!("/dependency/impact/full/{node_id}/list"));

        let response = self
            .get_with_retry(&url, &[], &token)
            .await?
            .error_for_status()?;
        let envelope: DataEnvelope<ImpactGraph> = response.json().await?;

        let mut graph = envelope.data;
        graph.strip_internal_properties();
        tracing::debug!(
            node_id,
            elapsed = ?started.elapsed(),
            nodes = graph.nodes.len(),
            relationships = graph.relationships.len(),
            "impact graph fetched"
        );

        debug::dump_json(
            self.config.debug,
            &format!("impact_{node_id}.json"),
            &graph,
        );
        self.caches.store_impact(node_id.to_string(), graph.clone()).await;
        Ok(graph)
    }

    /// GET with bounded retries on connect/timeout-class errors.
    ///
    /// Only used for idempotent requests; a response with an error status
    /// is returned to the caller undisturbed.
    async fn get_with_retry(
        &self,
        url: &str,
        query: &[(&str, &str)],
        token: &str,
    ) -> Result<reqwest::Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = self
                .http
                .get(url)
                .query(query)
                .bearer_auth(token)
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await;

            match result {
                Ok(response) => return Ok(response),
                Err(err) if attempt < RETRY_ATTEMPTS && (err.is_connect() || err.is_timeout()) => {
                    tracing::debug!(attempt, error = %err, "transient transport error, retrying");
                    tokio::time::sleep(RETRY_BASE_DELAY * attempt).await;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
