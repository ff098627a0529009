//! MCP tool implementations.
//!
//! Each method here does the argument validation, client orchestration,
//! and classification for one tool, and returns the finished markdown
//! report. Validation happens before any network traffic so a bad enum
//! value never costs a round trip.

use crate::error::{Error, Result};
use crate::models::{parse_agent_type, parse_ci_platform, parse_output_format, OutputFormat};
use crate::templates;
use ripple::graph::classify;
use ripple::report::{self, MethodReportInput};
use ripple::{DatabaseEntityType, GraphClient};
use std::sync::Arc;

/// At most this many matched database entities get an impact fetch.
const MAX_DATABASE_BATCH: usize = 5;

/// Tool implementations for the ripple MCP server.
pub struct Tools {
    client: Arc<GraphClient>,
}

impl Tools {
    /// Create a new `Tools` instance backed by the given client.
    pub fn new(client: Arc<GraphClient>) -> Self {
        Self { client }
    }

    /// Analyze the change impact of a method.
    ///
    /// A dotted class path is reduced to its trailing segment before
    /// matching. An empty search result renders a graceful
    /// "unable to analyze" report rather than an error, since the search
    /// layer recovers transient failures into empty results.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication or workspace resolution fails,
    /// if no search result matches the class, or if the impact fetch
    /// fails.
    pub async fn method_impact(&self, method: &str, class: &str) -> Result<String> {
        let class = class.rsplit('.').next().unwrap_or(class).trim();
        let config = self.client.config();

        let view_id = self.client.resolve_view(&config.workspace_name).await?;
        let nodes = self.client.find_method_nodes(&view_id, method).await;
        if nodes.is_empty() {
            tracing::info!(method, "no nodes found, rendering fallback report");
            return Ok(report::render_unable_to_analyze(method, &config.server_url));
        }

        let root = if class.is_empty() {
            &nodes[0]
        } else {
            classify::select_search_node(&nodes, class)?
        };

        let graph = self.client.get_impact(root.entity_id()).await?;

        // The impact graph may carry the method under a different node id
        // than the search result; fall back to the search node for stats
        // if no graph node matches. The fallback keys dependents on the
        // queryable id, since the search node's local id does not appear
        // in the impact graph.
        let class_filter = (!class.is_empty()).then_some(class);
        let (target, dependent_key) = match classify::resolve_target(&graph, method, class_filter)
        {
            Some(node) => (node, node.id.as_str()),
            None => (root, root.entity_id()),
        };

        let dependents = classify::dependents(&graph, dependent_key);
        let applications = classify::application_analysis(&graph);
        let endpoints = classify::endpoint_analysis(&graph);

        tracing::info!(
            method,
            class,
            dependents = dependents.len(),
            cross_application = applications.is_cross_application(),
            "method impact analysis complete"
        );

        Ok(report::render_method_report(&MethodReportInput {
            method,
            class: class_filter,
            complexity: target.complexity(),
            instruction_count: target.instruction_count(),
            dependents: &dependents,
            applications: &applications,
            endpoints: &endpoints,
            graph: &graph,
        }))
    }

    /// Analyze the change impact of a database column, table, or view.
    ///
    /// At most [`MAX_DATABASE_BATCH`] matched entities are analyzed; an
    /// impact fetch failing for one entity skips that entity rather than
    /// aborting the batch.
    ///
    /// # Errors
    ///
    /// Returns an error for a column search without an owning table, or
    /// for auth/workspace failures.
    pub async fn database_impact(
        &self,
        entity_type: DatabaseEntityType,
        name: &str,
        table_or_view: Option<&str>,
    ) -> Result<String> {
        if entity_type == DatabaseEntityType::Column && table_or_view.is_none() {
            return Err(Error::MissingArgument {
                field: "table_or_view",
                reason: "column searches must name the owning table or view",
            });
        }

        let config = self.client.config();
        let view_id = self.client.resolve_view(&config.workspace_name).await?;
        let entities = self
            .client
            .find_database_entities(&view_id, entity_type, name, table_or_view)
            .await;

        if entities.is_empty() {
            tracing::info!(name, entity_type = %entity_type, "no database entities matched");
            return Ok(report::render_no_database_matches(
                entity_type.label(),
                name,
                table_or_view,
            ));
        }

        let matched = entities.len();
        let analyzed = matched.min(MAX_DATABASE_BATCH);
        let mut summaries = Vec::with_capacity(analyzed);
        for entity in entities.iter().take(MAX_DATABASE_BATCH) {
            match self.client.get_impact(entity.entity_id()).await {
                Ok(graph) => summaries.push(classify::database_impact_summary(&graph, entity)),
                Err(err) => {
                    tracing::warn!(
                        entity = %entity.name,
                        error = %err,
                        "impact fetch failed for entity, skipping"
                    );
                }
            }
        }

        tracing::info!(
            name,
            entity_type = %entity_type,
            matched,
            analyzed,
            summarized = summaries.len(),
            "database impact analysis complete"
        );

        Ok(report::render_database_report(
            entity_type.label(),
            name,
            table_or_view,
            matched,
            analyzed,
            &summaries,
        ))
    }

    /// Generate a docker agent scan snippet for a CI/CD pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown agent type or CI platform.
    pub fn docker_agent(
        &self,
        agent_type: &str,
        scan_path: &str,
        application_name: &str,
        ci_platform: Option<&str>,
    ) -> Result<String> {
        let agent = parse_agent_type(agent_type).ok_or(Error::InvalidArgument {
            field: "agent_type",
            value: agent_type.to_string(),
            valid_values: "dotnet, java, sql, javascript",
        })?;
        let platform = match ci_platform {
            None => None,
            Some(raw) if raw.eq_ignore_ascii_case("generic") => None,
            Some(raw) => Some(parse_ci_platform(raw).ok_or(Error::InvalidArgument {
                field: "ci_platform",
                value: raw.to_string(),
                valid_values: "jenkins, github-actions, azure-devops, gitlab, generic",
            })?),
        };

        Ok(templates::docker_agent_guide(
            agent,
            scan_path,
            application_name,
            platform,
        ))
    }

    /// Generate the build-metadata capture snippet.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown CI platform or output format.
    pub fn build_info(
        &self,
        ci_platform: Option<&str>,
        output_format: Option<&str>,
    ) -> Result<String> {
        let platform = ci_platform
            .map(|raw| {
                parse_ci_platform(raw).ok_or(Error::InvalidArgument {
                    field: "ci_platform",
                    value: raw.to_string(),
                    valid_values: "jenkins, github-actions, azure-devops, gitlab",
                })
            })
            .transpose()?;
        let format = match output_format {
            Some(raw) => parse_output_format(raw).ok_or(Error::InvalidArgument {
                field: "output_format",
                value: raw.to_string(),
                valid_values: "docker, standalone, jenkins, yaml",
            })?,
            None => OutputFormat::default(),
        };

        Ok(templates::build_info_guide(platform, format))
    }

    /// Generate a full pipeline configuration guide.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown CI platform or agent type.
    pub fn pipeline_helper(&self, ci_platform: &str, agent_type: &str) -> Result<String> {
        let platform = parse_ci_platform(ci_platform).ok_or(Error::InvalidArgument {
            field: "ci_platform",
            value: ci_platform.to_string(),
            valid_values: "jenkins, github-actions, azure-devops, gitlab",
        })?;
        let agent = parse_agent_type(agent_type).ok_or(Error::InvalidArgument {
            field: "agent_type",
            value: agent_type.to_string(),
            valid_values: "dotnet, java, sql, javascript",
        })?;

        Ok(templates::pipeline_guide(platform, agent))
    }
}
