//! MCP server implementation.
//!
//! This module contains the main server setup using rmcp.
//!
//! Tool failures never surface as protocol errors: every error is
//! rendered into a markdown error block so the calling model sees
//! something it can report back, and the server stays up.

use crate::models::{
    BuildInfoParams, DatabaseImpactParams, DockerAgentParams, MethodImpactParams,
    PipelineGuideParams,
};
use crate::tools::Tools;
use ripple::{report, GraphClient};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::transport::stdio;
use rmcp::{
    handler::server::ServerHandler, tool, tool_handler, tool_router, ErrorData as McpError,
    ServiceExt,
};
use std::sync::Arc;

fn report_result(tool: &str, result: crate::error::Result<String>) -> CallToolResult {
    match result {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(err) => {
            tracing::error!(tool, error = %err, "tool execution failed");
            CallToolResult::error(vec![Content::text(report::render_tool_error(
                tool,
                &err.to_string(),
            ))])
        }
    }
}

/// The ripple MCP server.
///
/// Provides MCP protocol handling over stdio transport.
#[derive(Clone)]
pub struct RippleMcpServer {
    /// Tool implementations.
    tools: Arc<Tools>,
    /// Tool router for MCP dispatch.
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl RippleMcpServer {
    /// Analyze the blast radius of changing a method.
    #[tool(
        description = "Analyze the impact of modifying a specific method: dependents, cross-application reach, REST exposure, and complexity risk. Run before making code changes."
    )]
    async fn method_impact(
        &self,
        Parameters(params): Parameters<MethodImpactParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .tools
            .method_impact(&params.method, &params.class)
            .await;
        Ok(report_result("method_impact", result))
    }

    /// Analyze the blast radius of changing a database entity.
    #[tool(
        description = "Analyze the impact of modifying a database column, table, or view: code dependents, affected applications, and other database objects. Run before altering schemas or queries."
    )]
    async fn database_impact(
        &self,
        Parameters(params): Parameters<DatabaseImpactParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .tools
            .database_impact(
                params.entity_type.into(),
                &params.name,
                params.table_or_view.as_deref(),
            )
            .await;
        Ok(report_result("database_impact", result))
    }

    /// Generate a docker agent scan snippet for a CI/CD pipeline.
    #[tool(
        description = "Generate docker agent scan configuration for CI/CD pipelines (dotnet, java, sql, or javascript agents)."
    )]
    async fn docker_agent(
        &self,
        Parameters(params): Parameters<DockerAgentParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.tools.docker_agent(
            &params.agent_type,
            &params.scan_path,
            &params.application_name,
            params.ci_platform.as_deref(),
        );
        Ok(report_result("docker_agent", result))
    }

    /// Generate a build-metadata capture snippet.
    #[tool(
        description = "Generate the send_build_info snippet that attaches build metadata and logs to scans, in docker, standalone, jenkins, or yaml form."
    )]
    async fn build_info(
        &self,
        Parameters(params): Parameters<BuildInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .tools
            .build_info(params.ci_platform.as_deref(), params.output_format.as_deref());
        Ok(report_result("build_info", result))
    }

    /// Generate a complete pipeline configuration guide.
    #[tool(
        description = "Generate a complete CI/CD pipeline configuration for jenkins, github-actions, azure-devops, or gitlab with scan-space guidance."
    )]
    async fn pipeline_helper(
        &self,
        Parameters(params): Parameters<PipelineGuideParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .tools
            .pipeline_helper(&params.ci_platform, &params.agent_type);
        Ok(report_result("pipeline_helper", result))
    }
}

impl RippleMcpServer {
    /// Create a new ripple MCP server around a configured client.
    #[must_use]
    pub fn new(client: GraphClient) -> Self {
        Self {
            tools: Arc::new(Tools::new(Arc::new(client))),
            tool_router: Self::tool_router(),
        }
    }

    /// Serve MCP over stdio until the client disconnects.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails to initialize or the
    /// session ends abnormally.
    pub async fn run(self) -> anyhow::Result<()> {
        let service = self.serve(stdio()).await?;
        service.waiting().await?;
        Ok(())
    }
}

#[tool_handler]
impl ServerHandler for RippleMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "ripple-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Ripple MCP server for change-impact analysis. Use method_impact or database_impact before modifying code or schemas."
                    .into(),
            ),
        }
    }
}
