//! MCP parameter models.
//!
//! Parameter structs carry JSON schemas for tool discovery; enum-like
//! string arguments are validated by the `parse_*` helpers before any
//! network traffic happens.

use ripple::DatabaseEntityType;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `method_impact` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MethodImpactParams {
    /// Short name of the method to analyze (no signature, no package).
    pub method: String,

    /// Name of the class containing the method. A dotted path is
    /// accepted; only the trailing segment is used for matching.
    pub class: String,
}

/// Kind of database entity accepted by `database_impact`.
///
/// Published as an enum in the tool schema so invalid values are
/// rejected at deserialization, before the tool body runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// A table column; requires `table_or_view`.
    Column,
    /// A database table.
    Table,
    /// A database view.
    View,
}

impl From<EntityType> for DatabaseEntityType {
    fn from(value: EntityType) -> Self {
        match value {
            EntityType::Column => Self::Column,
            EntityType::Table => Self::Table,
            EntityType::View => Self::View,
        }
    }
}

/// Parameters for the `database_impact` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DatabaseImpactParams {
    /// Kind of entity to search for.
    pub entity_type: EntityType,

    /// Name of the database entity.
    pub name: String,

    /// Owning table or view. Required when `entity_type` is "column".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_or_view: Option<String>,
}

/// Parameters for the `docker_agent` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DockerAgentParams {
    /// Language agent to configure: "dotnet", "java", "sql", or "javascript".
    pub agent_type: String,

    /// Path inside the pipeline workspace that the agent should scan.
    pub scan_path: String,

    /// Application name to report scans under.
    pub application_name: String,

    /// CI platform the snippet is for. Defaults to a generic shell form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci_platform: Option<String>,
}

/// Parameters for the `build_info` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BuildInfoParams {
    /// CI platform whose metadata variables to capture. Defaults to a
    /// generic shell form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci_platform: Option<String>,

    /// Output format for the capture snippet: "docker", "standalone",
    /// "jenkins", or "yaml". Defaults to "docker".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
}

/// Parameters for the `pipeline_helper` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PipelineGuideParams {
    /// CI platform to generate the guide for.
    pub ci_platform: String,

    /// Language agent the pipeline will run.
    pub agent_type: String,
}

/// Language analysis agents that can run in a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentType {
    /// .NET assembly scanner.
    DotNet,
    /// Java bytecode scanner.
    Java,
    /// SQL database scanner.
    Sql,
    /// JavaScript/TypeScript source scanner.
    JavaScript,
}

impl AgentType {
    /// Canonical lowercase name used in image tags and report text.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::DotNet => "dotnet",
            Self::Java => "java",
            Self::Sql => "sql",
            Self::JavaScript => "javascript",
        }
    }
}

/// CI platforms with dedicated template support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiPlatform {
    /// Jenkins declarative pipelines.
    Jenkins,
    /// GitHub Actions workflows.
    GitHubActions,
    /// Azure DevOps pipelines.
    AzureDevOps,
    /// GitLab CI pipelines.
    GitLab,
}

impl CiPlatform {
    /// Canonical name as accepted in tool arguments.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Jenkins => "jenkins",
            Self::GitHubActions => "github-actions",
            Self::AzureDevOps => "azure-devops",
            Self::GitLab => "gitlab",
        }
    }
}

/// Output shapes for the build-info capture snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Environment flags for a `docker run` invocation.
    #[default]
    Docker,
    /// Plain shell exports for a standalone agent.
    Standalone,
    /// Jenkins pipeline environment block.
    Jenkins,
    /// YAML mapping for config-file driven agents.
    Yaml,
}

/// Parse an agent type string into an `AgentType`.
#[must_use]
pub fn parse_agent_type(s: &str) -> Option<AgentType> {
    match s.to_lowercase().as_str() {
        "dotnet" | ".net" => Some(AgentType::DotNet),
        "java" => Some(AgentType::Java),
        "sql" => Some(AgentType::Sql),
        "javascript" | "js" => Some(AgentType::JavaScript),
        _ => None,
    }
}

/// Parse a CI platform string into a `CiPlatform`.
#[must_use]
pub fn parse_ci_platform(s: &str) -> Option<CiPlatform> {
    match s.to_lowercase().as_str() {
        "jenkins" => Some(CiPlatform::Jenkins),
        "github-actions" | "github_actions" | "github" => Some(CiPlatform::GitHubActions),
        "azure-devops" | "azure_devops" | "azure" => Some(CiPlatform::AzureDevOps),
        "gitlab" => Some(CiPlatform::GitLab),
        _ => None,
    }
}

/// Parse an output format string into an `OutputFormat`.
#[must_use]
pub fn parse_output_format(s: &str) -> Option<OutputFormat> {
    match s.to_lowercase().as_str() {
        "docker" => Some(OutputFormat::Docker),
        "standalone" => Some(OutputFormat::Standalone),
        "jenkins" => Some(OutputFormat::Jenkins),
        "yaml" => Some(OutputFormat::Yaml),
        _ => None,
    }
}
