//! Markdown report rendering.
//!
//! Pure functions from classified facts to report text. Rendering is
//! deterministic for identical input: applications are sorted
//! lexicographically, node table rows follow graph order, and no wall-clock
//! content appears in the body. Section order and table columns are part of
//! the external contract.

use crate::graph::classify::{
    ApplicationAnalysis, DatabaseImpactSummary, Dependent, EndpointAnalysis,
    COMPLEXITY_THRESHOLD,
};
use crate::graph::ImpactGraph;
use std::fmt::Write;

/// Everything the method report needs, already classified.
#[derive(Debug)]
pub struct MethodReportInput<'a> {
    /// The method name as searched for.
    pub method: &'a str,
    /// The disambiguating class, if one was given.
    pub class: Option<&'a str>,
    /// Cyclomatic complexity of the resolved target node.
    pub complexity: Option<f64>,
    /// Instruction count of the resolved target node.
    pub instruction_count: Option<f64>,
    /// Nodes depending on the target.
    pub dependents: &'a [Dependent],
    /// Cross-application findings.
    pub applications: &'a ApplicationAnalysis,
    /// REST exposure findings.
    pub endpoints: &'a EndpointAnalysis,
    /// The full graph, for the metrics and relationship tables.
    pub graph: &'a ImpactGraph,
}

/// Format a statistic: `N/A` when absent, integers without a decimal tail.
fn fmt_stat(value: Option<f64>) -> String {
    match value {
        None => "N/A".to_string(),
        Some(v) if v.fract() == 0.0 => format!("{v:.0}"),
        Some(v) => format!("{v}"),
    }
}

fn exceeds_threshold(value: Option<f64>) -> bool {
    value.is_some_and(|v| v > COMPLEXITY_THRESHOLD)
}

/// Render the full method impact report.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn render_method_report(input: &MethodReportInput<'_>) -> String {
    let mut out = String::new();

    let _ = write!(
        out,
        "# Impact Analysis for Method: `{}`

## Guidelines for AI
- Pay special attention to methods with Cyclomatic Complexity over 10 as they represent higher risk
- Consider the cross-application dependencies when making changes
- Prioritize testing for components that directly depend on this method
- Suggest refactoring when complexity metrics indicate poor maintainability
- Consider the full relationship map to understand cascading impacts
- Highlight REST API endpoints and external dependencies that may be affected by changes

## Summary
- **Method**: `{}`
- **Class**: `{}`
- **Complexity**: {}
- **Instruction Count**: {}
- **Affected Applications**: {}
",
        input.method,
        input.method,
        input.class.unwrap_or("N/A"),
        fmt_stat(input.complexity),
        fmt_stat(input.instruction_count),
        input.applications.affected.len(),
    );

    if !input.endpoints.endpoints.is_empty() {
        out.push_str("\n### Affected REST Endpoints\n");
        for endpoint in &input.endpoints.endpoints {
            let _ = writeln!(out, "- `{} {}`", endpoint.http_verb, endpoint.path);
        }
    }

    out.push_str("\n## Risk Assessment\n");
    if exceeds_threshold(input.complexity) {
        let _ = writeln!(
            out,
            "⚠️ **Warning**: Cyclomatic complexity of {} exceeds threshold of 10\n",
            fmt_stat(input.complexity)
        );
    } else {
        out.push_str("✅ Complexity is within acceptable limits\n\n");
    }

    if input.applications.is_cross_application() {
        let _ = writeln!(
            out,
            "⚠️ **Cross-Application Dependency**: This method is used by {} applications:",
            input.applications.affected.len()
        );
        for app in &input.applications.affected {
            match input.applications.dependencies.get(app) {
                Some(deps) if !deps.is_empty() => {
                    let list = deps
                        .iter()
                        .map(|d| format!("`{d}`"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    let _ = writeln!(out, "- `{app}` (depends on: {list})");
                }
                _ => {
                    let _ = writeln!(out, "- `{app}`");
                }
            }
        }
        out.push_str(
            "\nChanges to this method may cause widespread impacts across multiple applications. \
             Consider careful testing across all affected systems.\n",
        );
    } else {
        out.push_str("✅ Method is used within a single application context\n");
    }

    if input.endpoints.has_rest_signal() {
        out.push_str("\n### REST API Risk Assessment\n");
        out.push_str("⚠️ **API Impact Alert**: This method affects REST endpoints or API controllers\n");

        if !input.endpoints.annotated_methods.is_empty() {
            out.push_str("\n#### REST Methods with Annotations\n");
            for method in &input.endpoints.annotated_methods {
                let _ = writeln!(out, "- `{}` ({})", method.name, method.annotations.join(", "));
            }
        }

        if !input.endpoints.controllers.is_empty() {
            out.push_str("\n#### Affected API Controllers\n");
            for controller in &input.endpoints.controllers {
                let _ = writeln!(out, "- `{}` ({})", controller.name, controller.node_type);
            }
        }

        if !input.endpoints.chains.is_empty() {
            out.push_str("\n### REST API Dependencies\n");
            out.push_str("⚠️ **Chained API Risk**: Changes may affect multiple interconnected endpoints\n\n");
            for chain in &input.endpoints.chains {
                let _ = writeln!(out, "- `{}` depends on `{}`", chain.source, chain.target);
            }
        }

        out.push_str(
            "
### API Change Risk Factors
- Changes may affect external consumers and services
- Consider versioning strategy for breaking changes
- API contract changes require thorough documentation
- Update API tests and client libraries as needed
- Consider backward compatibility requirements
- **Chained API calls**: Changes may have cascading effects across multiple endpoints
- **Cross-application impact**: API changes could affect dependent systems
",
        );
    } else {
        out.push_str("\n### REST API Risk Assessment\n");
        out.push_str("✅ No direct impact on REST endpoints or API controllers detected\n");
    }

    let _ = write!(
        out,
        "
## Method Impact
This analysis focuses on systems that depend on `{}`. Modifying this method could affect these dependents:

",
        input.method
    );

    if input.dependents.is_empty() {
        out.push_str("No components directly depend on this method. The change appears to be isolated.\n");
    } else {
        for dep in input.dependents {
            let _ = writeln!(
                out,
                "- `{}` ({}) via `{}`",
                dep.name, dep.node_type, dep.relationship
            );
        }
    }

    out.push_str("\n## Detailed Node Metrics\n");
    out.push_str(&node_metrics_table(input.graph));

    out.push_str("\n## Relationship Map\n");
    out.push_str(&relationship_table(input));

    if input.applications.is_cross_application() {
        out.push_str("\n## Application Dependency Graph\n```\n");
        for app in &input.applications.affected {
            match input.applications.dependencies.get(app) {
                Some(deps) if !deps.is_empty() => {
                    let _ = writeln!(out, "{app} → {}", deps.join(" → "));
                }
                _ => {
                    let _ = writeln!(out, "{app} (no dependencies)");
                }
            }
        }
        out.push_str("```\n");
    }

    out
}

/// Node metrics as a markdown table, rows in graph order.
fn node_metrics_table(graph: &ImpactGraph) -> String {
    let mut table = String::from(
        "| Name | Type | Complexity | Instruction Count | Method Count | Outgoing Refs | Incoming Refs |\n\
         |------|------|------------|-------------------|-------------|---------------|---------------|\n",
    );

    for node in &graph.nodes {
        let complexity = node.complexity();
        let complexity_cell = if exceeds_threshold(complexity) {
            format!("**{}** ⚠️", fmt_stat(complexity))
        } else {
            fmt_stat(complexity)
        };

        let _ = writeln!(
            table,
            "| {} | {} | {} | {} | {} | {} | {} |",
            node.name,
            node.primary_label,
            complexity_cell,
            fmt_stat(node.instruction_count()),
            fmt_stat(node.method_count()),
            fmt_stat(node.outgoing_reference_total()),
            fmt_stat(node.incoming_reference_total()),
        );
    }

    table
}

/// Relationships as a markdown table; rows touching both the target method
/// and its class are bolded.
fn relationship_table(input: &MethodReportInput<'_>) -> String {
    let mut table = String::from(
        "| Relationship Type | Source | Source Type | Target | Target Type |\n\
         |------------------|--------|-------------|--------|------------|\n",
    );

    let method = input.method.to_lowercase();
    let class = input.class.map(str::to_lowercase);

    for rel in &input.graph.relationships {
        let (Some(start), Some(end)) = (
            input.graph.find_node(&rel.start_id),
            input.graph.find_node(&rel.end_id),
        ) else {
            continue;
        };

        let source = start.name.to_lowercase();
        let target = end.name.to_lowercase();
        let touches_method = source.contains(&method) || target.contains(&method);
        let touches_class = class
            .as_ref()
            .is_some_and(|c| source.contains(c) || target.contains(c));
        let highlight = if touches_method && touches_class { "**" } else { "" };

        let _ = writeln!(
            table,
            "| {highlight}{}{highlight} | {highlight}{}{highlight} | {} | {highlight}{}{highlight} | {} |",
            rel.rel_type, start.name, start.primary_label, end.name, end.primary_label,
        );
    }

    table
}

/// The graceful branch for an empty or failed search: an "unable to
/// analyze" report instead of an error, since an empty result here is
/// indistinguishable from a transient server failure.
#[must_use]
pub fn render_unable_to_analyze(method: &str, server_url: &str) -> String {
    format!(
        "# Unable to Analyze Method: `{method}`

## Error
The request to retrieve method information from the graph server timed out or failed.

## Possible causes:
1. The graph server is under heavy load
2. Network connectivity issues between this server and the graph server
3. The method name provided (`{method}`) doesn't exist in the codebase

## Recommendations:
1. Try again in a few minutes
2. Verify the method name is correct
3. Check your connection to the graph server at: {server_url}
4. If the problem persists, contact your graph server administrator
"
    )
}

/// Report for a database search that matched nothing.
#[must_use]
pub fn render_no_database_matches(
    entity_type: &str,
    name: &str,
    table_or_view: Option<&str>,
) -> String {
    let scope = table_or_view
        .map(|t| format!(" in {t}"))
        .unwrap_or_default();
    format!(
        "# No {entity_type}s found matching '{name}'{scope}\n\n\
         No database {entity_type}s were found matching the name '{name}'{scope}.\n"
    )
}

/// Combined report across up to five matched database entities.
///
/// Entities whose impact fetch failed are absent from `summaries`; the
/// count line makes the omission visible without aborting the batch.
#[must_use]
pub fn render_database_report(
    entity_type: &str,
    name: &str,
    table_or_view: Option<&str>,
    matched: usize,
    analyzed: usize,
    summaries: &[DatabaseImpactSummary],
) -> String {
    let mut out = String::new();

    let scope = table_or_view
        .map(|t| format!(" in `{t}`"))
        .unwrap_or_default();
    let _ = write!(
        out,
        "# Database Impact Analysis: {entity_type} `{name}`

Matched {matched} {entity_type}(s){scope}; analyzed {analyzed}.
"
    );

    if summaries.len() < analyzed {
        let _ = writeln!(
            out,
            "\n⚠️ Impact retrieval failed for {} of the analyzed entities; they are omitted below. Check the server logs for details.",
            analyzed - summaries.len()
        );
    }

    for summary in summaries {
        let _ = write!(
            out,
            "
## {}.{} ({})
- **Schema**: {}
- **Affected Applications**: {}
- **Impact graph size**: {} nodes
",
            summary.schema,
            summary.name,
            summary.entity_label,
            summary.schema,
            summary.applications.affected.len(),
            summary.node_count,
        );

        out.push_str("\n### Code Dependents\n");
        if summary.code_dependents.is_empty() {
            let _ = writeln!(out, "No code directly depends on this {entity_type}.");
        } else {
            for dep in &summary.code_dependents {
                render_dependent_line(&mut out, dep);
            }
        }

        if !summary.other_dependents.is_empty() {
            out.push_str("\n### Other Dependents\n");
            for dep in &summary.other_dependents {
                render_dependent_line(&mut out, dep);
            }
        }

        if summary.applications.is_cross_application() {
            let _ = writeln!(
                out,
                "\n⚠️ **Cross-Application Dependency**: changes to this {entity_type} may affect {} applications: {}",
                summary.applications.affected.len(),
                summary
                    .applications
                    .affected
                    .iter()
                    .map(|app| format!("`{app}`"))
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }
    }

    out
}

fn render_dependent_line(out: &mut String, dep: &Dependent) {
    let _ = writeln!(
        out,
        "- `{}` ({}) via `{}`",
        dep.name, dep.node_type, dep.relationship
    );
}

/// The dispatch-boundary error block: callers of a tool never see a raw
/// error, only this text.
#[must_use]
pub fn render_tool_error(tool: &str, message: &str) -> String {
    format!(
        "# Error executing tool: {tool}

An error occurred while executing this tool:
```
{message}
```
Please check the server logs for more details.
"
    )
}
