//! Pure classification over one impact graph.
//!
//! Everything here is a stateless transformation: given the same
//! [`ImpactGraph`], every function returns identical derived facts, so a
//! report rendered from them is byte-identical across calls.

use crate::error::{Error, Result};
use crate::graph::{GraphNode, ImpactGraph};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Cyclomatic complexity above this value is flagged in reports.
///
/// Part of the report contract, not configurable.
pub const COMPLEXITY_THRESHOLD: f64 = 10.0;

/// Annotation substrings that mark a method as a REST handler.
pub const REST_ANNOTATION_MARKERS: &[&str] = &[
    "getmapping",
    "postmapping",
    "putmapping",
    "deletemapping",
    "requestmapping",
    "httpget",
    "httppost",
    "httpput",
    "httpdelete",
];

/// Type-tag substrings that mark a node as an API controller.
const CONTROLLER_MARKERS: &[&str] = &["controller", "restendpoint", "apiendpoint", "webservice"];

/// Relationship types that chain one endpoint to another.
const ENDPOINT_CHAIN_TYPES: &[&str] = &["INVOKES_ENDPOINT", "REFERENCES_ENDPOINT"];

/// Pick the search-result node whose identity contains the class
/// (case-insensitive). Callers with no class filter take the first result
/// directly.
///
/// # Errors
///
/// Returns [`Error::ClassNotFound`] when no result's identity contains the
/// class — the method exists, the disambiguating class does not.
pub fn select_search_node<'a>(nodes: &'a [GraphNode], class: &str) -> Result<&'a GraphNode> {
    let needle = class.to_lowercase();
    nodes
        .iter()
        .find(|node| node.identity.to_lowercase().contains(&needle))
        .ok_or_else(|| Error::ClassNotFound(class.to_string()))
}

/// Locate the best-matching method node inside an impact graph.
///
/// Precedence: method-labeled nodes whose name contains the search term
/// (case-insensitive); narrowed to identities containing the class when
/// that narrowing is non-empty; then the first candidate carrying a
/// complexity statistic; then the first candidate. Returns `None` when no
/// method node matches at all — callers fall back to the originally
/// located search node.
///
/// Known limitation: overloads are not disambiguated by signature, only by
/// name and class substring, so the selected node can be the wrong
/// overload when several share a name within one class.
#[must_use]
pub fn resolve_target<'a>(
    graph: &'a ImpactGraph,
    method: &str,
    class: Option<&str>,
) -> Option<&'a GraphNode> {
    let term = method.to_lowercase();
    let mut candidates: Vec<&GraphNode> = graph
        .nodes
        .iter()
        .filter(|node| node.is_method() && node.name.to_lowercase().contains(&term))
        .collect();

    if let Some(class) = class {
        let needle = class.to_lowercase();
        let narrowed: Vec<&GraphNode> = candidates
            .iter()
            .copied()
            .filter(|node| node.identity.to_lowercase().contains(&needle))
            .collect();
        if !narrowed.is_empty() {
            candidates = narrowed;
        }
    }

    candidates
        .iter()
        .copied()
        .find(|node| node.complexity().is_some())
        .or_else(|| candidates.first().copied())
}

/// Something that depends on the target node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependent {
    /// Display name of the depending node.
    pub name: String,
    /// Type tag of the depending node.
    pub node_type: String,
    /// Relationship type connecting it to the target.
    pub relationship: String,
}

/// Collect every node with an incoming relationship to the target.
#[must_use]
pub fn dependents(graph: &ImpactGraph, target_id: &str) -> Vec<Dependent> {
    graph
        .relationships
        .iter()
        .filter_map(|rel| {
            let start = graph.find_node(&rel.start_id)?;
            let end = graph.find_node(&rel.end_id)?;
            (end.id == target_id).then(|| Dependent {
                name: start.name.clone(),
                node_type: start.primary_label.clone(),
                relationship: rel.rel_type.clone(),
            })
        })
        .collect()
}

/// Applications touched by the impact graph and how they depend on each
/// other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationAnalysis {
    /// Every application that appears in the graph, sorted by name.
    pub affected: BTreeSet<String>,

    /// `REFERENCES_GROUP` adjacency: application → applications it depends
    /// on. An affected application may carry no entry here.
    pub dependencies: BTreeMap<String, Vec<String>>,
}

impl ApplicationAnalysis {
    /// Whether more than one application is affected.
    #[must_use]
    pub fn is_cross_application(&self) -> bool {
        self.affected.len() > 1
    }
}

/// Classify cross-application exposure.
///
/// The affected set unions three signals: `Application`-labeled nodes,
/// applications reachable through `groupIds` membership on any node, and
/// applications that `GROUPS` a component. `REFERENCES_GROUP` edges between
/// two applications feed the dependency adjacency.
#[must_use]
pub fn application_analysis(graph: &ImpactGraph) -> ApplicationAnalysis {
    let mut analysis = ApplicationAnalysis::default();

    let app_names_by_id: HashMap<&str, &str> = graph
        .nodes
        .iter()
        .filter(|node| node.is_application())
        .map(|node| (node.id.as_str(), node.name.as_str()))
        .collect();

    for name in app_names_by_id.values() {
        analysis.affected.insert((*name).to_string());
    }

    // Group membership: a node inside an application group implicates it.
    for node in &graph.nodes {
        for group_id in node.group_ids() {
            if let Some(name) = app_names_by_id.get(group_id.as_str()) {
                analysis.affected.insert((*name).to_string());
            }
        }
    }

    for rel in &graph.relationships {
        let (Some(start), Some(end)) = (graph.find_node(&rel.start_id), graph.find_node(&rel.end_id))
        else {
            continue;
        };

        match rel.rel_type.as_str() {
            "GROUPS" if start.is_application() => {
                analysis.affected.insert(start.name.clone());
            }
            "REFERENCES_GROUP" if start.is_application() && end.is_application() => {
                analysis.affected.insert(start.name.clone());
                analysis
                    .dependencies
                    .entry(start.name.clone())
                    .or_default()
                    .push(end.name.clone());
            }
            _ => {}
        }
    }

    analysis
}

/// An explicit `Endpoint` node with its HTTP coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestEndpoint {
    /// Endpoint display name.
    pub name: String,
    /// HTTP verb.
    pub http_verb: String,
    /// URL path.
    pub path: String,
}

/// A controller-typed node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiController {
    /// Controller display name.
    pub name: String,
    /// Type tag that marked it as a controller.
    pub node_type: String,
}

/// A method carrying REST-framework annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedMethod {
    /// Method display name.
    pub name: String,
    /// The mapping/http annotations that matched.
    pub annotations: Vec<String>,
}

/// One endpoint invoking or referencing another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDependency {
    /// Calling endpoint name.
    pub source: String,
    /// Called endpoint name.
    pub target: String,
}

/// REST exposure signals found in the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointAnalysis {
    /// Explicit `Endpoint` nodes.
    pub endpoints: Vec<RestEndpoint>,

    /// Controller-typed nodes.
    pub controllers: Vec<ApiController>,

    /// Methods with REST-framework annotations.
    pub annotated_methods: Vec<AnnotatedMethod>,

    /// Endpoint-to-endpoint chains (chained-API risk).
    pub chains: Vec<EndpointDependency>,
}

impl EndpointAnalysis {
    /// Whether any REST signal is present.
    #[must_use]
    pub fn has_rest_signal(&self) -> bool {
        !self.endpoints.is_empty()
            || !self.controllers.is_empty()
            || !self.annotated_methods.is_empty()
    }
}

/// Classify REST endpoint exposure from node labels, annotations, and
/// endpoint-chaining relationships.
#[must_use]
pub fn endpoint_analysis(graph: &ImpactGraph) -> EndpointAnalysis {
    let mut analysis = EndpointAnalysis::default();

    for node in &graph.nodes {
        if node.primary_label == "Endpoint" {
            analysis.endpoints.push(RestEndpoint {
                name: node.name.clone(),
                http_verb: node.http_verb().to_string(),
                path: node.endpoint_path().to_string(),
            });
        }

        let label = node.primary_label.to_lowercase();
        if CONTROLLER_MARKERS.iter().any(|marker| label.contains(marker)) {
            analysis.controllers.push(ApiController {
                name: node.name.clone(),
                node_type: node.primary_label.clone(),
            });
        }

        if node.is_method() {
            let matched: Vec<String> = node
                .annotations()
                .iter()
                .filter(|annotation| {
                    let lowered = annotation.to_lowercase();
                    lowered.contains("mapping") || lowered.contains("http")
                })
                .cloned()
                .collect();

            let is_rest = node.annotations().iter().any(|annotation| {
                let lowered = annotation.to_lowercase();
                REST_ANNOTATION_MARKERS
                    .iter()
                    .any(|marker| lowered.contains(marker))
            });

            if is_rest {
                analysis.annotated_methods.push(AnnotatedMethod {
                    name: node.name.clone(),
                    annotations: matched,
                });
            }
        }
    }

    for rel in &graph.relationships {
        if !ENDPOINT_CHAIN_TYPES.contains(&rel.rel_type.as_str()) {
            continue;
        }
        let (Some(start), Some(end)) = (graph.find_node(&rel.start_id), graph.find_node(&rel.end_id))
        else {
            continue;
        };
        analysis.chains.push(EndpointDependency {
            source: start.name.clone(),
            target: end.name.clone(),
        });
    }

    analysis
}

/// Per-entity findings for a database impact report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseImpactSummary {
    /// Entity display name.
    pub name: String,
    /// Owning schema.
    pub schema: String,
    /// Entity type tag from the graph.
    pub entity_label: String,
    /// Methods and functions that read or write this entity.
    pub code_dependents: Vec<Dependent>,
    /// Other graph nodes depending on it (SQL objects, jobs, ...).
    pub other_dependents: Vec<Dependent>,
    /// Applications implicated by the entity's impact graph.
    pub applications: ApplicationAnalysis,
    /// Size of the impact graph, as a rough blast-radius indicator.
    pub node_count: usize,
}

/// Summarize one database entity's impact graph.
#[must_use]
pub fn database_impact_summary(graph: &ImpactGraph, entity: &GraphNode) -> DatabaseImpactSummary {
    // The impact graph keys relationships by its own node ids, which need
    // not match the search result's id. Relocate the entity inside the
    // graph before walking its dependents.
    let target_id = graph
        .nodes
        .iter()
        .find(|node| node.id == entity.entity_id() || node.identity == entity.identity)
        .map_or(entity.entity_id(), |node| node.id.as_str());

    let (code_dependents, other_dependents) = dependents(graph, target_id)
        .into_iter()
        .partition(|dep| {
            let label = dep.node_type.to_lowercase();
            label.contains("method") || label.contains("function")
        });

    DatabaseImpactSummary {
        name: entity.name.clone(),
        schema: entity.schema_name().to_string(),
        entity_label: entity.primary_label.clone(),
        code_dependents,
        other_dependents,
        applications: application_analysis(graph),
        node_count: graph.nodes.len(),
    }
}
