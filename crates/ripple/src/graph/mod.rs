//! Graph domain model for impact analysis.
//!
//! These types mirror the node/relationship payloads returned by the graph
//! server's full-impact endpoint:
//!
//! - **`GraphNode`**: one entity (method, class, application, endpoint,
//!   database table, ...) with an open-ended property map
//! - **`Relationship`**: a directed, typed edge between two nodes
//! - **`ImpactGraph`**: the per-request snapshot of a root node's
//!   transitive impact
//!
//! Nodes are immutable snapshots retrieved per request; the `id` field is
//! only unique within one response. Property access goes through named
//! accessors with explicit defaults so the classification logic never does
//! ad hoc map lookups.

pub mod classify;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single value in a node's open-ended property map.
///
/// The server emits a small closed set of shapes: scalars for statistics
/// and flags, string lists for annotations and group memberships. Anything
/// else is preserved opaquely in [`PropertyValue::Other`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A boolean flag.
    Bool(bool),
    /// A numeric statistic (cyclomatic complexity, instruction count, ...).
    Number(f64),
    /// A plain string (HTTP verb, endpoint path, owner, ...).
    String(String),
    /// A list of strings (annotations, group ids, reviewers, ...).
    List(Vec<String>),
    /// Any other JSON shape, kept verbatim.
    Other(serde_json::Value),
}

impl PropertyValue {
    /// The value as a number, parsing numeric strings as the server
    /// sometimes stringifies statistics.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// The value as a string slice, if it is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a string list, if it is one.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// One entity in the dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Unique id within one graph response.
    #[serde(default)]
    pub id: String,

    /// Fully qualified name/path of the entity.
    #[serde(default)]
    pub identity: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Type tag, e.g. `JavaMethodEntity`, `Application`, `Endpoint`.
    #[serde(default)]
    pub primary_label: String,

    /// Open-ended statistics and metadata.
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl GraphNode {
    /// Numeric property lookup with a parse fallback for stringified numbers.
    fn statistic(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(PropertyValue::as_f64)
    }

    /// Cyclomatic complexity, when the server computed one for this node.
    #[must_use]
    pub fn complexity(&self) -> Option<f64> {
        self.statistic("statistics.cyclomaticComplexity")
    }

    /// Instruction count statistic.
    #[must_use]
    pub fn instruction_count(&self) -> Option<f64> {
        self.statistic("statistics.instructionCount")
    }

    /// Method count statistic (class-level nodes).
    #[must_use]
    pub fn method_count(&self) -> Option<f64> {
        self.statistic("statistics.methodCount")
    }

    /// Total outgoing external references.
    #[must_use]
    pub fn outgoing_reference_total(&self) -> Option<f64> {
        self.statistic("statistics.outgoingExternalReferenceTotal")
    }

    /// Total incoming external references.
    #[must_use]
    pub fn incoming_reference_total(&self) -> Option<f64> {
        self.statistic("statistics.incomingExternalReferenceTotal")
    }

    /// Ids of the groups (typically applications) this node belongs to.
    #[must_use]
    pub fn group_ids(&self) -> &[String] {
        self.properties
            .get("groupIds")
            .and_then(PropertyValue::as_list)
            .unwrap_or(&[])
    }

    /// Source annotations attached to this node, if any.
    #[must_use]
    pub fn annotations(&self) -> &[String] {
        self.properties
            .get("annotations")
            .and_then(PropertyValue::as_list)
            .unwrap_or(&[])
    }

    /// HTTP verb, for `Endpoint` nodes.
    #[must_use]
    pub fn http_verb(&self) -> &str {
        self.properties
            .get("httpVerb")
            .and_then(PropertyValue::as_str)
            .unwrap_or("")
    }

    /// Endpoint path, for `Endpoint` nodes.
    #[must_use]
    pub fn endpoint_path(&self) -> &str {
        self.properties
            .get("path")
            .and_then(PropertyValue::as_str)
            .unwrap_or("")
    }

    /// Owning schema, for database entity nodes.
    #[must_use]
    pub fn schema_name(&self) -> &str {
        self.properties
            .get("schema")
            .and_then(PropertyValue::as_str)
            .unwrap_or("Unknown")
    }

    /// The id used when requesting this node's impact graph.
    ///
    /// Shortname search results carry the queryable id in their property
    /// map; impact-graph nodes carry it top-level (the property copy is
    /// stripped). Prefer the property, fall back to the node id.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        self.properties
            .get("id")
            .and_then(PropertyValue::as_str)
            .unwrap_or(&self.id)
    }

    /// Whether this node's type tag marks a method entity in any language.
    #[must_use]
    pub fn is_method(&self) -> bool {
        self.primary_label.ends_with("MethodEntity")
    }

    /// Whether this node is an application grouping node.
    #[must_use]
    pub fn is_application(&self) -> bool {
        self.primary_label == "Application"
    }
}

/// A directed, typed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Id of the source node.
    #[serde(default)]
    pub start_id: String,

    /// Id of the target node.
    #[serde(default)]
    pub end_id: String,

    /// Semantic tag: structural call/reference, `GROUPS`,
    /// `REFERENCES_GROUP`, `INVOKES_ENDPOINT`, `REFERENCES_ENDPOINT`, ...
    #[serde(rename = "type", default)]
    pub rel_type: String,
}

/// The transitive impact of one root node: ordered nodes plus ordered
/// relationships, scoped to a single request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactGraph {
    /// All nodes reachable from the root.
    #[serde(default)]
    pub nodes: Vec<GraphNode>,

    /// All relationships between those nodes.
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

/// Property keys removed from every node before an impact graph is cached:
/// internal ids, scan-context ids, and duplicates of top-level fields.
/// Stripping bounds cache memory and keeps internal fields out of reports.
pub const STRIPPED_PROPERTIES: &[&str] = &[
    "agentIds",
    "sourceScanContextIds",
    "isScanRoot",
    "transitiveSourceNodeId",
    "dataSourceId",
    "scanContextId",
    "id",
    "shortName",
    "materializedViewId",
    "statistics.impactScore",
    "quality.impactScore",
    "identity",
    "name",
];

impl ImpactGraph {
    /// Find a node by its response-local id.
    #[must_use]
    pub fn find_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Remove volatile and duplicated properties from every node.
    pub fn strip_internal_properties(&mut self) {
        for node in &mut self.nodes {
            for key in STRIPPED_PROPERTIES {
                node.properties.remove(*key);
            }
        }
    }
}
