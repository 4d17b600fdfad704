use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::severity::Severity;
use crate::wire::null_as_default;

pub type NodeId = u64;

/// Vertical bucket a node is drawn in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
	Data,
	Model,
	Framework,
	Training,
	Inference,
	Infrastructure,
	Monitoring,
}

impl Layer {
	pub const ALL: [Layer; 7] = [
		Layer::Data,
		Layer::Model,
		Layer::Framework,
		Layer::Training,
		Layer::Inference,
		Layer::Infrastructure,
		Layer::Monitoring,
	];

	pub fn parse(value: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|layer| layer.as_str() == value)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Layer::Data => "data",
			Layer::Model => "model",
			Layer::Framework => "framework",
			Layer::Training => "training",
			Layer::Inference => "inference",
			Layer::Infrastructure => "infrastructure",
			Layer::Monitoring => "monitoring",
		}
	}

	pub fn title(self) -> &'static str {
		match self {
			Layer::Data => "Data",
			Layer::Model => "Models",
			Layer::Framework => "Frameworks",
			Layer::Training => "Training",
			Layer::Inference => "Inference",
			Layer::Infrastructure => "Infrastructure",
			Layer::Monitoring => "Monitoring",
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct NodeMetadata {
	#[serde(default, alias = "file_path")]
	pub path: Option<String>,
	#[serde(default)]
	pub version: Option<String>,
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
	#[serde(default)]
	pub purpose: Option<String>,
	#[serde(flatten)]
	pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Vulnerability {
	#[serde(default)]
	pub severity: Severity,
	#[serde(default, deserialize_with = "null_as_default")]
	pub title: String,
	#[serde(default, alias = "cve")]
	pub cve_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
	pub id: NodeId,
	#[serde(default, deserialize_with = "null_as_default")]
	pub label: String,
	/// Raw wire value; see [`GraphNode::layer`].
	#[serde(default)]
	pub layer: Option<String>,
	#[serde(default)]
	pub color: Option<String>,
	#[serde(default)]
	pub border_color: Option<String>,
	#[serde(default = "default_size", deserialize_with = "size_or_default")]
	pub size: f64,
	#[serde(default, deserialize_with = "null_as_default")]
	pub metadata: NodeMetadata,
	#[serde(default, alias = "vulnerability_count")]
	pub vulnerability_count: Option<u32>,
	#[serde(default, alias = "risk_level")]
	pub risk_level: Option<Severity>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub vulnerabilities: Vec<Vulnerability>,
}

fn default_size() -> f64 {
	25.0
}

fn size_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
	Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_else(default_size))
}

impl GraphNode {
	/// Known layer of this node, `None` when absent or unrecognized.
	pub fn layer(&self) -> Option<Layer> {
		self.layer.as_deref().and_then(Layer::parse)
	}

	/// Highest of the risk level and the vulnerability severities.
	pub fn highest_severity(&self) -> Option<Severity> {
		self.vulnerabilities
			.iter()
			.map(|v| v.severity)
			.chain(self.risk_level)
			.max()
	}

	pub fn vulnerability_total(&self) -> u32 {
		self.vulnerability_count
			.unwrap_or(self.vulnerabilities.len() as u32)
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphEdge {
	pub from: NodeId,
	pub to: NodeId,
	#[serde(default)]
	pub label: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct VulnerabilitySummary {
	#[serde(default, deserialize_with = "null_as_default")]
	pub total: u32,
	#[serde(default, deserialize_with = "null_as_default")]
	pub critical: u32,
	#[serde(default, deserialize_with = "null_as_default")]
	pub high: u32,
	#[serde(default, deserialize_with = "null_as_default")]
	pub medium: u32,
	#[serde(default, deserialize_with = "null_as_default")]
	pub low: u32,
}

/// Payload of the dependency graph endpoints.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphResponse {
	#[serde(default, deserialize_with = "null_as_default")]
	pub nodes: Vec<GraphNode>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub edges: Vec<GraphEdge>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub layer_summary: BTreeMap<String, usize>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub layer_colors: BTreeMap<String, String>,
	#[serde(default)]
	pub vulnerability_summary: Option<VulnerabilitySummary>,
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn decodes_enhanced_payload() {
		let payload = json!({
			"nodes": [{
				"id": 7,
				"label": "torch",
				"layer": "framework",
				"color": "#ff0000",
				"borderColor": "#990000",
				"size": 30,
				"metadata": {"version": "2.1.0", "type": "package", "license": "BSD"},
				"vulnerabilityCount": 2,
				"riskLevel": "high",
				"vulnerabilities": [
					{"severity": "critical", "title": "RCE", "cve_id": "CVE-2024-0001"},
					{"severity": "low", "title": "Info leak"}
				]
			}],
			"edges": [{"from": 7, "to": 8, "label": "imports"}],
			"layer_summary": {"framework": 1},
			"layer_colors": {"framework": "#ff0000"},
			"vulnerability_summary": {"total": 2, "critical": 1, "low": 1}
		});
		let graph: GraphResponse = serde_json::from_value(payload).unwrap();
		let node = &graph.nodes[0];
		assert_eq!(node.layer(), Some(Layer::Framework));
		assert_eq!(node.border_color.as_deref(), Some("#990000"));
		assert_eq!(node.metadata.version.as_deref(), Some("2.1.0"));
		assert_eq!(node.metadata.kind.as_deref(), Some("package"));
		assert_eq!(node.metadata.extra.get("license"), Some(&json!("BSD")));
		assert_eq!(node.highest_severity(), Some(Severity::Critical));
		assert_eq!(node.vulnerability_total(), 2);
		assert_eq!(graph.edges[0].label.as_deref(), Some("imports"));
		assert_eq!(graph.vulnerability_summary.unwrap().high, 0);
	}

	#[test]
	fn minimal_node_uses_defaults() {
		let node: GraphNode = serde_json::from_value(json!({"id": 1, "layer": "quantum"})).unwrap();
		assert_eq!(node.layer(), None);
		assert_eq!(node.size, 25.0);
		assert_eq!(node.highest_severity(), None);
		assert_eq!(node.vulnerability_total(), 0);
	}

	#[test]
	fn null_fields_do_not_fail_the_payload() {
		let payload = json!({
			"nodes": [{
				"id": 1,
				"label": null,
				"size": null,
				"metadata": null,
				"vulnerabilities": [{"severity": null, "title": null, "cve_id": null}]
			}, {
				"id": 2,
				"vulnerabilities": null
			}],
			"edges": null,
			"layer_summary": null,
			"layer_colors": null,
			"vulnerability_summary": {"total": 1, "critical": null}
		});
		let graph: GraphResponse = serde_json::from_value(payload).unwrap();
		assert_eq!(graph.nodes.len(), 2);
		let node = &graph.nodes[0];
		assert_eq!(node.label, "");
		assert_eq!(node.size, 25.0);
		assert_eq!(node.metadata, NodeMetadata::default());
		assert_eq!(node.vulnerabilities[0].severity, Severity::Unknown);
		assert_eq!(node.vulnerability_total(), 1);
		assert!(graph.nodes[1].vulnerabilities.is_empty());
		assert!(graph.edges.is_empty());
		assert!(graph.layer_summary.is_empty());
		assert!(graph.layer_colors.is_empty());
		assert_eq!(graph.vulnerability_summary.unwrap().critical, 0);
	}

	#[test]
	fn layer_names_round_trip() {
		for layer in Layer::ALL {
			assert_eq!(Layer::parse(layer.as_str()), Some(layer));
		}
		assert_eq!(Layer::parse("Data"), None);
	}
}
