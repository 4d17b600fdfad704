//! Layered and grid placement of graph nodes.
//!
//! Both layouts are pure functions of the node and edge lists: the same input
//! always yields the same coordinates. Edges whose endpoints are not in the
//! laid-out node set are dropped.

use std::collections::HashMap;

use super::style::{NodeStyle, node_style};
use super::types::{GraphEdge, GraphNode, GraphResponse, Layer, NodeId, VulnerabilitySummary};

pub const NODE_SPACING_X: f64 = 200.0;
pub const FALLBACK_Y_STEP: f64 = 100.0;
pub const GRID_COLUMNS: usize = 4;
pub const GRID_SPACING_X: f64 = 200.0;
pub const GRID_SPACING_Y: f64 = 150.0;

/// Vertical band of each known layer.
pub fn layer_y(layer: Layer) -> f64 {
	match layer {
		Layer::Data => 0.0,
		Layer::Model => 150.0,
		Layer::Framework => 300.0,
		Layer::Training => 450.0,
		Layer::Inference => 600.0,
		Layer::Infrastructure => 750.0,
		Layer::Monitoring => 900.0,
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutMode {
	Layered,
	Grid,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutNode {
	pub node: GraphNode,
	pub x: f64,
	pub y: f64,
	pub style: NodeStyle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutEdge {
	pub from: NodeId,
	pub to: NodeId,
	/// Index of the `from` node in [`GraphLayout::nodes`].
	pub source: usize,
	/// Index of the `to` node in [`GraphLayout::nodes`].
	pub target: usize,
	pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayerBand {
	pub layer: Layer,
	pub y: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bounds {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLayout {
	pub mode: LayoutMode,
	pub nodes: Vec<LayoutNode>,
	pub edges: Vec<LayoutEdge>,
	pub bands: Vec<LayerBand>,
}

impl Default for GraphLayout {
	fn default() -> Self {
		Self {
			mode: LayoutMode::Layered,
			nodes: Vec::new(),
			edges: Vec::new(),
			bands: Vec::new(),
		}
	}
}

impl GraphLayout {
	pub fn position_of(&self, id: NodeId) -> Option<(f64, f64)> {
		self.nodes
			.iter()
			.find(|n| n.node.id == id)
			.map(|n| (n.x, n.y))
	}

	/// Extent of all nodes including their radius.
	pub fn bounds(&self) -> Option<Bounds> {
		self.nodes.iter().fold(None, |acc, n| {
			let r = n.style.radius;
			let b = Bounds {
				min_x: n.x - r,
				min_y: n.y - r,
				max_x: n.x + r,
				max_y: n.y + r,
			};
			Some(match acc {
				None => b,
				Some(a) => Bounds {
					min_x: a.min_x.min(b.min_x),
					min_y: a.min_y.min(b.min_y),
					max_x: a.max_x.max(b.max_x),
					max_y: a.max_y.max(b.max_y),
				},
			})
		})
	}
}

fn positioned(node: &GraphNode, x: f64, y: f64) -> LayoutNode {
	LayoutNode {
		node: node.clone(),
		x,
		y,
		style: node_style(node),
	}
}

fn connect(nodes: &[LayoutNode], edges: &[GraphEdge]) -> Vec<LayoutEdge> {
	let mut index: HashMap<NodeId, usize> = HashMap::with_capacity(nodes.len());
	for (i, n) in nodes.iter().enumerate() {
		index.entry(n.node.id).or_insert(i);
	}
	edges
		.iter()
		.filter_map(|edge| {
			let (&source, &target) = (index.get(&edge.from)?, index.get(&edge.to)?);
			Some(LayoutEdge {
				from: edge.from,
				to: edge.to,
				source,
				target,
				label: edge.label.clone(),
			})
		})
		.collect()
}

/// Layer-banded layout: `y` from the layer table, `x` centered on 0 within
/// each group of nodes sharing a layer value. Nodes with an unrecognized or
/// missing layer get `y = index * FALLBACK_Y_STEP` by fetch order.
pub fn build_layout(nodes: &[GraphNode], edges: &[GraphEdge]) -> GraphLayout {
	let mut groups: HashMap<Option<&str>, Vec<usize>> = HashMap::new();
	for (i, node) in nodes.iter().enumerate() {
		groups.entry(node.layer.as_deref()).or_default().push(i);
	}

	let mut slots = vec![(0usize, 1usize); nodes.len()];
	for members in groups.values() {
		for (pos, &i) in members.iter().enumerate() {
			slots[i] = (pos, members.len());
		}
	}

	let placed: Vec<LayoutNode> = nodes
		.iter()
		.enumerate()
		.map(|(i, node)| {
			let (pos, len) = slots[i];
			let x = (pos as f64 - (len as f64 - 1.0) / 2.0) * NODE_SPACING_X;
			let y = node
				.layer()
				.map_or(i as f64 * FALLBACK_Y_STEP, layer_y);
			positioned(node, x, y)
		})
		.collect();

	let bands = Layer::ALL
		.into_iter()
		.filter(|layer| nodes.iter().any(|n| n.layer() == Some(*layer)))
		.map(|layer| LayerBand {
			layer,
			y: layer_y(layer),
		})
		.collect();

	GraphLayout {
		mode: LayoutMode::Layered,
		edges: connect(&placed, edges),
		nodes: placed,
		bands,
	}
}

/// Row-wrapped grid with `GRID_COLUMNS` columns, in input order.
pub fn grid_layout(nodes: &[GraphNode], edges: &[GraphEdge]) -> GraphLayout {
	let placed: Vec<LayoutNode> = nodes
		.iter()
		.enumerate()
		.map(|(i, node)| {
			let (row, col) = (i / GRID_COLUMNS, i % GRID_COLUMNS);
			positioned(node, col as f64 * GRID_SPACING_X, row as f64 * GRID_SPACING_Y)
		})
		.collect();
	GraphLayout {
		mode: LayoutMode::Grid,
		edges: connect(&placed, edges),
		nodes: placed,
		bands: Vec::new(),
	}
}

/// The graph as fetched. Never mutated; every view is derived from it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceGraph {
	nodes: Vec<GraphNode>,
	edges: Vec<GraphEdge>,
	layer_summary: Vec<(String, usize)>,
	layer_colors: HashMap<String, String>,
	vulnerability_summary: Option<VulnerabilitySummary>,
}

impl From<GraphResponse> for SourceGraph {
	fn from(response: GraphResponse) -> Self {
		Self {
			layer_summary: response.layer_summary.into_iter().collect(),
			layer_colors: response.layer_colors.into_iter().collect(),
			vulnerability_summary: response.vulnerability_summary,
			..Self::new(response.nodes, response.edges)
		}
	}
}

impl SourceGraph {
	pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
		Self {
			nodes,
			edges,
			..Self::default()
		}
	}

	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	pub fn edges(&self) -> &[GraphEdge] {
		&self.edges
	}

	pub fn vulnerability_summary(&self) -> Option<&VulnerabilitySummary> {
		self.vulnerability_summary.as_ref()
	}

	pub fn layer_color(&self, layer: Layer) -> Option<&str> {
		self.layer_colors.get(layer.as_str()).map(String::as_str)
	}

	/// Known layers present in the graph, in canonical order, with node
	/// counts. The backend summary is used for layers it reports.
	pub fn layers_present(&self) -> Vec<(Layer, usize)> {
		Layer::ALL
			.into_iter()
			.filter_map(|layer| {
				let counted = self.nodes.iter().filter(|n| n.layer() == Some(layer)).count();
				let reported = self
					.layer_summary
					.iter()
					.find(|(name, _)| name == layer.as_str())
					.map(|(_, count)| *count);
				match reported {
					Some(count) if count > 0 => Some((layer, count)),
					_ if counted > 0 => Some((layer, counted)),
					_ => None,
				}
			})
			.collect()
	}
}

/// Layout for the current filter: the layered view of everything for
/// `None`, a grid of one layer's nodes otherwise.
pub fn filter_by_layer(source: &SourceGraph, layer: Option<Layer>) -> GraphLayout {
	let Some(layer) = layer else {
		return build_layout(&source.nodes, &source.edges);
	};
	let kept: Vec<GraphNode> = source
		.nodes
		.iter()
		.filter(|n| n.layer.as_deref() == Some(layer.as_str()))
		.cloned()
		.collect();
	grid_layout(&kept, &source.edges)
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use serde_json::json;

	use super::*;

	fn nodes(value: serde_json::Value) -> Vec<GraphNode> {
		serde_json::from_value(value).unwrap()
	}

	fn edges(value: serde_json::Value) -> Vec<GraphEdge> {
		serde_json::from_value(value).unwrap()
	}

	fn sample() -> SourceGraph {
		SourceGraph::new(
			nodes(json!([
				{"id": 1, "label": "dataset", "layer": "data"},
				{"id": 2, "label": "labels", "layer": "data"},
				{"id": 3, "label": "bert", "layer": "model"},
				{"id": 4, "label": "torch", "layer": "framework"},
				{"id": 5, "label": "mystery", "layer": "quantum"},
				{"id": 6, "label": "cuda", "layer": "framework"}
			])),
			edges(json!([
				{"from": 1, "to": 3},
				{"from": 3, "to": 4},
				{"from": 4, "to": 6},
				{"from": 6, "to": 99}
			])),
		)
	}

	#[test]
	fn places_example_scenario() {
		let layout = build_layout(
			&nodes(json!([
				{"id": 1, "layer": "data"},
				{"id": 2, "layer": "data"},
				{"id": 3, "layer": "model"}
			])),
			&edges(json!([{"from": 1, "to": 3}])),
		);
		let (x1, y1) = layout.position_of(1).unwrap();
		let (x2, y2) = layout.position_of(2).unwrap();
		let (x3, y3) = layout.position_of(3).unwrap();
		assert_eq!(y1, layer_y(Layer::Data));
		assert_eq!(y2, layer_y(Layer::Data));
		assert_eq!(y3, layer_y(Layer::Model));
		assert_eq!(x1 + x2, 0.0);
		assert_eq!(x2 - x1, NODE_SPACING_X);
		assert_eq!(x3, 0.0);
		assert_eq!(layout.edges.len(), 1);
		let edge = &layout.edges[0];
		assert_eq!((edge.from, edge.to), (1, 3));
		assert_eq!(layout.nodes[edge.source].node.id, 1);
		assert_eq!(layout.nodes[edge.target].node.id, 3);
	}

	#[test]
	fn layout_is_deterministic() {
		let source = sample();
		let a = build_layout(source.nodes(), source.edges());
		let b = build_layout(source.nodes(), source.edges());
		assert_eq!(a, b);
	}

	#[test]
	fn groups_are_evenly_spaced_and_centered() {
		let source = sample();
		let layout = build_layout(source.nodes(), source.edges());
		for layer in [Layer::Data, Layer::Framework] {
			let mut xs: Vec<f64> = layout
				.nodes
				.iter()
				.filter(|n| n.node.layer() == Some(layer))
				.map(|n| n.x)
				.collect();
			assert!(xs.iter().sum::<f64>().abs() < 1e-9);
			xs.sort_by(f64::total_cmp);
			for pair in xs.windows(2) {
				assert_eq!(pair[1] - pair[0], NODE_SPACING_X);
			}
		}
	}

	#[test]
	fn unknown_layer_falls_back_to_fetch_index() {
		let source = sample();
		let layout = build_layout(source.nodes(), source.edges());
		let (x, y) = layout.position_of(5).unwrap();
		assert_eq!(y, 4.0 * FALLBACK_Y_STEP);
		assert_eq!(x, 0.0);
	}

	#[test]
	fn missing_layer_falls_back_too() {
		let layout = build_layout(&nodes(json!([{"id": 1}, {"id": 2}])), &[]);
		assert_eq!(layout.position_of(1), Some((-NODE_SPACING_X / 2.0, 0.0)));
		assert_eq!(layout.position_of(2), Some((NODE_SPACING_X / 2.0, FALLBACK_Y_STEP)));
		assert!(layout.bands.is_empty());
	}

	#[test]
	fn dangling_edges_are_dropped() {
		let source = sample();
		let layout = build_layout(source.nodes(), source.edges());
		let ids: HashSet<NodeId> = layout.nodes.iter().map(|n| n.node.id).collect();
		assert_eq!(layout.edges.len(), 3);
		for edge in &layout.edges {
			assert!(ids.contains(&edge.from) && ids.contains(&edge.to));
		}
	}

	#[test]
	fn bands_cover_present_layers_in_order() {
		let layout = build_layout(sample().nodes(), &[]);
		let layers: Vec<Layer> = layout.bands.iter().map(|b| b.layer).collect();
		assert_eq!(layers, vec![Layer::Data, Layer::Model, Layer::Framework]);
	}

	#[test]
	fn filter_keeps_one_layer_in_a_grid() {
		let source = sample();
		let layout = filter_by_layer(&source, Some(Layer::Framework));
		assert_eq!(layout.mode, LayoutMode::Grid);
		let ids: Vec<NodeId> = layout.nodes.iter().map(|n| n.node.id).collect();
		assert_eq!(ids, vec![4, 6]);
		assert_eq!(layout.position_of(4), Some((0.0, 0.0)));
		assert_eq!(layout.position_of(6), Some((GRID_SPACING_X, 0.0)));
		assert_eq!(layout.edges.len(), 1);
		assert_eq!((layout.edges[0].from, layout.edges[0].to), (4, 6));
	}

	#[test]
	fn grid_wraps_rows() {
		let many: Vec<GraphNode> = (0..6)
			.map(|i| serde_json::from_value(json!({"id": i, "layer": "data"})).unwrap())
			.collect();
		let layout = grid_layout(&many, &[]);
		assert_eq!(layout.position_of(3), Some((3.0 * GRID_SPACING_X, 0.0)));
		assert_eq!(layout.position_of(4), Some((0.0, GRID_SPACING_Y)));
		assert_eq!(layout.position_of(5), Some((GRID_SPACING_X, GRID_SPACING_Y)));
	}

	#[test]
	fn clearing_filter_restores_every_node() {
		let source = sample();
		let before = source.clone();
		let _ = filter_by_layer(&source, Some(Layer::Data));
		let restored = filter_by_layer(&source, None);
		assert_eq!(source, before);
		let ids: HashSet<NodeId> = restored.nodes.iter().map(|n| n.node.id).collect();
		let original: HashSet<NodeId> = source.nodes().iter().map(|n| n.id).collect();
		assert_eq!(ids, original);
		assert_eq!(restored, build_layout(source.nodes(), source.edges()));
	}

	#[test]
	fn layers_present_prefers_backend_counts() {
		let response: GraphResponse = serde_json::from_value(json!({
			"nodes": [{"id": 1, "layer": "data"}, {"id": 2, "layer": "model"}],
			"layer_summary": {"data": 10, "model": 0}
		}))
		.unwrap();
		let source = SourceGraph::from(response);
		assert_eq!(
			source.layers_present(),
			vec![(Layer::Data, 10), (Layer::Model, 1)]
		);
	}

	#[test]
	fn bounds_include_radius() {
		let layout = build_layout(&nodes(json!([{"id": 1, "layer": "data"}])), &[]);
		let r = layout.nodes[0].style.radius;
		let b = layout.bounds().unwrap();
		assert_eq!((b.min_x, b.max_x), (-r, r));
		assert!(GraphLayout::default().bounds().is_none());
	}
}
