use std::collections::HashSet;

use super::layout::GraphLayout;
use super::types::NodeId;

const FIT_PADDING: f64 = 60.0;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 4.0;
/// Extra hit area around a node, in world units.
pub const HIT_SLOP: f64 = 4.0;

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<usize>,
	pub neighbors: HashSet<usize>,
	pub highlight_t: f64,
	pub prev_node: Option<usize>,
	pub prev_neighbors: HashSet<usize>,
	delay_t: f64,
}

/// Everything the canvas needs between frames.
pub struct GraphViewState {
	pub layout: GraphLayout,
	pub transform: ViewTransform,
	pub pan: PanState,
	pub hover: HoverState,
	pub selected: Option<NodeId>,
	pub width: f64,
	pub height: f64,
}

impl GraphViewState {
	pub fn new(layout: GraphLayout, width: f64, height: f64) -> Self {
		let mut state = Self {
			layout,
			transform: ViewTransform::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			selected: None,
			width,
			height,
		};
		state.fit_to_view();
		state
	}

	/// Swap in a freshly derived layout. Hover is reset since indices change;
	/// the selection survives if the node is still shown.
	pub fn set_layout(&mut self, layout: GraphLayout) {
		self.layout = layout;
		self.hover = HoverState::default();
		if let Some(id) = self.selected {
			if self.layout.position_of(id).is_none() {
				self.selected = None;
			}
		}
		self.fit_to_view();
	}

	/// Scale and center so the whole layout is visible.
	pub fn fit_to_view(&mut self) {
		let Some(b) = self.layout.bounds() else {
			self.transform = ViewTransform {
				x: self.width / 2.0,
				y: self.height / 2.0,
				k: 1.0,
			};
			return;
		};
		let (w, h) = (
			(b.max_x - b.min_x).max(1.0),
			(b.max_y - b.min_y).max(1.0),
		);
		let avail_w = (self.width - 2.0 * FIT_PADDING).max(1.0);
		let avail_h = (self.height - 2.0 * FIT_PADDING).max(1.0);
		let k = (avail_w / w).min(avail_h / h).clamp(MIN_ZOOM, 1.0);
		let (cx, cy) = ((b.min_x + b.max_x) / 2.0, (b.min_y + b.max_y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under a screen position.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.layout.nodes.iter().enumerate().rev().find_map(|(i, n)| {
			let (dx, dy) = (n.x - gx, n.y - gy);
			((dx * dx + dy * dy).sqrt() < n.style.radius + HIT_SLOP).then_some(i)
		})
	}

	/// Select the node under the cursor, or clear the selection.
	pub fn select_at(&mut self, sx: f64, sy: f64) -> Option<NodeId> {
		self.selected = self
			.node_at_position(sx, sy)
			.map(|i| self.layout.nodes[i].node.id);
		self.selected
	}

	pub fn is_selected(&self, idx: usize) -> bool {
		self.selected.is_some() && self.layout.nodes.get(idx).map(|n| n.node.id) == self.selected
	}

	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Keep the previous highlight around while it fades out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for edge in &self.layout.edges {
				if edge.source == idx {
					self.hover.neighbors.insert(edge.target);
				} else if edge.target == idx {
					self.hover.neighbors.insert(edge.source);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: usize) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: usize) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	/// Advance the hover highlight easing.
	pub fn tick(&mut self, dt: f64) {
		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 6.0)
		} else {
			(0.0, 0.0, 5.0)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * (speed * dt).min(1.0);
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * (speed * dt).min(1.0);
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.fit_to_view();
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::super::layout::{build_layout, layer_y};
	use super::super::types::{GraphEdge, GraphNode, Layer};
	use super::*;

	fn state() -> GraphViewState {
		let nodes: Vec<GraphNode> = serde_json::from_value(json!([
			{"id": 1, "layer": "data"},
			{"id": 2, "layer": "data"},
			{"id": 3, "layer": "model"}
		]))
		.unwrap();
		let edges: Vec<GraphEdge> = serde_json::from_value(json!([{"from": 1, "to": 3}])).unwrap();
		GraphViewState::new(build_layout(&nodes, &edges), 800.0, 600.0)
	}

	fn screen_pos(s: &GraphViewState, id: NodeId) -> (f64, f64) {
		let (x, y) = s.layout.position_of(id).unwrap();
		(x * s.transform.k + s.transform.x, y * s.transform.k + s.transform.y)
	}

	#[test]
	fn fit_centers_layout() {
		let s = state();
		let b = s.layout.bounds().unwrap();
		let (cx, cy) = ((b.min_x + b.max_x) / 2.0, (b.min_y + b.max_y) / 2.0);
		let sx = cx * s.transform.k + s.transform.x;
		let sy = cy * s.transform.k + s.transform.y;
		assert!((sx - 400.0).abs() < 1e-9);
		assert!((sy - 300.0).abs() < 1e-9);
		assert!(s.transform.k <= 1.0);
	}

	#[test]
	fn hit_test_finds_node() {
		let s = state();
		let (sx, sy) = screen_pos(&s, 3);
		let idx = s.node_at_position(sx, sy).unwrap();
		assert_eq!(s.layout.nodes[idx].node.id, 3);
		assert_eq!(s.node_at_position(-500.0, -500.0), None);
	}

	#[test]
	fn hover_collects_neighbors() {
		let mut s = state();
		s.set_hover(Some(0));
		assert!(s.is_highlighted(0));
		assert!(s.is_highlighted(2));
		assert!(!s.is_highlighted(1));
		s.set_hover(None);
		assert!(s.is_hovered(0));
		for _ in 0..200 {
			s.tick(0.016);
		}
		assert!(!s.has_active_highlight());
	}

	#[test]
	fn selection_survives_only_if_node_remains() {
		let mut s = state();
		let (sx, sy) = screen_pos(&s, 3);
		assert_eq!(s.select_at(sx, sy), Some(3));
		assert!(s.is_selected(2));

		let kept: Vec<GraphNode> = serde_json::from_value(json!([{"id": 3, "layer": "model"}])).unwrap();
		s.set_layout(build_layout(&kept, &[]));
		assert_eq!(s.selected, Some(3));
		assert_eq!(s.layout.position_of(3), Some((0.0, layer_y(Layer::Model))));

		s.set_layout(GraphLayout::default());
		assert_eq!(s.selected, None);
	}

	#[test]
	fn zoom_keeps_cursor_anchored() {
		let mut s = state();
		let before = s.screen_to_graph(120.0, 80.0);
		s.zoom_at(120.0, 80.0, 1.5);
		let after = s.screen_to_graph(120.0, 80.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
	}
}
