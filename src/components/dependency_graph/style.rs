use crate::severity::Severity;

use super::types::{GraphNode, Layer};

pub const BASE_RADIUS: f64 = 18.0;
pub const REFERENCE_SIZE: f64 = 25.0;
const MIN_SCALE: f64 = 0.5;
const MAX_SCALE: f64 = 3.0;
const BORDER_WIDTH: f64 = 2.0;
const VULNERABLE_BORDER_WIDTH: f64 = 4.0;
const FALLBACK_COLOR: &str = "#94a3b8";

#[derive(Clone, Debug, PartialEq)]
pub struct Glow {
	pub color: &'static str,
	pub blur: f64,
}

/// Visual attributes of one node, derived from backend hints only.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
	pub radius: f64,
	pub fill: String,
	pub border: String,
	pub border_width: f64,
	pub glow: Option<Glow>,
	pub badge: Option<u32>,
}

pub fn layer_color(layer: Layer) -> &'static str {
	match layer {
		Layer::Data => "#3b82f6",
		Layer::Model => "#8b5cf6",
		Layer::Framework => "#10b981",
		Layer::Training => "#f59e0b",
		Layer::Inference => "#ec4899",
		Layer::Infrastructure => "#6366f1",
		Layer::Monitoring => "#14b8a6",
	}
}

pub fn node_style(node: &GraphNode) -> NodeStyle {
	let scale = if node.size.is_finite() && node.size > 0.0 {
		(node.size / REFERENCE_SIZE).clamp(MIN_SCALE, MAX_SCALE)
	} else {
		1.0
	};
	let fill = node
		.color
		.clone()
		.unwrap_or_else(|| node.layer().map_or(FALLBACK_COLOR, layer_color).to_string());
	let border = node.border_color.clone().unwrap_or_else(|| fill.clone());
	let vulnerabilities = node.vulnerability_total();
	let glow = match node.highest_severity() {
		Some(Severity::Critical) => Some(Glow {
			color: Severity::Critical.color(),
			blur: 24.0,
		}),
		Some(Severity::High) => Some(Glow {
			color: Severity::High.color(),
			blur: 14.0,
		}),
		_ => None,
	};

	NodeStyle {
		radius: BASE_RADIUS * scale,
		fill,
		border,
		border_width: if vulnerabilities > 0 || !node.vulnerabilities.is_empty() {
			VULNERABLE_BORDER_WIDTH
		} else {
			BORDER_WIDTH
		},
		glow,
		badge: (vulnerabilities > 0).then_some(vulnerabilities),
	}
}
