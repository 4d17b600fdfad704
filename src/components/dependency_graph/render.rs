use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::layout::LayoutMode;
use super::state::GraphViewState;

const BACKGROUND: &str = "#0f172a";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	if state.layout.mode == LayoutMode::Layered {
		draw_bands(state, ctx);
	}
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_bands(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	let Some(bounds) = state.layout.bounds() else {
		return;
	};
	let k = state.transform.k;
	let (left, right) = (bounds.min_x - 120.0, bounds.max_x + 40.0);
	for band in &state.layout.bands {
		ctx.set_fill_style_str("rgba(148, 163, 184, 0.06)");
		ctx.fill_rect(left, band.y - 60.0, right - left, 120.0);
		ctx.set_fill_style_str("rgba(148, 163, 184, 0.7)");
		ctx.set_font(&format!("bold {}px sans-serif", 12.0 / k.max(0.5)));
		let _ = ctx.fill_text(band.layer.title(), left + 8.0, band.y - 44.0);
	}
}

fn draw_edges(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (line_width, arrow_size) = (1.5 / k.max(0.5), 10.0);
	let t = ease_out_cubic(state.hover.highlight_t);

	for edge in &state.layout.edges {
		let (n1, n2) = (&state.layout.nodes[edge.source], &state.layout.nodes[edge.target]);
		let (dx, dy) = (n2.x - n1.x, n2.y - n1.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < n1.style.radius + n2.style.radius {
			continue;
		}

		let is_highlighted =
			state.is_highlighted(edge.source) && state.is_highlighted(edge.target);

		// t=0: every edge at base alpha; t=1: highlighted edges brighten, others dim
		let (edge_alpha, width) = if is_highlighted {
			(0.6 + 0.35 * t, line_width * (1.0 + 0.5 * t))
		} else {
			(0.6 - 0.45 * t, line_width)
		};
		let stroke = format!("rgba(148, 197, 255, {})", edge_alpha);

		let (ux, uy) = (dx / dist, dy / dist);
		let (start_x, start_y) = (n1.x + ux * n1.style.radius, n1.y + uy * n1.style.radius);
		let (tip_x, tip_y) = (n2.x - ux * n2.style.radius, n2.y - uy * n2.style.radius);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);

		ctx.set_stroke_style_str(&stroke);
		ctx.set_line_width(width);
		ctx.begin_path();
		ctx.move_to(start_x, start_y);
		ctx.line_to(back_x, back_y);
		ctx.stroke();

		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.set_fill_style_str(&stroke);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();

		if let Some(label) = &edge.label {
			ctx.set_fill_style_str(&format!("rgba(203, 213, 225, {})", edge_alpha));
			ctx.set_font(&format!("{}px sans-serif", 9.0 / k.max(0.5)));
			let _ = ctx.fill_text(label, (start_x + tip_x) / 2.0 + 4.0, (start_y + tip_y) / 2.0);
		}
	}
}

fn draw_nodes(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	for (idx, n) in state.layout.nodes.iter().enumerate() {
		let dimmed = has_highlight && !state.is_highlighted(idx);
		let alpha = if dimmed { 1.0 - 0.7 * t } else { 1.0 };
		let radius = if state.is_hovered(idx) {
			n.style.radius * (1.0 + 0.15 * t)
		} else {
			n.style.radius
		};

		ctx.set_global_alpha(alpha);

		if let Some(glow) = &n.style.glow {
			ctx.set_shadow_color(glow.color);
			ctx.set_shadow_blur(glow.blur);
		}
		ctx.begin_path();
		let _ = ctx.arc(n.x, n.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&n.style.fill);
		ctx.fill();
		ctx.set_shadow_blur(0.0);
		ctx.set_shadow_color("transparent");

		ctx.set_stroke_style_str(&n.style.border);
		ctx.set_line_width(n.style.border_width);
		ctx.stroke();

		if state.is_selected(idx) {
			ctx.begin_path();
			let _ = ctx.arc(n.x, n.y, radius + n.style.border_width + 3.0, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.9)");
			ctx.set_line_width(2.0 / k.max(0.5));
			ctx.stroke();
		}

		if let Some(count) = n.style.badge {
			let (bx, by) = (n.x + radius * 0.75, n.y - radius * 0.75);
			let badge_radius = 8.0;
			let color = n
				.node
				.highest_severity()
				.map_or("#dc2626", |severity| severity.color());
			ctx.begin_path();
			let _ = ctx.arc(bx, by, badge_radius, 0.0, 2.0 * PI);
			ctx.set_fill_style_str(color);
			ctx.fill();
			ctx.set_fill_style_str("white");
			ctx.set_font("bold 9px sans-serif");
			ctx.set_text_align("center");
			let _ = ctx.fill_text(&count.to_string(), bx, by + 3.0);
			ctx.set_text_align("start");
		}

		if !n.node.label.is_empty() {
			ctx.set_fill_style_str("white");
			ctx.set_font(&format!("{}px sans-serif", 11.0 / k.max(0.5)));
			ctx.set_text_align("center");
			let _ = ctx.fill_text(&n.node.label, n.x, n.y + radius + 14.0);
			ctx.set_text_align("start");
		}

		ctx.set_global_alpha(1.0);
	}
}
