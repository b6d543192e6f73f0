use std::collections::HashMap;
use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::{ForceGraphState, NODE_RADIUS, Projected};
use crate::similarity::Styling;

const BACKGROUND: &str = "#1a1a2e";
const LINK_ALPHA: f64 = 0.6;

pub fn render(state: &ForceGraphState, styling: &Styling<'_>, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	let nodes = state.projected_nodes();
	draw_links(state, styling, &nodes, ctx);
	draw_nodes(styling, &nodes, ctx);
}

fn draw_links(
	state: &ForceGraphState,
	styling: &Styling<'_>,
	nodes: &[Projected],
	ctx: &CanvasRenderingContext2d,
) {
	if !styling.link_visible() {
		return;
	}
	let screen: HashMap<_, _> = nodes.iter().map(|p| (p.idx, (p.x, p.y))).collect();

	ctx.set_stroke_style_str(styling.link_color());
	ctx.set_global_alpha(LINK_ALPHA);
	for edge in state.edges() {
		let width = styling.link_width(&edge.link);
		if width <= 0.0 {
			continue;
		}
		let (Some(&(x1, y1)), Some(&(x2, y2))) = (screen.get(&edge.source), screen.get(&edge.target))
		else {
			continue;
		};
		ctx.set_line_width(width);
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(styling: &Styling<'_>, nodes: &[Projected], ctx: &CanvasRenderingContext2d) {
	let selected = styling.selected();

	// farthest first, so nearer nodes paint over
	for node in nodes {
		let radius = NODE_RADIUS * node.scale;
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(styling.node_color(&node.id));
		ctx.fill();

		if selected == Some(&node.id) {
			ctx.begin_path();
			let _ = ctx.arc(node.x, node.y, radius + 3.0, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.7)");
			ctx.set_line_width(1.5);
			ctx.stroke();
		}
	}
}
