use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::regions::RegionLevel;
use super::scene::Scene;

const BACKGROUND: &str = "#f7f7f7";
const FRAME_FILL: &str = "#fff";
const FRAME_STROKE: &str = "#ccc";
const LAB_STROKE: &str = "black";
const FEATURE_STROKE: &str = "#888";
const LABEL_FILL: &str = "#222";

/// Paints one captured frame. Everything but the cursor is drawn under the view transform.
pub fn render(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, scene.width, scene.height);
	ctx.save();
	let _ = ctx.translate(scene.transform.x, scene.transform.y);
	let _ = ctx.scale(scene.transform.k, scene.transform.k);
	draw_frame(scene, ctx);
	draw_regions(scene, ctx);
	draw_links(scene, ctx);
	draw_nodes(scene, ctx);
	ctx.restore();
	draw_cursor(scene, ctx);
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: Option<f64>) {
	let pattern = match dash {
		Some(d) => js_sys::Array::of2(&JsValue::from_f64(d), &JsValue::from_f64(d)),
		None => js_sys::Array::new(),
	};
	let _ = ctx.set_line_dash(&pattern);
}

fn draw_frame(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	let f = scene.frame;
	ctx.set_fill_style_str(FRAME_FILL);
	ctx.fill_rect(f.x, f.y, f.width, f.height);
	ctx.set_stroke_style_str(FRAME_STROKE);
	ctx.set_line_width(1.0);
	ctx.stroke_rect(f.x, f.y, f.width, f.height);
}

fn draw_regions(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	for region in &scene.regions {
		let r = region.rect;
		if let Some(fill) = region.fill {
			ctx.set_global_alpha(0.35);
			ctx.set_fill_style_str(fill);
			ctx.fill_rect(r.x, r.y, r.width, r.height);
			ctx.set_global_alpha(1.0);
		}

		let (stroke, font) = match region.level {
			RegionLevel::Lab => (LAB_STROKE, "bold 14px sans-serif"),
			RegionLevel::Feature => (FEATURE_STROKE, "italic 11px sans-serif"),
		};
		set_dash(ctx, Some(4.0));
		ctx.set_stroke_style_str(stroke);
		ctx.set_line_width(1.0);
		ctx.stroke_rect(r.x, r.y, r.width, r.height);
		set_dash(ctx, None);

		ctx.set_fill_style_str(stroke);
		ctx.set_font(font);
		ctx.set_text_baseline("alphabetic");
		let _ = ctx.fill_text(&region.title, r.x, r.y - 5.0);
	}
}

fn draw_links(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	// highlighted links last so they sit on top
	let ordered = scene
		.links
		.iter()
		.filter(|l| !l.highlighted)
		.chain(scene.links.iter().filter(|l| l.highlighted));
	for link in ordered {
		ctx.set_stroke_style_str(link.stroke);
		ctx.set_line_width(link.width);
		ctx.begin_path();
		ctx.move_to(link.from.x, link.from.y);
		ctx.line_to(link.to.x, link.to.y);
		ctx.stroke();
	}
}

fn draw_nodes(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	for node in &scene.nodes {
		ctx.begin_path();
		let _ = ctx.arc(node.center.x, node.center.y, node.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node.fill);
		ctx.fill();
	}

	ctx.set_fill_style_str(LABEL_FILL);
	ctx.set_font("12px sans-serif");
	ctx.set_text_baseline("middle");
	for node in &scene.nodes {
		let _ = ctx.fill_text(&node.label, node.label_at.x, node.label_at.y);
	}
}

fn draw_cursor(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	let Some((at, radius)) = scene.cursor else {
		return;
	};
	ctx.set_global_alpha(0.5);
	ctx.begin_path();
	let _ = ctx.arc(at.x, at.y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str("black");
	ctx.fill();
	ctx.set_global_alpha(1.0);
}
