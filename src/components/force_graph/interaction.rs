use super::document::{NodeIdx, SystemLink};
use super::regions::Point;

/// Scene-to-screen mapping: `screen = scene * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
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

impl ViewTransform {
	pub fn screen_to_scene(&self, p: Point) -> Point {
		Point::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
	}

	#[cfg(test)]
	pub fn scene_to_screen(&self, p: Point) -> Point {
		Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
	}

	/// Scales about `anchor` (screen space) so the scene point under it stays put.
	pub fn zoom_at(&mut self, anchor: Point, factor: f64, (min, max): (f64, f64)) {
		let k = (self.k * factor).clamp(min, max);
		let ratio = k / self.k;
		self.x = anchor.x - (anchor.x - self.x) * ratio;
		self.y = anchor.y - (anchor.y - self.y) * ratio;
		self.k = k;
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.x += dx;
		self.y += dy;
	}
}

/// At most one highlighted node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Highlight {
	node: Option<NodeIdx>,
}

impl Highlight {
	/// Selects `node`, or clears the selection if it was already selected.
	pub fn toggle(&mut self, node: NodeIdx) -> bool {
		self.node = if self.node == Some(node) {
			None
		} else {
			Some(node)
		};
		self.node.is_some()
	}

	#[cfg(test)]
	pub fn node(&self) -> Option<NodeIdx> {
		self.node
	}

	pub fn is_node(&self, idx: NodeIdx) -> bool {
		self.node == Some(idx)
	}

	pub fn touches(&self, link: &SystemLink) -> bool {
		self.is_node(link.source) || self.is_node(link.target)
	}

	pub fn clear(&mut self) {
		self.node = None;
	}
}

/// Pointer gesture in progress. Positions are in screen space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
	#[default]
	Idle,
	/// Pressed on a node; becomes a drag once the pointer travels past the click tolerance.
	Node {
		node: NodeIdx,
		press: Point,
		moved: bool,
	},
	Pan {
		last: Point,
	},
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::LinkKind;

	#[test]
	fn zoom_keeps_anchor_fixed_and_respects_extent() {
		let mut t = ViewTransform::default();
		let anchor = Point::new(200.0, 100.0);
		let under = t.screen_to_scene(anchor);

		t.zoom_at(anchor, 1.5, (0.5, 2.0));
		assert_eq!(t.k, 1.5);
		let after = t.screen_to_scene(anchor);
		assert!((after.x - under.x).abs() < 1e-9 && (after.y - under.y).abs() < 1e-9);

		for _ in 0..10 {
			t.zoom_at(anchor, 1.1, (0.5, 2.0));
		}
		assert_eq!(t.k, 2.0);
		for _ in 0..30 {
			t.zoom_at(anchor, 0.9, (0.5, 2.0));
		}
		assert_eq!(t.k, 0.5);
	}

	#[test]
	fn screen_and_scene_round_trip_after_pan() {
		let mut t = ViewTransform::default();
		t.pan_by(30.0, -10.0);
		t.zoom_at(Point::new(0.0, 0.0), 2.0, (0.5, 2.0));
		let p = Point::new(12.0, 34.0);
		assert_eq!(t.screen_to_scene(t.scene_to_screen(p)), p);
	}

	#[test]
	fn highlight_toggles_and_moves() {
		let (a, b) = (NodeIdx(0), NodeIdx(1));
		let mut h = Highlight::default();
		assert!(h.toggle(a));
		assert!(h.is_node(a));
		assert!(h.toggle(b));
		assert!(!h.is_node(a) && h.is_node(b));
		assert!(!h.toggle(b));
		assert_eq!(h.node(), None);

		let link = SystemLink {
			source: a,
			target: NodeIdx(2),
			kind: LinkKind::Upstream,
		};
		h.toggle(a);
		assert!(h.touches(&link));
		h.clear();
		assert!(!h.touches(&link));
	}
}
