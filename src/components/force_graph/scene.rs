use super::document::NodeIdx;
use super::interaction::ViewTransform;
use super::regions::{Point, Rect, RegionLevel};
use super::state::LayoutSession;
use super::types::LinkKind;

pub const NODE_FILL: &str = "steelblue";
pub const NODE_ACCENT: &str = "orange";
pub const UPSTREAM_STROKE: &str = "green";
pub const DOWNSTREAM_STROKE: &str = "red";
pub const LINK_WIDTH: f64 = 2.0;
pub const HIGHLIGHT_LINK_WIDTH: f64 = 4.0;

const LAB_TINTS: &[&str] = &[
	"#FFDDC1", "#C1FFD7", "#C1D4FF", "#FFD1C1", "#D4FFC1", "#FFC1C1", "#C1FFC1", "#C1C1FF",
	"#FFD1FF", "#D1FFC1",
];

#[derive(Clone, Debug, PartialEq)]
pub struct RegionShape {
	pub rect: Rect,
	pub level: RegionLevel,
	pub title: String,
	pub fill: Option<&'static str>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkShape {
	pub from: Point,
	pub to: Point,
	pub stroke: &'static str,
	pub width: f64,
	pub highlighted: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeShape {
	pub idx: NodeIdx,
	pub center: Point,
	pub radius: f64,
	pub fill: &'static str,
	pub active: bool,
	pub label: String,
	pub label_at: Point,
}

/// A consistent snapshot of everything drawn for one frame, in scene coordinates
/// (the cursor excepted, which is in screen space).
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
	pub width: f64,
	pub height: f64,
	pub transform: ViewTransform,
	pub frame: Rect,
	pub regions: Vec<RegionShape>,
	pub links: Vec<LinkShape>,
	pub nodes: Vec<NodeShape>,
	pub cursor: Option<(Point, f64)>,
}

impl Scene {
	pub fn capture(session: &LayoutSession) -> Self {
		let (width, height) = session.size();
		let cfg = session.config();
		let graph = session.graph();
		let highlight = session.highlight();
		let sim_nodes = session.simulation().nodes();

		let regions = session
			.regions()
			.iter()
			.map(|(key, region)| {
				let (title, fill) = match &key.feature {
					Some(feature) => (feature.clone(), None),
					None => {
						let tint = graph
							.groups
							.labs
							.iter()
							.position(|l| *l == key.lab)
							.map(|i| LAB_TINTS[i % LAB_TINTS.len()]);
						(key.lab.clone(), tint)
					}
				};
				RegionShape {
					rect: region.rect,
					level: region.level,
					title,
					fill,
				}
			})
			.collect();

		let links = graph
			.links
			.iter()
			.map(|link| {
				let highlighted = highlight.touches(link);
				LinkShape {
					from: sim_nodes[link.source.0].position,
					to: sim_nodes[link.target.0].position,
					stroke: match link.kind {
						LinkKind::Upstream => UPSTREAM_STROKE,
						LinkKind::Downstream => DOWNSTREAM_STROKE,
					},
					width: if highlighted {
						HIGHLIGHT_LINK_WIDTH
					} else {
						LINK_WIDTH
					},
					highlighted,
				}
			})
			.collect();

		let nodes = graph
			.nodes
			.iter()
			.zip(sim_nodes)
			.enumerate()
			.map(|(i, (node, sim))| {
				let idx = NodeIdx(i);
				let radius = cfg.node_radius(node.footprint);
				let active = highlight.is_node(idx);
				NodeShape {
					idx,
					center: sim.position,
					radius,
					fill: if active { NODE_ACCENT } else { NODE_FILL },
					active,
					label: node.name.clone(),
					label_at: Point::new(sim.position.x + radius + cfg.label_gap, sim.position.y),
				}
			})
			.collect();

		let frame = Rect::new(0.0, 0.0, width, height).inset(cfg.frame_padding);
		Self {
			width,
			height,
			transform: *session.transform(),
			frame,
			regions,
			links,
			nodes,
			cursor: session.cursor().map(|at| (at, cfg.cursor_radius)),
		}
	}
}
