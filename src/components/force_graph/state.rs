use log::{debug, info};

use super::config::LayoutConfig;
use super::document::{NodeIdx, SystemGraph};
use super::interaction::{Gesture, Highlight, ViewTransform};
use super::regions::{PartitionScheme, Point, RegionMap, partition};
use super::simulation::{Simulation, TickReport};

/// Smallest pick radius in scene units, so tiny nodes stay clickable.
pub const MIN_HIT_RADIUS: f64 = 6.0;

/// Everything that may change a session. Pointer positions are scene coordinates except
/// for [`Command::Zoom`] and [`Command::Cursor`], which are screen coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
	DragStart { node: NodeIdx, pointer: Point },
	DragMove { pointer: Point },
	DragEnd,
	Click { node: NodeIdx },
	SetScheme(PartitionScheme),
	Resize { width: f64, height: f64 },
	Zoom { anchor: Point, factor: f64 },
	Pan { dx: f64, dy: f64 },
	Cursor(Option<Point>),
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct DragState {
	node: NodeIdx,
	/// Node position minus pointer position at drag start.
	offset: Point,
}

/// One live diagram: the validated graph, its physics, regions and UI state.
pub struct LayoutSession {
	graph: SystemGraph,
	config: LayoutConfig,
	simulation: Simulation,
	regions: RegionMap,
	scheme: PartitionScheme,
	highlight: Highlight,
	transform: ViewTransform,
	drag: Option<DragState>,
	gesture: Gesture,
	cursor: Option<Point>,
	width: f64,
	height: f64,
	torn_down: bool,
}

impl LayoutSession {
	pub fn new(
		graph: SystemGraph,
		config: LayoutConfig,
		width: f64,
		height: f64,
		scheme: PartitionScheme,
	) -> Self {
		let radii: Vec<f64> = graph
			.nodes
			.iter()
			.map(|n| config.collision_radius(n.footprint))
			.collect();
		let links: Vec<(NodeIdx, NodeIdx)> =
			graph.links.iter().map(|l| (l.source, l.target)).collect();
		let simulation =
			Simulation::new(&radii, &links, Point::new(width / 2.0, height / 2.0), &config);

		info!(
			"layout session: {} nodes, {} links, {} labs, {width}x{height}",
			graph.nodes.len(),
			graph.links.len(),
			graph.groups.labs.len()
		);
		let mut session = Self {
			graph,
			config,
			simulation,
			regions: RegionMap::default(),
			scheme,
			highlight: Highlight::default(),
			transform: ViewTransform::default(),
			drag: None,
			gesture: Gesture::Idle,
			cursor: None,
			width,
			height,
			torn_down: false,
		};
		session.rebuild_regions();
		session
	}

	pub fn graph(&self) -> &SystemGraph {
		&self.graph
	}

	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	pub fn simulation(&self) -> &Simulation {
		&self.simulation
	}

	pub fn regions(&self) -> &RegionMap {
		&self.regions
	}

	#[cfg(test)]
	pub fn scheme(&self) -> PartitionScheme {
		self.scheme
	}

	pub fn highlight(&self) -> &Highlight {
		&self.highlight
	}

	pub fn transform(&self) -> &ViewTransform {
		&self.transform
	}

	pub fn cursor(&self) -> Option<Point> {
		self.cursor
	}

	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	#[cfg(test)]
	pub fn is_torn_down(&self) -> bool {
		self.torn_down
	}

	#[cfg(test)]
	pub fn position(&self, idx: NodeIdx) -> Option<Point> {
		self.simulation.position(idx)
	}

	pub fn node_radius(&self, idx: NodeIdx) -> f64 {
		self.graph
			.nodes
			.get(idx.0)
			.map(|n| self.config.node_radius(n.footprint))
			.unwrap_or(0.0)
	}

	/// Advances the engine one tick; `None` once resting or torn down.
	pub fn step(&mut self) -> Option<TickReport> {
		if self.torn_down {
			return None;
		}
		self.simulation.tick()
	}

	pub fn dispatch(&mut self, command: Command) {
		if self.torn_down {
			return;
		}
		match command {
			Command::DragStart { node, pointer } => {
				if self.drag.is_some() {
					return;
				}
				let Some(at) = self.simulation.position(node) else {
					return;
				};
				debug!("drag start on {}", self.graph.nodes[node.0].id);
				self.simulation.pin(node, at);
				self.simulation.temperature_mut().hold();
				self.drag = Some(DragState {
					node,
					offset: Point::new(at.x - pointer.x, at.y - pointer.y),
				});
			}
			Command::DragMove { pointer } => {
				if let Some(drag) = self.drag {
					let at = Point::new(pointer.x + drag.offset.x, pointer.y + drag.offset.y);
					self.simulation.pin(drag.node, at);
				}
			}
			Command::DragEnd => {
				if let Some(drag) = self.drag.take() {
					debug!("drag end on {}", self.graph.nodes[drag.node.0].id);
					self.simulation.unpin(drag.node);
					self.simulation.temperature_mut().release();
				}
			}
			Command::Click { node } => {
				if node.0 >= self.graph.nodes.len() {
					return;
				}
				let active = self.highlight.toggle(node);
				debug!(
					"highlight {} {}",
					self.graph.nodes[node.0].id,
					if active { "on" } else { "off" }
				);
			}
			Command::SetScheme(scheme) => {
				if scheme == self.scheme {
					return;
				}
				info!("partition scheme {:?} -> {scheme:?}", self.scheme);
				self.scheme = scheme;
				self.rebuild_regions();
				self.simulation.temperature_mut().reheat();
			}
			Command::Resize { width, height } => {
				if (width, height) == (self.width, self.height) {
					return;
				}
				debug!("resize to {width}x{height}");
				self.width = width;
				self.height = height;
				self.rebuild_regions();
				self.simulation.temperature_mut().reheat();
			}
			Command::Zoom { anchor, factor } => {
				self.transform.zoom_at(anchor, factor, self.config.zoom_extent);
			}
			Command::Pan { dx, dy } => self.transform.pan_by(dx, dy),
			Command::Cursor(at) => self.cursor = at,
		}
	}

	/// Stops ticking and drops every pin, gesture and highlight. Later commands are ignored.
	pub fn teardown(&mut self) {
		if self.torn_down {
			return;
		}
		self.dispatch(Command::DragEnd);
		self.simulation.unpin_all();
		self.gesture = Gesture::Idle;
		self.highlight.clear();
		self.cursor = None;
		self.torn_down = true;
		info!("layout session torn down after {} ticks", self.simulation.ticks());
	}

	/// Recomputes regions for the current scheme and canvas, then retargets every node.
	fn rebuild_regions(&mut self) {
		self.regions = partition(
			&self.graph.groups,
			self.scheme,
			self.width,
			self.height,
			self.config.region_margin,
		);
		let center = Point::new(self.width / 2.0, self.height / 2.0);
		let mut unresolved = 0;
		let targets = self
			.graph
			.nodes
			.iter()
			.map(|node| {
				let key = self.scheme.target_key(&node.lab, node.feature.as_deref());
				if key.as_ref().is_none_or(|k| self.regions.get(k).is_none()) {
					unresolved += 1;
				}
				self.regions.resolve_region_or_default(key.as_ref(), center)
			})
			.collect();
		self.simulation.set_targets(targets);
		if self.scheme != PartitionScheme::None && unresolved > 0 {
			debug!("{unresolved} nodes have no region under {:?}; centering on canvas", self.scheme);
		}
	}

	pub fn node_at_position(&self, screen: Point) -> Option<NodeIdx> {
		let p = self.transform.screen_to_scene(screen);
		let mut found = None;
		for (i, node) in self.simulation.nodes().iter().enumerate() {
			let reach = self.node_radius(NodeIdx(i)).max(MIN_HIT_RADIUS);
			if node.position.distance(p) < reach {
				found = Some(NodeIdx(i));
			}
		}
		found
	}

	pub fn pointer_down(&mut self, screen: Point) {
		if self.torn_down {
			return;
		}
		self.dispatch(Command::Cursor(Some(screen)));
		if let Some(node) = self.node_at_position(screen) {
			self.gesture = Gesture::Node {
				node,
				press: screen,
				moved: false,
			};
			let pointer = self.transform.screen_to_scene(screen);
			self.dispatch(Command::DragStart { node, pointer });
		} else {
			self.gesture = Gesture::Pan { last: screen };
		}
	}

	pub fn pointer_move(&mut self, screen: Point) {
		if self.torn_down {
			return;
		}
		self.dispatch(Command::Cursor(Some(screen)));
		let command = match &mut self.gesture {
			Gesture::Idle => None,
			Gesture::Node { press, moved, .. } => {
				if press.distance(screen) > self.config.click_tolerance {
					*moved = true;
				}
				Some(Command::DragMove {
					pointer: self.transform.screen_to_scene(screen),
				})
			}
			Gesture::Pan { last } => {
				let (dx, dy) = (screen.x - last.x, screen.y - last.y);
				*last = screen;
				Some(Command::Pan { dx, dy })
			}
		};
		if let Some(command) = command {
			self.dispatch(command);
		}
	}

	/// Ends the gesture; a node press that never moved is a click.
	pub fn pointer_up(&mut self) {
		if let Gesture::Node { node, moved, .. } = std::mem::take(&mut self.gesture) {
			self.dispatch(Command::DragEnd);
			if !moved {
				self.dispatch(Command::Click { node });
			}
		}
	}

	pub fn pointer_leave(&mut self) {
		if let Gesture::Node { .. } = std::mem::take(&mut self.gesture) {
			self.dispatch(Command::DragEnd);
		}
		self.dispatch(Command::Cursor(None));
	}

	/// Zooms out on a positive vertical delta and in on a negative one; sideways scrolls
	/// (no vertical delta) leave the view alone.
	pub fn wheel(&mut self, screen: Point, delta_y: f64) {
		if delta_y == 0.0 || !delta_y.is_finite() {
			return;
		}
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.dispatch(Command::Zoom {
			anchor: screen,
			factor,
		});
	}
}
