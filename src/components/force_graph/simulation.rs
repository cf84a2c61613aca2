//! Force-directed layout: link springs, many-body repulsion, region centering and
//! footprint collision, cooled by a decaying alpha.

use std::f64::consts::PI;

use super::config::LayoutConfig;
use super::document::NodeIdx;
use super::regions::Point;

const SETTLE_PASSES: usize = 200;
const SETTLE_TOLERANCE: f64 = 1e-3;

/// Whether the engine is still producing ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
	Resting,
	Perturbed,
}

/// Alpha schedule. Any hold or reheat moves to [`Phase::Perturbed`]; cooling below
/// `min` with no hold active moves back to [`Phase::Resting`].
#[derive(Clone, Debug, PartialEq)]
pub struct Temperature {
	alpha: f64,
	target: f64,
	min: f64,
	decay: f64,
	floor: f64,
	holds: usize,
	phase: Phase,
}

impl Temperature {
	pub fn new(cfg: &LayoutConfig) -> Self {
		Self {
			alpha: 1.0,
			target: 0.0,
			min: cfg.alpha_min,
			decay: cfg.alpha_decay,
			floor: cfg.reheat_alpha,
			holds: 0,
			phase: Phase::Perturbed,
		}
	}

	#[cfg(test)]
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	#[cfg(test)]
	pub fn phase(&self) -> Phase {
		self.phase
	}

	#[cfg(test)]
	pub fn is_held(&self) -> bool {
		self.holds > 0
	}

	pub fn reheat(&mut self) {
		self.alpha = self.alpha.max(self.floor);
		self.phase = Phase::Perturbed;
	}

	/// Keeps alpha at the floor until the matching [`Temperature::release`].
	pub fn hold(&mut self) {
		self.holds += 1;
		self.target = self.floor;
		self.reheat();
	}

	pub fn release(&mut self) {
		self.holds = self.holds.saturating_sub(1);
		if self.holds == 0 {
			self.target = 0.0;
		}
	}

	fn advance(&mut self) -> f64 {
		self.alpha += (self.target - self.alpha) * self.decay;
		self.alpha
	}

	fn settle(&mut self) {
		if self.holds == 0 && self.alpha < self.min {
			self.phase = Phase::Resting;
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimNode {
	pub position: Point,
	pub velocity: Point,
	pub pin: Option<Point>,
	/// Collision radius, padding included.
	pub radius: f64,
}

/// Published after every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
	pub tick: u64,
	pub alpha: f64,
	pub max_displacement: f64,
}

#[derive(Clone, Debug)]
struct Forces {
	link_distance: f64,
	link_strength: f64,
	charge_strength: f64,
	center_strength: f64,
	velocity_decay: f64,
	collision_iterations: usize,
}

/// Linear congruential source for jiggling coincident points.
#[derive(Clone, Debug)]
struct Lcg(u64);

impl Lcg {
	fn next(&mut self) -> f64 {
		const M: u64 = 1 << 32;
		self.0 = (1_664_525 * self.0 + 1_013_904_223) % M;
		self.0 as f64 / M as f64
	}

	fn jiggle(&mut self) -> f64 {
		(self.next() - 0.5) * 1e-6
	}
}

#[derive(Clone, Debug)]
pub struct Simulation {
	nodes: Vec<SimNode>,
	links: Vec<(usize, usize)>,
	bias: Vec<f64>,
	targets: Vec<Point>,
	forces: Forces,
	temperature: Temperature,
	random: Lcg,
	ticks: u64,
}

impl Simulation {
	/// Places nodes on a phyllotaxis spiral around `center`, which is also every
	/// node's initial centering target.
	pub fn new(radii: &[f64], links: &[(NodeIdx, NodeIdx)], center: Point, cfg: &LayoutConfig) -> Self {
		let golden = PI * (3.0 - 5.0_f64.sqrt());
		let nodes: Vec<SimNode> = radii
			.iter()
			.enumerate()
			.map(|(i, &radius)| {
				let (r, angle) = (10.0 * (0.5 + i as f64).sqrt(), i as f64 * golden);
				SimNode {
					position: Point::new(center.x + r * angle.cos(), center.y + r * angle.sin()),
					velocity: Point::default(),
					pin: None,
					radius,
				}
			})
			.collect();

		let links: Vec<(usize, usize)> = links
			.iter()
			.map(|&(s, t)| (s.0, t.0))
			.filter(|&(s, t)| s != t && s < nodes.len() && t < nodes.len())
			.collect();
		let mut degree = vec![0usize; nodes.len()];
		for &(s, t) in &links {
			degree[s] += 1;
			degree[t] += 1;
		}
		let bias = links
			.iter()
			.map(|&(s, t)| degree[s] as f64 / (degree[s] + degree[t]) as f64)
			.collect();

		Self {
			targets: vec![center; nodes.len()],
			nodes,
			links,
			bias,
			forces: Forces {
				link_distance: cfg.link_distance,
				link_strength: cfg.link_strength,
				charge_strength: cfg.charge_strength,
				center_strength: cfg.center_strength,
				velocity_decay: cfg.velocity_decay,
				collision_iterations: cfg.collision_iterations,
			},
			temperature: Temperature::new(cfg),
			random: Lcg(1),
			ticks: 0,
		}
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn position(&self, idx: NodeIdx) -> Option<Point> {
		self.nodes.get(idx.0).map(|n| n.position)
	}

	#[cfg(test)]
	pub fn target(&self, idx: NodeIdx) -> Option<Point> {
		self.targets.get(idx.0).copied()
	}

	#[cfg(test)]
	pub fn temperature(&self) -> &Temperature {
		&self.temperature
	}

	pub fn temperature_mut(&mut self) -> &mut Temperature {
		&mut self.temperature
	}

	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	/// Replaces every centering target; the caller supplies one per node.
	pub fn set_targets(&mut self, targets: Vec<Point>) {
		debug_assert_eq!(targets.len(), self.nodes.len());
		self.targets = targets;
	}

	/// Holds the node at `at` until [`Simulation::unpin`].
	pub fn pin(&mut self, idx: NodeIdx, at: Point) {
		if let Some(node) = self.nodes.get_mut(idx.0) {
			node.pin = Some(at);
			node.position = at;
			node.velocity = Point::default();
		}
	}

	pub fn unpin(&mut self, idx: NodeIdx) {
		if let Some(node) = self.nodes.get_mut(idx.0) {
			node.pin = None;
		}
	}

	pub fn unpin_all(&mut self) {
		for node in &mut self.nodes {
			node.pin = None;
		}
	}

	/// Advances one step, or returns `None` while resting.
	pub fn tick(&mut self) -> Option<TickReport> {
		if self.temperature.phase == Phase::Resting {
			return None;
		}
		let alpha = self.temperature.advance();
		let before: Vec<Point> = self.nodes.iter().map(|n| n.position).collect();

		self.apply_links(alpha);
		self.apply_charge(alpha);
		self.apply_centering(alpha);
		self.integrate();
		self.separate_collisions();

		self.ticks += 1;
		self.temperature.settle();
		if self.temperature.phase == Phase::Resting {
			self.resolve_remaining_overlap();
		}
		let max_displacement = before
			.iter()
			.zip(&self.nodes)
			.map(|(p, n)| p.distance(n.position))
			.fold(0.0, f64::max);
		Some(TickReport {
			tick: self.ticks,
			alpha,
			max_displacement,
		})
	}

	/// Ticks until resting or `max_ticks` is reached; returns the number of ticks run.
	#[cfg(test)]
	pub fn run_until_rest(&mut self, max_ticks: usize) -> usize {
		let mut ran = 0;
		while ran < max_ticks && self.tick().is_some() {
			ran += 1;
		}
		ran
	}

	fn apply_links(&mut self, alpha: f64) {
		let (distance, strength) = (self.forces.link_distance, self.forces.link_strength);
		for (k, &(s, t)) in self.links.iter().enumerate() {
			let (src, tgt) = (self.nodes[s], self.nodes[t]);
			let mut dx = tgt.position.x + tgt.velocity.x - src.position.x - src.velocity.x;
			let mut dy = tgt.position.y + tgt.velocity.y - src.position.y - src.velocity.y;
			if dx == 0.0 {
				dx = self.random.jiggle();
			}
			if dy == 0.0 {
				dy = self.random.jiggle();
			}
			let l = dx.hypot(dy);
			let scale = (l - distance) / l * alpha * strength;
			let (fx, fy, b) = (dx * scale, dy * scale, self.bias[k]);
			self.nodes[t].velocity.x -= fx * b;
			self.nodes[t].velocity.y -= fy * b;
			self.nodes[s].velocity.x += fx * (1.0 - b);
			self.nodes[s].velocity.y += fy * (1.0 - b);
		}
	}

	fn apply_charge(&mut self, alpha: f64) {
		let strength = self.forces.charge_strength;
		let positions: Vec<Point> = self.nodes.iter().map(|n| n.position).collect();
		for (i, node) in self.nodes.iter_mut().enumerate() {
			for (j, other) in positions.iter().enumerate() {
				if i == j {
					continue;
				}
				let mut dx = other.x - positions[i].x;
				let mut dy = other.y - positions[i].y;
				if dx == 0.0 {
					dx = self.random.jiggle();
				}
				if dy == 0.0 {
					dy = self.random.jiggle();
				}
				let mut l = dx * dx + dy * dy;
				// distance floor of 1 keeps near-coincident pairs finite
				if l < 1.0 {
					l = l.sqrt();
				}
				let w = strength * alpha / l;
				node.velocity.x += dx * w;
				node.velocity.y += dy * w;
			}
		}
	}

	fn apply_centering(&mut self, alpha: f64) {
		let k = self.forces.center_strength * alpha;
		for (node, target) in self.nodes.iter_mut().zip(&self.targets) {
			node.velocity.x += (target.x - node.position.x) * k;
			node.velocity.y += (target.y - node.position.y) * k;
		}
	}

	fn integrate(&mut self) {
		let keep = 1.0 - self.forces.velocity_decay;
		for node in &mut self.nodes {
			match node.pin {
				Some(pin) => {
					node.position = pin;
					node.velocity = Point::default();
				}
				None => {
					node.velocity.x *= keep;
					node.velocity.y *= keep;
					node.position.x += node.velocity.x;
					node.position.y += node.velocity.y;
				}
			}
		}
	}

	/// Pushes overlapping circles apart along their centre line. Smaller circles give way
	/// more; pinned circles never move.
	fn separate_collisions(&mut self) {
		for _ in 0..self.forces.collision_iterations {
			self.collision_pass();
		}
	}

	/// Extra projection passes once cooling stops, so the resting layout has no overlap.
	fn resolve_remaining_overlap(&mut self) {
		for _ in 0..SETTLE_PASSES {
			if self.collision_pass() <= SETTLE_TOLERANCE {
				return;
			}
		}
	}

	/// One projection sweep over every pair; returns the deepest overlap it corrected.
	fn collision_pass(&mut self) -> f64 {
		let n = self.nodes.len();
		let mut deepest: f64 = 0.0;
		for i in 0..n {
			for j in (i + 1)..n {
				let (a, b) = (self.nodes[i], self.nodes[j]);
				if a.pin.is_some() && b.pin.is_some() {
					continue;
				}
				let reach = a.radius + b.radius;
				let mut dx = b.position.x - a.position.x;
				let mut dy = b.position.y - a.position.y;
				let mut d2 = dx * dx + dy * dy;
				if d2 >= reach * reach {
					continue;
				}
				if d2 == 0.0 {
					dx = self.random.jiggle();
					dy = self.random.jiggle();
					d2 = dx * dx + dy * dy;
				}
				let d = d2.sqrt();
				deepest = deepest.max(reach - d);
				let push = (reach - d) / d;
				let (sx, sy) = (dx * push, dy * push);
				let share = match (a.pin, b.pin) {
					(Some(_), _) => 0.0,
					(_, Some(_)) => 1.0,
					_ => {
						let (ra2, rb2) = (a.radius * a.radius, b.radius * b.radius);
						rb2 / (ra2 + rb2)
					}
				};
				self.nodes[i].position.x -= sx * share;
				self.nodes[i].position.y -= sy * share;
				self.nodes[j].position.x += sx * (1.0 - share);
				self.nodes[j].position.y += sy * (1.0 - share);
			}
		}
		deepest
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const CENTER: Point = Point::new(480.0, 250.0);

	fn ring(n: usize) -> Vec<(NodeIdx, NodeIdx)> {
		(0..n).map(|i| (NodeIdx(i), NodeIdx((i + 1) % n))).collect()
	}

	fn chain(n: usize) -> Vec<(NodeIdx, NodeIdx)> {
		(1..n).map(|i| (NodeIdx(i - 1), NodeIdx(i))).collect()
	}

	#[test]
	fn cools_to_rest_within_bounded_ticks() {
		let cfg = LayoutConfig::default();
		let radii = vec![cfg.collision_radius(4.0); 10];
		let mut sim = Simulation::new(&radii, &ring(10), CENTER, &cfg);

		let mut last = None;
		while let Some(report) = sim.tick() {
			last = Some(report);
			assert!(report.tick < 1000, "did not settle");
		}
		let last = last.unwrap();
		assert_eq!(sim.temperature().phase(), Phase::Resting);
		assert!(last.alpha < cfg.alpha_min);
		assert!(last.max_displacement < 1.0, "{last:?}");
		assert!(sim.tick().is_none());
	}

	#[test]
	fn linked_pairs_sit_nearer_the_link_distance() {
		let cfg = LayoutConfig {
			center_strength: 0.0,
			..LayoutConfig::default()
		};
		let n = 8;
		let links = ring(n);
		let mut sim = Simulation::new(&vec![cfg.collision_radius(1.0); n], &links, CENTER, &cfg);
		sim.run_until_rest(2000);

		let pos = |i: usize| sim.position(NodeIdx(i)).unwrap();
		let linked = |i: usize, j: usize| {
			links
				.iter()
				.any(|&(s, t)| (s.0, t.0) == (i, j) || (s.0, t.0) == (j, i))
		};
		let (mut near, mut far) = (Vec::new(), Vec::new());
		for i in 0..n {
			for j in (i + 1)..n {
				let off = (pos(i).distance(pos(j)) - cfg.link_distance).abs();
				if linked(i, j) { near.push(off) } else { far.push(off) }
			}
		}
		let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
		assert!(mean(&near) < 30.0, "linked deviation {}", mean(&near));
		assert!(mean(&near) < mean(&far));
	}

	fn assert_no_overlap(nodes: &[SimNode]) {
		for i in 0..nodes.len() {
			for j in (i + 1)..nodes.len() {
				let d = nodes[i].position.distance(nodes[j].position);
				let reach = nodes[i].radius + nodes[j].radius;
				assert!(d >= reach - 0.01, "nodes {i} and {j}: {d} < {reach}");
			}
		}
	}

	#[test]
	fn clustered_nodes_end_without_overlap() {
		let cfg = LayoutConfig::default();
		let footprints = [100.0, 100.0, 1.0, 36.0, 64.0, 9.0];
		let radii: Vec<f64> = footprints.iter().map(|&f| cfg.collision_radius(f)).collect();
		let mut sim = Simulation::new(&radii, &chain(radii.len()), CENTER, &cfg);
		for (i, node) in sim.nodes.iter_mut().enumerate() {
			node.position = Point::new(CENTER.x + i as f64 * 0.01, CENTER.y);
		}
		sim.run_until_rest(2000);
		assert_no_overlap(sim.nodes());
	}

	#[test]
	fn long_clustered_chain_rests_without_overlap() {
		let cfg = LayoutConfig::default();
		let radii: Vec<f64> = (0..60)
			.map(|i| cfg.collision_radius(1.0 + (i % 7) as f64 * 12.0))
			.collect();
		let mut sim = Simulation::new(&radii, &chain(radii.len()), CENTER, &cfg);
		for (i, node) in sim.nodes.iter_mut().enumerate() {
			node.position = Point::new(CENTER.x + i as f64 * 0.01, CENTER.y - i as f64 * 0.01);
		}
		sim.run_until_rest(5000);
		assert_eq!(sim.temperature().phase(), Phase::Resting);
		assert_no_overlap(sim.nodes());
	}

	#[test]
	fn repulsion_separates_unlinked_nodes() {
		let cfg = LayoutConfig {
			center_strength: 0.0,
			collision_padding: 0.0,
			..LayoutConfig::default()
		};
		let mut sim = Simulation::new(&[1.0, 1.0], &[], CENTER, &cfg);
		let start = sim.nodes()[0].position.distance(sim.nodes()[1].position);
		sim.run_until_rest(2000);
		let end = sim.nodes()[0].position.distance(sim.nodes()[1].position);
		assert!(end > start + 10.0, "{start} -> {end}");
	}

	#[test]
	fn centering_pulls_nodes_to_their_targets() {
		let cfg = LayoutConfig::default();
		let mut sim = Simulation::new(&[cfg.collision_radius(1.0); 2], &chain(2), CENTER, &cfg);
		let (left, right) = (Point::new(100.0, 250.0), Point::new(860.0, 250.0));
		sim.set_targets(vec![left, right]);
		sim.run_until_rest(2000);
		let (a, b) = (sim.position(NodeIdx(0)).unwrap(), sim.position(NodeIdx(1)).unwrap());
		assert!(a.x < CENTER.x && b.x > CENTER.x, "{a:?} {b:?}");
		assert_eq!(sim.target(NodeIdx(1)), Some(right));
	}

	#[test]
	fn pinned_node_stays_put_and_drifts_once_released() {
		let cfg = LayoutConfig::default();
		let mut sim = Simulation::new(&[cfg.collision_radius(4.0); 2], &chain(2), CENTER, &cfg);
		let pin = Point::new(100.0, 100.0);
		sim.pin(NodeIdx(0), pin);
		for _ in 0..50 {
			sim.tick();
			assert_eq!(sim.position(NodeIdx(0)), Some(pin));
		}

		sim.unpin(NodeIdx(0));
		assert!(sim.tick().is_some());
		assert_ne!(sim.position(NodeIdx(0)), Some(pin));
	}

	#[test]
	fn hold_keeps_engine_hot_until_released() {
		let cfg = LayoutConfig::default();
		let mut sim = Simulation::new(&[cfg.collision_radius(1.0); 2], &chain(2), CENTER, &cfg);
		sim.run_until_rest(2000);
		assert_eq!(sim.temperature().phase(), Phase::Resting);

		sim.temperature_mut().hold();
		assert_eq!(sim.temperature().phase(), Phase::Perturbed);
		assert!(sim.temperature().alpha() >= cfg.reheat_alpha);
		for _ in 0..1000 {
			assert!(sim.tick().is_some());
		}
		assert!((sim.temperature().alpha() - cfg.reheat_alpha).abs() < 1e-9);

		sim.temperature_mut().release();
		let ran = sim.run_until_rest(2000);
		assert!(ran > 0 && ran < 2000);
		assert_eq!(sim.temperature().phase(), Phase::Resting);
	}

	#[test]
	fn reheat_restarts_a_resting_engine() {
		let cfg = LayoutConfig::default();
		let mut sim = Simulation::new(&[cfg.collision_radius(1.0)], &[], CENTER, &cfg);
		sim.run_until_rest(2000);
		assert!(sim.tick().is_none());
		sim.temperature_mut().reheat();
		assert!(sim.tick().is_some());
		assert!(!sim.temperature().is_held());
	}

	#[test]
	fn empty_simulation_ticks_harmlessly() {
		let cfg = LayoutConfig::default();
		let mut sim = Simulation::new(&[], &[], CENTER, &cfg);
		let report = sim.tick().unwrap();
		assert_eq!(report.max_displacement, 0.0);
	}
}
