//! Grid tiling of the canvas into lab regions and, optionally, feature sub-regions.

use std::hash::Hash;

use indexmap::IndexMap;

use super::document::GroupIndex;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		(self.x - other.x).hypot(self.y - other.y)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self {
			x,
			y,
			width,
			height,
		}
	}

	pub fn center(&self) -> Point {
		Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}

	#[cfg(test)]
	pub fn right(&self) -> f64 {
		self.x + self.width
	}

	#[cfg(test)]
	pub fn bottom(&self) -> f64 {
		self.y + self.height
	}

	/// Shrinks by `margin` on every side; collapses to the centre line instead of going negative.
	pub fn inset(&self, margin: f64) -> Rect {
		let (cx, cy) = (self.x + self.width / 2.0, self.y + self.height / 2.0);
		let (width, height) = (
			(self.width - 2.0 * margin).max(0.0),
			(self.height - 2.0 * margin).max(0.0),
		);
		Rect::new(cx - width / 2.0, cy - height / 2.0, width, height)
	}

	#[cfg(test)]
	pub fn contains_rect(&self, other: &Rect) -> bool {
		other.x >= self.x
			&& other.y >= self.y
			&& other.right() <= self.right()
			&& other.bottom() <= self.bottom()
	}

	/// True when the interiors intersect; shared edges do not count.
	#[cfg(test)]
	pub fn overlaps(&self, other: &Rect) -> bool {
		self.x < other.right()
			&& other.x < self.right()
			&& self.y < other.bottom()
			&& other.y < self.bottom()
	}
}

/// Identifies a lab region (`feature == None`) or a feature sub-region.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupKey {
	pub lab: String,
	pub feature: Option<String>,
}

impl GroupKey {
	pub fn lab(lab: impl Into<String>) -> Self {
		Self {
			lab: lab.into(),
			feature: None,
		}
	}

	pub fn feature(lab: impl Into<String>, feature: impl Into<String>) -> Self {
		Self {
			lab: lab.into(),
			feature: Some(feature.into()),
		}
	}
}

/// Active grouping of the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PartitionScheme {
	#[default]
	None,
	Labs,
	LabsAndFeatures,
}

impl PartitionScheme {
	/// Feature regions live inside lab regions, so `features` implies `labs`.
	pub fn from_toggles(labs: bool, features: bool) -> Self {
		match (labs, features) {
			(_, true) => Self::LabsAndFeatures,
			(true, false) => Self::Labs,
			(false, false) => Self::None,
		}
	}

	/// Region key a node centres on, or `None` when it has nothing to resolve against.
	pub fn target_key(self, lab: &str, feature: Option<&str>) -> Option<GroupKey> {
		match self {
			Self::None => None,
			Self::Labs => Some(GroupKey::lab(lab)),
			Self::LabsAndFeatures => feature.map(|f| GroupKey::feature(lab, f)),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionLevel {
	Lab,
	Feature,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
	pub rect: Rect,
	pub level: RegionLevel,
}

/// Regions for one scheme, in drawing order (each lab followed by its features).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegionMap {
	regions: IndexMap<GroupKey, Region>,
}

impl RegionMap {
	pub fn get(&self, key: &GroupKey) -> Option<&Region> {
		self.regions.get(key)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &Region)> {
		self.regions.iter()
	}

	#[cfg(test)]
	pub fn len(&self) -> usize {
		self.regions.len()
	}

	#[cfg(test)]
	pub fn is_empty(&self) -> bool {
		self.regions.is_empty()
	}

	#[cfg(test)]
	pub fn level_count(&self, level: RegionLevel) -> usize {
		self.regions.values().filter(|r| r.level == level).count()
	}

	/// Centre of the region for `key`, or `fallback` when the key is absent or unresolved.
	pub fn resolve_region_or_default(&self, key: Option<&GroupKey>, fallback: Point) -> Point {
		match key.and_then(|k| self.regions.get(k)) {
			Some(region) => region.rect.center(),
			None => fallback,
		}
	}
}

/// Splits `parent` into `ceil(sqrt(n))` columns and enough rows for `count` cells, row-major,
/// each inset by `margin`.
pub fn tile(parent: Rect, count: usize, margin: f64) -> Vec<Rect> {
	if count == 0 {
		return Vec::new();
	}
	let cols = (count as f64).sqrt().ceil() as usize;
	let rows = count.div_ceil(cols);
	let edge = |origin: f64, extent: f64, i: usize, n: usize| origin + extent * i as f64 / n as f64;

	(0..count)
		.map(|i| {
			let (col, row) = (i % cols, i / cols);
			let (left, right) = (
				edge(parent.x, parent.width, col, cols),
				edge(parent.x, parent.width, col + 1, cols),
			);
			let (top, bottom) = (
				edge(parent.y, parent.height, row, rows),
				edge(parent.y, parent.height, row + 1, rows),
			);
			Rect::new(left, top, right - left, bottom - top).inset(margin)
		})
		.collect()
}

/// Flat partition of a `width` by `height` canvas, one cell per group in input order.
pub fn compute_regions<K: Clone + Eq + Hash>(
	groups: &[K],
	width: f64,
	height: f64,
	margin: f64,
) -> IndexMap<K, Rect> {
	let canvas = Rect::new(0.0, 0.0, width, height);
	groups
		.iter()
		.cloned()
		.zip(tile(canvas, groups.len(), margin))
		.collect()
}

/// Feature sub-regions tiled inside one lab rectangle.
pub fn compute_nested_regions(
	lab_rect: Rect,
	features: &[String],
	margin: f64,
) -> IndexMap<String, Rect> {
	features
		.iter()
		.cloned()
		.zip(tile(lab_rect, features.len(), margin))
		.collect()
}

pub fn partition(
	groups: &GroupIndex,
	scheme: PartitionScheme,
	width: f64,
	height: f64,
	margin: f64,
) -> RegionMap {
	let mut regions = IndexMap::new();
	if scheme == PartitionScheme::None {
		return RegionMap { regions };
	}

	for (lab, rect) in compute_regions(&groups.labs, width, height, margin) {
		if scheme == PartitionScheme::LabsAndFeatures {
			let nested = compute_nested_regions(rect, groups.features_of(&lab), margin);
			regions.insert(
				GroupKey::lab(lab.clone()),
				Region {
					rect,
					level: RegionLevel::Lab,
				},
			);
			for (feature, sub) in nested {
				regions.insert(
					GroupKey::feature(lab.clone(), feature),
					Region {
						rect: sub,
						level: RegionLevel::Feature,
					},
				);
			}
		} else {
			regions.insert(
				GroupKey::lab(lab),
				Region {
					rect,
					level: RegionLevel::Lab,
				},
			);
		}
	}
	RegionMap { regions }
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	fn labs(n: usize) -> Vec<String> {
		(1..=n).map(|i| format!("Lab {i}")).collect()
	}

	fn assert_disjoint(rects: &[Rect]) {
		for (i, a) in rects.iter().enumerate() {
			for b in &rects[i + 1..] {
				assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
			}
		}
	}

	#[test]
	fn zero_groups_is_empty() {
		assert!(compute_regions::<String>(&[], 960.0, 500.0, 20.0).is_empty());
		assert!(tile(Rect::new(0.0, 0.0, 10.0, 10.0), 0, 1.0).is_empty());
	}

	#[test]
	fn single_group_spans_inset_canvas() {
		let regions = compute_regions(&labs(1), 960.0, 500.0, 20.0);
		assert_eq!(regions["Lab 1"], Rect::new(20.0, 20.0, 920.0, 460.0));
	}

	#[test]
	fn grid_shape_follows_square_root() {
		// 3 groups -> 2 columns, 2 rows; third cell starts the second row
		let regions = compute_regions(&labs(3), 960.0, 500.0, 20.0);
		assert_eq!(regions["Lab 1"], Rect::new(20.0, 20.0, 440.0, 210.0));
		assert_eq!(regions["Lab 2"], Rect::new(500.0, 20.0, 440.0, 210.0));
		assert_eq!(regions["Lab 3"], Rect::new(20.0, 270.0, 440.0, 210.0));

		// 10 groups -> 4 columns, 3 rows
		let regions = compute_regions(&labs(10), 800.0, 600.0, 5.0);
		assert_eq!(regions["Lab 5"].x, 5.0);
		assert_eq!(regions["Lab 5"].y, 205.0);
		assert_eq!(regions["Lab 10"].x, 205.0);
		assert_eq!(regions["Lab 10"].width, 190.0);
	}

	#[test]
	fn siblings_never_overlap() {
		for n in [1, 2, 3, 4, 9, 10] {
			let regions = compute_regions(&labs(n), 960.0, 500.0, 20.0);
			assert_eq!(regions.len(), n);
			let rects: Vec<Rect> = regions.values().copied().collect();
			assert_disjoint(&rects);
		}
	}

	#[test]
	fn oversized_margin_collapses_instead_of_inverting() {
		let cells = tile(Rect::new(0.0, 0.0, 30.0, 30.0), 4, 20.0);
		for cell in cells {
			assert_eq!(cell.width, 0.0);
			assert_eq!(cell.height, 0.0);
		}
	}

	#[test]
	fn nested_partition_places_features_inside_their_lab() {
		let mut groups = GroupIndex {
			labs: labs(2),
			..Default::default()
		};
		groups.features.insert("Lab 1".into(), vec!["ingest".into(), "store".into()]);
		groups.features.insert("Lab 2".into(), vec![]);

		let map = partition(&groups, PartitionScheme::LabsAndFeatures, 960.0, 500.0, 20.0);
		assert_eq!(map.level_count(RegionLevel::Lab), 2);
		assert_eq!(map.level_count(RegionLevel::Feature), 2);

		let lab = map.get(&GroupKey::lab("Lab 1")).unwrap().rect;
		let ingest = map.get(&GroupKey::feature("Lab 1", "ingest")).unwrap().rect;
		let store = map.get(&GroupKey::feature("Lab 1", "store")).unwrap().rect;
		assert!(lab.contains_rect(&ingest));
		assert!(lab.contains_rect(&store));
		assert!(!ingest.overlaps(&store));

		// drawing order: lab first, then its features
		let keys: Vec<&GroupKey> = map.iter().map(|(k, _)| k).collect();
		assert_eq!(keys[0], &GroupKey::lab("Lab 1"));
		assert_eq!(keys[1], &GroupKey::feature("Lab 1", "ingest"));
		assert_eq!(keys[3], &GroupKey::lab("Lab 2"));
	}

	#[test]
	fn scheme_none_yields_no_regions() {
		let groups = GroupIndex {
			labs: labs(3),
			..Default::default()
		};
		assert!(partition(&groups, PartitionScheme::None, 960.0, 500.0, 20.0).is_empty());
		assert_eq!(
			partition(&groups, PartitionScheme::Labs, 960.0, 500.0, 20.0).len(),
			3
		);
	}

	#[test]
	fn toggles_map_to_schemes() {
		assert_eq!(PartitionScheme::from_toggles(false, false), PartitionScheme::None);
		assert_eq!(PartitionScheme::from_toggles(true, false), PartitionScheme::Labs);
		assert_eq!(
			PartitionScheme::from_toggles(false, true),
			PartitionScheme::LabsAndFeatures
		);
		assert_eq!(
			PartitionScheme::from_toggles(true, true),
			PartitionScheme::LabsAndFeatures
		);
	}

	#[test]
	fn unresolved_keys_fall_back_to_default() {
		let groups = GroupIndex {
			labs: labs(2),
			..Default::default()
		};
		let map = partition(&groups, PartitionScheme::LabsAndFeatures, 960.0, 500.0, 20.0);
		let center = Point::new(480.0, 250.0);

		let featureless = PartitionScheme::LabsAndFeatures.target_key("Lab 1", None);
		assert_eq!(featureless, None);
		assert_eq!(map.resolve_region_or_default(featureless.as_ref(), center), center);

		let unknown = GroupKey::feature("Lab 1", "missing");
		assert_eq!(map.resolve_region_or_default(Some(&unknown), center), center);

		let lab = GroupKey::lab("Lab 2");
		assert_eq!(
			map.resolve_region_or_default(Some(&lab), center),
			map.get(&lab).unwrap().rect.center()
		);
	}

	proptest! {
		#[test]
		fn partition_is_idempotent(
			n in 0usize..40,
			width in 100.0f64..2000.0,
			height in 100.0f64..2000.0,
			margin in 0.0f64..40.0,
		) {
			let groups = labs(n);
			prop_assert_eq!(
				compute_regions(&groups, width, height, margin),
				compute_regions(&groups, width, height, margin)
			);
		}

		#[test]
		fn partition_cells_are_disjoint_and_inside_canvas(
			n in 1usize..40,
			width in 100.0f64..2000.0,
			height in 100.0f64..2000.0,
			margin in 1.0f64..20.0,
		) {
			let canvas = Rect::new(0.0, 0.0, width, height);
			let rects: Vec<Rect> = compute_regions(&labs(n), width, height, margin)
				.into_values()
				.collect();
			prop_assert_eq!(rects.len(), n);
			for (i, a) in rects.iter().enumerate() {
				prop_assert!(canvas.contains_rect(a));
				for b in &rects[i + 1..] {
					prop_assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
				}
			}
		}
	}
}
