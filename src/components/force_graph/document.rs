use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::debug;

use super::error::{DocumentError, Result};
use super::types::{GraphDocument, GraphNode, LinkKind};

/// Position of a node inside a validated [`SystemGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct SystemLink {
	pub source: NodeIdx,
	pub target: NodeIdx,
	pub kind: LinkKind,
}

/// Labs and their features in order of first appearance in the document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupIndex {
	pub labs: Vec<String>,
	pub features: IndexMap<String, Vec<String>>,
}

impl GroupIndex {
	fn from_nodes(nodes: &[GraphNode]) -> Self {
		let mut features: IndexMap<String, Vec<String>> = IndexMap::new();
		for node in nodes {
			let entry = features.entry(node.lab.clone()).or_default();
			if let Some(feature) = &node.feature {
				if !entry.contains(feature) {
					entry.push(feature.clone());
				}
			}
		}
		Self {
			labs: features.keys().cloned().collect(),
			features,
		}
	}

	pub fn features_of(&self, lab: &str) -> &[String] {
		self.features.get(lab).map(Vec::as_slice).unwrap_or(&[])
	}
}

/// A validated document with isolated nodes removed and links resolved to indices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SystemGraph {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<SystemLink>,
	pub groups: GroupIndex,
}

impl SystemGraph {
	#[cfg(test)]
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

impl GraphDocument {
	pub fn from_json(text: &str) -> Result<Self> {
		Ok(serde_json::from_str(text)?)
	}

	/// Validates every record (failing on the first bad one) and drops nodes without links.
	pub fn into_graph(self) -> Result<SystemGraph> {
		validate_nodes(&self.nodes)?;
		{
			let known: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
			for (index, link) in self.links.iter().enumerate() {
				for id in [&link.source, &link.target] {
					if !known.contains(id.as_str()) {
						return Err(DocumentError::UnknownLinkEndpoint {
							index,
							id: id.clone(),
						});
					}
				}
			}
		}

		let nodes: Vec<GraphNode> = self
			.nodes
			.into_iter()
			.map(|mut node| {
				node.feature = node.feature.filter(|f| !f.trim().is_empty());
				node
			})
			.collect();
		let groups = GroupIndex::from_nodes(&nodes);

		let linked: HashSet<&str> = self
			.links
			.iter()
			.flat_map(|l| [l.source.as_str(), l.target.as_str()])
			.collect();
		let total = nodes.len();
		let nodes: Vec<GraphNode> = nodes
			.iter()
			.filter(|n| linked.contains(n.id.as_str()))
			.cloned()
			.collect();
		if nodes.len() < total {
			debug!("dropped {} isolated nodes", total - nodes.len());
		}

		let id_to_idx: HashMap<&str, NodeIdx> = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.as_str(), NodeIdx(i)))
			.collect();
		let links = self
			.links
			.iter()
			.map(|link| SystemLink {
				source: id_to_idx[link.source.as_str()],
				target: id_to_idx[link.target.as_str()],
				kind: link.kind,
			})
			.collect();

		Ok(SystemGraph {
			nodes,
			links,
			groups,
		})
	}
}

fn validate_nodes(nodes: &[GraphNode]) -> Result<()> {
	let mut seen = HashSet::new();
	for (index, node) in nodes.iter().enumerate() {
		for (field, value) in [("id", &node.id), ("name", &node.name), ("lab", &node.lab)] {
			if value.trim().is_empty() {
				return Err(DocumentError::EmptyField { index, field });
			}
		}
		if !(node.footprint.is_finite() && node.footprint > 0.0) {
			return Err(DocumentError::NonPositiveFootprint {
				id: node.id.clone(),
				footprint: node.footprint,
			});
		}
		if !seen.insert(node.id.as_str()) {
			return Err(DocumentError::DuplicateNodeId(node.id.clone()));
		}
	}
	Ok(())
}
