use serde::Deserialize;

/// Relationship direction of a link, used for its stroke colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
	Upstream,
	Downstream,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphNode {
	pub id: String,
	pub name: String,
	pub lab: String,
	#[serde(default)]
	pub feature: Option<String>,
	pub footprint: f64,
	#[serde(rename = "type")]
	pub kind: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
	#[serde(rename = "type")]
	pub kind: LinkKind,
}

/// A systems document as supplied by the loader, before validation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphDocument {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}
