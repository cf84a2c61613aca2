/// Failures of the load step. Physics never produces these.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum DocumentError {
	#[error("failed to fetch graph document: {0}")]
	Fetch(String),
	#[error("malformed graph document: {0}")]
	Parse(String),
	#[error("node #{index} has an empty `{field}`")]
	EmptyField { index: usize, field: &'static str },
	#[error("node `{id}` has a non-positive footprint ({footprint})")]
	NonPositiveFootprint { id: String, footprint: f64 },
	#[error("duplicate node id `{0}`")]
	DuplicateNodeId(String),
	#[error("link #{index} references unknown node `{id}`")]
	UnknownLinkEndpoint { index: usize, id: String },
}

impl From<serde_json::Error> for DocumentError {
	fn from(err: serde_json::Error) -> Self {
		Self::Parse(err.to_string())
	}
}

pub type Result<T> = std::result::Result<T, DocumentError>;
