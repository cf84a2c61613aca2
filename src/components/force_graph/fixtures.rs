//! Shared test graphs.

use super::document::SystemGraph;
use super::types::GraphDocument;

/// Two linked labs with features, plus an isolated node in a third lab.
pub const SYSTEMS: &str = r#"{
	"nodes": [
		{"id": "ledger", "name": "Ledger", "lab": "Lab 1", "feature": "payments", "footprint": 16, "type": "service"},
		{"id": "clearing", "name": "Clearing", "lab": "Lab 1", "feature": "payments", "footprint": 9, "type": "batch"},
		{"id": "kyc", "name": "KYC", "lab": "Lab 1", "feature": "onboarding", "footprint": 4, "type": "service"},
		{"id": "lake", "name": "Data Lake", "lab": "Lab 2", "feature": "storage", "footprint": 36, "type": "store"},
		{"id": "etl", "name": "ETL", "lab": "Lab 2", "feature": "storage", "footprint": 9, "type": "batch"},
		{"id": "reports", "name": "Reports", "lab": "Lab 2", "footprint": 4, "type": "service"},
		{"id": "archive", "name": "Archive", "lab": "Lab 3", "footprint": 1, "type": "store"}
	],
	"links": [
		{"source": "ledger", "target": "clearing", "type": "upstream"},
		{"source": "clearing", "target": "kyc", "type": "downstream"},
		{"source": "lake", "target": "etl", "type": "upstream"},
		{"source": "etl", "target": "reports", "type": "downstream"},
		{"source": "kyc", "target": "etl", "type": "downstream"}
	]
}"#;

pub fn systems() -> SystemGraph {
	GraphDocument::from_json(SYSTEMS)
		.and_then(GraphDocument::into_graph)
		.expect("fixture is valid")
}
