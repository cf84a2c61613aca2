use log::{error, info, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use super::config::LayoutConfig;
use super::document::SystemGraph;
use super::error::{DocumentError, Result};
use super::types::GraphDocument;

fn fetch_error(value: JsValue) -> DocumentError {
	DocumentError::Fetch(
		value
			.as_string()
			.unwrap_or_else(|| format!("{value:?}")),
	)
}

async fn fetch_text(url: &str) -> Result<String> {
	let window = web_sys::window().ok_or_else(|| DocumentError::Fetch("no window".into()))?;
	let response: Response = JsFuture::from(window.fetch_with_str(url))
		.await
		.map_err(fetch_error)?
		.dyn_into()
		.map_err(fetch_error)?;
	if !response.ok() {
		return Err(DocumentError::Fetch(format!(
			"{url} answered {}",
			response.status()
		)));
	}
	let text = JsFuture::from(response.text().map_err(fetch_error)?)
		.await
		.map_err(fetch_error)?;
	text.as_string()
		.ok_or_else(|| DocumentError::Fetch(format!("{url} returned a non-text body")))
}

/// Fetches, parses and validates the systems document at `url`.
pub async fn fetch_graph(url: &str) -> Result<SystemGraph> {
	let loaded = async {
		let text = fetch_text(url).await?;
		GraphDocument::from_json(&text)?.into_graph()
	}
	.await;
	match &loaded {
		Ok(graph) => info!(
			"loaded {url}: {} linked systems in {} labs",
			graph.nodes.len(),
			graph.groups.labs.len()
		),
		Err(err) => error!("{err}"),
	}
	loaded
}

/// Loads optional layout overrides from `url` on top of `base`. A missing or unreadable file
/// keeps `base`.
pub async fn fetch_layout(url: &str, base: LayoutConfig) -> LayoutConfig {
	let text = match fetch_text(url).await {
		Ok(text) => text,
		Err(err) => {
			info!("no layout overrides ({err}); using built-in layout");
			return base;
		}
	};
	match base.with_overrides(&text) {
		Ok(config) => {
			info!("applied layout overrides from {url}");
			config
		}
		Err(err) => {
			warn!("ignoring layout overrides in {url}: {err}");
			base
		}
	}
}
