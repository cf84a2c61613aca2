use leptos::prelude::*;

use crate::components::force_graph::{ForceGraphCanvas, LayoutConfig, fetch_graph, fetch_layout};

/// Where the systems document is served from, relative to the page.
const SYSTEMS_URL: &str = "systems.json";
/// Optional deployment overrides for [`LayoutConfig`].
const LAYOUT_URL: &str = "layout.json";

/// The systems overview on a fixed canvas.
#[component]
pub fn Home() -> impl IntoView {
	view! { <Overview fullscreen=false /> }
}

/// The systems overview filling the browser window.
#[component]
pub fn Fullscreen() -> impl IntoView {
	view! { <Overview fullscreen=true /> }
}

/// Region toggles above the force-directed diagram. `fullscreen` selects the
/// viewport-filling variant with its narrower zoom range.
#[component]
fn Overview(fullscreen: bool) -> impl IntoView {
	let (show_labs, set_show_labs) = signal(false);
	let (show_features, set_show_features) = signal(false);
	let (loaded, set_loaded) = signal(None);
	leptos::task::spawn_local(async move {
		let base = if fullscreen {
			LayoutConfig::viewport()
		} else {
			LayoutConfig::default()
		};
		let config = fetch_layout(LAYOUT_URL, base).await;
		let graph = fetch_graph(SYSTEMS_URL).await;
		set_loaded.set(Some(graph.map(|graph| (graph, config))));
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="systems-overview">
				<div class="graph-overlay">
					<h1>"Systems Overview"</h1>
					<p class="subtitle">
						"Drag systems to reposition. Click a system to highlight its links. Scroll to zoom."
					</p>
					<label>
						<input
							type="checkbox"
							prop:checked=show_labs
							on:change=move |ev| set_show_labs.set(event_target_checked(&ev))
						/>
						"Show lab regions"
					</label>
					<label>
						<input
							type="checkbox"
							prop:checked=show_features
							on:change=move |ev| set_show_features.set(event_target_checked(&ev))
						/>
						"Show feature regions"
					</label>
				</div>
				{move || match loaded.get() {
					None => Ok(view! { <p class="loading">"Loading systems..."</p> }.into_any()),
					Some(Ok((graph, config))) => Ok(
						view! {
							<ForceGraphCanvas
								graph=graph
								show_labs=show_labs
								show_features=show_features
								config=config
							/>
						}
							.into_any(),
					),
					Some(Err(err)) => Err(err),
				}}
			</div>
		</ErrorBoundary>
	}
}
