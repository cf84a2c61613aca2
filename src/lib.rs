//! Systems overview: a Leptos client-side app drawing labs, features and the links
//! between systems as a region-constrained force-directed diagram.
//!
//! `/` shows the diagram on a fixed canvas, `/full` fills the window. Both read
//! `systems.json` and optional `layout.json` overrides from the page's directory.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

mod components;
mod pages;

use crate::pages::home::{Fullscreen, Home};
use crate::pages::not_found::NotFound;

/// Routes `log` to the browser console and reports panics there.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("systems overview v{}", env!("CARGO_PKG_VERSION"));
}

/// Fixed-canvas and full-window overview routes, with a 404 page for anything else.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		<Title text="Systems Overview" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
				<Route path=path!("/full") view=Fullscreen />
			</Routes>
		</Router>
	}
}
