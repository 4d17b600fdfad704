//! Leptos client-side app wiring and routes.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info, warn};

// Modules
mod api;
mod components;
mod config;
mod error;
mod pages;
mod severity;
mod storage;
mod wire;

// Top-Level pages
use crate::config::AppConfig;
use crate::pages::graph::{AibomGraphPage, DependencyGraphPage};
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;
use crate::pages::simulation::SimulationPage;
use crate::storage::{BrowserStore, MemoryStore, SharedStore};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router for the graph views and the attack theater, with a 404
/// fallback.
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	let config = AppConfig::from_env();
	info!("API at {}, streams at {}", config.api_base_url, config.ws_base_url);
	provide_context(config);
	let store: SharedStore = if BrowserStore::is_available() {
		Arc::new(BrowserStore)
	} else {
		warn!("localStorage unavailable; view state will not persist");
		Arc::new(MemoryStore::default())
	};
	provide_context(store);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		// sets the document title
		<Title text="AIBOM Security Dashboard" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
				<Route path=path!("/projects/:project_id/dependencies") view=DependencyGraphPage />
				<Route path=path!("/projects/:project_id/aibom") view=AibomGraphPage />
				<Route path=path!("/simulations/:simulation_id") view=SimulationPage />
			</Routes>
		</Router>
	}
}
