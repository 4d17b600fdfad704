use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::hooks::use_params_map;

use crate::api::{GraphKind, fetch_graph};
use crate::components::dependency_graph::style::layer_color;
use crate::components::dependency_graph::{
	DependencyGraphCanvas, GraphNode, Layer, NodeId, SourceGraph, filter_by_layer,
};
use crate::config::AppConfig;
use crate::error::Result;
use crate::storage::{BrowserStore, SharedStore, layer_filter_key};

fn saved_filter(store: &SharedStore, project_id: &str) -> Option<Layer> {
	store
		.load(&layer_filter_key(project_id))
		.and_then(|value| Layer::parse(&value))
}

/// A finished fetch, tagged with the project it was made for.
type LoadedGraph = (String, Result<Arc<SourceGraph>>);

/// The fetch result when it belongs to `project_id`. A resource keeps its
/// previous value while reloading, so a stale project reads as loading.
fn graph_for(loaded: Option<LoadedGraph>, project_id: &str) -> Option<Result<Arc<SourceGraph>>> {
	loaded
		.filter(|(project, _)| project == project_id)
		.map(|(_, result)| result)
}

#[component]
fn NodeDetails(node: GraphNode) -> impl IntoView {
	let layer = node
		.layer()
		.map(|l| l.title().to_string())
		.or(node.layer.clone())
		.unwrap_or_else(|| "Unassigned".into());
	let meta = &node.metadata;
	let mut rows: Vec<(String, String)> = [
		("Path", &meta.path),
		("Version", &meta.version),
		("Type", &meta.kind),
		("Purpose", &meta.purpose),
	]
	.into_iter()
	.filter_map(|(name, value)| value.clone().map(|v| (name.to_string(), v)))
	.collect();
	rows.extend(meta.extra.iter().map(|(key, value)| {
		let text = value
			.as_str()
			.map(str::to_string)
			.unwrap_or_else(|| value.to_string());
		(key.clone(), text)
	}));
	let risk = node.risk_level.map(|r| r.as_str().to_uppercase());
	let vulnerabilities = node.vulnerabilities.clone();

	view! {
		<aside class="node-details">
			<h2>{node.label.clone()}</h2>
			<p class="node-layer">{layer}</p>
			{risk.map(|risk| view! { <p class="node-risk">"Risk: " {risk}</p> })}
			<dl>
				{rows
					.into_iter()
					.map(|(name, value)| view! { <dt>{name}</dt><dd>{value}</dd> })
					.collect_view()}
			</dl>
			{(!vulnerabilities.is_empty())
				.then(|| {
					view! {
						<h3>{format!("Vulnerabilities ({})", node.vulnerability_total())}</h3>
						<ul class="vulnerabilities">
							{vulnerabilities
								.into_iter()
								.map(|v| {
									view! {
										<li>
											<span class=format!("severity severity-{}", v.severity.as_str())>
												{v.severity.as_str().to_uppercase()}
											</span>
											<span class="vuln-title">{v.title}</span>
											{v.cve_id.map(|cve| view! { <code>{cve}</code> })}
										</li>
									}
								})
								.collect_view()}
						</ul>
					}
				})}
		</aside>
	}
}

#[component]
fn GraphWorkspace(
	source: Arc<SourceGraph>,
	project_id: String,
	filter: RwSignal<Option<Layer>>,
	show_vulnerabilities: bool,
) -> impl IntoView {
	let store = use_context::<SharedStore>().unwrap_or_else(|| Arc::new(BrowserStore) as SharedStore);
	let selected = RwSignal::new(None::<NodeId>);

	let layout_source = source.clone();
	let layout = Memo::new(move |_| filter_by_layer(&layout_source, filter.get()));

	let choose = move |layer: Option<Layer>| {
		let key = layer_filter_key(&project_id);
		match layer {
			Some(l) => store.save(&key, l.as_str()),
			None => store.remove(&key),
		}
		filter.set(layer);
	};
	let choose_all = choose.clone();

	let buttons = source
		.layers_present()
		.into_iter()
		.map(|(layer, count)| {
			let color = source
				.layer_color(layer)
				.unwrap_or_else(|| layer_color(layer))
				.to_string();
			let choose = choose.clone();
			view! {
				<button
					class="layer-filter"
					class:active=move || filter.get() == Some(layer)
					style=format!("--layer-color: {color}")
					on:click=move |_| choose(Some(layer))
				>
					{format!("{} ({count})", layer.title())}
				</button>
			}
		})
		.collect_view();

	let summary = show_vulnerabilities
		.then(|| source.vulnerability_summary().cloned())
		.flatten()
		.map(|s| {
			view! {
				<div class="vulnerability-summary">
					<span class="total">{format!("{} vulnerabilities", s.total)}</span>
					<span class="severity severity-critical">{format!("{} critical", s.critical)}</span>
					<span class="severity severity-high">{format!("{} high", s.high)}</span>
					<span class="severity severity-medium">{format!("{} medium", s.medium)}</span>
					<span class="severity severity-low">{format!("{} low", s.low)}</span>
				</div>
			}
		});

	let details_source = source.clone();
	let details = move || {
		selected
			.get()
			.and_then(|id| details_source.nodes().iter().find(|n| n.id == id).cloned())
			.map(|node| view! { <NodeDetails node=node /> })
	};

	let empty = source.nodes().is_empty();

	view! {
		{summary}
		<nav class="layer-filters">
			<button
				class="layer-filter"
				class:active=move || filter.get().is_none()
				on:click=move |_| choose_all(None)
			>
				"All layers"
			</button>
			{buttons}
		</nav>
		{if empty {
			view! { <p class="graph-empty">"No components found for this project."</p> }.into_any()
		} else {
			view! {
				<div class="graph-workspace">
					<div class="graph-canvas-wrap">
						<DependencyGraphCanvas
							layout=layout
							on_select=Callback::new(move |id| selected.set(id))
						/>
					</div>
					{details}
				</div>
			}
				.into_any()
		}}
	}
}

#[component]
fn GraphView(kind: GraphKind) -> impl IntoView {
	let params = use_params_map();
	let project_id = Memo::new(move |_| params.read().get("project_id").unwrap_or_default());
	let config = use_context::<AppConfig>().unwrap_or_default();
	let store = use_context::<SharedStore>().unwrap_or_else(|| Arc::new(BrowserStore) as SharedStore);

	let filter = RwSignal::new(None::<Layer>);
	let filter_store = store.clone();
	Effect::new(move |_| {
		filter.set(saved_filter(&filter_store, &project_id.get()));
	});

	let graph = LocalResource::new(move || {
		let (config, store, project) = (config.clone(), store.clone(), project_id.get());
		async move {
			let result = fetch_graph(&config, store.as_ref(), kind, &project)
				.await
				.map(Arc::new);
			(project, result)
		}
	});

	let title = match kind {
		GraphKind::Dependency => "Dependency graph",
		GraphKind::Aibom => "AI bill of materials",
	};

	view! {
		<div class="graph-page">
			<header class="page-header">
				<h1>{title}</h1>
				<p class="subtitle">"Project " {move || project_id.get()}</p>
			</header>
			{move || {
				let project = project_id.get();
				match graph_for(graph.get(), &project) {
					None => view! { <p class="loading">"Loading graph..."</p> }.into_any(),
					Some(Err(err)) => view! { <div class="fetch-error">{err.to_string()}</div> }.into_any(),
					Some(Ok(source)) => {
						view! {
							<GraphWorkspace
								source=source
								project_id=project
								filter=filter
								show_vulnerabilities={kind == GraphKind::Aibom}
							/>
						}
							.into_any()
					}
				}
			}}
		</div>
	}
}

/// Dependency graph of a project.
#[component]
pub fn DependencyGraphPage() -> impl IntoView {
	view! { <GraphView kind=GraphKind::Dependency /> }
}

/// AIBOM graph of a project, with vulnerability annotations.
#[component]
pub fn AibomGraphPage() -> impl IntoView {
	view! { <GraphView kind=GraphKind::Aibom /> }
}
