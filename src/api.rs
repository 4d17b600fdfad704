//! Graph fetches against the backend REST API.

use log::{debug, warn};
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::components::dependency_graph::{GraphResponse, SourceGraph};
use crate::config::AppConfig;
use crate::error::{DashboardError, Result};
use crate::storage::{AUTH_TOKEN_KEY, StateStore};

/// Which graph endpoint to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphKind {
	/// Plain dependency graph.
	Dependency,
	/// AIBOM graph with vulnerability annotations.
	Aibom,
}

impl GraphKind {
	pub fn url(self, config: &AppConfig, project_id: &str) -> String {
		match self {
			GraphKind::Dependency => config.dependency_graph_url(project_id),
			GraphKind::Aibom => config.aibom_graph_url(project_id),
		}
	}
}

/// User-facing message for a failed response: the backend's `detail`
/// (string or validation list), then `message` or `error`, then a fallback.
pub fn error_message_from_body(status: u16, body: &str) -> String {
	let fallback = || format!("Failed to load graph (status {status})");
	let Ok(value) = serde_json::from_str::<Value>(body) else {
		return fallback();
	};
	match value.get("detail") {
		Some(Value::String(detail)) if !detail.is_empty() => return detail.clone(),
		Some(Value::Array(items)) => {
			let messages: Vec<&str> = items
				.iter()
				.filter_map(|item| item.get("msg").and_then(Value::as_str))
				.collect();
			if !messages.is_empty() {
				return messages.join("; ");
			}
		}
		_ => {}
	}
	["message", "error"]
		.iter()
		.find_map(|key| value.get(*key).and_then(Value::as_str))
		.filter(|text| !text.is_empty())
		.map(str::to_string)
		.unwrap_or_else(fallback)
}

async fn get_text(url: &str, store: &dyn StateStore) -> Result<(u16, bool, String)> {
	let opts = RequestInit::new();
	opts.set_method("GET");
	opts.set_mode(RequestMode::Cors);
	let request = Request::new_with_str_and_init(url, &opts).map_err(DashboardError::browser)?;
	let headers = request.headers();
	headers
		.set("Accept", "application/json")
		.map_err(DashboardError::browser)?;
	if let Some(token) = store.load(AUTH_TOKEN_KEY) {
		headers
			.set("Authorization", &format!("Bearer {token}"))
			.map_err(DashboardError::browser)?;
	}

	let window = web_sys::window().ok_or_else(|| DashboardError::Browser("no window".into()))?;
	let response: Response = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(DashboardError::network)?
		.dyn_into()
		.map_err(DashboardError::browser)?;
	let text = JsFuture::from(response.text().map_err(DashboardError::browser)?)
		.await
		.map_err(DashboardError::network)?
		.as_string()
		.unwrap_or_default();
	Ok((response.status(), response.ok(), text))
}

/// Fetch a project's graph. Any failure yields an error and no graph.
pub async fn fetch_graph(
	config: &AppConfig,
	store: &dyn StateStore,
	kind: GraphKind,
	project_id: &str,
) -> Result<SourceGraph> {
	let url = kind.url(config, project_id);
	debug!("GET {url}");
	let (status, ok, body) = get_text(&url, store).await?;
	if !ok {
		let message = error_message_from_body(status, &body);
		warn!("Graph fetch for project {project_id} failed: {message}");
		return Err(DashboardError::Http { status, message });
	}
	let response: GraphResponse = serde_json::from_str(&body)?;
	debug!(
		"Loaded {} nodes and {} edges for project {project_id}",
		response.nodes.len(),
		response.edges.len()
	);
	Ok(SourceGraph::from(response))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn prefers_detail_string() {
		assert_eq!(
			error_message_from_body(404, r#"{"detail":"Project not found","message":"x"}"#),
			"Project not found"
		);
	}

	#[test]
	fn joins_validation_details() {
		let body = r#"{"detail":[{"msg":"field required"},{"msg":"not an int"}]}"#;
		assert_eq!(error_message_from_body(422, body), "field required; not an int");
	}

	#[test]
	fn falls_back_to_message_then_generic() {
		assert_eq!(error_message_from_body(500, r#"{"error":"boom"}"#), "boom");
		assert_eq!(
			error_message_from_body(502, "<html>Bad gateway</html>"),
			"Failed to load graph (status 502)"
		);
		assert_eq!(
			error_message_from_body(500, r#"{"detail":""}"#),
			"Failed to load graph (status 500)"
		);
	}

	#[test]
	fn graph_kind_selects_endpoint() {
		let config = AppConfig::new("http://api", None);
		assert_eq!(GraphKind::Dependency.url(&config, "p1"), "http://api/dependency-graph/p1");
		assert!(GraphKind::Aibom
			.url(&config, "p1")
			.ends_with("/enhanced?include_vulnerabilities=true"));
	}
}
