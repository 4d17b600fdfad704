//! Application configuration, fixed at build time.

const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Backoff schedule for the simulation socket.
///
/// `max_attempts = 0` keeps single-attempt semantics: a failed socket stays
/// failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
	pub max_attempts: u32,
	pub base_delay_ms: u32,
	pub max_delay_ms: u32,
}

impl Default for ReconnectPolicy {
	fn default() -> Self {
		Self {
			max_attempts: 0,
			base_delay_ms: 500,
			max_delay_ms: 8_000,
		}
	}
}

impl ReconnectPolicy {
	/// Delay before reconnect `attempt` (1-based), or `None` once the budget
	/// is spent.
	pub fn delay_for(&self, attempt: u32) -> Option<u32> {
		if attempt == 0 || attempt > self.max_attempts {
			return None;
		}
		let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
		Some(self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms))
	}
}

/// Backend endpoints and stream behaviour.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
	/// Base URL of the REST API, without a trailing slash.
	pub api_base_url: String,
	/// Base URL of the WebSocket endpoints, without a trailing slash.
	pub ws_base_url: String,
	pub reconnect: ReconnectPolicy,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self::new(DEFAULT_API_URL, None)
	}
}

impl AppConfig {
	/// Build from an API URL; the socket URL is derived from it unless given.
	pub fn new(api_base_url: &str, ws_base_url: Option<&str>) -> Self {
		let api_base_url = api_base_url.trim_end_matches('/').to_string();
		let ws_base_url = ws_base_url
			.map(|url| url.trim_end_matches('/').to_string())
			.unwrap_or_else(|| ws_url_from_http(&api_base_url));
		Self {
			api_base_url,
			ws_base_url,
			reconnect: ReconnectPolicy::default(),
		}
	}

	/// Read `AIBOM_API_URL`, `AIBOM_WS_URL` and `AIBOM_RECONNECT_ATTEMPTS`
	/// from the build environment.
	pub fn from_env() -> Self {
		let mut config = Self::new(
			option_env!("AIBOM_API_URL").unwrap_or(DEFAULT_API_URL),
			option_env!("AIBOM_WS_URL"),
		);
		if let Some(attempts) = option_env!("AIBOM_RECONNECT_ATTEMPTS").and_then(|v| v.parse().ok()) {
			config.reconnect.max_attempts = attempts;
		}
		config
	}

	pub fn dependency_graph_url(&self, project_id: &str) -> String {
		format!("{}/dependency-graph/{}", self.api_base_url, project_id)
	}

	pub fn aibom_graph_url(&self, project_id: &str) -> String {
		format!(
			"{}/dependency-graph/{}/enhanced?include_vulnerabilities=true",
			self.api_base_url, project_id
		)
	}

	pub fn simulation_socket_url(&self, simulation_id: &str) -> String {
		format!("{}/attack-simulation/ws/{}", self.ws_base_url, simulation_id)
	}
}

/// `http://` -> `ws://`, `https://` -> `wss://`; anything else is kept.
pub fn ws_url_from_http(url: &str) -> String {
	if let Some(rest) = url.strip_prefix("https://") {
		format!("wss://{rest}")
	} else if let Some(rest) = url.strip_prefix("http://") {
		format!("ws://{rest}")
	} else {
		url.to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn socket_url_follows_api_scheme() {
		assert_eq!(ws_url_from_http("https://api.example.com/v1"), "wss://api.example.com/v1");
		assert_eq!(ws_url_from_http("http://localhost:8000"), "ws://localhost:8000");
		assert_eq!(ws_url_from_http("ws://already"), "ws://already");
	}

	#[test]
	fn endpoints_are_built_from_base_urls() {
		let config = AppConfig::new("https://api.example.com/v1/", None);
		assert_eq!(
			config.dependency_graph_url("42"),
			"https://api.example.com/v1/dependency-graph/42"
		);
		assert_eq!(
			config.aibom_graph_url("42"),
			"https://api.example.com/v1/dependency-graph/42/enhanced?include_vulnerabilities=true"
		);
		assert_eq!(
			config.simulation_socket_url("sim-7"),
			"wss://api.example.com/v1/attack-simulation/ws/sim-7"
		);
	}

	#[test]
	fn explicit_socket_url_wins() {
		let config = AppConfig::new("http://a", Some("wss://b/"));
		assert_eq!(config.ws_base_url, "wss://b");
	}

	#[test]
	fn default_policy_never_reconnects() {
		assert_eq!(ReconnectPolicy::default().delay_for(1), None);
	}

	#[test]
	fn backoff_doubles_and_caps() {
		let policy = ReconnectPolicy {
			max_attempts: 6,
			base_delay_ms: 500,
			max_delay_ms: 8_000,
		};
		let delays: Vec<_> = (1..=7).map(|a| policy.delay_for(a)).collect();
		assert_eq!(
			delays,
			vec![
				Some(500),
				Some(1_000),
				Some(2_000),
				Some(4_000),
				Some(8_000),
				Some(8_000),
				None
			]
		);
	}
}
