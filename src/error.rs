//! Error type shared by the graph fetch and the simulation stream.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors surfaced by the dashboard core. All of them stay local to the
/// view that produced them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
	/// The backend answered with a non-success status.
	#[error("{message} (HTTP {status})")]
	Http { status: u16, message: String },

	/// The request never produced a response.
	#[error("Network error: {0}")]
	Network(String),

	/// A payload or socket frame could not be decoded.
	#[error("Decode error: {0}")]
	Decode(String),

	/// The simulation socket failed.
	#[error("Socket error: {0}")]
	Socket(String),

	/// A browser API was unavailable or rejected the call.
	#[error("Browser error: {0}")]
	Browser(String),
}

impl DashboardError {
	/// Wrap a rejected browser call.
	pub fn browser(value: JsValue) -> Self {
		DashboardError::Browser(describe_js(&value))
	}

	/// Wrap a failed `fetch`.
	pub fn network(value: JsValue) -> Self {
		DashboardError::Network(describe_js(&value))
	}
}

impl From<serde_json::Error> for DashboardError {
	fn from(err: serde_json::Error) -> Self {
		DashboardError::Decode(err.to_string())
	}
}

fn describe_js(value: &JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

pub type Result<T> = std::result::Result<T, DashboardError>;
