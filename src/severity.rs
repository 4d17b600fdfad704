use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Severity scale shared by vulnerabilities, node risk levels and attack
/// steps. Ordered from least to most severe; `Unknown` sorts lowest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
	#[default]
	Unknown,
	Info,
	Low,
	Medium,
	High,
	Critical,
}

impl Severity {
	pub fn parse(value: &str) -> Self {
		match value.trim().to_ascii_lowercase().as_str() {
			"info" | "informational" => Severity::Info,
			"low" => Severity::Low,
			"medium" | "moderate" => Severity::Medium,
			"high" => Severity::High,
			"critical" => Severity::Critical,
			_ => Severity::Unknown,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Severity::Unknown => "unknown",
			Severity::Info => "info",
			Severity::Low => "low",
			Severity::Medium => "medium",
			Severity::High => "high",
			Severity::Critical => "critical",
		}
	}

	/// Display colour for badges and glows.
	pub fn color(self) -> &'static str {
		match self {
			Severity::Critical => "#dc2626",
			Severity::High => "#ea580c",
			Severity::Medium => "#ca8a04",
			Severity::Low => "#2563eb",
			Severity::Info | Severity::Unknown => "#64748b",
		}
	}
}

/// Strings are parsed leniently; `null`, numbers or anything else decode as
/// `Unknown` instead of failing the surrounding payload.
impl<'de> Deserialize<'de> for Severity {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let value = Value::deserialize(deserializer)?;
		Ok(value.as_str().map_or(Severity::Unknown, Severity::parse))
	}
}
