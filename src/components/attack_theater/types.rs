use serde::Deserialize;
use serde_json::Value;

use crate::error::{DashboardError, Result};
use crate::severity::Severity;
use crate::wire::null_as_default;

/// One executed attack step as reported by the simulation backend.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct AttackStep {
	#[serde(default, deserialize_with = "null_as_default")]
	pub step: u32,
	#[serde(default, deserialize_with = "null_as_default")]
	pub name: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub description: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub payload: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub response: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub success: bool,
	#[serde(default)]
	pub severity: Severity,
	#[serde(default, deserialize_with = "null_as_default")]
	pub impact: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub timestamp: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct StatusUpdate {
	#[serde(default)]
	pub status: Option<String>,
	#[serde(default)]
	pub message: Option<String>,
}

impl StatusUpdate {
	/// Human readable text, preferring the message.
	pub fn text(&self) -> Option<&str> {
		self.message.as_deref().or(self.status.as_deref())
	}
}

/// A decoded socket frame, dispatched on its `type` field.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamFrame {
	Status(StatusUpdate),
	Step(AttackStep),
	Complete { summary: Option<Value> },
	Error { message: String },
	Unknown(String),
}

impl StreamFrame {
	/// Decode a text frame. The step record may sit under `data` or be
	/// inlined next to `type`.
	pub fn decode(text: &str) -> Result<Self> {
		let value: Value = serde_json::from_str(text)?;
		let kind = value
			.get("type")
			.and_then(Value::as_str)
			.ok_or_else(|| DashboardError::Decode("frame has no type".into()))?
			.to_string();
		Ok(match kind.as_str() {
			"status" => StreamFrame::Status(serde_json::from_value(value)?),
			"step" => {
				let record = match value.get("data") {
					Some(data) if data.is_object() => data.clone(),
					_ => value,
				};
				StreamFrame::Step(serde_json::from_value(record)?)
			}
			"complete" => StreamFrame::Complete {
				summary: value.get("summary").cloned(),
			},
			"error" => StreamFrame::Error {
				message: value
					.get("message")
					.and_then(Value::as_str)
					.unwrap_or("simulation failed")
					.to_string(),
			},
			_ => StreamFrame::Unknown(kind),
		})
	}
}

/// Counts derived from the accumulated step list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
	pub total: usize,
	pub successful: usize,
	/// Successful steps with critical severity.
	pub critical: usize,
}

impl StepStats {
	pub fn from_steps(steps: &[AttackStep]) -> Self {
		let successful = steps.iter().filter(|s| s.success);
		Self {
			total: steps.len(),
			successful: successful.clone().count(),
			critical: successful
				.filter(|s| s.severity == Severity::Critical)
				.count(),
		}
	}

	/// Percentage of successful steps, 0 when nothing ran.
	pub fn success_rate(&self) -> f64 {
		if self.total == 0 {
			0.0
		} else {
			self.successful as f64 * 100.0 / self.total as f64
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_nested_step() {
		let frame = StreamFrame::decode(
			r#"{"type":"step","data":{"step":2,"name":"Prompt injection","success":true,"severity":"critical","payload":"ignore previous"}}"#,
		)
		.unwrap();
		let StreamFrame::Step(step) = frame else {
			panic!("expected step frame");
		};
		assert_eq!(step.step, 2);
		assert_eq!(step.name, "Prompt injection");
		assert!(step.success);
		assert_eq!(step.severity, Severity::Critical);
		assert_eq!(step.response, "");
	}

	#[test]
	fn decodes_flat_step() {
		let frame = StreamFrame::decode(r#"{"type":"step","step":5,"name":"Exfil","severity":"high"}"#).unwrap();
		assert_eq!(
			frame,
			StreamFrame::Step(AttackStep {
				step: 5,
				name: "Exfil".into(),
				severity: Severity::High,
				..AttackStep::default()
			})
		);
	}

	#[test]
	fn decodes_status_complete_and_error() {
		let status = StreamFrame::decode(r#"{"type":"status","status":"running","message":"Starting"}"#).unwrap();
		let StreamFrame::Status(update) = status else {
			panic!("expected status frame");
		};
		assert_eq!(update.text(), Some("Starting"));

		assert_eq!(
			StreamFrame::decode(r#"{"type":"complete"}"#).unwrap(),
			StreamFrame::Complete { summary: None }
		);
		assert_eq!(
			StreamFrame::decode(r#"{"type":"error","message":"model offline"}"#).unwrap(),
			StreamFrame::Error {
				message: "model offline".into()
			}
		);
		assert_eq!(
			StreamFrame::decode(r#"{"type":"heartbeat"}"#).unwrap(),
			StreamFrame::Unknown("heartbeat".into())
		);
	}

	#[test]
	fn null_step_fields_take_defaults() {
		let frame = StreamFrame::decode(
			r#"{"type":"step","data":{"step":3,"name":"Jailbreak","success":true,"severity":null,"payload":null,"response":null,"impact":null,"timestamp":null}}"#,
		)
		.unwrap();
		assert_eq!(
			frame,
			StreamFrame::Step(AttackStep {
				step: 3,
				name: "Jailbreak".into(),
				success: true,
				..AttackStep::default()
			})
		);
	}

	#[test]
	fn rejects_malformed_frames() {
		assert!(matches!(StreamFrame::decode("{not json"), Err(DashboardError::Decode(_))));
		assert!(matches!(StreamFrame::decode(r#"{"step":1}"#), Err(DashboardError::Decode(_))));
	}

	#[test]
	fn stats_count_successes_and_critical_successes() {
		let step = |success, severity| AttackStep {
			success,
			severity,
			..AttackStep::default()
		};
		let steps = vec![
			step(true, Severity::Critical),
			step(true, Severity::High),
			step(false, Severity::Critical),
			step(true, Severity::Critical),
			step(false, Severity::Info),
		];
		let stats = StepStats::from_steps(&steps);
		assert_eq!(
			stats,
			StepStats {
				total: 5,
				successful: 3,
				critical: 2
			}
		);
		assert_eq!(stats.success_rate(), 60.0);
		assert_eq!(StepStats::default().success_rate(), 0.0);
	}
}
