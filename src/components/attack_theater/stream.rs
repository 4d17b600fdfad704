//! Ordered consumer of a simulation's frame stream.
//!
//! `AttackStream` is independent of the transport: the socket driver feeds it
//! text frames and connection events, and it reports to a [`StreamObserver`].
//! Steps are kept in arrival order; statistics are always recomputed from the
//! full list.

use log::{debug, info, warn};

use crate::error::Result;

use super::types::{AttackStep, StatusUpdate, StepStats, StreamFrame};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamPhase {
	Connecting,
	Streaming,
	Completed,
	Errored,
	Reconnecting { attempt: u32 },
}

impl StreamPhase {
	pub fn label(self) -> &'static str {
		match self {
			StreamPhase::Connecting => "Connecting",
			StreamPhase::Streaming => "Running",
			StreamPhase::Completed => "Completed",
			StreamPhase::Errored => "Connection lost",
			StreamPhase::Reconnecting { .. } => "Reconnecting",
		}
	}

	pub fn is_terminal(self) -> bool {
		self == StreamPhase::Completed
	}
}

/// Subscriber to stream progress.
pub trait StreamObserver {
	fn on_status(&mut self, _status: &StatusUpdate) {}

	/// A step was appended at `index`.
	fn on_step(&mut self, step: &AttackStep, index: usize);

	/// Called once, when the stream completes.
	fn on_complete(&mut self, steps: &[AttackStep], stats: StepStats);

	fn on_phase(&mut self, _phase: StreamPhase) {}

	/// A step arrived out of sequence; `count` is the running total.
	fn on_sequence_anomaly(&mut self, _count: usize) {}
}

#[derive(Debug)]
pub struct AttackStream {
	phase: StreamPhase,
	steps: Vec<AttackStep>,
	sequence_anomalies: usize,
	reconnects: u32,
	/// The server reported the simulation as failed.
	server_failed: bool,
}

impl Default for AttackStream {
	fn default() -> Self {
		Self::new()
	}
}

impl AttackStream {
	pub fn new() -> Self {
		Self {
			phase: StreamPhase::Connecting,
			steps: Vec::new(),
			sequence_anomalies: 0,
			reconnects: 0,
			server_failed: false,
		}
	}

	pub fn phase(&self) -> StreamPhase {
		self.phase
	}

	pub fn steps(&self) -> &[AttackStep] {
		&self.steps
	}

	pub fn reconnect_attempts(&self) -> u32 {
		self.reconnects
	}

	pub fn stats(&self) -> StepStats {
		StepStats::from_steps(&self.steps)
	}

	fn set_phase(&mut self, phase: StreamPhase, observer: &mut dyn StreamObserver) {
		if self.phase != phase {
			debug!("Simulation stream {:?} -> {:?}", self.phase, phase);
			self.phase = phase;
			observer.on_phase(phase);
		}
	}

	/// The socket opened. Only a fresh or reconnecting stream starts
	/// streaming; an errored one must go through [`Self::begin_reconnect`].
	pub fn opened(&mut self, observer: &mut dyn StreamObserver) {
		if matches!(
			self.phase,
			StreamPhase::Connecting | StreamPhase::Reconnecting { .. }
		) {
			self.set_phase(StreamPhase::Streaming, observer);
		}
	}

	/// Decode and apply one text frame. A frame that fails to decode is
	/// returned as an error and leaves the stream untouched.
	pub fn handle_text(&mut self, text: &str, observer: &mut dyn StreamObserver) -> Result<()> {
		let frame = StreamFrame::decode(text)?;
		self.apply(frame, observer);
		Ok(())
	}

	pub fn apply(&mut self, frame: StreamFrame, observer: &mut dyn StreamObserver) {
		if self.phase.is_terminal() {
			debug!("Ignoring frame after completion: {:?}", frame);
			return;
		}
		// A failed stream only resumes through a reconnect
		if self.phase == StreamPhase::Errored
			&& matches!(frame, StreamFrame::Step(_) | StreamFrame::Complete { .. })
		{
			debug!("Ignoring frame on errored stream: {:?}", frame);
			return;
		}
		match frame {
			StreamFrame::Status(update) => {
				if let Some(text) = update.text() {
					info!("Simulation status: {text}");
				}
				observer.on_status(&update);
			}
			StreamFrame::Step(step) => {
				self.set_phase(StreamPhase::Streaming, observer);
				if let Some(prev) = self.steps.last() {
					if step.step <= prev.step {
						self.sequence_anomalies += 1;
						warn!(
							"Step {} arrived after step {}; keeping arrival order",
							step.step, prev.step
						);
						observer.on_sequence_anomaly(self.sequence_anomalies);
					}
				}
				self.steps.push(step);
				let index = self.steps.len() - 1;
				observer.on_step(&self.steps[index], index);
			}
			StreamFrame::Complete { .. } => {
				self.set_phase(StreamPhase::Completed, observer);
				let stats = self.stats();
				info!(
					"Simulation complete: {} steps, {} successful, {} critical, {} out of sequence",
					stats.total, stats.successful, stats.critical, self.sequence_anomalies
				);
				observer.on_complete(&self.steps, stats);
			}
			StreamFrame::Error { message } => {
				warn!("Simulation reported an error: {message}");
				self.server_failed = true;
				observer.on_status(&StatusUpdate {
					status: Some("error".into()),
					message: Some(message),
				});
				self.set_phase(StreamPhase::Errored, observer);
			}
			StreamFrame::Unknown(kind) => {
				warn!("Ignoring unknown frame type {kind:?}");
			}
		}
	}

	/// The connection failed. Returns whether a reconnect makes sense:
	/// false once completed or after the server reported a failure.
	pub fn fail(&mut self, reason: &str, observer: &mut dyn StreamObserver) -> bool {
		if self.phase.is_terminal() || self.server_failed {
			return false;
		}
		warn!("Simulation stream failed: {reason}");
		self.set_phase(StreamPhase::Errored, observer);
		true
	}

	/// Enter the reconnecting phase; returns the 1-based attempt number.
	pub fn begin_reconnect(&mut self, observer: &mut dyn StreamObserver) -> u32 {
		self.reconnects += 1;
		let attempt = self.reconnects;
		self.set_phase(StreamPhase::Reconnecting { attempt }, observer);
		attempt
	}
}
