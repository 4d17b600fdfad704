use leptos::prelude::*;
use log::error;

use crate::config::AppConfig;
use crate::severity::Severity;

use super::socket::AttackSocket;
use super::stream::{StreamObserver, StreamPhase};
use super::types::{AttackStep, StatusUpdate, StepStats};

/// Mirrors stream progress into signals for the view.
struct TheaterObserver {
	steps: RwSignal<Vec<AttackStep>>,
	current: RwSignal<Option<usize>>,
	phase: RwSignal<StreamPhase>,
	status: RwSignal<Option<String>>,
	summary: RwSignal<Option<StepStats>>,
	anomalies: RwSignal<usize>,
	on_complete: Option<Callback<(Vec<AttackStep>, StepStats)>>,
}

impl StreamObserver for TheaterObserver {
	fn on_status(&mut self, update: &StatusUpdate) {
		if let Some(text) = update.text() {
			let _ = self.status.try_set(Some(text.to_string()));
		}
	}

	fn on_step(&mut self, step: &AttackStep, index: usize) {
		let _ = self.steps.try_update(|steps| steps.push(step.clone()));
		let _ = self.current.try_set(Some(index));
	}

	fn on_complete(&mut self, steps: &[AttackStep], stats: StepStats) {
		let _ = self.summary.try_set(Some(stats));
		if let Some(cb) = self.on_complete.take() {
			cb.run((steps.to_vec(), stats));
		}
	}

	fn on_phase(&mut self, phase: StreamPhase) {
		let _ = self.phase.try_set(phase);
	}

	fn on_sequence_anomaly(&mut self, count: usize) {
		let _ = self.anomalies.try_set(count);
	}
}

fn severity_class(severity: Severity) -> String {
	format!("severity severity-{}", severity.as_str())
}

#[component]
fn StepEntry(step: AttackStep, #[prop(into)] active: Signal<bool>) -> impl IntoView {
	let outcome = if step.success { "SUCCESS" } else { "BLOCKED" };
	let outcome_class = if step.success { "outcome outcome-success" } else { "outcome outcome-blocked" };
	let severity = step.severity;

	view! {
		<div class="theater-step" class:active=move || active.get()>
			<div class="theater-step-header">
				<span class="step-number">{format!("[{:02}]", step.step)}</span>
				<span class="step-name">{step.name.clone()}</span>
				<span class=severity_class(severity)>{severity.as_str().to_uppercase()}</span>
				<span class=outcome_class>{outcome}</span>
				<span class="step-time">{step.timestamp.clone()}</span>
			</div>
			<p class="step-description">{step.description.clone()}</p>
			<div class="step-io">
				<span class="io-label">"> payload"</span>
				<pre class="io-payload">{step.payload.clone()}</pre>
				<span class="io-label">"< response"</span>
				<pre class="io-response">{step.response.clone()}</pre>
			</div>
			{(!step.impact.is_empty()).then(|| view! { <p class="step-impact">"Impact: " {step.impact.clone()}</p> })}
		</div>
	}
}

/// Live terminal of a running attack simulation.
#[component]
pub fn AttackTheater(
	#[prop(into)] simulation_id: Signal<String>,
	#[prop(optional)] on_complete: Option<Callback<(Vec<AttackStep>, StepStats)>>,
) -> impl IntoView {
	let config = use_context::<AppConfig>().unwrap_or_default();
	let steps = RwSignal::new(Vec::<AttackStep>::new());
	let current = RwSignal::new(None::<usize>);
	let phase = RwSignal::new(StreamPhase::Connecting);
	let status = RwSignal::new(None::<String>);
	let summary = RwSignal::new(None::<StepStats>);
	let anomalies = RwSignal::new(0usize);
	let socket = StoredValue::new_local(None::<AttackSocket>);
	let log_ref = NodeRef::<leptos::html::Div>::new();

	Effect::new(move |_| {
		let id = simulation_id.get();
		socket.update_value(|s| {
			s.take();
		});
		steps.set(Vec::new());
		current.set(None);
		phase.set(StreamPhase::Connecting);
		status.set(None);
		summary.set(None);
		anomalies.set(0);

		let observer = TheaterObserver {
			steps,
			current,
			phase,
			status,
			summary,
			anomalies,
			on_complete,
		};
		match AttackSocket::connect(
			config.simulation_socket_url(&id),
			config.reconnect,
			Box::new(observer),
		) {
			Ok(s) => socket.set_value(Some(s)),
			Err(err) => {
				error!("Could not open simulation {id}: {err}");
				status.set(Some(err.to_string()));
				phase.set(StreamPhase::Errored);
			}
		}
	});

	on_cleanup(move || {
		let _ = socket.try_update_value(|s| {
			s.take();
		});
	});

	// Keep the newest step in view
	Effect::new(move |_| {
		if steps.with(|s| s.is_empty()) {
			return;
		}
		request_animation_frame(move || {
			if let Some(el) = log_ref.get_untracked() {
				el.set_scroll_top(el.scroll_height());
			}
		});
	});

	let running = Memo::new(move |_| steps.with(|s| StepStats::from_steps(s)));

	view! {
		<section class="attack-theater">
			<header class="theater-header">
				<span class="theater-phase" class:live=move || phase.get() == StreamPhase::Streaming>
					{move || match phase.get() {
						StreamPhase::Reconnecting { attempt } => format!("Reconnecting (attempt {attempt})"),
						other => other.label().to_string(),
					}}
				</span>
				<span class="theater-status">{move || status.get().unwrap_or_default()}</span>
				<span class="theater-counts">
					{move || {
						let stats = running.get();
						format!(
							"{} steps · {} successful · {} critical",
							stats.total,
							stats.successful,
							stats.critical,
						)
					}}
				</span>
				{move || {
					let count = anomalies.get();
					(count > 0)
						.then(|| view! { <span class="theater-anomalies">{format!("{count} out of sequence")}</span> })
				}}
			</header>

			<div class="theater-log" node_ref=log_ref>
				<For
					each=move || steps.get().into_iter().enumerate()
					key=|(index, _)| *index
					children=move |(index, step)| {
						view! { <StepEntry step=step active=Signal::derive(move || current.get() == Some(index)) /> }
					}
				/>
				{move || {
					(steps.with(|s| s.is_empty()) && phase.get() != StreamPhase::Errored)
						.then(|| view! { <p class="theater-waiting">"Waiting for the first step..."</p> })
				}}
			</div>

			{move || {
				summary
					.get()
					.map(|stats| {
						view! {
							<footer class="theater-summary">
								<h3>"Simulation complete"</h3>
								<dl>
									<dt>"Total steps"</dt>
									<dd>{stats.total}</dd>
									<dt>"Successful"</dt>
									<dd>{stats.successful}</dd>
									<dt>"Critical"</dt>
									<dd>{stats.critical}</dd>
									<dt>"Success rate"</dt>
									<dd>{format!("{:.0}%", stats.success_rate())}</dd>
								</dl>
							</footer>
						}
					})
			}}
		</section>
	}
}
