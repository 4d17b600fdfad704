use leptos::prelude::*;
use leptos_router::hooks::use_params_map;
use log::info;

use crate::components::attack_theater::{AttackStep, AttackTheater, StepStats};

fn verdict(stats: &StepStats) -> (&'static str, &'static str) {
	if stats.critical > 0 {
		("verdict verdict-critical", "Critical attacks succeeded against the target.")
	} else if stats.successful > 0 {
		("verdict verdict-warning", "Some attacks succeeded; review the steps above.")
	} else {
		("verdict verdict-ok", "Every attack step was blocked.")
	}
}

/// Live view of one attack simulation run.
#[component]
pub fn SimulationPage() -> impl IntoView {
	let params = use_params_map();
	let simulation_id =
		Signal::derive(move || params.read().get("simulation_id").unwrap_or_default());
	let finished = RwSignal::new(None::<StepStats>);

	let on_complete = Callback::new(move |(steps, stats): (Vec<AttackStep>, StepStats)| {
		info!("Simulation finished after {} steps", steps.len());
		finished.set(Some(stats));
	});

	view! {
		<div class="simulation-page">
			<header class="page-header">
				<h1>"Attack simulation"</h1>
				<p class="subtitle">"Run " {move || simulation_id.get()}</p>
			</header>
			<AttackTheater simulation_id=simulation_id on_complete=on_complete />
			{move || {
				finished
					.get()
					.map(|stats| {
						let (class, text) = verdict(&stats);
						view! { <p class=class>{text}</p> }
					})
			}}
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn verdict_escalates_with_critical_successes() {
		let stats = |successful, critical| StepStats {
			total: 5,
			successful,
			critical,
		};
		assert_eq!(verdict(&stats(0, 0)).0, "verdict verdict-ok");
		assert_eq!(verdict(&stats(2, 0)).0, "verdict verdict-warning");
		assert_eq!(verdict(&stats(2, 1)).0, "verdict verdict-critical");
	}
}
