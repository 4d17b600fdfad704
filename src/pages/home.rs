use leptos::prelude::*;

/// Landing page: jump to a project's graphs or a simulation run.
#[component]
pub fn Home() -> impl IntoView {
	let project_id = RwSignal::new(String::new());
	let simulation_id = RwSignal::new(String::new());

	let project_link = move |target: &'static str| {
		move || {
			let id = project_id.get();
			let id = id.trim();
			if id.is_empty() {
				"#".to_string()
			} else {
				format!("/projects/{id}/{target}")
			}
		}
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="home">
				<h1>"AI supply-chain security"</h1>
				<p class="subtitle">"Inspect a project's component graph or follow a live attack simulation."</p>

				<section class="home-card">
					<h2>"Project graphs"</h2>
					<input
						type="text"
						placeholder="Project ID"
						prop:value=move || project_id.get()
						on:input=move |ev| project_id.set(event_target_value(&ev))
					/>
					<a class="button" href=project_link("dependencies")>"Dependency graph"</a>
					<a class="button" href=project_link("aibom")>"AIBOM graph"</a>
				</section>

				<section class="home-card">
					<h2>"Attack simulation"</h2>
					<input
						type="text"
						placeholder="Simulation ID"
						prop:value=move || simulation_id.get()
						on:input=move |ev| simulation_id.set(event_target_value(&ev))
					/>
					<a
						class="button"
						href=move || {
							let id = simulation_id.get();
							if id.trim().is_empty() { "#".to_string() } else { format!("/simulations/{}", id.trim()) }
						}
					>
						"Open theater"
					</a>
				</section>
			</div>
		</ErrorBoundary>
	}
}
