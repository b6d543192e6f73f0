use std::time::Duration;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, info, warn};

use crate::components::force_graph::ForceGraphCanvas;
use crate::services::{DOCUMENT_URL, fetch_document, upload_images};
use crate::similarity::{ConfigUpdate, GraphConfig, GraphContext};

// give the pipeline time to rewrite the document after an upload
const RELOAD_AFTER_UPLOAD: Duration = Duration::from_millis(700);

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let context = RwSignal::new(GraphContext::new(GraphConfig::default()).unwrap_or_else(|err| {
		error!("{err}");
		GraphContext::default()
	}));
	let reset_requests = RwSignal::new(0u32);
	let status = RwSignal::new(String::new());
	let upload_ref = NodeRef::<leptos::html::Input>::new();

	// failures leave the current graph on screen
	let reload = move || {
		spawn_local(async move {
			match fetch_document(DOCUMENT_URL).await {
				Ok(text) => context.update(|c| {
					let _ = c.load_json(&text);
				}),
				Err(err) => error!("{err}"),
			}
		});
	};
	Effect::new(move |_| reload());

	let apply = move |update: ConfigUpdate| {
		context.update(|c| {
			let _ = c.apply(update);
		});
	};
	let apply_number = move |raw: String, update: fn(f64) -> ConfigUpdate| {
		match raw.parse::<f64>() {
			Ok(value) => apply(update(value)),
			Err(err) => warn!("ignoring slider value: {err}"),
		}
	};

	let on_upload = move |_| {
		let files = upload_ref
			.get()
			.and_then(|input| input.files())
			.filter(|files| files.length() > 0);
		let Some(files) = files else {
			status.set("No files selected".into());
			return;
		};
		status.set("Uploading...".into());
		spawn_local(async move {
			match upload_images(&files).await {
				Ok(resp) if resp.success => {
					info!("uploaded {:?}", resp.saved);
					status.set("Uploaded".into());
					set_timeout(reload, RELOAD_AFTER_UPLOAD);
				}
				Ok(_) => status.set("Upload failed".into()),
				Err(err) => {
					error!("{err}");
					status.set("Upload failed".into());
				}
			}
		});
	};

	let summary = move || {
		context.with(|c| {
			let clusters = c.clusters().map_or(0, |a| a.cluster_count());
			format!(
				"{} faces, {} links, {} clusters",
				c.node_count(),
				c.links().len(),
				clusters
			)
		})
	};
	let preview = move || context.with(|c| c.selected_node().map(|n| n.img.clone()));

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

			<div class="fullscreen-graph">
				<ForceGraphCanvas context=context reset_requests=reset_requests fullscreen=true />
				<div class="graph-overlay">
					<h1>"Face Similarity Graph"</h1>
					<p class="subtitle">{summary}</p>

					<label>
						<input
							type="checkbox"
							prop:checked=move || context.with(|c| c.config().links_visible)
							on:change=move |ev| apply(ConfigUpdate::LinksVisible(event_target_checked(&ev)))
						/>
						"Show links"
					</label>
					<label>
						"Link width"
						<input
							type="range"
							min="0.5"
							max="5"
							step="0.5"
							prop:value=move || context.with(|c| c.config().link_width.to_string())
							on:input=move |ev| apply_number(event_target_value(&ev), ConfigUpdate::LinkWidth)
						/>
					</label>
					<label>
						"Link color"
						<input
							type="color"
							prop:value=move || context.with(|c| c.config().link_color.clone())
							on:input=move |ev| apply(ConfigUpdate::LinkColor(event_target_value(&ev)))
						/>
					</label>
					<label>
						"Node distance"
						<input
							type="range"
							min="20"
							max="400"
							step="10"
							prop:value=move || context.with(|c| c.config().node_distance.to_string())
							on:change=move |ev| apply_number(event_target_value(&ev), ConfigUpdate::NodeDistance)
						/>
					</label>
					<label>
						<input
							type="checkbox"
							prop:checked=move || context.with(|c| c.config().auto_rotate)
							on:change=move |ev| apply(ConfigUpdate::AutoRotate(event_target_checked(&ev)))
						/>
						"Auto-rotate"
					</label>

					<button on:click=move |_| reset_requests.update(|n| *n = n.wrapping_add(1))>
						"Reset camera"
					</button>
					<button on:click=move |_| reload()>"Reload"</button>

					<div class="upload">
						<input node_ref=upload_ref type="file" multiple=true accept="image/*" />
						<button on:click=on_upload>"Upload"</button>
						<span class="status">{move || status.get()}</span>
					</div>
				</div>

				{move || {
					preview()
						.map(|src| {
							view! {
								<div class="preview-popup">
									<img src=src alt="Selected face" />
									<button on:click=move |_| {
										context.update(|c| {
											c.clear_selection();
										})
									}>"Close"</button>
								</div>
							}
						})
				}}
			</div>
		</ErrorBoundary>
	}
}
