use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::animation::AnimationLoop;
use super::render;
use super::state::ForceGraphState;
use crate::similarity::GraphContext;

type SharedState = Rc<RefCell<Option<ForceGraphState>>>;

fn window_size(window: &Window) -> (f64, f64) {
	(
		window
			.inner_width()
			.ok()
			.and_then(|v| v.as_f64())
			.unwrap_or(800.0),
		window
			.inner_height()
			.ok()
			.and_then(|v| v.as_f64())
			.unwrap_or(600.0),
	)
}

fn local_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Canvas view of the graph held by `context`.
///
/// Rebuilds its layout whenever a new graph is loaded, and re-frames the
/// camera each time `reset_requests` changes.
#[component]
pub fn ForceGraphCanvas(
	context: RwSignal<GraphContext>,
	#[prop(into)] reset_requests: Signal<u32>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let generation = Memo::new(move |_| context.with(|c| c.generation()));
	let node_distance = Memo::new(move |_| context.with(|c| c.config().node_distance));

	let (state_init, resize_cb_init) = (state.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("canvas has no 2d context");
			return;
		};
		let (data, distance) =
			context.with_untracked(|c| (c.graph_data(), c.config().node_distance));
		*state_init.borrow_mut() = Some(ForceGraphState::new(data, distance, w, h));

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let state_anim = state_init.clone();
		let animation = AnimationLoop::start(move |dt| {
			let Some(auto_rotate) = context.try_with_untracked(|c| c.config().auto_rotate) else {
				return;
			};
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(dt, auto_rotate);
				context.with_untracked(|c| render::render(s, &c.styling(), &ctx));
			}
		});
		on_cleanup(move || animation.cancel());
	});

	// a new load replaces the layout wholesale; the camera stays put
	let state_reload = state.clone();
	Effect::new(move |prev: Option<()>| {
		generation.track();
		if prev.is_none() {
			return;
		}
		if let Some(ref mut s) = *state_reload.borrow_mut() {
			let (data, distance) =
				context.with_untracked(|c| (c.graph_data(), c.config().node_distance));
			debug!("rebuilding layout: {} nodes", data.nodes.len());
			let camera = s.camera;
			*s = ForceGraphState::new(data, distance, s.width, s.height);
			s.camera = camera;
		}
	});

	let state_distance = state.clone();
	Effect::new(move |prev: Option<()>| {
		let distance = node_distance.get();
		if prev.is_none() {
			return;
		}
		if let Some(ref mut s) = *state_distance.borrow_mut() {
			s.set_node_distance(distance);
		}
	});

	let state_reset = state.clone();
	Effect::new(move |prev: Option<()>| {
		reset_requests.track();
		if prev.is_none() {
			return;
		}
		if let Some(ref mut s) = *state_reset.borrow_mut() {
			s.reset_camera();
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.begin_drag(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.drag_to(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		let hit = {
			let mut guard = state_mu.borrow_mut();
			let Some(s) = guard.as_mut() else {
				return;
			};
			if !s.end_drag() {
				return;
			}
			s.node_at_position(x, y)
		};
		// clicking empty space clears the selection
		match hit {
			Some(id) => context.update(|c| {
				c.select(&id);
			}),
			None => context.update(|c| {
				c.clear_selection();
			}),
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.end_drag();
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.dolly(if ev.delta_y() > 0.0 { 1.1 } else { 0.9 });
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
