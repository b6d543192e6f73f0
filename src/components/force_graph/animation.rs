use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use wasm_bindgen::prelude::*;

const FRAME_MS: f64 = 16.0;
// keep the layout stable after the tab was in the background
const MAX_FRAME_MS: f64 = 100.0;

/// A `requestAnimationFrame` loop that runs until cancelled.
///
/// The handle is cheap to clone and safe to move into cleanup callbacks.
#[derive(Clone, Debug)]
pub struct AnimationLoop {
	cancelled: Arc<AtomicBool>,
}

impl AnimationLoop {
	/// Call `frame` with the elapsed milliseconds once per animation frame.
	pub fn start(mut frame: impl FnMut(f64) + 'static) -> Self {
		let cancelled = Arc::new(AtomicBool::new(false));
		let callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
		let (flag, callback_inner) = (cancelled.clone(), callback.clone());
		let mut last: Option<f64> = None;

		*callback.borrow_mut() = Some(Closure::new(move |now: f64| {
			if flag.load(Ordering::Relaxed) {
				return;
			}
			let dt = last.map_or(FRAME_MS, |prev| (now - prev).clamp(0.0, MAX_FRAME_MS));
			last = Some(now);
			frame(dt);
			if let Some(ref cb) = *callback_inner.borrow() {
				request_frame(cb);
			}
		}));
		if let Some(ref cb) = *callback.borrow() {
			request_frame(cb);
		}

		Self { cancelled }
	}

	/// Stop scheduling frames. The pending frame, if any, returns immediately.
	pub fn cancel(&self) {
		self.cancelled.store(true, Ordering::Relaxed);
	}
}

fn request_frame(cb: &Closure<dyn FnMut(f64)>) {
	if let Some(window) = web_sys::window() {
		let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
	}
}
