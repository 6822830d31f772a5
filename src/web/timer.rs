use crate::{
    error::{Result, SwimlaneError},
    storage::Timer,
};
use std::time::Duration;
use tracing::warn;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::Window;

/// One-shot tasks on `window.setTimeout`
pub struct WindowTimer {
    window: Window,
}

impl WindowTimer {
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    pub fn from_window() -> Result<Self> {
        web_sys::window()
            .map(Self::new)
            .ok_or_else(|| SwimlaneError::ConfigError("no global window".to_string()))
    }
}

impl Timer for WindowTimer {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        // setTimeout takes a signed 32-bit delay. Longer waits fire early and
        // the expiry check re-arms itself.
        let millis = delay.as_millis().min(i32::MAX as u128) as i32;
        let callback = Closure::once_into_js(move || task());
        let function: &js_sys::Function = callback.unchecked_ref();
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(function, millis)
        {
            warn!(error = ?err, "failed to schedule expiry timer");
        }
    }
}
