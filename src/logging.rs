//! Subscriber setup for the browser build.

/// Installs `tracing-wasm` as the global subscriber, once. Later calls do nothing.
///
/// Native hosts install their own subscriber, so this is a no-op there.
pub fn init() {
	#[cfg(target_arch = "wasm32")]
	{
		static INIT: std::sync::Once = std::sync::Once::new();
		INIT.call_once(tracing_wasm::set_as_global_default);
	}
}
