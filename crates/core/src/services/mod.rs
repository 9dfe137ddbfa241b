pub mod aggregator;
pub mod normalizer;
pub mod reconciler;
#[cfg(not(target_arch = "wasm32"))]
pub mod scheduler;
pub mod store;
