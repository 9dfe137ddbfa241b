pub mod coin;
pub mod draft;
pub mod holding;
pub mod session;
pub mod settings;
pub mod stats;
