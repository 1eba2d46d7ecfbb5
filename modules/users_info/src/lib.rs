// === PUBLIC CONTRACT ===
// Transport-agnostic models shared by the REST surface and the storage adapter
pub mod contract;

// Re-export the public contract components
pub use contract::model;

// === MODULE DEFINITION ===
pub mod module;
pub use module::UsersInfo;

// === INTERNAL MODULES ===
// WARNING: These modules are internal implementation details!
// They are exposed only for comprehensive testing and should NOT be used by external consumers.
// Only use the `contract` module for stable public APIs.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
