// handlers/public/mod.rs - Public handlers (no JWT required)
//
// Service description, health probe and token acquisition. The proxy-tier
// basic auth gate, when configured, still applies.

pub mod health;
pub mod login;

pub use health::{health, root};
pub use login::login;
