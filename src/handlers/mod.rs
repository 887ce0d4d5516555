// handlers/mod.rs - Two-tier handler layout
//
// Public (no JWT) -> Protected (JWT required). Both tiers sit behind the
// optional proxy basic-auth gate.

pub mod protected; // /api/* except login
pub mod public; // /, /health, /api/login
