// handlers/mod.rs - Handlers grouped by security tier
//
// Public (no auth) → Protected (bearer JWT via the AuthUser extractor)
pub mod protected;
pub mod public;
