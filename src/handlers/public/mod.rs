// handlers/public/mod.rs - Public handlers (no authentication)
pub mod market;
pub mod news;
pub mod system;
pub mod weather;
