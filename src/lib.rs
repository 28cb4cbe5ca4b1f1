pub mod briefing;
pub mod core;
pub mod geometry;
pub mod parameters;
pub mod render;
pub mod runner;
