pub mod collision;
pub mod config;
pub mod engine;
pub mod fault;
pub mod physics;
pub mod scene;
pub mod time;
pub mod world;
