pub mod body;
pub mod entity;
pub mod shape;
pub mod sound;
pub mod sprite;
pub mod tags;
