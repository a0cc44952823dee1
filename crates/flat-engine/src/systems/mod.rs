pub mod dispatch;
pub mod raster;
pub mod render;
pub mod text;
