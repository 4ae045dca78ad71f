pub mod arc;
pub mod circle;
pub mod edge_map;
pub mod edge_segment;
pub mod ellipse;
pub mod image;
pub mod line;
pub mod point;

pub use arc::Arc;
pub use circle::Circle;
pub use edge_map::EdgeMap;
pub use edge_segment::{EdgeSegment, Edgel};
pub use ellipse::Ellipse;
pub use image::GrayImage;
pub use line::{Line, LineModel};
pub use point::{Point, Position};
