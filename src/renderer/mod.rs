//! Draw-list construction
//!
//! Builds a [`Frame`] of colored screen-space triangles plus text items each
//! tick. The host uploads `Frame::vertices` with the [`Vertex::desc`] layout
//! and draws the text with its own font.

pub mod palette;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use palette::Palette;
pub use scene::{Frame, Scene, TextItem};
pub use vertex::Vertex;
