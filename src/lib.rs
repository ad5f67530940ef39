#![warn(missing_docs)]

//! Tiled TMX map and tileset loader with viewport composition for Macroquad.
//!
//! [`Map::load`] parses a `.tmx` document, resolves each tileset into a
//! sliced atlas and decodes every tile layer. [`Composer`] turns the decoded
//! layers into images, either whole or restricted to a camera rectangle.
//! Collision checks run against object groups through [`Map::point_in`] and
//! [`Map::rect_intersects`].

mod config;
mod error;
mod layer;
mod map;
mod object;
mod schema;
mod surface;
mod tile;
mod tileset;
mod loader {
    pub mod tmx_loader;
}
mod render {
    pub mod command;
    pub mod composer;
    pub mod cull;
}
mod spatial {
    pub mod query;
}

pub use config::{ComposerConfig, LoadOptions};
pub use error::{ErrorKind, MapError};
pub use layer::{cells, owning_tileset, Layer, LayerData};
pub use map::Map;
pub use object::{MapObject, ObjectGroup};
pub use render::command::DrawCommand;
pub use render::composer::{Camera, Composer};
pub use render::cull::{clip_view, visible_window, TileWindow};
pub use schema::{Compression, DataEncoding, DrawOrder, ObjectAlignment, Orientation, RenderOrder};
pub use spatial::query::{aabb_overlaps, point_in, rect_intersects};
pub use surface::{FileImageProvider, ImageProvider, ImageSurface, MemoryImageProvider};
pub use tile::{Flip, Tile, TileId, FLIP_D, FLIP_H, FLIP_V, GID_MASK};
pub use tileset::Tileset;
