use macroquad::prelude::{Rect, Vec2};

use crate::tile::Flip;

/// One tile to draw: where it comes from and where it lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    /// Index into `Map::layers`
    pub layer_index: usize,
    /// Index into `Map::tilesets`
    pub tileset_index: usize,
    /// Tile index inside the tileset
    pub local_id: u32,
    /// Grid cell of the tile in its layer
    pub cell: (u32, u32),
    /// Rectangle in the tileset's atlas image
    pub src: Rect,
    /// Top-left of the tile on the target surface
    pub dest: Vec2,
    /// Orientation applied when drawing
    pub flip: Flip,
}
