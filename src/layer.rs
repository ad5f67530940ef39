use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use macroquad::prelude::{vec2, Vec2};

use crate::error::MapError;
use crate::loader::tmx_loader::TmxLayer;
use crate::schema::{Compression, DataEncoding};
use crate::tile::{Tile, TileId};
use crate::tileset::Tileset;

/// The raw `<data>` payload of a tile layer, as written in the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerData {
    /// `None` means cells are written as `<tile>` child elements.
    pub encoding: Option<DataEncoding>,
    /// Compression tag; every value is rejected at decode
    pub compression: Option<Compression>,
    /// Payload text as written
    pub text: String,
}

/// A tile layer: document attributes plus its decoded, sparse tiles.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Unique layer id
    pub id: u32,
    /// Layer name, used in error messages and lookups
    pub name: String,
    /// Grid position of the layer, in cells. Shifts every cell when drawing.
    pub x: i32,
    /// See [`x`](Self::x)
    pub y: i32,
    /// Grid size of the layer, in cells
    pub width: u32,
    /// See [`width`](Self::width)
    pub height: u32,
    /// Stored, not applied when composing
    pub opacity: f32,
    /// `false` for `visible="0"`
    pub visible: bool,
    /// Pixel offset applied when drawing
    pub offset: Vec2,
    /// Undecoded payload
    pub data: LayerData,
    tiles: Vec<Tile>,
    decoded: bool,
}

/// Index of the tileset owning `gid`: the one with the largest
/// `first_gid <= gid`. `tilesets` must be sorted by `first_gid`.
pub fn owning_tileset<S>(tilesets: &[Tileset<S>], gid: u32) -> Option<usize> {
    tilesets
        .partition_point(|t| t.first_gid <= gid)
        .checked_sub(1)
}

/// Splits a byte stream into little-endian cells. A trailing partial
/// group is ignored.
pub fn cells(bytes: &[u8]) -> impl Iterator<Item = TileId> + '_ {
    bytes
        .chunks_exact(4)
        .map(|c| TileId::from_le_bytes([c[0], c[1], c[2], c[3]]))
}

impl Layer {
    pub(crate) fn from_tmx(raw: TmxLayer) -> Result<Self, MapError> {
        let data = match raw.data {
            Some(d) if !d.chunks.is_empty() => {
                return Err(MapError::unsupported(format!(
                    "chunked (infinite) data in layer '{}'",
                    raw.name
                )))
            }
            Some(d) => LayerData {
                encoding: d.encoding,
                compression: d.compression,
                text: d.text,
            },
            None => {
                return Err(MapError::payload(&raw.name, "layer has no <data> element"));
            }
        };
        Ok(Self {
            id: raw.id,
            name: raw.name,
            x: raw.x,
            y: raw.y,
            width: raw.width,
            height: raw.height,
            opacity: raw.opacity,
            visible: raw.visible,
            offset: vec2(raw.offset_x, raw.offset_y),
            data,
            tiles: Vec::new(),
            decoded: false,
        })
    }

    /// Builds an undecoded layer from a base64 payload.
    pub fn from_base64(name: impl Into<String>, width: u32, height: u32, payload: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            x: 0,
            y: 0,
            width,
            height,
            opacity: 1.0,
            visible: true,
            offset: Vec2::ZERO,
            data: LayerData {
                encoding: Some(DataEncoding::Base64),
                compression: None,
                text: payload.into(),
            },
            tiles: Vec::new(),
            decoded: false,
        }
    }

    /// Non-empty tiles in row-major order. Empty until decoded.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Whether [`decode`](Self::decode) has run successfully.
    pub fn is_decoded(&self) -> bool {
        self.decoded
    }

    /// The tile at grid cell `(x, y)`, if that cell is non-empty.
    pub fn tile_at(&self, x: u32, y: u32) -> Option<&Tile> {
        self.tiles
            .binary_search_by_key(&(y, x), |t| (t.y, t.x))
            .ok()
            .map(|i| &self.tiles[i])
    }

    /// The decoded byte stream of the payload.
    pub fn payload_bytes(&self) -> Result<Vec<u8>, MapError> {
        if let Some(c) = self.data.compression {
            return Err(MapError::payload(
                &self.name,
                format!("{} compression is not supported", c.as_str()),
            ));
        }
        match self.data.encoding {
            Some(DataEncoding::Base64) => {
                let text: String = self
                    .data
                    .text
                    .chars()
                    .filter(|c| !c.is_ascii_whitespace())
                    .collect();
                STANDARD
                    .decode(text)
                    .map_err(|e| MapError::payload(&self.name, format!("invalid base64: {e}")))
            }
            Some(DataEncoding::Csv) => Err(MapError::payload(
                &self.name,
                "csv encoding is not supported",
            )),
            None => Err(MapError::payload(
                &self.name,
                "<tile> element encoding is not supported",
            )),
        }
    }

    /// Decodes the payload into tiles, resolving each against `tilesets`
    /// (sorted by `first_gid`). Runs once; later calls are no-ops.
    ///
    /// Cells past `width * height` are dropped with a warning, or rejected
    /// when `strict_size` is set.
    pub fn decode<S>(&mut self, tilesets: &[Tileset<S>], strict_size: bool) -> Result<(), MapError> {
        if self.decoded {
            return Ok(());
        }
        let bytes = self.payload_bytes()?;
        if bytes.len() % 4 != 0 {
            log::debug!(
                "layer '{}': ignoring {} trailing payload bytes",
                self.name,
                bytes.len() % 4
            );
        }

        let capacity = self.width as usize * self.height as usize;
        let mut tiles = Vec::new();
        for (index, cell) in cells(&bytes).enumerate() {
            if index >= capacity {
                let surplus = bytes.len() / 4 - capacity;
                if strict_size {
                    return Err(MapError::payload(
                        &self.name,
                        format!("{surplus} cells beyond {}x{}", self.width, self.height),
                    ));
                }
                log::warn!(
                    "layer '{}': dropping {surplus} cells beyond {}x{}",
                    self.name,
                    self.width,
                    self.height
                );
                break;
            }

            let (gid, flip) = cell.decode();
            if gid == 0 {
                continue;
            }
            let ts_idx = owning_tileset(tilesets, gid).ok_or_else(|| MapError::UnresolvedTile {
                layer: self.name.clone(),
                cell: index,
                gid,
            })?;

            let i = index as u32;
            tiles.push(Tile {
                gid,
                local_id: gid - tilesets[ts_idx].first_gid,
                x: i % self.width,
                y: i / self.width,
                flip,
                tileset: ts_idx,
            });
        }

        log::debug!("layer '{}': {} non-empty cells", self.name, tiles.len());
        self.tiles = tiles;
        self.decoded = true;
        Ok(())
    }
}
