//! Enumerated attribute values of the TMX/TSX schema.
//!
//! All of them deserialize strictly: an unknown value fails the document
//! parse instead of falling back to a default.

use serde::Deserialize;

/// Map projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Square grid, the only projection the composer draws.
    #[default]
    Orthogonal,
    /// Diamond projection
    Isometric,
    /// Staggered isometric
    Staggered,
    /// Hexagonal grid
    Hexagonal,
}

impl Orientation {
    /// Attribute spelling of this value.
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Orthogonal => "orthogonal",
            Orientation::Isometric => "isometric",
            Orientation::Staggered => "staggered",
            Orientation::Hexagonal => "hexagonal",
        }
    }
}

/// Order in which tiles are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderOrder {
    /// Rows top to bottom, columns left to right.
    #[default]
    RightDown,
    /// Rows bottom to top, columns left to right.
    RightUp,
    /// Rows top to bottom, columns right to left.
    LeftDown,
    /// Rows bottom to top, columns right to left.
    LeftUp,
}

impl RenderOrder {
    /// Sort key for a cell so that ascending keys follow this render order.
    pub(crate) fn sort_key(self, x: u32, y: u32) -> (i64, i64) {
        let (x, y) = (x as i64, y as i64);
        match self {
            RenderOrder::RightDown => (y, x),
            RenderOrder::RightUp => (-y, x),
            RenderOrder::LeftDown => (y, -x),
            RenderOrder::LeftUp => (-y, -x),
        }
    }
}

/// Anchor of tile objects relative to their position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectAlignment {
    #[default]
    /// `unspecified`
    Unspecified,
    /// `topleft`
    TopLeft,
    /// `top`
    Top,
    /// `topright`
    TopRight,
    /// `left`
    Left,
    /// `center`
    Center,
    /// `right`
    Right,
    /// `bottomleft`
    BottomLeft,
    /// `bottom`
    Bottom,
    /// `bottomright`
    BottomRight,
}

/// Text encoding of a layer's `<data>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataEncoding {
    /// Little-endian u32 cells, base64 encoded.
    Base64,
    /// Comma separated gids (recognised, not decoded).
    Csv,
}

/// Compression applied to base64 layer data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// `gzip`
    Gzip,
    /// `zlib`
    Zlib,
    /// `zstd`
    Zstd,
}

impl Compression {
    /// Attribute spelling of this value.
    pub fn as_str(self) -> &'static str {
        match self {
            Compression::Gzip => "gzip",
            Compression::Zlib => "zlib",
            Compression::Zstd => "zstd",
        }
    }
}

/// Object drawing order inside an object group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawOrder {
    /// Document order.
    Index,
    /// Sorted by y coordinate.
    #[default]
    TopDown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_order_keys_sort_rows_and_columns() {
        let mut cells = vec![(0, 0), (1, 0), (0, 1), (1, 1)];

        cells.sort_by_key(|&(x, y)| RenderOrder::RightDown.sort_key(x, y));
        assert_eq!(cells, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);

        cells.sort_by_key(|&(x, y)| RenderOrder::LeftUp.sort_key(x, y));
        assert_eq!(cells, vec![(1, 1), (0, 1), (1, 0), (0, 0)]);

        cells.sort_by_key(|&(x, y)| RenderOrder::RightUp.sort_key(x, y));
        assert_eq!(cells, vec![(0, 1), (1, 1), (0, 0), (1, 0)]);
    }
}
