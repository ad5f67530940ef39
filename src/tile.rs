//! Packed cell encoding and decoded tile records.

/// Horizontal flip flag (bit 31).
pub const FLIP_H: u32 = 0x8000_0000;
/// Vertical flip flag (bit 30).
pub const FLIP_V: u32 = 0x4000_0000;
/// Diagonal flip flag (bit 29).
pub const FLIP_D: u32 = 0x2000_0000;
/// Lower 29 bits carry the global tile id.
pub const GID_MASK: u32 = !(FLIP_H | FLIP_V | FLIP_D);

/// A raw 32-bit cell value: global tile id plus orientation flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileId(pub u32);

impl TileId {
    /// Packs a gid and flags. Bits of `gid` above the mask are dropped.
    pub fn encode(gid: u32, flip: Flip) -> Self {
        let mut raw = gid & GID_MASK;
        if flip.horizontal {
            raw |= FLIP_H;
        }
        if flip.vertical {
            raw |= FLIP_V;
        }
        if flip.diagonal {
            raw |= FLIP_D;
        }
        TileId(raw)
    }

    /// Reads one little-endian cell.
    #[inline]
    pub fn from_le_bytes(bytes: [u8; 4]) -> Self {
        TileId(u32::from_le_bytes(bytes))
    }

    /// The cell value as stored, flags included.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Global tile id with the flag bits stripped. 0 means empty.
    #[inline]
    pub fn gid(self) -> u32 {
        self.0 & GID_MASK
    }

    /// Whether the cell is empty (gid 0).
    #[inline]
    pub fn is_empty(self) -> bool {
        self.gid() == 0
    }

    /// Horizontal flip flag (bit 31).
    #[inline]
    pub fn flip_h(self) -> bool {
        (self.0 & FLIP_H) != 0
    }

    /// Vertical flip flag (bit 30).
    #[inline]
    pub fn flip_v(self) -> bool {
        (self.0 & FLIP_V) != 0
    }

    /// Diagonal flip flag (bit 29).
    #[inline]
    pub fn flip_d(self) -> bool {
        (self.0 & FLIP_D) != 0
    }

    /// All three orientation flags.
    #[inline]
    pub fn flip(self) -> Flip {
        Flip {
            horizontal: self.flip_h(),
            vertical: self.flip_v(),
            diagonal: self.flip_d(),
        }
    }

    /// Splits the cell into `(gid, flags)`. Total, never fails.
    #[inline]
    pub fn decode(self) -> (u32, Flip) {
        (self.gid(), self.flip())
    }
}

/// Orientation flags of a placed tile.
///
/// Applied as in Tiled: the diagonal flip (anti-diagonal transpose) first,
/// then the horizontal and vertical mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flip {
    /// Mirror around the vertical axis
    pub horizontal: bool,
    /// Mirror around the horizontal axis
    pub vertical: bool,
    /// Swap x and y
    pub diagonal: bool,
}

impl Flip {
    /// No flags set.
    pub const NONE: Flip = Flip {
        horizontal: false,
        vertical: false,
        diagonal: false,
    };

    /// Whether no flag is set.
    pub fn is_none(self) -> bool {
        self == Flip::NONE
    }
}

/// A decoded, tileset-resolved, non-empty cell of a tile layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Global id with flags stripped, never 0
    pub gid: u32,
    /// `gid - tileset.first_gid`, index into the owning tileset's atlas
    pub local_id: u32,
    /// Column within the layer
    pub x: u32,
    /// Row within the layer
    pub y: u32,
    /// Orientation flags
    pub flip: Flip,
    /// Index of the owning tileset in [`Map::tilesets`](crate::Map::tilesets)
    pub tileset: usize,
}
