use std::path::{Path, PathBuf};

use macroquad::prelude::{Image, Rect};

use crate::error::MapError;
use crate::loader::tmx_loader::{read_tileset_file, TmxTileset};
use crate::schema::ObjectAlignment;
use crate::surface::{ImageProvider, ImageSurface};

/// A resolved tileset: geometry, source image and its sliced atlas.
///
/// Immutable once built. Owns the gids `first_gid..next.first_gid`, where
/// `next` is the following tileset of the map.
pub struct Tileset<S = Image> {
    /// Tileset name
    pub name: String,
    /// `source` attribute of the map's reference, `None` for inline tilesets
    pub source: Option<String>,
    /// First global id owned
    pub first_gid: u32,
    /// Tile width in pixels
    pub tile_width: u32,
    /// Tile height in pixels
    pub tile_height: u32,
    /// Pixels between tiles
    pub spacing: u32,
    /// Pixels around the tile grid
    pub margin: u32,
    /// Number of tiles in the atlas
    pub tile_count: u32,
    /// Tiles per atlas row
    pub columns: u32,
    /// Anchor of tile objects
    pub object_alignment: ObjectAlignment,
    /// Format version of the description
    pub version: String,
    /// Tiled version that wrote the description
    pub tiled_version: String,
    /// Resolved path of the atlas image
    pub image_path: PathBuf,
    image: S,
    rects: Vec<Rect>,
    tiles: Vec<S>,
}

impl<S: ImageSurface> Tileset<S> {
    /// Atlas rectangle of a local tile id.
    pub fn atlas_rect(&self, local_id: u32) -> Option<Rect> {
        self.rects.get(local_id as usize).copied()
    }

    /// Pre-sliced sub-image of a local tile id.
    pub fn tile_image(&self, local_id: u32) -> Option<&S> {
        self.tiles.get(local_id as usize)
    }

    /// The whole atlas image.
    pub fn image(&self) -> &S {
        &self.image
    }

    /// Number of sliced tiles (equals `tile_count`).
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the atlas holds no tiles.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Atlas rectangle of tile `index`, or `None` on arithmetic overflow.
fn atlas_origin(index: u32, columns: u32, tw: u32, th: u32, spacing: u32, margin: u32) -> Option<(u32, u32)> {
    let col = index % columns;
    let row = index / columns;
    let x = col.checked_mul(tw.checked_add(spacing)?)?.checked_add(margin)?;
    let y = row.checked_mul(th.checked_add(spacing)?)?.checked_add(margin)?;
    Some((x, y))
}

/// Tiles of size `tile` that fit along `extent`, for descriptions that omit
/// `columns` or `tilecount`. `None` on arithmetic overflow.
fn fitting_tiles(extent: u32, tile: u32, spacing: u32, margin: u32) -> Option<u32> {
    if tile == 0 {
        return Some(0);
    }
    let usable = extent.saturating_sub(margin.checked_mul(2)?);
    usable.checked_add(spacing)?.checked_div(tile.checked_add(spacing)?)
}

/// Loads the description behind a map's `<tileset>` reference (external
/// file or inline), loads its image and slices every tile.
pub(crate) fn resolve_tileset<P: ImageProvider>(
    reference: TmxTileset,
    map_dir: &Path,
    provider: &mut P,
) -> Result<Tileset<P::Surface>, MapError> {
    let first_gid = reference
        .first_gid
        .ok_or_else(|| MapError::InvalidMap("tileset reference without firstgid".into()))?;
    if first_gid == 0 {
        return Err(MapError::InvalidMap(
            "tileset firstgid must be at least 1".into(),
        ));
    }

    let source = reference.source.clone();
    let (desc, base_dir) = match &source {
        Some(src) => {
            let path = map_dir.join(src);
            let desc = read_tileset_file(&path)?;
            let dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| map_dir.to_path_buf());
            (desc, dir)
        }
        None => (reference, map_dir.to_path_buf()),
    };

    let label = if !desc.name.is_empty() {
        desc.name.clone()
    } else {
        source.clone().unwrap_or_else(|| format!("firstgid {first_gid}"))
    };

    let tile_width = desc
        .tile_width
        .ok_or_else(|| MapError::resolution(&label, "missing tilewidth"))?;
    let tile_height = desc
        .tile_height
        .ok_or_else(|| MapError::resolution(&label, "missing tileheight"))?;
    let img = desc
        .image
        .ok_or_else(|| MapError::unsupported(format!("image collection tileset '{label}'")))?;

    let image_path = base_dir.join(&img.source);
    let image = provider
        .load_image(&image_path)
        .map_err(|e| MapError::resolution(&label, format!("{e:#}")))?;
    let (iw, ih) = image.dimensions();
    if img.width.is_some_and(|w| w != iw) || img.height.is_some_and(|h| h != ih) {
        log::warn!(
            "tileset '{label}': image {} is {iw}x{ih}, description says {:?}x{:?}",
            image_path.display(),
            img.width,
            img.height
        );
    }

    let (spacing, margin) = (desc.spacing, desc.margin);
    let overflow = || MapError::resolution(&label, "derived atlas geometry overflows");
    let columns = match desc.columns {
        Some(n) => n,
        None => fitting_tiles(iw, tile_width, spacing, margin).ok_or_else(overflow)?,
    };
    let tile_count = match desc.tile_count {
        Some(n) => n,
        None => fitting_tiles(ih, tile_height, spacing, margin)
            .and_then(|rows| rows.checked_mul(columns))
            .ok_or_else(overflow)?,
    };

    if tile_count > 0 {
        if columns == 0 {
            return Err(MapError::resolution(&label, "columns is 0 but tilecount is not"));
        }
        if tile_width == 0 || tile_height == 0 {
            return Err(MapError::resolution(&label, "tile size is 0"));
        }
    }

    // Grown per tile: the bounds check below rejects an inflated tilecount
    // before it can turn into a huge allocation.
    let mut rects = Vec::new();
    let mut tiles = Vec::new();
    for i in 0..tile_count {
        let (x, y) = atlas_origin(i, columns, tile_width, tile_height, spacing, margin)
            .ok_or_else(|| MapError::resolution(&label, format!("tile {i}: atlas offset overflows")))?;
        let fits = x.checked_add(tile_width).is_some_and(|r| r <= iw)
            && y.checked_add(tile_height).is_some_and(|b| b <= ih);
        if !fits {
            return Err(MapError::resolution(
                &label,
                format!(
                    "tile {i} at ({x},{y}) size {tile_width}x{tile_height} exceeds image {iw}x{ih}"
                ),
            ));
        }
        let rect = Rect::new(x as f32, y as f32, tile_width as f32, tile_height as f32);
        tiles.push(image.sub_view(rect));
        rects.push(rect);
    }
    log::debug!("tileset '{label}': {} tiles pre-loaded", tiles.len());

    Ok(Tileset {
        name: desc.name,
        source,
        first_gid,
        tile_width,
        tile_height,
        spacing,
        margin,
        tile_count,
        columns,
        object_alignment: desc.object_alignment,
        version: desc.version,
        tiled_version: desc.tiled_version,
        image_path,
        image,
        rects,
        tiles,
    })
}
