use std::path::{Path, PathBuf};

use macroquad::prelude::{Image, Rect, Vec2};

use crate::config::LoadOptions;
use crate::error::MapError;
use crate::layer::{owning_tileset, Layer};
use crate::loader::tmx_loader::{parse_map_str, read_map_file, TmxMap};
use crate::object::ObjectGroup;
use crate::schema::{Orientation, RenderOrder};
use crate::surface::{FileImageProvider, ImageProvider, ImageSurface};
use crate::tile::Tile;
use crate::tileset::{resolve_tileset, Tileset};

/// A fully resolved map: tilesets sliced, every layer decoded.
pub struct Map<S = Image> {
    /// Format version of the document
    pub version: String,
    /// Always [`Orientation::Orthogonal`] once loaded
    pub orientation: Orientation,
    /// Order in which tiles are drawn
    pub render_order: RenderOrder,
    /// Grid size in cells
    pub width: u32,
    /// See [`width`](Self::width)
    pub height: u32,
    /// Cell size in pixels
    pub tile_width: u32,
    /// See [`tile_width`](Self::tile_width)
    pub tile_height: u32,
    /// Next free layer id, kept for round trips
    pub next_layer_id: u32,
    /// Next free object id, kept for round trips
    pub next_object_id: u32,
    /// `#AARRGGBB` or `#RRGGBB`, as written
    pub background_color: Option<String>,
    /// Sorted by ascending `first_gid`
    pub tilesets: Vec<Tileset<S>>,
    /// Document order
    pub layers: Vec<Layer>,
    /// Document order
    pub object_groups: Vec<ObjectGroup>,
    /// Directory relative paths in the document resolve against
    pub base_dir: PathBuf,
    options: LoadOptions,
}

impl Map<Image> {
    /// Loads a `.tmx` file, reading tileset images from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        Self::load_with(path, &mut FileImageProvider, LoadOptions::default())
    }
}

impl<S: ImageSurface> Map<S> {
    /// Loads a `.tmx` file with a custom image provider and options.
    pub fn load_with<P>(
        path: impl AsRef<Path>,
        provider: &mut P,
        options: LoadOptions,
    ) -> Result<Self, MapError>
    where
        P: ImageProvider<Surface = S>,
    {
        let path = path.as_ref();
        log::info!("Loading map {}", path.display());
        let tmx = read_map_file(path)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("./"));
        Self::from_tmx(tmx, base_dir, provider, options)
    }

    /// Parses TMX text. External tilesets and images resolve against `base_dir`.
    pub fn from_str_with<P>(
        text: &str,
        base_dir: impl Into<PathBuf>,
        provider: &mut P,
        options: LoadOptions,
    ) -> Result<Self, MapError>
    where
        P: ImageProvider<Surface = S>,
    {
        let base_dir = base_dir.into();
        let tmx = parse_map_str(text, &base_dir.join("<inline>"))?;
        Self::from_tmx(tmx, base_dir, provider, options)
    }

    fn from_tmx<P>(
        tmx: TmxMap,
        base_dir: PathBuf,
        provider: &mut P,
        options: LoadOptions,
    ) -> Result<Self, MapError>
    where
        P: ImageProvider<Surface = S>,
    {
        if tmx.orientation != Orientation::Orthogonal {
            return Err(MapError::unsupported(format!(
                "{} orientation",
                tmx.orientation.as_str()
            )));
        }
        if tmx.infinite {
            return Err(MapError::unsupported("infinite maps"));
        }
        if !tmx.groups.is_empty() {
            return Err(MapError::unsupported("group layers"));
        }
        if !tmx.image_layers.is_empty() {
            return Err(MapError::unsupported("image layers"));
        }
        if tmx.tile_width == 0 || tmx.tile_height == 0 {
            return Err(MapError::InvalidMap(format!(
                "tile size {}x{} must be non-zero",
                tmx.tile_width, tmx.tile_height
            )));
        }

        let mut tilesets = tmx
            .tilesets
            .into_iter()
            .map(|t| resolve_tileset(t, &base_dir, provider))
            .collect::<Result<Vec<_>, _>>()?;
        tilesets.sort_by_key(|t| t.first_gid);
        if let Some(pair) = tilesets.windows(2).find(|w| w[0].first_gid == w[1].first_gid) {
            return Err(MapError::InvalidMap(format!(
                "tilesets '{}' and '{}' share firstgid {}",
                pair[0].name, pair[1].name, pair[0].first_gid
            )));
        }

        let mut layers = Vec::with_capacity(tmx.layers.len());
        for raw in tmx.layers {
            let mut layer = Layer::from_tmx(raw)?;
            layer.decode(&tilesets, options.strict_layer_size)?;
            layers.push(layer);
        }

        let object_groups = tmx
            .object_groups
            .into_iter()
            .map(ObjectGroup::from_tmx)
            .collect::<Result<Vec<_>, _>>()?;
        for og in &object_groups {
            log::debug!("object group '{}' with {} objects", og.name, og.objects.len());
        }

        log::info!(
            "Loaded {}x{} map ({}x{} px tiles): {} tilesets, {} layers, {} object groups",
            tmx.width,
            tmx.height,
            tmx.tile_width,
            tmx.tile_height,
            tilesets.len(),
            layers.len(),
            object_groups.len()
        );

        Ok(Self {
            version: tmx.version,
            orientation: tmx.orientation,
            render_order: tmx.render_order,
            width: tmx.width,
            height: tmx.height,
            tile_width: tmx.tile_width,
            tile_height: tmx.tile_height,
            next_layer_id: tmx.next_layer_id,
            next_object_id: tmx.next_object_id,
            background_color: tmx.background_color,
            tilesets,
            layers,
            object_groups,
            base_dir,
            options,
        })
    }

    /// `width * tile_width`
    pub fn pixel_width(&self) -> u32 {
        self.width.saturating_mul(self.tile_width)
    }

    /// `height * tile_height`
    pub fn pixel_height(&self) -> u32 {
        self.height.saturating_mul(self.tile_height)
    }

    /// Pixel bounds of the whole map.
    pub fn pixel_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.pixel_width() as f32, self.pixel_height() as f32)
    }

    /// Options the map was loaded with.
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// First layer named `name`.
    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Index of the first layer named `name`.
    pub fn layer_index(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name == name)
    }

    /// First object group named `name`.
    pub fn object_group_by_name(&self, name: &str) -> Option<&ObjectGroup> {
        self.object_groups.iter().find(|g| g.name == name)
    }

    /// Index of the first object group named `name`.
    pub fn object_group_index(&self, name: &str) -> Option<usize> {
        self.object_groups.iter().position(|g| g.name == name)
    }

    /// Like [`object_group_by_name`](Self::object_group_by_name), but a
    /// missing group is an error.
    pub fn require_object_group(&self, name: &str) -> Result<&ObjectGroup, MapError> {
        self.object_group_by_name(name)
            .ok_or_else(|| MapError::GroupNotFound(name.to_owned()))
    }

    /// Owning tileset and local id of a global id (flags already stripped).
    pub fn tileset_for_gid(&self, gid: u32) -> Option<(&Tileset<S>, u32)> {
        if gid == 0 {
            return None;
        }
        let ts = &self.tilesets[owning_tileset(&self.tilesets, gid)?];
        Some((ts, gid - ts.first_gid))
    }

    /// Atlas rectangle and sliced image of a decoded tile.
    pub fn tile_source(&self, tile: &Tile) -> Option<(Rect, &S)> {
        let ts = self.tilesets.get(tile.tileset)?;
        Some((ts.atlas_rect(tile.local_id)?, ts.tile_image(tile.local_id)?))
    }

    /// Pixel position of cell `(0, 0)` of `layer`: its grid position in
    /// tiles plus its pixel offset.
    pub fn layer_origin(&self, layer: &Layer) -> Vec2 {
        Vec2::new(
            layer.x as f32 * self.tile_width as f32,
            layer.y as f32 * self.tile_height as f32,
        ) + layer.offset
    }

    /// Pixel position of grid cell `(x, y)` of `layer`.
    pub fn cell_origin(&self, layer: &Layer, x: u32, y: u32) -> Vec2 {
        Vec2::new(
            x as f32 * self.tile_width as f32,
            y as f32 * self.tile_height as f32,
        ) + self.layer_origin(layer)
    }

    /// Pixel bounds covering the map and every layer, offsets included.
    pub fn content_rect(&self) -> Rect {
        let (tw, th) = (self.tile_width as f32, self.tile_height as f32);
        self.layers.iter().fold(self.pixel_rect(), |acc, layer| {
            let o = self.layer_origin(layer);
            acc.combine_with(Rect::new(o.x, o.y, layer.width as f32 * tw, layer.height as f32 * th))
        })
    }
}
