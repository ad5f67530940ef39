//! Layer and viewport composition.
//!
//! Whole-layer renders are cached per layer index behind an `RwLock`. A
//! refresh builds the new surface without holding the lock and then swaps the
//! `Arc`, so readers see either the old render or the new one.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use macroquad::prelude::{Image, Rect, Vec2};

use crate::config::ComposerConfig;
use crate::map::Map;
use crate::render::command::DrawCommand;
use crate::render::cull::{clip_view, normalize, visible_window, TileWindow};
use crate::surface::ImageSurface;

/// Pixel-space window to render and the factor applied to the result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Window in map pixels
    pub view: Rect,
    /// Output scale; `1.0` keeps pixels as is
    pub scale: f32,
}

impl Camera {
    /// Camera over `view` with output `scale`.
    pub fn new(view: Rect, scale: f32) -> Self {
        Self { view, scale }
    }

    /// Unscaled camera over `(x, y, w, h)`.
    pub fn at(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Rect::new(x, y, w, h), 1.0)
    }

    fn effective_scale(&self) -> Option<f32> {
        let s = self.scale;
        (s.is_finite() && s > 0.0 && (s - 1.0).abs() > f32::EPSILON).then_some(s)
    }
}

type RenderCache<S> = RwLock<HashMap<usize, Arc<S>>>;

fn cached<S>(cache: &RenderCache<S>, index: usize) -> Option<Arc<S>> {
    cache
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&index)
        .cloned()
}

fn store<S>(cache: &RenderCache<S>, index: usize, surface: S) -> Arc<S> {
    let surface = Arc::new(surface);
    cache
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(index, Arc::clone(&surface));
    surface
}

/// Builds draw lists and composed surfaces for one map.
///
/// Cached renders are keyed by layer / object group index, so a composer
/// must not be shared between maps. Call [`invalidate_layer`](Self::invalidate_layer)
/// after mutating a layer.
pub struct Composer<S = Image> {
    config: ComposerConfig,
    layers: RenderCache<S>,
    object_groups: RenderCache<S>,
}

impl<S: ImageSurface> Default for Composer<S> {
    fn default() -> Self {
        Self::new(ComposerConfig::default())
    }
}

impl<S: ImageSurface> Composer<S> {
    /// Composer with empty caches.
    pub fn new(config: ComposerConfig) -> Self {
        Self {
            config,
            layers: RwLock::new(HashMap::new()),
            object_groups: RwLock::new(HashMap::new()),
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Draw list for every tile of a layer, in the map's render order, with
    /// destinations in map pixels.
    pub fn plan_layer(&self, map: &Map<S>, layer_index: usize) -> Vec<DrawCommand> {
        let Some(layer) = map.layers.get(layer_index) else {
            return Vec::new();
        };
        let window = TileWindow {
            x0: 0,
            y0: 0,
            x1: layer.width,
            y1: layer.height,
        };
        self.plan(map, layer_index, window, Vec2::ZERO)
    }

    /// Draw list for the tiles of a layer that intersect `view`. Destinations
    /// are relative to the top-left of `view`.
    pub fn plan_viewport(&self, map: &Map<S>, layer_index: usize, view: Rect) -> Vec<DrawCommand> {
        let Some(layer) = map.layers.get(layer_index) else {
            return Vec::new();
        };
        let view = normalize(view);
        let window = visible_window(
            view,
            map.layer_origin(layer),
            map.tile_width,
            map.tile_height,
            layer.width,
            layer.height,
            self.config.cull_margin_tiles,
        );
        self.plan(map, layer_index, window, view.point())
    }

    fn plan(&self, map: &Map<S>, layer_index: usize, window: TileWindow, origin: Vec2) -> Vec<DrawCommand> {
        let layer = &map.layers[layer_index];
        if window.is_empty() {
            return Vec::new();
        }
        let mut out: Vec<DrawCommand> = layer
            .tiles()
            .iter()
            .filter(|t| window.contains(t.x, t.y))
            .filter_map(|t| {
                let (src, _) = map.tile_source(t)?;
                Some(DrawCommand {
                    layer_index,
                    tileset_index: t.tileset,
                    local_id: t.local_id,
                    cell: (t.x, t.y),
                    src,
                    dest: map.cell_origin(layer, t.x, t.y) - origin,
                    flip: t.flip,
                })
            })
            .collect();
        let order = map.render_order;
        out.sort_by_key(|c| order.sort_key(c.cell.0, c.cell.1));
        out
    }

    /// Draws `commands` onto `target` using the tilesets' sliced tiles.
    pub fn execute(&self, map: &Map<S>, commands: &[DrawCommand], target: &mut S) {
        for cmd in commands {
            let Some(tile) = map
                .tilesets
                .get(cmd.tileset_index)
                .and_then(|ts| ts.tile_image(cmd.local_id))
            else {
                continue;
            };
            let (w, h) = tile.dimensions();
            target.draw_sub_image_flipped(tile, Rect::new(0.0, 0.0, w as f32, h as f32), cmd.dest, cmd.flip);
        }
    }

    /// Map-sized render of one layer, built on first request and cached.
    /// `None` if the map has no such layer.
    pub fn compose_layer(&self, map: &Map<S>, layer_index: usize) -> Option<Arc<S>> {
        if let Some(hit) = cached(&self.layers, layer_index) {
            return Some(hit);
        }
        self.refresh_layer(map, layer_index)
    }

    /// Re-renders a layer and replaces its cached render.
    pub fn refresh_layer(&self, map: &Map<S>, layer_index: usize) -> Option<Arc<S>> {
        let layer = map.layers.get(layer_index)?;
        let started = Instant::now();
        let mut surface = S::blank(map.pixel_width(), map.pixel_height());
        let commands = self.plan_layer(map, layer_index);
        self.execute(map, &commands, &mut surface);
        log::debug!(
            "layer '{}': rendered {} tiles in {:?}",
            layer.name,
            commands.len(),
            started.elapsed()
        );
        Some(store(&self.layers, layer_index, surface))
    }

    /// Drops the cached render of one layer.
    pub fn invalidate_layer(&self, layer_index: usize) {
        self.layers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&layer_index);
    }

    /// Drops the cached overlay of one object group.
    pub fn invalidate_object_group(&self, group_index: usize) {
        self.object_groups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&group_index);
    }

    /// Drops every cached render.
    pub fn invalidate_all(&self) {
        self.layers.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.object_groups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Part of `view` that composition renders: the view clamped to
    /// [`Map::content_rect`]. `None` when nothing of the map is visible.
    pub fn viewport_bounds(&self, map: &Map<S>, view: Rect) -> Option<Rect> {
        clip_view(view, map.content_rect())
    }

    /// Renders only the tiles of one layer visible through `camera`.
    ///
    /// The output covers [`viewport_bounds`](Self::viewport_bounds) scaled
    /// by `camera.scale`, and is empty when the camera misses the map.
    pub fn compose_viewport(&self, map: &Map<S>, layer_index: usize, camera: &Camera) -> S {
        let Some(view) = self.viewport_bounds(map, camera.view) else {
            return S::blank(0, 0);
        };
        let mut surface = blank_for(view);
        let commands = self.plan_viewport(map, layer_index, view);
        self.execute(map, &commands, &mut surface);
        scaled(surface, camera)
    }

    /// Every layer composited in document order. Hidden layers are skipped
    /// unless configured otherwise.
    pub fn compose_map(&self, map: &Map<S>) -> S {
        let mut surface = S::blank(map.pixel_width(), map.pixel_height());
        for index in self.drawn_layers(map) {
            if let Some(render) = self.compose_layer(map, index) {
                let (w, h) = render.dimensions();
                surface.draw_sub_image(&render, Rect::new(0.0, 0.0, w as f32, h as f32), Vec2::ZERO);
            }
        }
        surface
    }

    /// Viewport composition over every drawn layer.
    pub fn compose_map_viewport(&self, map: &Map<S>, camera: &Camera) -> S {
        let Some(view) = self.viewport_bounds(map, camera.view) else {
            return S::blank(0, 0);
        };
        let mut surface = blank_for(view);
        for index in self.drawn_layers(map) {
            let commands = self.plan_viewport(map, index, view);
            self.execute(map, &commands, &mut surface);
        }
        scaled(surface, camera)
    }

    fn drawn_layers<'m>(&self, map: &'m Map<S>) -> impl Iterator<Item = usize> + 'm {
        let skip_hidden = self.config.skip_hidden_layers;
        map.layers
            .iter()
            .enumerate()
            .filter(move |(_, l)| l.visible || !skip_hidden)
            .map(|(i, _)| i)
    }

    /// Debug overlay of an object group: each visible object as a filled
    /// rectangle on a map-sized surface. Cached like layer renders.
    pub fn compose_object_group(&self, map: &Map<S>, group_index: usize) -> Option<Arc<S>> {
        if let Some(hit) = cached(&self.object_groups, group_index) {
            return Some(hit);
        }
        self.refresh_object_group(map, group_index)
    }

    /// Re-renders an object group overlay and replaces its cached render.
    pub fn refresh_object_group(&self, map: &Map<S>, group_index: usize) -> Option<Arc<S>> {
        let group = map.object_groups.get(group_index)?;
        let started = Instant::now();
        let color = self.config.debug_object_color();
        let mut surface = S::blank(map.pixel_width(), map.pixel_height());
        let objects = group.objects_in_draw_order();
        for obj in objects.iter().filter(|o| o.visible) {
            surface.fill_rect(obj.rect().offset(group.offset), color);
        }
        log::debug!(
            "object group '{}': rendered {} objects in {:?}",
            group.name,
            objects.len(),
            started.elapsed()
        );
        Some(store(&self.object_groups, group_index, surface))
    }
}

fn blank_for<S: ImageSurface>(view: Rect) -> S {
    S::blank(view.w.ceil() as u32, view.h.ceil() as u32)
}

fn scaled<S: ImageSurface>(surface: S, camera: &Camera) -> S {
    match camera.effective_scale() {
        Some(s) => {
            let (w, h) = surface.dimensions();
            surface.resized(
                (w as f32 * s).round() as u32,
                (h as f32 * s).round() as u32,
            )
        }
        None => surface,
    }
}
