use macroquad::prelude::{vec2, Rect, Vec2};

use crate::error::MapError;
use crate::loader::tmx_loader::{TmxObject, TmxObjectGroup};
use crate::schema::DrawOrder;
use crate::tile::TileId;

/// An axis-aligned object of an object group.
#[derive(Debug, Clone, PartialEq)]
pub struct MapObject {
    /// Unique object id
    pub id: u32,
    /// Object name
    pub name: String,
    /// `type` attribute, or `class` for newer documents
    pub class_name: String,
    /// Left edge in map pixels
    pub x: f32,
    /// Top edge in map pixels
    pub y: f32,
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
    /// Degrees, clockwise
    pub rotation: f32,
    /// `false` for `visible="0"`
    pub visible: bool,
    /// Tile reference of tile objects
    pub tile: Option<TileId>,
}

impl MapObject {
    /// Bounding rectangle in map pixels.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    fn from_tmx(obj: TmxObject, group: &str) -> Result<Self, MapError> {
        if let Some(template) = obj.template {
            return Err(MapError::unsupported(format!(
                "object template '{template}' (object {} in group '{group}')",
                obj.id
            )));
        }
        let class_name = if !obj.class.is_empty() {
            obj.class
        } else {
            obj.kind
        };
        Ok(Self {
            id: obj.id,
            name: obj.name,
            class_name,
            x: obj.x,
            y: obj.y,
            width: obj.width,
            height: obj.height,
            rotation: obj.rotation,
            visible: obj.visible,
            tile: obj.gid.map(TileId),
        })
    }
}

/// A named collection of objects.
#[derive(Debug, Clone)]
pub struct ObjectGroup {
    /// Unique layer id
    pub id: u32,
    /// Group name, used by spatial queries
    pub name: String,
    /// Display colour, as written
    pub color: Option<String>,
    /// Stored, not applied
    pub opacity: f32,
    /// `false` for `visible="0"`
    pub visible: bool,
    /// Pixel offset of every object
    pub offset: Vec2,
    /// Overlay drawing order
    pub draw_order: DrawOrder,
    /// Document order
    pub objects: Vec<MapObject>,
}

impl ObjectGroup {
    pub(crate) fn from_tmx(raw: TmxObjectGroup) -> Result<Self, MapError> {
        let objects = raw
            .objects
            .into_iter()
            .map(|o| MapObject::from_tmx(o, &raw.name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: raw.id,
            name: raw.name,
            color: raw.color,
            opacity: raw.opacity,
            visible: raw.visible,
            offset: vec2(raw.offset_x, raw.offset_y),
            draw_order: raw.draw_order,
            objects,
        })
    }

    /// Objects in drawing order: document order for `index`, ascending `y`
    /// (stable) for `topdown`.
    pub fn objects_in_draw_order(&self) -> Vec<&MapObject> {
        let mut out: Vec<&MapObject> = self.objects.iter().collect();
        if self.draw_order == DrawOrder::TopDown {
            out.sort_by(|a, b| a.y.total_cmp(&b.y));
        }
        out
    }
}
