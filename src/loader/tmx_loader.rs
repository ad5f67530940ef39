// src/loader/tmx_loader.rs
//! Serde shapes of the TMX map and TSX tileset documents.
//!
//! Numeric and enum attributes are typed, so a malformed value fails the
//! parse with [`MapError::Document`] instead of silently becoming zero.

use crate::error::MapError;
use crate::schema::*;
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::path::Path;

fn default_true() -> bool {
    true
}
fn one() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmxMap {
    #[serde(rename = "@version", default)]
    pub version: String,
    #[serde(rename = "@orientation", default)]
    pub orientation: Orientation,
    #[serde(rename = "@renderorder", default)]
    pub render_order: RenderOrder,
    #[serde(rename = "@width")]
    pub width: u32,
    #[serde(rename = "@height")]
    pub height: u32,
    #[serde(rename = "@tilewidth")]
    pub tile_width: u32,
    #[serde(rename = "@tileheight")]
    pub tile_height: u32,
    #[serde(rename = "@infinite", default)]
    pub infinite: bool,
    #[serde(rename = "@nextlayerid", default)]
    pub next_layer_id: u32,
    #[serde(rename = "@nextobjectid", default)]
    pub next_object_id: u32,
    #[serde(rename = "@backgroundcolor", default)]
    pub background_color: Option<String>,
    #[serde(rename = "tileset", default)]
    pub tilesets: Vec<TmxTileset>,
    #[serde(rename = "layer", default)]
    pub layers: Vec<TmxLayer>,
    #[serde(rename = "objectgroup", default)]
    pub object_groups: Vec<TmxObjectGroup>,
    #[serde(rename = "group", default)]
    pub groups: Vec<IgnoredAny>,
    #[serde(rename = "imagelayer", default)]
    pub image_layers: Vec<IgnoredAny>,
}

/// Either a `<tileset firstgid source>` reference inside a map, an inline
/// tileset inside a map, or the root of an external `.tsx` file.
#[derive(Debug, Deserialize)]
pub(crate) struct TmxTileset {
    #[serde(rename = "@firstgid", default)]
    pub first_gid: Option<u32>,
    #[serde(rename = "@source", default)]
    pub source: Option<String>,
    #[serde(rename = "@version", default)]
    pub version: String,
    #[serde(rename = "@tiledversion", default)]
    pub tiled_version: String,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@tilewidth", default)]
    pub tile_width: Option<u32>,
    #[serde(rename = "@tileheight", default)]
    pub tile_height: Option<u32>,
    #[serde(rename = "@spacing", default)]
    pub spacing: u32,
    #[serde(rename = "@margin", default)]
    pub margin: u32,
    #[serde(rename = "@tilecount", default)]
    pub tile_count: Option<u32>,
    #[serde(rename = "@columns", default)]
    pub columns: Option<u32>,
    #[serde(rename = "@objectalignment", default)]
    pub object_alignment: ObjectAlignment,
    #[serde(default)]
    pub image: Option<TmxImage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmxImage {
    #[serde(rename = "@source")]
    pub source: String,
    #[serde(rename = "@width", default)]
    pub width: Option<u32>,
    #[serde(rename = "@height", default)]
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmxLayer {
    #[serde(rename = "@id", default)]
    pub id: u32,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@x", default)]
    pub x: i32,
    #[serde(rename = "@y", default)]
    pub y: i32,
    #[serde(rename = "@width")]
    pub width: u32,
    #[serde(rename = "@height")]
    pub height: u32,
    #[serde(rename = "@opacity", default = "one")]
    pub opacity: f32,
    #[serde(rename = "@visible", default = "default_true")]
    pub visible: bool,
    #[serde(rename = "@offsetx", default)]
    pub offset_x: f32,
    #[serde(rename = "@offsety", default)]
    pub offset_y: f32,
    #[serde(default)]
    pub data: Option<TmxData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmxData {
    #[serde(rename = "@encoding", default)]
    pub encoding: Option<DataEncoding>,
    #[serde(rename = "@compression", default)]
    pub compression: Option<Compression>,
    #[serde(rename = "$text", default)]
    pub text: String,
    #[serde(rename = "chunk", default)]
    pub chunks: Vec<IgnoredAny>,
    #[serde(rename = "tile", default)]
    pub tile_elements: Vec<IgnoredAny>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmxObjectGroup {
    #[serde(rename = "@id", default)]
    pub id: u32,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@color", default)]
    pub color: Option<String>,
    #[serde(rename = "@opacity", default = "one")]
    pub opacity: f32,
    #[serde(rename = "@visible", default = "default_true")]
    pub visible: bool,
    #[serde(rename = "@offsetx", default)]
    pub offset_x: f32,
    #[serde(rename = "@offsety", default)]
    pub offset_y: f32,
    #[serde(rename = "@draworder", default)]
    pub draw_order: DrawOrder,
    #[serde(rename = "object", default)]
    pub objects: Vec<TmxObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmxObject {
    #[serde(rename = "@id", default)]
    pub id: u32,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@type", default)]
    pub kind: String,
    #[serde(rename = "@class", default)]
    pub class: String,
    #[serde(rename = "@x", default)]
    pub x: f32,
    #[serde(rename = "@y", default)]
    pub y: f32,
    #[serde(rename = "@width", default)]
    pub width: f32,
    #[serde(rename = "@height", default)]
    pub height: f32,
    #[serde(rename = "@rotation", default)]
    pub rotation: f32,
    #[serde(rename = "@gid", default)]
    pub gid: Option<u32>,
    #[serde(rename = "@visible", default = "default_true")]
    pub visible: bool,
    #[serde(rename = "@template", default)]
    pub template: Option<String>,
}

fn read_text(path: &Path) -> Result<String, MapError> {
    std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| allowed.iter().any(|a| e.eq_ignore_ascii_case(a)))
}

/// Parses TMX text. `origin` only labels errors.
pub(crate) fn parse_map_str(text: &str, origin: &Path) -> Result<TmxMap, MapError> {
    quick_xml::de::from_str(text).map_err(|source| MapError::Document {
        path: origin.to_path_buf(),
        source,
    })
}

pub(crate) fn read_map_file(path: &Path) -> Result<TmxMap, MapError> {
    if has_extension(path, &["json", "tmj"]) {
        return Err(MapError::unsupported(format!(
            "JSON map format: {}",
            path.display()
        )));
    }
    let txt = read_text(path)?;
    parse_map_str(&txt, path)
}

pub(crate) fn read_tileset_file(path: &Path) -> Result<TmxTileset, MapError> {
    if has_extension(path, &["json", "tsj"]) {
        return Err(MapError::unsupported(format!(
            "JSON tileset format: {}",
            path.display()
        )));
    }
    let txt = read_text(path)?;
    quick_xml::de::from_str(&txt).map_err(|source| MapError::Document {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn parse(text: &str) -> Result<TmxMap, MapError> {
        parse_map_str(text, Path::new("inline.tmx"))
    }

    #[test]
    fn parses_interleaved_children_in_document_order() {
        let map = parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <map version="1.10" orientation="orthogonal" renderorder="left-up"
                 width="4" height="3" tilewidth="16" tileheight="8"
                 infinite="0" nextlayerid="4" nextobjectid="2">
              <tileset firstgid="1" source="a.tsx"/>
              <layer id="1" name="ground" width="4" height="3">
                <data encoding="base64">AQAAAA==</data>
              </layer>
              <objectgroup id="2" name="collisionmap" draworder="index">
                <object id="1" name="wall" x="10" y="12.5" width="20" height="20"/>
              </objectgroup>
              <tileset firstgid="5" source="b.tsx"/>
              <layer id="3" name="top" width="4" height="3" visible="0" opacity="0.5">
                <data encoding="base64"/>
              </layer>
            </map>"#,
        )
        .expect("parse");

        assert_eq!(map.render_order, RenderOrder::LeftUp);
        assert_eq!((map.width, map.height, map.tile_width, map.tile_height), (4, 3, 16, 8));
        assert_eq!(map.next_layer_id, 4);
        assert_eq!(map.tilesets.len(), 2);
        assert_eq!(map.tilesets[1].first_gid, Some(5));
        assert_eq!(map.layers.len(), 2);
        assert_eq!(map.layers[0].name, "ground");
        assert!(!map.layers[1].visible);
        assert_eq!(map.layers[1].opacity, 0.5);
        let data = map.layers[0].data.as_ref().expect("data");
        assert_eq!(data.encoding, Some(DataEncoding::Base64));
        assert_eq!(data.text.trim(), "AQAAAA==");
        assert_eq!(map.object_groups[0].draw_order, DrawOrder::Index);
        assert_eq!(map.object_groups[0].objects[0].y, 12.5);
    }

    #[test]
    fn malformed_integer_is_a_document_error() {
        let err = parse(r#"<map width="ten" height="1" tilewidth="8" tileheight="8"/>"#)
            .err()
            .expect("expected parse error");
        assert!(matches!(err, MapError::Document { .. }));
        assert_eq!(err.kind(), ErrorKind::Document);
    }

    #[test]
    fn unknown_enum_value_is_a_document_error() {
        let err = parse(
            r#"<map orientation="spherical" width="1" height="1" tilewidth="8" tileheight="8"/>"#,
        )
        .err()
        .expect("expected parse error");
        assert!(matches!(err, MapError::Document { .. }));
    }

    #[test]
    fn recognises_every_orientation_and_compression() {
        for (attr, want) in [
            ("orthogonal", Orientation::Orthogonal),
            ("isometric", Orientation::Isometric),
            ("staggered", Orientation::Staggered),
            ("hexagonal", Orientation::Hexagonal),
        ] {
            let map = parse(&format!(
                r#"<map orientation="{attr}" width="1" height="1" tilewidth="8" tileheight="8"/>"#
            ))
            .expect("parse");
            assert_eq!(map.orientation, want);
        }

        let map = parse(
            r#"<map width="1" height="1" tilewidth="8" tileheight="8">
                 <layer name="l" width="1" height="1">
                   <data encoding="base64" compression="zstd">AAAA</data>
                 </layer>
               </map>"#,
        )
        .expect("parse");
        let data = map.layers[0].data.as_ref().expect("data");
        assert_eq!(data.compression, Some(Compression::Zstd));
    }

    #[test]
    fn json_documents_are_rejected_before_reading() {
        let err = read_map_file(Path::new("does/not/exist.tmj"))
            .err()
            .expect("expected error");
        assert!(matches!(err, MapError::Unsupported { .. }));

        let err = read_map_file(Path::new("does/not/exist.tmx"))
            .err()
            .expect("expected error");
        assert!(matches!(err, MapError::Io { .. }));
    }
}
