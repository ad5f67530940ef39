#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use macroquad::prelude::{Color, Image, Rect};
use tmx_atlas::{ImageSurface, MemoryImageProvider};

/// Fresh directory under the system temp dir.
pub fn temp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("tmx_atlas_{tag}_{nanos}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn base64_cells(cells: &[u32]) -> String {
    STANDARD.encode(cells.iter().flat_map(|c| c.to_le_bytes()).collect::<Vec<u8>>())
}

/// `columns x rows` atlas of square tiles; tile `i` is filled with red `i + 1`.
pub fn atlas_provider(name: &str, tile: u32, columns: u32, rows: u32) -> MemoryImageProvider {
    let mut img = <Image as ImageSurface>::blank(columns * tile, rows * tile);
    for i in 0..columns * rows {
        let (cx, cy) = (i % columns, i / columns);
        img.fill_rect(
            Rect::new((cx * tile) as f32, (cy * tile) as f32, tile as f32, tile as f32),
            Color::from_rgba((i + 1) as u8, 0, 0, 255),
        );
    }
    let mut provider = MemoryImageProvider::new();
    provider.insert(name, img);
    provider
}

pub fn tsx(name: &str, tile: u32, columns: u32, count: u32, image: &str) -> String {
    let rows = count.div_ceil(columns.max(1));
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset version="1.10" tiledversion="1.10.2" name="{name}" tilewidth="{tile}" tileheight="{tile}" tilecount="{count}" columns="{columns}">
 <image source="{image}" width="{}" height="{}"/>
</tileset>
"#,
        columns * tile,
        rows * tile
    )
}

/// Map text referencing one external tileset at firstgid 1, with one layer
/// per payload and a `collisionmap` group holding `objects`.
pub fn tmx(w: u32, h: u32, tile: u32, tileset: &str, layers: &[Vec<u32>], objects: &[(f32, f32, f32, f32)]) -> String {
    let mut out = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.10" tiledversion="1.10.2" orientation="orthogonal" renderorder="right-down" width="{w}" height="{h}" tilewidth="{tile}" tileheight="{tile}" infinite="0" nextlayerid="{}" nextobjectid="{}">
 <tileset firstgid="1" source="{tileset}"/>
"#,
        layers.len() + 2,
        objects.len() + 1
    );
    for (i, cells) in layers.iter().enumerate() {
        out.push_str(&format!(
            r#" <layer id="{}" name="layer{i}" width="{w}" height="{h}">
  <data encoding="base64">
   {}
  </data>
 </layer>
"#,
            i + 1,
            base64_cells(cells)
        ));
    }
    out.push_str(&format!(r#" <objectgroup id="{}" name="collisionmap">
"#, layers.len() + 1));
    for (i, (x, y, ow, oh)) in objects.iter().enumerate() {
        out.push_str(&format!(
            r#"  <object id="{}" x="{x}" y="{y}" width="{ow}" height="{oh}"/>
"#,
            i + 1
        ));
    }
    out.push_str(" </objectgroup>\n</map>\n");
    out
}

/// Writes `files` into a fresh temp dir and returns it.
pub fn fixture(tag: &str, files: &[(&str, String)]) -> PathBuf {
    let dir = temp_dir(tag);
    for (name, text) in files {
        fs::write(dir.join(name), text).unwrap();
    }
    dir
}
