use anyhow::Context;
use macroquad::prelude::*;
use tmx_atlas::{Camera, Composer, ComposerConfig, Map};

const PAN_SPEED: f32 = 400.0;

fn window_conf() -> Conf {
    Conf {
        window_title: "TMX viewer".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{e:#}");
    }
}

async fn run() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "assets/map.tmx".to_owned());
    let map = Map::load(&path).with_context(|| format!("Failed to load map {path}"))?;
    let composer = Composer::new(ComposerConfig {
        cull_margin_tiles: 1,
        ..ComposerConfig::default()
    });
    let collision = map.object_group_index(&map.options().collision_group);

    let mut origin = Vec2::ZERO;
    let mut scale = 1.0_f32;
    let mut show_collision = false;
    let mut last: Option<(Vec2, f32, Vec2)> = None;
    let mut frame: Option<(Texture2D, Vec2)> = None;
    let mut overlay: Option<Texture2D> = None;

    loop {
        let dt = get_frame_time();
        let mut dir = Vec2::ZERO;
        if is_key_down(KeyCode::Left) || is_key_down(KeyCode::A) {
            dir.x -= 1.0;
        }
        if is_key_down(KeyCode::Right) || is_key_down(KeyCode::D) {
            dir.x += 1.0;
        }
        if is_key_down(KeyCode::Up) || is_key_down(KeyCode::W) {
            dir.y -= 1.0;
        }
        if is_key_down(KeyCode::Down) || is_key_down(KeyCode::S) {
            dir.y += 1.0;
        }
        origin += dir * PAN_SPEED * dt / scale;

        let (_, wheel) = mouse_wheel();
        if wheel > 0.0 {
            scale = (scale * 1.1).min(8.0);
        } else if wheel < 0.0 {
            scale = (scale / 1.1).max(0.125);
        }
        if is_key_pressed(KeyCode::C) {
            show_collision = !show_collision;
        }

        // Recompose only when the camera moved or the window was resized.
        let screen = vec2(screen_width(), screen_height());
        if last != Some((origin, scale, screen)) {
            let camera = Camera::new(
                Rect::new(origin.x, origin.y, screen.x / scale, screen.y / scale),
                scale,
            );
            // Only the part of the camera over the map is composed.
            frame = composer.viewport_bounds(&map, camera.view).map(|bounds| {
                let image = composer.compose_map_viewport(&map, &camera);
                let at = (bounds.point() - origin) * scale;
                (Texture2D::from_image(&image), at)
            });
            last = Some((origin, scale, screen));
        }
        if show_collision && overlay.is_none() {
            overlay = collision
                .and_then(|i| composer.compose_object_group(&map, i))
                .map(|img| Texture2D::from_image(&img));
        }

        clear_background(BLACK);
        if let Some((tex, at)) = &frame {
            draw_texture(tex, at.x, at.y, WHITE);
        }
        if let (true, Some(tex)) = (show_collision, &overlay) {
            draw_texture_ex(
                tex,
                -origin.x * scale,
                -origin.y * scale,
                Color::new(1.0, 1.0, 1.0, 0.4),
                DrawTextureParams {
                    dest_size: Some(vec2(tex.width() * scale, tex.height() * scale)),
                    ..Default::default()
                },
            );
        }

        draw_text(
            &format!("FPS: {}  zoom: {scale:.2}  [C] collision", get_fps()),
            20.0,
            30.0,
            24.0,
            RED,
        );

        next_frame().await;
    }
}
