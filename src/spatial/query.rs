//! Point and rectangle tests against the objects of a named group.

use macroquad::prelude::{Rect, Vec2};

use crate::error::MapError;
use crate::map::Map;
use crate::object::ObjectGroup;
use crate::surface::ImageSurface;

/// Strict AABB overlap; touching edges do not overlap.
#[inline]
pub fn aabb_overlaps(a: Rect, b: Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

fn object_rects(group: &ObjectGroup) -> impl Iterator<Item = Rect> + '_ {
    group
        .objects
        .iter()
        .map(move |o| o.rect().offset(group.offset))
}

/// Whether `point` lies inside (edges included) any object of `group`.
pub fn point_in(group: &ObjectGroup, point: Vec2) -> bool {
    object_rects(group).any(|r| {
        point.x >= r.x && point.x <= r.x + r.w && point.y >= r.y && point.y <= r.y + r.h
    })
}

/// Whether `rect` overlaps any object of `group`.
pub fn rect_intersects(group: &ObjectGroup, rect: Rect) -> bool {
    object_rects(group).any(|r| aabb_overlaps(rect, r))
}

impl<S: ImageSurface> Map<S> {
    /// [`point_in`] against the group named `group`.
    pub fn point_in(&self, group: &str, point: Vec2) -> Result<bool, MapError> {
        let g = self.require_object_group(group)?;
        Ok(point_in(g, point))
    }

    /// [`rect_intersects`] against the group named `group`.
    pub fn rect_intersects(&self, group: &str, rect: Rect) -> Result<bool, MapError> {
        let g = self.require_object_group(group)?;
        let hit = rect_intersects(g, rect);
        if hit {
            log::debug!("collision in group '{group}' with {rect:?}");
        }
        Ok(hit)
    }

    /// [`point_in`] against the configured collision group.
    pub fn collides_point(&self, point: Vec2) -> Result<bool, MapError> {
        self.point_in(&self.options().collision_group, point)
    }

    /// [`rect_intersects`] against the configured collision group.
    pub fn collides_rect(&self, rect: Rect) -> Result<bool, MapError> {
        self.rect_intersects(&self.options().collision_group, rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoadOptions;
    use crate::error::ErrorKind;
    use crate::map::tests::{load, striped_provider, tmx};

    #[test]
    fn rect_intersects_follows_strict_aabb() {
        let map = load(&tmx(4, 4, 16, 1, &[]), &mut striped_provider(16, 1));
        assert!(map.rect_intersects("collisionmap", Rect::new(15.0, 15.0, 5.0, 5.0)).unwrap());
        assert!(!map.rect_intersects("collisionmap", Rect::new(0.0, 0.0, 5.0, 5.0)).unwrap());
        assert!(!map.rect_intersects("collisionmap", Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap());
        assert!(map.collides_rect(Rect::new(29.0, 29.0, 5.0, 5.0)).unwrap());
    }

    #[test]
    fn point_in_includes_edges() {
        let map = load(&tmx(4, 4, 16, 1, &[]), &mut striped_provider(16, 1));
        assert!(map.point_in("collisionmap", Vec2::new(10.0, 10.0)).unwrap());
        assert!(map.point_in("collisionmap", Vec2::new(30.0, 20.0)).unwrap());
        assert!(!map.point_in("collisionmap", Vec2::new(31.0, 20.0)).unwrap());
        assert!(map.collides_point(Vec2::new(20.0, 20.0)).unwrap());
    }

    #[test]
    fn unknown_group_is_distinct_from_no_collision() {
        let map = load(&tmx(4, 4, 16, 1, &[]), &mut striped_provider(16, 1));
        let err = map
            .rect_intersects("walls", Rect::new(0.0, 0.0, 1.0, 1.0))
            .err()
            .expect("expected error");
        assert_eq!(err.kind(), ErrorKind::GroupNotFound);

        let text = tmx(4, 4, 16, 1, &[]).replace(
            r#"<object id="1" name="wall" x="10" y="10" width="20" height="20"/>"#,
            "",
        );
        let empty = load(&text, &mut striped_provider(16, 1));
        assert!(!empty.collides_rect(Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap());
    }

    #[test]
    fn collision_group_comes_from_options() {
        let opts = LoadOptions {
            collision_group: "solid".into(),
            ..LoadOptions::default()
        };
        let mut p = striped_provider(16, 1);
        let map = Map::from_str_with(&tmx(4, 4, 16, 1, &[]), ".", &mut p, opts).expect("load");
        assert!(matches!(
            map.collides_point(Vec2::ZERO),
            Err(MapError::GroupNotFound(ref g)) if g == "solid"
        ));
    }
}
