use super::Rect;
use glam::Vec2;

/// Corners of `dest` after rotating `rotation` radians about its pivot.
///
/// The pivot sits at `dest.min() + origin`. Corners come back in
/// top-left, top-right, bottom-right, bottom-left order.
pub fn quad_corners(dest: Rect, origin: Vec2, rotation: f32) -> [Vec2; 4] {
    let corners = [
        dest.min(),
        Vec2::new(dest.x + dest.w, dest.y),
        dest.max(),
        Vec2::new(dest.x, dest.y + dest.h),
    ];
    if rotation == 0.0 {
        return corners;
    }

    let pivot = dest.min() + origin;
    let turn = Vec2::from_angle(rotation);
    corners.map(|corner| pivot + turn.rotate(corner - pivot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: Vec2, b: Vec2) -> bool {
        a.abs_diff_eq(b, 1e-4)
    }

    #[test]
    fn unrotated_quad_matches_rect() {
        let corners = quad_corners(Rect::new(1.0, 2.0, 3.0, 4.0), Vec2::ZERO, 0.0);
        assert_eq!(
            corners,
            [
                Vec2::new(1.0, 2.0),
                Vec2::new(4.0, 2.0),
                Vec2::new(4.0, 6.0),
                Vec2::new(1.0, 6.0),
            ]
        );
    }

    #[test]
    fn quarter_turn_about_center() {
        let dest = Rect::new(0.0, 0.0, 2.0, 2.0);
        let corners = quad_corners(dest, Vec2::new(1.0, 1.0), FRAC_PI_2);
        assert!(close(corners[0], Vec2::new(2.0, 0.0)));
        assert!(close(corners[1], Vec2::new(2.0, 2.0)));
        assert!(close(corners[2], Vec2::new(0.0, 2.0)));
        assert!(close(corners[3], Vec2::new(0.0, 0.0)));
    }
}
