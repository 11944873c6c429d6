//! Collision detection for the runner
//!
//! Obstacles are drawn as triangles and arrows, so the lethal area is an inset
//! rectangle inside the visual one. The player box is tested against that
//! inset "hit box" only.

use super::state::{Obstacle, ObstacleKind, Rect};

/// Ground obstacles: trimmed on both sides and from the top
const GROUND_SIDE_INSET: f32 = 0.22;
const GROUND_TOP_INSET: f32 = 0.18;

/// Flying obstacles: trimmed from the left (and 1.45x that off the width), top and bottom
const FLYING_LEFT_INSET: f32 = 0.28;
const FLYING_WIDTH_TRIM: f32 = 1.45;
const FLYING_VERTICAL_INSET: f32 = 0.20;

/// Lethal rectangle of an obstacle
pub fn hit_box(obstacle: &Obstacle) -> Rect {
    let (x, y) = (obstacle.pos.x, obstacle.pos.y);
    let (w, h) = (obstacle.size.x, obstacle.size.y);

    match obstacle.kind {
        ObstacleKind::Ground => {
            let side = w * GROUND_SIDE_INSET;
            let top = h * GROUND_TOP_INSET;
            Rect::new(x + side, y + top, w - side * 2.0, h - top)
        }
        ObstacleKind::Flying => {
            let left = w * FLYING_LEFT_INSET;
            let vertical = h * FLYING_VERTICAL_INSET;
            Rect::new(
                x + left,
                y + vertical,
                w - left * FLYING_WIDTH_TRIM,
                h - vertical * 2.0,
            )
        }
    }
}

/// Whether the player box overlaps an obstacle's hit box
pub fn player_hits(player: &Rect, obstacle: &Obstacle) -> bool {
    player.overlaps(&hit_box(obstacle))
}

/// First obstacle (in creation order) the player collides with
pub fn first_hit<'a>(player: &Rect, obstacles: &'a [Obstacle]) -> Option<&'a Obstacle> {
    obstacles.iter().find(|o| player_hits(player, o))
}
