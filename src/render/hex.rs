//! Hexagon geometry for the offset tile grid
//!
//! Tiles use an "odd-r" layout: pointy-top hexagons one world unit wide, with
//! odd rows shifted right by half a tile.

use crate::core::types::Vec2;

/// Center-to-vertex radius of a hexagon one world unit wide (1 / sqrt(3))
pub const HEX_RADIUS: f32 = 0.577_350_26;

/// Horizontal shift applied to a row
pub fn row_offset(y: i32) -> f32 {
    if y.rem_euclid(2) == 1 { 0.5 } else { 0.0 }
}

/// World-space center of tile (x, y)
pub fn tile_center(x: i32, y: i32) -> Vec2 {
    Vec2::new(x as f32 + 0.5 + row_offset(y), y as f32 + 0.5)
}

/// Tile containing a world position (inverse of [`tile_center`] by rows)
pub fn tile_at(world: Vec2) -> (i32, i32) {
    let y = world.y.floor() as i32;
    let x = (world.x - row_offset(y)).floor() as i32;
    (x, y)
}

/// Corners of a pointy-top hexagon, clockwise from the upper right
pub fn hex_corners(center: Vec2, radius: f32) -> [Vec2; 6] {
    std::array::from_fn(|i| {
        let angle = (60.0 * i as f32 - 30.0).to_radians();
        center + Vec2::new(angle.cos(), angle.sin()) * radius
    })
}
