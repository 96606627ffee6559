//! Board layout: square index to canvas pixel coordinates.
//! Square 0 is a8 and sits at the top-left; square 63 is h1 at the bottom-right.

/// Edge length of one square in pixels.
pub const SQUARE_SIZE: u32 = 100;

/// Edge length of the whole canvas in pixels.
pub const BOARD_SIZE: u32 = SQUARE_SIZE * 8;

/// Converts a square index (0-63, board-string order) to the pixel offset of
/// its top-left corner.
///
/// Rows count down from the top, `y = (square / 8) * 100`, so rank 8 is drawn
/// at the top. Not `(7 - square / 8)`, which would put rank 8 at the bottom.
///
/// Returns signed coordinates because the compositor accepts offsets outside
/// the canvas; indices past 63 land below it and get clipped.
pub fn square_to_pixel(square: usize) -> (i64, i64) {
    let size = SQUARE_SIZE as i64;
    let file = (square % 8) as i64;
    let rank_from_top = (square / 8) as i64;
    (file * size, rank_from_top * size)
}

/// Checkerboard colouring; a8 (square 0) is light.
pub fn is_light_square(square: usize) -> bool {
    (square + square / 8) % 2 == 0
}
