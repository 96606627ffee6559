//! Renderer module.
//! Builds the 800x800 background from tile sprites and alpha-composites piece
//! sprites onto it, one PNG per piece: `{white,black}_{pawn,knight,...}.png`.
//! A missing piece sprite is logged and skipped so the board still renders.

use anyhow::{Context, Result};
use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use shakmaty::{Color, Piece, Role};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::fen::{self, EMPTY_SQUARE};
use crate::layout::{is_light_square, square_to_pixel, BOARD_SIZE, SQUARE_SIZE};

const WHITE_TILE: &str = "whitetile.png";
const BLACK_TILE: &str = "blacktile.png";

/// Colours for the plain background drawn when tile sprites are unavailable.
pub const LIGHT_TILE_COLOR: Rgba<u8> = Rgba([240, 217, 181, 255]);
pub const DARK_TILE_COLOR: Rgba<u8> = Rgba([181, 136, 99, 255]);

/// Board orientation requested by the caller
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Rank 8 at the top, a-file on the left
    #[default]
    Normal,
    /// Board string reversed end to end: a 180° rotation, not a mirror
    Flipped,
}

impl Orientation {
    /// Parses the single-character URL/CLI flag: `"0"` or `"1"`.
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "0" => Some(Orientation::Normal),
            "1" => Some(Orientation::Flipped),
            _ => None,
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            Orientation::Normal => "0",
            Orientation::Flipped => "1",
        }
    }

    pub fn is_flipped(self) -> bool {
        self == Orientation::Flipped
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Normal => write!(f, "normal"),
            Orientation::Flipped => write!(f, "flipped"),
        }
    }
}

/// Directory holding tile and piece sprites.
#[derive(Clone, Debug)]
pub struct Assets {
    dir: PathBuf,
}

impl Assets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the sprite for a piece, e.g. `img/black_knight.png`.
    pub fn sprite_path(&self, piece: Piece) -> PathBuf {
        self.dir
            .join(format!("{}_{}.png", color_name(piece.color), role_name(piece.role)))
    }

    fn load(&self, path: &Path) -> Result<RgbaImage> {
        let img = image::open(path)
            .with_context(|| format!("Failed to load sprite {}", path.display()))?;
        Ok(img.to_rgba8())
    }

    fn load_tile(&self, name: &str) -> Result<RgbaImage> {
        self.load(&self.dir.join(name))
    }
}

fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::Pawn => "pawn",
        Role::Knight => "knight",
        Role::Bishop => "bishop",
        Role::Rook => "rook",
        Role::Queen => "queen",
        Role::King => "king",
    }
}

/// Builds the checkered background from `whitetile.png` / `blacktile.png`.
///
/// Tiles replace canvas pixels outright. When a tile cannot be loaded and
/// `plain_fallback` is set, solid squares are drawn instead of failing.
pub fn create_background(assets: &Assets, plain_fallback: bool) -> Result<RgbaImage> {
    match tiled_background(assets) {
        Ok(bg) => Ok(bg),
        Err(e) if plain_fallback => {
            eprintln!("{:#}; drawing plain tiles instead", e);
            Ok(plain_background(LIGHT_TILE_COLOR, DARK_TILE_COLOR))
        }
        Err(e) => Err(e),
    }
}

fn tiled_background(assets: &Assets) -> Result<RgbaImage> {
    let white_tile = assets.load_tile(WHITE_TILE)?;
    let black_tile = assets.load_tile(BLACK_TILE)?;
    let mut bg = RgbaImage::new(BOARD_SIZE, BOARD_SIZE);

    for square in 0..64 {
        let (x, y) = square_to_pixel(square);
        let tile = if is_light_square(square) { &white_tile } else { &black_tile };
        imageops::replace(&mut bg, tile, x, y);
    }
    Ok(bg)
}

/// Solid-colour checkerboard, no sprites involved.
pub fn plain_background(light: Rgba<u8>, dark: Rgba<u8>) -> RgbaImage {
    let mut bg = RgbaImage::new(BOARD_SIZE, BOARD_SIZE);
    for square in 0..64 {
        let (x, y) = square_to_pixel(square);
        let color = if is_light_square(square) { light } else { dark };
        let rect = Rect::at(x as i32, y as i32).of_size(SQUARE_SIZE, SQUARE_SIZE);
        draw_filled_rect_mut(&mut bg, rect, color);
    }
    bg
}

/// Composites every piece of `board` (a board string) onto `background`.
///
/// Sprites are pasted with their own alpha as the mask. A sprite that fails
/// to load, or a character that is not a piece letter, is logged and skipped.
pub fn render_board(
    board: &str,
    mut background: RgbaImage,
    orientation: Orientation,
    assets: &Assets,
) -> RgbaImage {
    let mut squares: Vec<char> = board.chars().collect();
    if orientation.is_flipped() {
        squares.reverse();
    }

    for (square, c) in squares.into_iter().enumerate() {
        if c == EMPTY_SQUARE {
            continue;
        }
        let Some(piece) = Piece::from_char(c) else {
            eprintln!("Skipping unknown piece '{}' on square {}", c, square);
            continue;
        };

        let path = assets.sprite_path(piece);
        match assets.load(&path) {
            Ok(sprite) => {
                let (x, y) = square_to_pixel(square);
                imageops::overlay(&mut background, &sprite, x, y);
            }
            Err(e) => eprintln!("Error loading {}: {:#}", path.display(), e),
        }
    }
    background
}

/// Validates `fen`, then renders it onto a fresh background.
pub fn render_fen(
    fen: &str,
    orientation: Orientation,
    assets: &Assets,
    plain_fallback: bool,
) -> Result<RgbaImage> {
    let start = Instant::now();

    fen::validate_fen(fen).context("Invalid FEN string")?;
    let board = fen::board_string(fen);
    let background = create_background(assets, plain_fallback)?;
    let image = render_board(&board, background, orientation, assets);

    eprintln!("Render latency ({}): {:?}", orientation, start.elapsed());
    Ok(image)
}
