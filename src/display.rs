//! Visual overlay the algorithm can draw on.
//!
//! Tile colors, fog, text and declared walls only describe what the algorithm believes about the
//! maze. None of it affects the physical walls the mouse collides with or senses.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Mutex, MutexGuard, PoisonError},
};

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::domain::{Cell, Direction};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    #[default]
    Black,
    Blue,
    Cyan,
    DarkBlue,
    DarkCyan,
    DarkGray,
    DarkGreen,
    DarkRed,
    DarkYellow,
    Gray,
    Green,
    Orange,
    Red,
    White,
    Yellow,
}

static CHAR_TO_COLOR: Lazy<BTreeMap<char, Color>> = Lazy::new(|| {
    BTreeMap::from([
        ('k', Color::Black),
        ('b', Color::Blue),
        ('c', Color::Cyan),
        ('B', Color::DarkBlue),
        ('C', Color::DarkCyan),
        ('A', Color::DarkGray),
        ('G', Color::DarkGreen),
        ('R', Color::DarkRed),
        ('Y', Color::DarkYellow),
        ('a', Color::Gray),
        ('g', Color::Green),
        ('o', Color::Orange),
        ('r', Color::Red),
        ('w', Color::White),
        ('y', Color::Yellow),
    ])
});

impl Color {
    pub fn from_char(c: char) -> Option<Self> {
        CHAR_TO_COLOR.get(&c).copied()
    }
}

/// Display service driven by the mouse interface. Calls are fire-and-forget.
pub trait TileDisplay: Send + Sync {
    fn set_tile_color(&self, cell: Cell, color: Color);
    fn set_tile_fogginess(&self, cell: Cell, foggy: bool);
    fn set_tile_text(&self, cell: Cell, text: Vec<String>);
    fn declare_wall(&self, cell: Cell, direction: Direction, wall_exists: bool);
    fn undeclare_wall(&self, cell: Cell, direction: Direction);
}

/// What the algorithm has said about a wall.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum WallDeclaration {
    #[default]
    Undeclared,
    Declared {
        wall_exists: bool,
    },
}

/// In-memory overlay for a maze of fixed size. Every tile starts out foggy, uncolored and
/// without text. Tile text is cut to the overlay's rows and columns.
#[derive(Debug)]
pub struct TileOverlay {
    base_color: Color,
    text_rows: usize,
    text_cols: usize,
    state: Mutex<OverlayState>,
}

#[derive(Debug, Default)]
struct OverlayState {
    colors: BTreeMap<Cell, Color>,
    clear_tiles: BTreeSet<Cell>,
    text: BTreeMap<Cell, Vec<String>>,
    walls: BTreeMap<(Cell, Direction), bool>,
}

impl TileOverlay {
    pub fn new(base_color: Color, text_rows: usize, text_cols: usize) -> Self {
        Self {
            base_color,
            text_rows,
            text_cols,
            state: Mutex::new(OverlayState::default()),
        }
    }

    pub fn tile_color(&self, cell: Cell) -> Color {
        self.lock()
            .colors
            .get(&cell)
            .copied()
            .unwrap_or(self.base_color)
    }

    pub fn is_foggy(&self, cell: Cell) -> bool {
        !self.lock().clear_tiles.contains(&cell)
    }

    pub fn tile_text(&self, cell: Cell) -> Vec<String> {
        self.lock().text.get(&cell).cloned().unwrap_or_default()
    }

    pub fn wall_declaration(&self, cell: Cell, direction: Direction) -> WallDeclaration {
        match self.lock().walls.get(&(cell, direction)) {
            Some(wall_exists) => WallDeclaration::Declared {
                wall_exists: *wall_exists,
            },
            None => WallDeclaration::Undeclared,
        }
    }

    fn lock(&self) -> MutexGuard<'_, OverlayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TileDisplay for TileOverlay {
    fn set_tile_color(&self, cell: Cell, color: Color) {
        let mut state = self.lock();
        if color == self.base_color {
            state.colors.remove(&cell);
        } else {
            state.colors.insert(cell, color);
        }
    }

    fn set_tile_fogginess(&self, cell: Cell, foggy: bool) {
        let mut state = self.lock();
        if foggy {
            state.clear_tiles.remove(&cell);
        } else {
            state.clear_tiles.insert(cell);
        }
    }

    fn set_tile_text(&self, cell: Cell, text: Vec<String>) {
        let text: Vec<String> = text
            .into_iter()
            .take(self.text_rows)
            .map(|line| line.chars().take(self.text_cols).collect())
            .collect();
        let mut state = self.lock();
        if text.is_empty() {
            state.text.remove(&cell);
        } else {
            state.text.insert(cell, text);
        }
    }

    fn declare_wall(&self, cell: Cell, direction: Direction, wall_exists: bool) {
        self.lock().walls.insert((cell, direction), wall_exists);
    }

    fn undeclare_wall(&self, cell: Cell, direction: Direction) {
        self.lock().walls.remove(&(cell, direction));
    }
}
