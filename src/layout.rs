//! Screen-space layout for captions and chrome
//!
//! Pure geometry; text measurement is supplied by the caller.

/// Gap between elements and from the view edges
pub const MARGIN: f32 = 16.0;
/// The menu button is a square of this side
pub const MENU_BUTTON_SIDE: f32 = 70.0;
/// Width of the sign menu panel
pub const MENU_WIDTH: f32 = 200.0;
/// Height of the sign menu panel
pub const MENU_HEIGHT: f32 = 400.0;
/// Upper bound on the caption note's height before measuring
pub const NOTE_MAX_HEIGHT: f32 = 1600.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Rect of `size` centred inside `bounds`
    pub fn centered(bounds: Size, size: Size) -> Self {
        Self::new(
            (bounds.width - size.width) / 2.0,
            (bounds.height - size.height) / 2.0,
            size.width,
            size.height,
        )
    }

    pub fn max_y(&self) -> f32 {
        self.origin.y + self.size.height
    }

    pub fn max_x(&self) -> f32 {
        self.origin.x + self.size.width
    }
}

/// Frames of the always-present chrome (menu button and menu panel)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromeLayout {
    pub menu_button: Rect,
    pub menu: Rect,
}

impl ChromeLayout {
    /// Button in the bottom-right corner, menu panel stacked above it
    pub fn compute(view: Size) -> Self {
        let menu_button = Rect::new(
            view.width - MENU_BUTTON_SIDE - MARGIN,
            view.height - MENU_BUTTON_SIDE - MARGIN,
            MENU_BUTTON_SIDE,
            MENU_BUTTON_SIDE,
        );
        let menu = Rect::new(
            view.width - MENU_WIDTH - MARGIN,
            menu_button.origin.y - MARGIN - MENU_HEIGHT,
            MENU_WIDTH,
            MENU_HEIGHT,
        );
        Self { menu_button, menu }
    }
}

/// Frames for the two caption elements
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptionLayout {
    pub word: Rect,
    pub note: Rect,
}

impl CaptionLayout {
    /// Box the note may wrap into: everything left of the menu button
    pub fn note_bounds(view: Size, menu_button_width: f32) -> Size {
        let width = view.width - MARGIN - menu_button_width - MARGIN - MARGIN;
        Size::new(width.max(0.0), NOTE_MAX_HEIGHT)
    }

    /// Place the measured note at the bottom-left and the word directly above it
    pub fn compute(view: Size, note: Size, word: Size) -> Self {
        let note = Rect::new(MARGIN, view.height - note.height - MARGIN, note.width, note.height);
        let word = Rect::new(
            MARGIN,
            note.origin.y - word.height - MARGIN,
            word.width,
            word.height,
        );
        Self { word, note }
    }
}
