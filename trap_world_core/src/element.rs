/// The closed set of things a map cell can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Empty,
    Wall,
    Vegetation,
    Character,
    Enemy,
    Portal,
    Trap,
}

/// Terminal-agnostic palette; the renderer maps it onto real colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    Default,
    Black,
    DarkGray,
    Red,
    Green,
}

/// Immutable description of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Element {
    kind: ElementKind,
    foreground: Color,
    background: Color,
    tangible: bool,
}

impl Element {
    pub const EMPTY: Element = Element::new(ElementKind::Empty, Color::Default, Color::Default, false);
    pub const WALL: Element = Element::new(ElementKind::Wall, Color::Black, Color::DarkGray, true);
    pub const VEGETATION: Element =
        Element::new(ElementKind::Vegetation, Color::Green, Color::Default, false);
    pub const CHARACTER: Element =
        Element::new(ElementKind::Character, Color::DarkGray, Color::Default, true);
    pub const ENEMY: Element = Element::new(ElementKind::Enemy, Color::Red, Color::Default, true);
    pub const PORTAL: Element = Element::new(ElementKind::Portal, Color::Green, Color::Default, false);
    /// Tangible, yet always enterable so that stepping on it can trigger it.
    pub const TRAP: Element = Element::new(ElementKind::Trap, Color::Red, Color::Default, true);

    const fn new(kind: ElementKind, foreground: Color, background: Color, tangible: bool) -> Self {
        Element {
            kind,
            foreground,
            background,
            tangible,
        }
    }

    /// Returns the canonical element for a kind.
    pub const fn of(kind: ElementKind) -> Element {
        match kind {
            ElementKind::Empty => Element::EMPTY,
            ElementKind::Wall => Element::WALL,
            ElementKind::Vegetation => Element::VEGETATION,
            ElementKind::Character => Element::CHARACTER,
            ElementKind::Enemy => Element::ENEMY,
            ElementKind::Portal => Element::PORTAL,
            ElementKind::Trap => Element::TRAP,
        }
    }

    #[inline]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    #[inline]
    pub fn is(&self, kind: ElementKind) -> bool {
        self.kind == kind
    }

    #[inline]
    pub fn foreground(&self) -> Color {
        self.foreground
    }

    #[inline]
    pub fn background(&self) -> Color {
        self.background
    }

    #[inline]
    pub fn is_tangible(&self) -> bool {
        self.tangible
    }

    /// The character used both in map files and on screen.
    pub fn symbol(&self) -> char {
        match self.kind {
            ElementKind::Empty => ' ',
            ElementKind::Wall => '▤',
            ElementKind::Vegetation => '♣',
            ElementKind::Character => '☺',
            ElementKind::Enemy => '☠',
            ElementKind::Portal => '○',
            ElementKind::Trap => '▲',
        }
    }
}

impl Default for Element {
    fn default() -> Self {
        Element::EMPTY
    }
}
