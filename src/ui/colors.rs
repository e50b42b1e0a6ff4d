use ratatui::style::Color;

// Guide palette
pub const ACCENT: Color = Color::Rgb(80, 200, 255); // electric cyan
pub const ACCENT_DIM: Color = Color::Rgb(30, 90, 120);
pub const TEXT_PRIMARY: Color = Color::Rgb(225, 225, 225);
pub const TEXT_DIM: Color = Color::Rgb(110, 110, 110);

// Program cell states
pub const NOW_FG: Color = Color::Rgb(255, 215, 100); // amber for airing now
pub const PAST_FG: Color = Color::Rgb(90, 90, 90);
pub const CELL_BG: Color = Color::Rgb(20, 24, 28);
pub const CELL_ALT_BG: Color = Color::Rgb(28, 34, 40);
pub const SELECTED_BG: Color = Color::Rgb(80, 200, 255);
pub const SELECTED_FG: Color = Color::Black;

// Status accents
pub const ERROR_FG: Color = Color::Rgb(255, 110, 110);
pub const NOW_MARKER: Color = Color::Rgb(255, 80, 80);
