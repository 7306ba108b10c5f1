use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 129, g: 199, b: 132 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 213, b: 79 };
pub const SEPARATOR: Color = Color::TrueColor { r: 117, g: 117, b: 117 };
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 224, g: 224, b: 224 };
pub const IPV4_ADDR: Color = Color::TrueColor { r: 100, g: 181, b: 246 };

// Occupancy matrix cells
pub const UNSCANNED: Color = Color::TrueColor { r: 189, g: 189, b: 189 };
pub const ACTIVE: Color = Color::TrueColor { r: 244, g: 67, b: 54 };
pub const FREE: Color = Color::TrueColor { r: 139, g: 195, b: 74 };
