/// Named colour constants, `0xRRGGBB`.
pub const COLOURS: [(&str, i32); 24] = [
    ("GREEN", 0x228B22),
    ("RED", 0xFF0000),
    ("BLUE", 0x0000FF),
    ("YELLOW", 0xFFFF00),
    ("VIOLET", 0x8A2BE2),
    ("LIME", 0x00FF00),
    ("ORANGE", 0xFFAA00),
    ("SKYBLUE", 0x00B0FF),
    ("BROWN", 0x964B00),
    ("PINK", 0xEE1289),
    ("DARKGREEN", 0x006400),
    ("DARKRED", 0xB22222),
    ("DARKBLUE", 0x000080),
    ("OCHRE", 0xC89620),
    ("INDIGO", 0x4B0082),
    ("OLIVE", 0x808000),
    ("TEAL", 0x008080),
    ("MAGENTA", 0xFF00FF),
    ("CYAN", 0x00FFFF),
    ("GOLD", 0xFFD700),
    ("SILVER", 0xC0C0C0),
    ("GREY", 0x808080),
    ("WHITE", 0xFFFFFF),
    ("BLACK", 0x000000),
];

pub fn colour(name: &str) -> Option<i32> {
    COLOURS
        .iter()
        .find(|(colour_name, _)| *colour_name == name)
        .map(|(_, rgb)| *rgb)
}
