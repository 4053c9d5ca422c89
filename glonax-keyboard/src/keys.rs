//! Linux input key codes.
//!
//! Only the keys that are commonly bound are listed, the full table lives
//! in `linux/input-event-codes.h`.

pub const KEY_ESC: u16 = 1;
pub const KEY_1: u16 = 2;
pub const KEY_2: u16 = 3;
pub const KEY_3: u16 = 4;
pub const KEY_4: u16 = 5;
pub const KEY_5: u16 = 6;
pub const KEY_6: u16 = 7;
pub const KEY_7: u16 = 8;
pub const KEY_8: u16 = 9;
pub const KEY_9: u16 = 10;
pub const KEY_0: u16 = 11;
pub const KEY_TAB: u16 = 15;
pub const KEY_Q: u16 = 16;
pub const KEY_W: u16 = 17;
pub const KEY_E: u16 = 18;
pub const KEY_R: u16 = 19;
pub const KEY_T: u16 = 20;
pub const KEY_Y: u16 = 21;
pub const KEY_U: u16 = 22;
pub const KEY_I: u16 = 23;
pub const KEY_O: u16 = 24;
pub const KEY_P: u16 = 25;
pub const KEY_ENTER: u16 = 28;
pub const KEY_A: u16 = 30;
pub const KEY_S: u16 = 31;
pub const KEY_D: u16 = 32;
pub const KEY_F: u16 = 33;
pub const KEY_G: u16 = 34;
pub const KEY_H: u16 = 35;
pub const KEY_J: u16 = 36;
pub const KEY_K: u16 = 37;
pub const KEY_L: u16 = 38;
pub const KEY_Z: u16 = 44;
pub const KEY_X: u16 = 45;
pub const KEY_C: u16 = 46;
pub const KEY_V: u16 = 47;
pub const KEY_B: u16 = 48;
pub const KEY_N: u16 = 49;
pub const KEY_M: u16 = 50;
pub const KEY_SPACE: u16 = 57;
pub const KEY_UP: u16 = 103;
pub const KEY_LEFT: u16 = 105;
pub const KEY_RIGHT: u16 = 106;
pub const KEY_DOWN: u16 = 108;

const KEY_NAMES: &[(&str, u16)] = &[
    ("ESC", KEY_ESC),
    ("1", KEY_1),
    ("2", KEY_2),
    ("3", KEY_3),
    ("4", KEY_4),
    ("5", KEY_5),
    ("6", KEY_6),
    ("7", KEY_7),
    ("8", KEY_8),
    ("9", KEY_9),
    ("0", KEY_0),
    ("TAB", KEY_TAB),
    ("Q", KEY_Q),
    ("W", KEY_W),
    ("E", KEY_E),
    ("R", KEY_R),
    ("T", KEY_T),
    ("Y", KEY_Y),
    ("U", KEY_U),
    ("I", KEY_I),
    ("O", KEY_O),
    ("P", KEY_P),
    ("ENTER", KEY_ENTER),
    ("A", KEY_A),
    ("S", KEY_S),
    ("D", KEY_D),
    ("F", KEY_F),
    ("G", KEY_G),
    ("H", KEY_H),
    ("J", KEY_J),
    ("K", KEY_K),
    ("L", KEY_L),
    ("Z", KEY_Z),
    ("X", KEY_X),
    ("C", KEY_C),
    ("V", KEY_V),
    ("B", KEY_B),
    ("N", KEY_N),
    ("M", KEY_M),
    ("SPACE", KEY_SPACE),
    ("UP", KEY_UP),
    ("LEFT", KEY_LEFT),
    ("RIGHT", KEY_RIGHT),
    ("DOWN", KEY_DOWN),
];

/// Look up a key code by name, case insensitive.
pub fn code(name: &str) -> Option<u16> {
    KEY_NAMES
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
}

/// Look up the name of a key code.
pub fn name(code: u16) -> Option<&'static str> {
    KEY_NAMES
        .iter()
        .find(|(_, key)| *key == code)
        .map(|(name, _)| *name)
}
