// Keyswap Key Symbol Table
// Maps human-friendly key names and canonical kernel symbols to (type, code)

use evdev::EventType;

/// One entry of the built-in symbol table.
///
/// `canonical` is the kernel's textual name from input-event-codes.h; it is
/// what `canonical_name` returns for diagnostic display.
struct KeyEntry {
    name: &'static str,
    aliases: &'static [&'static str],
    code: u16,
    event_type: EventType,
    canonical: &'static str,
}

const EV_KEY: EventType = EventType::KEY;

#[rustfmt::skip]
static KEY_TABLE: &[KeyEntry] = &[
    // Mouse buttons. "back"/"forward" deliberately alias the side buttons,
    // which is what desktop users mean by those words on a mouse.
    KeyEntry { name: "back", aliases: &["back_button", "side_button", "btn_side"], code: 275, event_type: EV_KEY, canonical: "BTN_SIDE" },
    KeyEntry { name: "forward", aliases: &["forward_button", "extra_button", "btn_extra"], code: 276, event_type: EV_KEY, canonical: "BTN_EXTRA" },
    KeyEntry { name: "left_click", aliases: &["left_button", "btn_left", "left"], code: 272, event_type: EV_KEY, canonical: "BTN_LEFT" },
    KeyEntry { name: "right_click", aliases: &["right_button", "btn_right", "right"], code: 273, event_type: EV_KEY, canonical: "BTN_RIGHT" },
    KeyEntry { name: "middle_click", aliases: &["middle_button", "btn_middle", "middle"], code: 274, event_type: EV_KEY, canonical: "BTN_MIDDLE" },
    KeyEntry { name: "task", aliases: &["task_button", "btn_task"], code: 279, event_type: EV_KEY, canonical: "BTN_TASK" },

    // Keyboard navigation keys (the keyboard counterparts of the mouse
    // side buttons; common remap targets).
    KeyEntry { name: "nav_back", aliases: &["key_back"], code: 158, event_type: EV_KEY, canonical: "KEY_BACK" },
    KeyEntry { name: "nav_forward", aliases: &["key_forward"], code: 159, event_type: EV_KEY, canonical: "KEY_FORWARD" },

    // Special keys
    KeyEntry { name: "enter", aliases: &["return", "key_enter"], code: 28, event_type: EV_KEY, canonical: "KEY_ENTER" },
    KeyEntry { name: "space", aliases: &["key_space", "spc"], code: 57, event_type: EV_KEY, canonical: "KEY_SPACE" },
    KeyEntry { name: "tab", aliases: &["key_tab"], code: 15, event_type: EV_KEY, canonical: "KEY_TAB" },
    KeyEntry { name: "escape", aliases: &["esc", "key_esc"], code: 1, event_type: EV_KEY, canonical: "KEY_ESC" },
    KeyEntry { name: "backspace", aliases: &["key_backspace", "bs"], code: 14, event_type: EV_KEY, canonical: "KEY_BACKSPACE" },
    KeyEntry { name: "delete", aliases: &["del", "key_delete"], code: 111, event_type: EV_KEY, canonical: "KEY_DELETE" },
    KeyEntry { name: "caps_lock", aliases: &["capslock", "key_capslock"], code: 58, event_type: EV_KEY, canonical: "KEY_CAPSLOCK" },

    // Modifier keys
    KeyEntry { name: "left_control", aliases: &["lctrl", "left_ctrl", "key_leftctrl"], code: 29, event_type: EV_KEY, canonical: "KEY_LEFTCTRL" },
    KeyEntry { name: "right_control", aliases: &["rctrl", "right_ctrl", "key_rightctrl"], code: 97, event_type: EV_KEY, canonical: "KEY_RIGHTCTRL" },
    KeyEntry { name: "left_shift", aliases: &["lshift", "key_leftshift"], code: 42, event_type: EV_KEY, canonical: "KEY_LEFTSHIFT" },
    KeyEntry { name: "right_shift", aliases: &["rshift", "key_rightshift"], code: 54, event_type: EV_KEY, canonical: "KEY_RIGHTSHIFT" },
    KeyEntry { name: "left_alt", aliases: &["lalt", "key_leftalt"], code: 56, event_type: EV_KEY, canonical: "KEY_LEFTALT" },
    KeyEntry { name: "right_alt", aliases: &["ralt", "key_rightalt"], code: 100, event_type: EV_KEY, canonical: "KEY_RIGHTALT" },
    KeyEntry { name: "left_super", aliases: &["lwin", "left_meta", "key_leftmeta"], code: 125, event_type: EV_KEY, canonical: "KEY_LEFTMETA" },
    KeyEntry { name: "right_super", aliases: &["rwin", "right_meta", "key_rightmeta"], code: 126, event_type: EV_KEY, canonical: "KEY_RIGHTMETA" },

    // Letters a-z
    KeyEntry { name: "a", aliases: &["key_a"], code: 30, event_type: EV_KEY, canonical: "KEY_A" },
    KeyEntry { name: "b", aliases: &["key_b"], code: 48, event_type: EV_KEY, canonical: "KEY_B" },
    KeyEntry { name: "c", aliases: &["key_c"], code: 46, event_type: EV_KEY, canonical: "KEY_C" },
    KeyEntry { name: "d", aliases: &["key_d"], code: 32, event_type: EV_KEY, canonical: "KEY_D" },
    KeyEntry { name: "e", aliases: &["key_e"], code: 18, event_type: EV_KEY, canonical: "KEY_E" },
    KeyEntry { name: "f", aliases: &["key_f"], code: 33, event_type: EV_KEY, canonical: "KEY_F" },
    KeyEntry { name: "g", aliases: &["key_g"], code: 34, event_type: EV_KEY, canonical: "KEY_G" },
    KeyEntry { name: "h", aliases: &["key_h"], code: 35, event_type: EV_KEY, canonical: "KEY_H" },
    KeyEntry { name: "i", aliases: &["key_i"], code: 23, event_type: EV_KEY, canonical: "KEY_I" },
    KeyEntry { name: "j", aliases: &["key_j"], code: 36, event_type: EV_KEY, canonical: "KEY_J" },
    KeyEntry { name: "k", aliases: &["key_k"], code: 37, event_type: EV_KEY, canonical: "KEY_K" },
    KeyEntry { name: "l", aliases: &["key_l"], code: 38, event_type: EV_KEY, canonical: "KEY_L" },
    KeyEntry { name: "m", aliases: &["key_m"], code: 50, event_type: EV_KEY, canonical: "KEY_M" },
    KeyEntry { name: "n", aliases: &["key_n"], code: 49, event_type: EV_KEY, canonical: "KEY_N" },
    KeyEntry { name: "o", aliases: &["key_o"], code: 24, event_type: EV_KEY, canonical: "KEY_O" },
    KeyEntry { name: "p", aliases: &["key_p"], code: 25, event_type: EV_KEY, canonical: "KEY_P" },
    KeyEntry { name: "q", aliases: &["key_q"], code: 16, event_type: EV_KEY, canonical: "KEY_Q" },
    KeyEntry { name: "r", aliases: &["key_r"], code: 19, event_type: EV_KEY, canonical: "KEY_R" },
    KeyEntry { name: "s", aliases: &["key_s"], code: 31, event_type: EV_KEY, canonical: "KEY_S" },
    KeyEntry { name: "t", aliases: &["key_t"], code: 20, event_type: EV_KEY, canonical: "KEY_T" },
    KeyEntry { name: "u", aliases: &["key_u"], code: 22, event_type: EV_KEY, canonical: "KEY_U" },
    KeyEntry { name: "v", aliases: &["key_v"], code: 47, event_type: EV_KEY, canonical: "KEY_V" },
    KeyEntry { name: "w", aliases: &["key_w"], code: 17, event_type: EV_KEY, canonical: "KEY_W" },
    KeyEntry { name: "x", aliases: &["key_x"], code: 45, event_type: EV_KEY, canonical: "KEY_X" },
    KeyEntry { name: "y", aliases: &["key_y"], code: 21, event_type: EV_KEY, canonical: "KEY_Y" },
    KeyEntry { name: "z", aliases: &["key_z"], code: 44, event_type: EV_KEY, canonical: "KEY_Z" },

    // Digits 0-9
    KeyEntry { name: "0", aliases: &["key_0"], code: 11, event_type: EV_KEY, canonical: "KEY_0" },
    KeyEntry { name: "1", aliases: &["key_1"], code: 2, event_type: EV_KEY, canonical: "KEY_1" },
    KeyEntry { name: "2", aliases: &["key_2"], code: 3, event_type: EV_KEY, canonical: "KEY_2" },
    KeyEntry { name: "3", aliases: &["key_3"], code: 4, event_type: EV_KEY, canonical: "KEY_3" },
    KeyEntry { name: "4", aliases: &["key_4"], code: 5, event_type: EV_KEY, canonical: "KEY_4" },
    KeyEntry { name: "5", aliases: &["key_5"], code: 6, event_type: EV_KEY, canonical: "KEY_5" },
    KeyEntry { name: "6", aliases: &["key_6"], code: 7, event_type: EV_KEY, canonical: "KEY_6" },
    KeyEntry { name: "7", aliases: &["key_7"], code: 8, event_type: EV_KEY, canonical: "KEY_7" },
    KeyEntry { name: "8", aliases: &["key_8"], code: 9, event_type: EV_KEY, canonical: "KEY_8" },
    KeyEntry { name: "9", aliases: &["key_9"], code: 10, event_type: EV_KEY, canonical: "KEY_9" },

    // Function keys F1-F12
    KeyEntry { name: "f1", aliases: &["key_f1"], code: 59, event_type: EV_KEY, canonical: "KEY_F1" },
    KeyEntry { name: "f2", aliases: &["key_f2"], code: 60, event_type: EV_KEY, canonical: "KEY_F2" },
    KeyEntry { name: "f3", aliases: &["key_f3"], code: 61, event_type: EV_KEY, canonical: "KEY_F3" },
    KeyEntry { name: "f4", aliases: &["key_f4"], code: 62, event_type: EV_KEY, canonical: "KEY_F4" },
    KeyEntry { name: "f5", aliases: &["key_f5"], code: 63, event_type: EV_KEY, canonical: "KEY_F5" },
    KeyEntry { name: "f6", aliases: &["key_f6"], code: 64, event_type: EV_KEY, canonical: "KEY_F6" },
    KeyEntry { name: "f7", aliases: &["key_f7"], code: 65, event_type: EV_KEY, canonical: "KEY_F7" },
    KeyEntry { name: "f8", aliases: &["key_f8"], code: 66, event_type: EV_KEY, canonical: "KEY_F8" },
    KeyEntry { name: "f9", aliases: &["key_f9"], code: 67, event_type: EV_KEY, canonical: "KEY_F9" },
    KeyEntry { name: "f10", aliases: &["key_f10"], code: 68, event_type: EV_KEY, canonical: "KEY_F10" },
    KeyEntry { name: "f11", aliases: &["key_f11"], code: 87, event_type: EV_KEY, canonical: "KEY_F11" },
    KeyEntry { name: "f12", aliases: &["key_f12"], code: 88, event_type: EV_KEY, canonical: "KEY_F12" },

    // Arrow keys
    KeyEntry { name: "up", aliases: &["up_arrow", "key_up"], code: 103, event_type: EV_KEY, canonical: "KEY_UP" },
    KeyEntry { name: "down", aliases: &["down_arrow", "key_down"], code: 108, event_type: EV_KEY, canonical: "KEY_DOWN" },
    KeyEntry { name: "left_arrow", aliases: &["key_left"], code: 105, event_type: EV_KEY, canonical: "KEY_LEFT" },
    KeyEntry { name: "right_arrow", aliases: &["key_right"], code: 106, event_type: EV_KEY, canonical: "KEY_RIGHT" },
];

fn lookup_builtin(name: &str) -> Option<(EventType, u16)> {
    KEY_TABLE
        .iter()
        .find(|entry| {
            entry.name.eq_ignore_ascii_case(name)
                || entry.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
        })
        .map(|entry| (entry.event_type, entry.code))
}

/// Resolve a canonical kernel symbol name (`BTN_*`, `KEY_*`).
///
/// Single-letter, single-digit, and F1-F12 forms are derived from the primary
/// table by stripping the `KEY_` prefix instead of being enumerated twice;
/// everything else must carry an explicit `canonical` entry.
fn resolve_canonical(name: &str) -> Option<(EventType, u16)> {
    if let Some(entry) = KEY_TABLE
        .iter()
        .find(|entry| entry.canonical.eq_ignore_ascii_case(name))
    {
        return Some((entry.event_type, entry.code));
    }

    if !name.get(..4)?.eq_ignore_ascii_case("KEY_") {
        return None;
    }
    let suffix = name.get(4..)?;

    let single = suffix.len() == 1 && suffix.chars().all(|c| c.is_ascii_alphanumeric());
    let function_key = (2..=3).contains(&suffix.len())
        && suffix.get(..1).is_some_and(|f| f.eq_ignore_ascii_case("f"))
        && suffix[1..].chars().all(|c| c.is_ascii_digit());

    if single || function_key {
        return lookup_builtin(suffix);
    }

    None
}

/// Resolve a key name to its (event type, code) pair.
///
/// Resolution order, first match wins:
/// 1. built-in primary names and aliases, case-insensitive;
/// 2. canonical kernel symbol names (`BTN_SIDE`, `KEY_ENTER`, ...);
/// 3. a base-10 integer in [0, 0xFFFF], taken as a raw code.
///
/// The numeric fallback always assumes the key-event type; a bare number can
/// never name a relative or absolute axis.
pub fn resolve_key_name(name: &str) -> Option<(EventType, u16)> {
    if let Some(resolved) = lookup_builtin(name) {
        return Some(resolved);
    }

    if let Some(resolved) = resolve_canonical(name) {
        return Some(resolved);
    }

    name.parse::<u16>().ok().map(|code| (EventType::KEY, code))
}

/// Canonical kernel symbol for a (type, code) pair, if the table knows it.
///
/// Diagnostic display only; routing never consults this.
pub fn canonical_name(event_type: EventType, code: u16) -> Option<&'static str> {
    if event_type != EventType::KEY {
        return None;
    }

    KEY_TABLE
        .iter()
        .find(|entry| entry.code == code && entry.event_type == event_type)
        .map(|entry| entry.canonical)
}
