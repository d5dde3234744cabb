//! Plain-text views of engine state for terminals and logs.

use crate::engine::Engine;

/// Printable form of a cell value: the character itself for visible ASCII,
/// `·` for everything else.
pub fn printable(value: u8) -> char {
    if value.is_ascii_graphic() || value == b' ' {
        char::from(value)
    } else {
        '·'
    }
}

/// Render the tape left to right as three aligned rows: decimal values,
/// printable characters, and markers. The active cell is marked `^`, the
/// origin `*`, and `@` when they coincide.
pub fn render_tape(engine: &Engine) -> String {
    let mut values = String::new();
    let mut chars = String::new();
    let mut marks = String::new();

    for (id, value) in engine.cells() {
        let mark = match (id == engine.active(), id == engine.origin()) {
            (true, true) => '@',
            (true, false) => '^',
            (false, true) => '*',
            (false, false) => ' ',
        };
        values.push_str(&format!("{value:>4}"));
        chars.push_str(&format!("{:>4}", printable(value)));
        marks.push_str(&format!("{mark:>4}"));
    }

    format!("{}\n{}\n{}\n", values, chars, marks.trim_end())
}

/// Render the program with a caret under the instruction pointer.
///
/// Newlines in the program are shown as spaces so the caret stays aligned.
/// When the program is finished the caret sits one past its end.
pub fn render_position(engine: &Engine) -> String {
    let line: String = engine
        .program()
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    format!("{line}\n{}^\n", " ".repeat(engine.ip()))
}

/// One-line status: instruction pointer, current character, active cell.
pub fn render_status(engine: &Engine) -> String {
    let op = engine
        .current_char()
        .map_or_else(|| "end".to_string(), |c| format!("{c:?}"));
    let state = if engine.is_blocked() { " [waiting for input]" } else { "" };
    format!(
        "ip={:<5} op={:<5} cell[{}]={}{}",
        engine.ip(),
        op,
        engine.active_index(),
        engine.value(engine.active()),
        state
    )
}
