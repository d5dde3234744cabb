use std::fmt::Write;
use std::ops::Range;

/// The eight Brainfuck instructions.
///
/// Every other character in a program is a comment and executes as a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Instruction {
    Increment,
    Decrement,
    MoveLeft,
    MoveRight,
    LoopStart,
    LoopEnd,
    Output,
    Input,
}

const PLUS: char = '+';
const MINUS: char = '-';
const LESS: char = '<';
const GREATER: char = '>';
const LBRACKET: char = '[';
const RBRACKET: char = ']';
const DOT: char = '.';
const COMMA: char = ',';

impl Instruction {
    /// Decode a program character, or `None` if it is a comment.
    pub fn decode(c: char) -> Option<Self> {
        match c {
            PLUS => Some(Self::Increment),
            MINUS => Some(Self::Decrement),
            LESS => Some(Self::MoveLeft),
            GREATER => Some(Self::MoveRight),
            LBRACKET => Some(Self::LoopStart),
            RBRACKET => Some(Self::LoopEnd),
            DOT => Some(Self::Output),
            COMMA => Some(Self::Input),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Increment => PLUS,
            Self::Decrement => MINUS,
            Self::MoveLeft => LESS,
            Self::MoveRight => GREATER,
            Self::LoopStart => LBRACKET,
            Self::LoopEnd => RBRACKET,
            Self::Output => DOT,
            Self::Input => COMMA,
        }
    }

    pub fn class(self) -> TokenClass {
        match self {
            Self::Increment | Self::Decrement => TokenClass::Arith,
            Self::MoveLeft | Self::MoveRight => TokenClass::Pointer,
            Self::Output | Self::Input => TokenClass::Io,
            Self::LoopStart | Self::LoopEnd => TokenClass::Bracket,
        }
    }

    fn mnemonic(self) -> &'static str {
        match self {
            Self::Increment => "INC",
            Self::Decrement => "DEC",
            Self::MoveLeft => "LEFT",
            Self::MoveRight => "RIGHT",
            Self::LoopStart => "LOOP",
            Self::LoopEnd => "END",
            Self::Output => "OUT",
            Self::Input => "IN",
        }
    }
}

/// Returns true if the character is one of the eight instructions.
pub fn is_instruction(c: char) -> bool {
    Instruction::decode(c).is_some()
}

/// Highlighting category of an instruction character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenClass {
    /// `+` and `-`
    Arith,
    /// `<` and `>`
    Pointer,
    /// `.` and `,`
    Io,
    /// `[` and `]`
    Bracket,
}

/// A run of same-class instruction characters, as char offsets into the program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub range: Range<usize>,
    pub class: TokenClass,
}

/// Split a program into maximal runs of same-class instructions.
///
/// Comment characters break runs and are not covered by any span, so
/// `"++ --"` yields two `Arith` spans.
pub fn classify(program: &str) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    for (i, c) in program.chars().enumerate() {
        let Some(class) = Instruction::decode(c).map(Instruction::class) else {
            continue;
        };
        match spans.last_mut() {
            Some(last) if last.class == class && last.range.end == i => last.range.end = i + 1,
            _ => spans.push(Span {
                range: i..i + 1,
                class,
            }),
        }
    }
    spans
}

/// Pretty-print a disassembly of the program for human inspection.
///
/// One line per instruction: the char offset, the symbol and a mnemonic,
/// indented by loop nesting depth. Comments are dropped.
pub fn disassemble(program: &str) -> String {
    let mut out = String::new();
    let mut depth: usize = 0;
    for (i, c) in program.chars().enumerate() {
        let Some(instr) = Instruction::decode(c) else {
            continue;
        };
        if instr == Instruction::LoopEnd {
            depth = depth.saturating_sub(1);
        }
        let indent = "  ".repeat(depth);
        let _ = writeln!(out, "{i:04}: {indent}{} {}", instr.symbol(), instr.mnemonic());
        if instr == Instruction::LoopStart {
            depth += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_all_symbols() {
        for c in "+-<>[].,".chars() {
            let instr = Instruction::decode(c).unwrap();
            assert_eq!(instr.symbol(), c);
        }
    }

    #[test]
    fn test_comments_are_not_instructions() {
        for c in "abc 019\n#!{}".chars() {
            assert!(!is_instruction(c), "{c:?} should be a comment");
        }
    }

    #[test]
    fn test_classify_runs() {
        let spans = classify("++>>[.]");
        assert_eq!(
            spans,
            vec![
                Span { range: 0..2, class: TokenClass::Arith },
                Span { range: 2..4, class: TokenClass::Pointer },
                Span { range: 4..5, class: TokenClass::Bracket },
                Span { range: 5..6, class: TokenClass::Io },
                Span { range: 6..7, class: TokenClass::Bracket },
            ]
        );
    }

    #[test]
    fn test_classify_comment_breaks_run() {
        let spans = classify("+- x-+");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].range, 0..2);
        assert_eq!(spans[1].range, 4..6);
    }

    #[test]
    fn test_classify_uses_char_offsets() {
        // Multi-byte comment characters count as one position each.
        let spans = classify("é+");
        assert_eq!(spans[0].range, 1..2);
    }

    #[test]
    fn test_disassemble_indents_loops() {
        let text = disassemble("+[-]");
        assert_eq!(text, "0000: + INC\n0001: [ LOOP\n0002:   - DEC\n0003: ] END\n");
    }

    #[test]
    fn test_disassemble_unbalanced_close() {
        // An extra ']' must not underflow the indentation.
        let text = disassemble("]+");
        assert_eq!(text, "0000: ] END\n0001: + INC\n");
    }
}
