use std::collections::VecDeque;

use log::{debug, trace};

use crate::instruction::Instruction;
use crate::tape::{CellId, Cells, Tape};

/// Result of a single call to [`Engine::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// One program character was executed (possibly a comment).
    Executed,
    /// A `,` found no input. Nothing advanced.
    Blocked,
    /// The instruction pointer is already past the end. Nothing happened.
    Done,
}

/// How [`Engine::run`] stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The program ran off its end; the instruction pointer is back at 0.
    Completed,
    /// A `,` is waiting for input. Supply some and run again to resume.
    Blocked,
}

/// A steppable Brainfuck machine.
///
/// State is fully observable between steps: the tape, the active cell, the
/// instruction pointer, pending input and accumulated output. Nothing here
/// fails. Unmatched brackets and comment characters are tolerated as
/// no-ops, and reading with no input parks the engine in a blocked state
/// until [`Engine::supply_input`] is called.
#[derive(Clone, Debug)]
pub struct Engine {
    program: Vec<char>,
    tape: Tape,
    active: CellId,
    ip: usize,
    loop_stack: Vec<usize>,
    input: VecDeque<char>,
    output: String,
    blocked: bool,
}

impl Engine {
    pub fn new(program: &str) -> Self {
        let tape = Tape::new();
        Self {
            program: program.chars().collect(),
            active: tape.origin(),
            tape,
            ip: 0,
            loop_stack: Vec::new(),
            input: VecDeque::new(),
            output: String::new(),
            blocked: false,
        }
    }

    /// Replace the program text. The instruction pointer and tape are kept.
    pub fn set_program(&mut self, program: &str) {
        self.program = program.chars().collect();
    }

    /// Reinitialize tape, pointers, stacks and buffers, keeping the program.
    pub fn reset(&mut self) {
        debug!("engine reset ({} cells discarded)", self.tape.cell_count());
        let program = std::mem::take(&mut self.program);
        *self = Self {
            program,
            ..Self::new("")
        };
    }

    /// Execute the character at the instruction pointer.
    pub fn step(&mut self) -> Step {
        if self.blocked {
            return Step::Blocked;
        }
        let Some(&c) = self.program.get(self.ip) else {
            return Step::Done;
        };
        trace!("ip={} op={c:?} cell={}", self.ip, self.tape.value(self.active));

        match Instruction::decode(c) {
            Some(Instruction::Increment) => self.tape.increment(self.active),
            Some(Instruction::Decrement) => self.tape.decrement(self.active),
            Some(Instruction::MoveRight) => self.active = self.tape.right_of(self.active),
            Some(Instruction::MoveLeft) => self.active = self.tape.left_of(self.active),
            Some(Instruction::LoopStart) => {
                if self.tape.value(self.active) == 0 {
                    self.ip = self.skip_loop();
                    return Step::Executed;
                }
                self.loop_stack.push(self.ip);
            }
            Some(Instruction::LoopEnd) => {
                // An extra ']' pops nothing and falls through.
                if let Some(start) = self.loop_stack.pop() {
                    if self.tape.value(self.active) != 0 {
                        // Land on the '[' so the condition is re-tested.
                        self.ip = start;
                        return Step::Executed;
                    }
                }
            }
            Some(Instruction::Output) => {
                self.output.push(char::from(self.tape.value(self.active)));
            }
            Some(Instruction::Input) => {
                let Some(ch) = self.input.pop_front() else {
                    debug!("blocked on input at ip={}", self.ip);
                    self.blocked = true;
                    return Step::Blocked;
                };
                self.tape.set(self.active, (u32::from(ch) % 256) as u8);
            }
            None => {}
        }

        self.ip += 1;
        Step::Executed
    }

    /// Position just past the ']' matching the '[' at the instruction
    /// pointer, or the end of the program if it has no match.
    fn skip_loop(&self) -> usize {
        let mut depth: usize = 0;
        for (i, &c) in self.program.iter().enumerate().skip(self.ip) {
            match c {
                '[' => depth += 1,
                ']' => depth -= 1,
                _ => {}
            }
            if depth == 0 {
                return i + 1;
            }
        }
        self.program.len()
    }

    /// Step until the program ends or blocks on input.
    ///
    /// On completion the instruction pointer rewinds to 0 so the same
    /// program can be run again over the existing tape. A program that
    /// never terminates makes this loop forever; see
    /// [`crate::runner::Runner`] for a bounded alternative.
    pub fn run(&mut self) -> RunOutcome {
        while self.step() == Step::Executed {}
        self.finish_run()
    }

    pub(crate) fn finish_run(&mut self) -> RunOutcome {
        if self.blocked {
            return RunOutcome::Blocked;
        }
        debug!("program completed, {} output chars", self.output.chars().count());
        self.ip = 0;
        RunOutcome::Completed
    }

    /// Queue input characters and clear the blocked flag.
    pub fn supply_input(&mut self, text: &str) {
        self.input.extend(text.chars());
        self.blocked = false;
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Instruction pointer, as a char offset into the program.
    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn is_done(&self) -> bool {
        self.ip >= self.program.len()
    }

    /// The program text as given to [`Engine::new`] or [`Engine::set_program`].
    pub fn program(&self) -> String {
        self.program.iter().collect()
    }

    /// The character at the instruction pointer, if any.
    pub fn current_char(&self) -> Option<char> {
        self.program.get(self.ip).copied()
    }

    /// Tape cells from leftmost to rightmost.
    pub fn cells(&self) -> Cells<'_> {
        self.tape.iter()
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn origin(&self) -> CellId {
        self.tape.origin()
    }

    pub fn leftmost(&self) -> CellId {
        self.tape.leftmost()
    }

    pub fn active(&self) -> CellId {
        self.active
    }

    /// Value of any cell on the tape.
    pub fn value(&self, id: CellId) -> u8 {
        self.tape.value(id)
    }

    /// Zero-based position of the active cell counted from the leftmost cell.
    pub fn active_index(&self) -> usize {
        self.tape.index_of(self.active)
    }

    /// Number of loops currently entered and not yet exited.
    pub fn loop_depth(&self) -> usize {
        self.loop_stack.len()
    }

    pub fn pending_input(&self) -> usize {
        self.input.len()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new("")
    }
}
