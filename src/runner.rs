use std::collections::VecDeque;
use std::io::{BufRead, Write};

use log::{debug, info};

use crate::engine::{Engine, RunOutcome, Step};
use crate::error::{Error, Result};

/// A supply of input for programs that block on `,`.
///
/// Each call hands over the next chunk of text, or `None` once nothing is
/// left. A runner only asks when the engine is actually blocked, and passes
/// the engine so the source can see what the program printed so far.
pub trait InputSource {
    fn next_chunk(&mut self, engine: &Engine) -> Result<Option<String>>;
}

impl<S: InputSource + ?Sized> InputSource for Box<S> {
    fn next_chunk(&mut self, engine: &Engine) -> Result<Option<String>> {
        (**self).next_chunk(engine)
    }
}

/// Input fixed up front, handed out one chunk per request.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    chunks: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }

    /// A source that never provides anything.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl InputSource for ScriptedInput {
    fn next_chunk(&mut self, _engine: &Engine) -> Result<Option<String>> {
        Ok(self.chunks.pop_front())
    }
}

/// Input read line by line from a reader, newline included.
pub struct LineInput<R> {
    reader: R,
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> InputSource for LineInput<R> {
    fn next_chunk(&mut self, _engine: &Engine) -> Result<Option<String>> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).map_err(Error::Input)?;
        Ok((n > 0).then_some(line))
    }
}

/// Writes the engine's output to `writer` as it appears, one byte per char.
///
/// Wraps another source so that anything printed before a `,` is flushed
/// before that source is asked for more input, so prompts show up ahead of
/// the read they precede.
pub struct ForwardOutput<W, S> {
    writer: W,
    source: S,
    /// Byte offset into `Engine::output` already written.
    written: usize,
}

impl<W: Write, S: InputSource> ForwardOutput<W, S> {
    pub fn new(writer: W, source: S) -> Self {
        Self {
            writer,
            source,
            written: 0,
        }
    }

    /// Write and flush any output produced since the last call. Meant for
    /// one engine; output from before a reset is not replayed.
    pub fn flush(&mut self, engine: &Engine) -> Result<()> {
        let pending = engine.output().get(self.written..).unwrap_or("");
        if !pending.is_empty() {
            // Output chars are cell values, so each fits in one byte.
            let bytes: Vec<u8> = pending.chars().map(|c| c as u8).collect();
            self.writer.write_all(&bytes).map_err(Error::Output)?;
            self.written = engine.output().len();
        }
        self.writer.flush().map_err(Error::Output)
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write, S: InputSource> InputSource for ForwardOutput<W, S> {
    fn next_chunk(&mut self, engine: &Engine) -> Result<Option<String>> {
        self.flush(engine)?;
        self.source.next_chunk(engine)
    }
}

/// Configuration for a bounded run.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Maximum instruction steps before giving up (0 to disable).
    pub step_limit: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            step_limit: 1 << 24, // 16777216
        }
    }
}

/// Summary of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Steps executed by this run, not counting blocked retries.
    pub steps: usize,
    /// Number of times the program blocked and was refilled.
    pub refills: usize,
}

/// Drives an [`Engine`] to completion under an external step bound,
/// feeding it from an [`InputSource`] whenever it blocks.
pub struct Runner {
    config: RunConfig,
}

impl Runner {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run to completion. The instruction pointer rewinds to 0 afterwards,
    /// matching [`Engine::run`].
    pub fn run(&self, engine: &mut Engine, input: &mut dyn InputSource) -> Result<RunReport> {
        self.trace(engine, input, |_| {})
    }

    /// Like [`Runner::run`], calling `on_step` after every executed step.
    pub fn trace<F>(
        &self,
        engine: &mut Engine,
        input: &mut dyn InputSource,
        mut on_step: F,
    ) -> Result<RunReport>
    where
        F: FnMut(&Engine),
    {
        let limit = self.config.step_limit;
        let mut report = RunReport { steps: 0, refills: 0 };

        loop {
            match engine.step() {
                Step::Executed => {
                    report.steps += 1;
                    on_step(engine);
                    if limit > 0 && report.steps >= limit && !engine.is_done() {
                        return Err(Error::StepLimitExceeded {
                            limit,
                            ip: engine.ip(),
                        });
                    }
                }
                Step::Blocked => match input.next_chunk(engine)? {
                    Some(chunk) => {
                        debug!("refilling {} input chars at ip={}", chunk.chars().count(), engine.ip());
                        report.refills += 1;
                        engine.supply_input(&chunk);
                    }
                    None => return Err(Error::InputExhausted { ip: engine.ip() }),
                },
                Step::Done => break,
            }
        }

        let outcome = engine.finish_run();
        debug_assert_eq!(outcome, RunOutcome::Completed);
        info!("run finished in {} steps ({} refills)", report.steps, report.refills);
        Ok(report)
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(RunConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_run_simple_program() {
        let mut engine = Engine::new("+++.");
        let report = Runner::default()
            .run(&mut engine, &mut ScriptedInput::empty())
            .unwrap();
        assert_eq!(report.steps, 4);
        assert_eq!(report.refills, 0);
        assert_eq!(engine.output(), "\u{3}");
        assert_eq!(engine.ip(), 0);
    }

    #[test]
    fn test_step_limit_stops_infinite_loop() {
        let mut engine = Engine::new("+[]");
        let runner = Runner::new(RunConfig { step_limit: 100 });
        let err = runner
            .run(&mut engine, &mut ScriptedInput::empty())
            .unwrap_err();
        assert!(matches!(err, Error::StepLimitExceeded { limit: 100, .. }));
    }

    #[test]
    fn test_step_limit_exactly_enough() {
        // A program that finishes on its last allowed step is not an error.
        let mut engine = Engine::new("+++");
        let runner = Runner::new(RunConfig { step_limit: 3 });
        let report = runner.run(&mut engine, &mut ScriptedInput::empty()).unwrap();
        assert_eq!(report.steps, 3);
    }

    #[test]
    fn test_zero_limit_disables_bound() {
        let mut engine = Engine::new(&"+".repeat(1000));
        let runner = Runner::new(RunConfig { step_limit: 0 });
        let report = runner.run(&mut engine, &mut ScriptedInput::empty()).unwrap();
        assert_eq!(report.steps, 1000);
    }

    #[test]
    fn test_refills_from_scripted_input() {
        let mut engine = Engine::new(",.,.");
        let mut input = ScriptedInput::new(["a", "b"]);
        let report = Runner::default().run(&mut engine, &mut input).unwrap();
        assert_eq!(engine.output(), "ab");
        assert_eq!(report.refills, 2);
    }

    #[test]
    fn test_input_exhausted() {
        let mut engine = Engine::new("+,.");
        let err = Runner::default()
            .run(&mut engine, &mut ScriptedInput::empty())
            .unwrap_err();
        assert!(matches!(err, Error::InputExhausted { ip: 1 }));
        assert!(engine.is_blocked());
    }

    #[test]
    fn test_line_input() {
        // Each line keeps its newline, which the program echoes too.
        let mut engine = Engine::new(",.,.,.");
        let mut input = LineInput::new(Cursor::new("hi\n"));
        Runner::default().run(&mut engine, &mut input).unwrap();
        assert_eq!(engine.output(), "hi\n");
    }

    #[test]
    fn test_line_input_eof() {
        let mut input = LineInput::new(Cursor::new(""));
        assert!(input.next_chunk(&Engine::default()).unwrap().is_none());
    }

    /// Records the output the engine had each time input was requested.
    struct Recording {
        seen: Vec<String>,
        chunks: ScriptedInput,
    }

    impl InputSource for Recording {
        fn next_chunk(&mut self, engine: &Engine) -> Result<Option<String>> {
            self.seen.push(engine.output().to_string());
            self.chunks.next_chunk(engine)
        }
    }

    #[test]
    fn test_source_sees_prompt_before_refill() {
        // Prints 'A', then reads and echoes.
        let mut engine = Engine::new("++++++++[>++++++++<-]>+.,.");
        let mut input = Recording {
            seen: Vec::new(),
            chunks: ScriptedInput::new(["z"]),
        };
        Runner::default().run(&mut engine, &mut input).unwrap();
        assert_eq!(input.seen, vec!["A".to_string()]);
        assert_eq!(engine.output(), "Az");
    }

    #[test]
    fn test_forward_output_writes_before_each_read() {
        let mut engine = Engine::new("++++++++[>++++++++<-]>+.,.,.");
        let mut input = ForwardOutput::new(
            Vec::new(),
            Recording {
                seen: Vec::new(),
                chunks: ScriptedInput::new(["z", "y"]),
            },
        );
        Runner::default().run(&mut engine, &mut input).unwrap();
        // Both prompts were already written when the inner source was asked.
        assert_eq!(input.source.seen, vec!["A".to_string(), "Az".to_string()]);
        input.flush(&engine).unwrap();
        assert_eq!(input.into_writer(), b"Azy".to_vec());
    }

    #[test]
    fn test_forward_output_raw_bytes() {
        // Cell value 255 is written as a single byte, not as UTF-8.
        let mut engine = Engine::new("-.");
        engine.run();
        let mut out = ForwardOutput::new(Vec::new(), ScriptedInput::empty());
        out.flush(&engine).unwrap();
        out.flush(&engine).unwrap();
        assert_eq!(out.into_writer(), vec![255]);
    }

    /// A writer whose every write fails.
    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_forward_output_reports_write_error() {
        let mut engine = Engine::new("+.,");
        let mut input = ForwardOutput::new(Broken, ScriptedInput::new(["x"]));
        let err = Runner::default().run(&mut engine, &mut input).unwrap_err();
        assert!(matches!(err, Error::Output(_)));
    }

    #[test]
    fn test_trace_sees_every_step() {
        let mut engine = Engine::new(">+<");
        let mut seen = Vec::new();
        Runner::default()
            .trace(&mut engine, &mut ScriptedInput::empty(), |e| {
                seen.push((e.ip(), e.active_index()));
            })
            .unwrap();
        assert_eq!(seen, vec![(1, 1), (2, 1), (3, 0)]);
    }

    #[test]
    fn test_resume_after_blocked_engine_run() {
        // The engine may be left blocked by a plain run and finished here.
        let mut engine = Engine::new(",+.");
        assert_eq!(engine.run(), RunOutcome::Blocked);
        let mut input = ScriptedInput::new(["@"]);
        let report = Runner::default().run(&mut engine, &mut input).unwrap();
        assert_eq!(engine.output(), "A");
        assert_eq!(report.refills, 1);
    }

    #[test]
    fn test_random_programs_respect_limit() {
        use rand::rngs::SmallRng;
        use rand::{Rng, SeedableRng};

        const OPS: &[u8] = b"+-<>[].";
        let mut rng = SmallRng::seed_from_u64(0xbf);
        let runner = Runner::new(RunConfig { step_limit: 2000 });
        for _ in 0..200 {
            let len = rng.gen_range(0..64);
            let program: String = (0..len)
                .map(|_| OPS[rng.gen_range(0..OPS.len())] as char)
                .collect();
            let mut engine = Engine::new(&program);
            match runner.run(&mut engine, &mut ScriptedInput::empty()) {
                Ok(report) => assert!(report.steps <= 2000),
                Err(Error::StepLimitExceeded { limit, .. }) => assert_eq!(limit, 2000),
                Err(other) => panic!("unexpected error for {program:?}: {other}"),
            }
        }
    }
}
