use std::io;
use std::path::PathBuf;

use bonafide::engine::Engine;
use bonafide::error::{Error, Result};
use bonafide::instruction::disassemble;
use bonafide::render::{render_position, render_status, render_tape};
use bonafide::runner::{ForwardOutput, InputSource, LineInput, RunConfig, Runner, ScriptedInput};
use clap::Parser;
use log::info;

#[derive(Parser)]
#[command(name = "bonafide", about = "Step-through Brainfuck interpreter")]
struct Cli {
    /// Program file to run.
    file: Option<PathBuf>,

    /// Program text given inline instead of a file.
    #[arg(short = 'e', long = "execute", conflicts_with = "file")]
    program: Option<String>,

    /// Input queued before the program starts.
    #[arg(long, default_value = "")]
    input: String,

    /// Max steps before aborting (0 to disable).
    #[arg(long, default_value_t = RunConfig::default().step_limit)]
    step_limit: usize,

    /// Print the instruction pointer and tape after every step (to stderr).
    #[arg(long)]
    trace: bool,

    /// Print the tape once the program finishes (to stderr).
    #[arg(long)]
    dump: bool,

    /// Print a disassembly of the program and exit.
    #[arg(long)]
    disassemble: bool,

    /// Fail instead of reading more input from stdin when the program blocks.
    #[arg(long)]
    no_stdin: bool,
}

fn load_program(cli: &Cli) -> Result<String> {
    if let Some(ref program) = cli.program {
        return Ok(program.clone());
    }
    let path = cli.file.as_ref().ok_or(Error::NoProgram)?;
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })
}

fn run(cli: &Cli) -> Result<()> {
    let program = load_program(cli)?;

    if cli.disassemble {
        print!("{}", disassemble(&program));
        return Ok(());
    }

    let mut engine = Engine::new(&program);
    engine.supply_input(&cli.input);

    let refill: Box<dyn InputSource> = if cli.no_stdin {
        Box::new(ScriptedInput::empty())
    } else {
        Box::new(LineInput::new(io::stdin().lock()))
    };
    // Prompts printed before a `,` reach the terminal before stdin is read.
    let mut source = ForwardOutput::new(io::stdout(), refill);

    let runner = Runner::new(RunConfig {
        step_limit: cli.step_limit,
    });
    info!("running {} chars with step limit {}", program.chars().count(), cli.step_limit);

    let result = if cli.trace {
        runner.trace(&mut engine, &mut source, |e| {
            eprintln!("{}", render_status(e));
            eprint!("{}", render_tape(e));
        })
    } else {
        runner.run(&mut engine, &mut source)
    };

    // Whatever was produced before a failure is still worth showing.
    let flushed = source.flush(&engine);

    if cli.dump || result.is_err() {
        eprintln!();
        if result.is_err() {
            eprint!("{}", render_position(&engine));
        }
        eprint!("{}", render_tape(&engine));
    }

    let report = result?;
    flushed?;
    info!("{} steps, {} refills", report.steps, report.refills);
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
