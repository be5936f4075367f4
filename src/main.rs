use argh::FromArgs;
use minish::reader::{EditorReader, LineSource, StreamReader};
use minish::{DEFAULT_PROMPT, DIAGNOSTIC_PREFIX, Interpreter, ShellError, Shutdown};
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(FromArgs)]
/// A minimal interactive command interpreter.
struct Args {
    /// prompt shown before each command line.
    #[argh(option, default = "DEFAULT_PROMPT.to_string()")]
    prompt: String,

    /// tracing filter directive, e.g. `debug` or `minish=trace`; falls back to RUST_LOG.
    #[argh(option)]
    log: Option<String>,

    /// read standard input as a plain stream even on a terminal.
    #[argh(switch)]
    plain: bool,
}

fn init_tracing(directive: Option<&str>) {
    let filter = match directive {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")),
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run(args: &Args) -> Result<Shutdown, ShellError> {
    let sh = Interpreter::default().with_prompt(args.prompt.as_str());
    let stdin = io::stdin();
    let mut source: Box<dyn LineSource> = if !args.plain && stdin.is_terminal() {
        Box::new(EditorReader::new()?)
    } else {
        Box::new(StreamReader::new(stdin.lock()))
    };
    sh.run(source.as_mut(), &mut io::stdout(), &mut io::stderr())
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();
    init_tracing(args.log.as_deref());

    match run(&args) {
        Ok(shutdown) => {
            debug!(?shutdown, "shell finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", DIAGNOSTIC_PREFIX, e);
            ExitCode::FAILURE
        }
    }
}
