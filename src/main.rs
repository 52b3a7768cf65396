use argh::FromArgs;
use dsh::{EditorLineSource, Interpreter};
use std::process::ExitCode;

#[derive(FromArgs)]
/// Interactive command interpreter.
struct Args {
    #[argh(switch, short = 'd')]
    /// print a summary of every command after it ran
    debug: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args: Args = argh::from_env();

    let mut source = match EditorLineSource::new() {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{}: cannot start line editor: {}", dsh::SHELL_NAME, e);
            return ExitCode::FAILURE;
        }
    };

    let code = Interpreter::new().debug(args.debug).repl(&mut source);
    log::debug!("leaving with status {}", code);
    ExitCode::from(code.rem_euclid(256) as u8)
}
