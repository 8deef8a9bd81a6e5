use libtungsten::{OutputKind, SessionRegistry};
use tungsten::{run_tungsten, Opts, TungstenResult};

use std::env;
use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::process::{Command, Stdio};
use termcolor::{BufferedStandardStream, ColorChoice, WriteColor};

fn get_opts(color: bool) -> Opts {
    let matches = clap::App::new(clap::crate_name!())
        .version(clap::crate_version!())
        .about(clap::crate_description!())
        .author(clap::crate_authors!())
        .arg(
            clap::Arg::with_name("program")
                .help("Program to evaluate; statements are separated by \";\"")
                .required(true)
                .default_value_ifs(&[("explain", None, ""), ("interactive", None, "")]),
        )
        .arg(
            clap::Arg::with_name("output-form")
                .short("-o")
                .long("--output-form")
                .next_line_help(true)
                .help(
                    "Tungsten emit format. Possible values:\n\
                    \tfullform: Canonical head notation, like \"Plus[1, 2]\".\n\
                    \tdebug:    Opaque internal representation. Note: this format is not stable.\n\
                    ",
                )
                .hide_possible_values(true)
                .default_value("fullform")
                .takes_value(true)
                .possible_values(&["fullform", "debug"]),
        )
        .arg(
            clap::Arg::with_name("parse-only")
                .long("--parse-only")
                .help("Stop after parsing and emit the translated expression trees unevaluated"),
        )
        .arg(
            clap::Arg::with_name("explain")
                .long("--explain")
                .value_name("diagnostic")
                .help("Provide a detailed explanation for a diagnostic code.")
                .takes_value(true),
        )
        .arg(
            clap::Arg::with_name("interactive")
                .short("-i")
                .long("--interactive")
                .help("Run an interactive session; each line is one submission."),
        )
        .get_matches();

    Opts {
        program: matches.value_of("program").unwrap().into(),
        emit_format: matches.value_of("output-form").unwrap().into(),
        parse_only: matches.is_present("parse-only"),
        explain_diagnostic: matches.value_of("explain").map(str::to_owned),
        interactive: matches.is_present("interactive"),
        color,
    }
}

fn main_impl() -> Result<(), Box<dyn std::error::Error>> {
    let mut ch_stdout = BufferedStandardStream::stdout(ColorChoice::Auto);
    let mut ch_stderr = BufferedStandardStream::stderr(ColorChoice::Auto);
    let is_tty = atty::is(atty::Stream::Stderr);
    let use_color = is_tty && ch_stderr.supports_color();

    let opts = get_opts(use_color);
    if opts.interactive {
        return run_session(&mut ch_stdout, &mut ch_stderr);
    }

    let TungstenResult {
        code,
        stdout,
        stderr,
        page,
    } = run_tungsten(opts);

    if !stderr.is_empty() {
        writeln!(&mut ch_stderr, "{}", stderr)?;
        ch_stderr.flush()?;
    }
    if !stdout.is_empty() {
        print_stdout(&stdout, &mut ch_stdout, page)?;
    }

    std::process::exit(code)
}

/// Drives an interactive session over the public session API: every line read is submitted with
/// the next sequence number and its in-order completion is printed before the next prompt.
fn run_session(
    ch_stdout: &mut BufferedStandardStream,
    ch_stderr: &mut BufferedStandardStream,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = SessionRegistry::new();
    let handle = registry.create_session();
    let mut seq_num = handle.initial_seq_num;

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        write!(ch_stdout, "tungsten> ")?;
        ch_stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            writeln!(ch_stdout)?;
            ch_stdout.flush()?;
            return Ok(());
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        registry.submit(&handle.topic_id, input, seq_num);
        seq_num += 1;
        match registry.await_result(&handle.topic_id) {
            Some(out) if out.kind == OutputKind::Diagnostic => {
                writeln!(ch_stderr, "{}", out.print_content)?;
                ch_stderr.flush()?;
            }
            Some(out) => {
                writeln!(ch_stdout, "{}", out.print_content)?;
                ch_stdout.flush()?;
            }
            None => return Ok(()),
        }
    }
}

/// Basically just copied from rust/src/librustc_driver/lib.rs#show_content_with_pager
fn print_stdout(
    stdout: &str,
    mut ch_stdout: &mut BufferedStandardStream,
    page: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut fallback_to_println = false;

    if page {
        let pager_name = env::var_os("PAGER")
            .unwrap_or_else(|| OsString::from(if cfg!(windows) { "more.com" } else { "less" }));

        match Command::new(pager_name).stdin(Stdio::piped()).spawn() {
            Ok(mut pager) => {
                if let Some(pipe) = pager.stdin.as_mut() {
                    if pipe.write_all(stdout.as_bytes()).is_err() {
                        fallback_to_println = true;
                    }
                }

                if pager.wait().is_err() {
                    fallback_to_println = true;
                }
            }
            Err(_) => {
                fallback_to_println = true;
            }
        }
    }

    // If pager fails for whatever reason, we should still print the content to standard output.
    if fallback_to_println || !page {
        write!(&mut ch_stdout, "{}", stdout)?;
        ch_stdout.flush()?;
    }

    Ok(())
}

fn main() {
    let out = std::panic::catch_unwind(main_impl);

    if let Err(..) = out {
        eprint!("\nnote: you found an internal tungsten error (ITE; it's like an ICE, but for tungsten)!\n");
        eprint!("\nnote: we would appreciate a bug report for this failure\n");
        std::process::exit(2);
    }
}
