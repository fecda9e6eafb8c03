use std::{path::PathBuf, process::ExitCode, time::Instant};

use dfamin::prelude::*;

use tracing::{debug, info, trace};
use tracing_subscriber::{filter, prelude::*};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

fn size_arg(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .help(help)
        .required(true)
        .value_parser(value_parser!(u32))
}

fn cli() -> Command {
    Command::new("dfamin")
        .about("Prunes and minimizes deterministic finite automata")
        .subcommand_required(true)
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .global(true)
                .num_args(0..=1)
                .require_equals(true)
                .value_parser(["info", "debug", "trace"])
                .default_value("info")
                .default_missing_value("debug"),
        )
        .arg(
            Arg::new("time")
                .short('t')
                .long("time")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("print how long the minimization took"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("trace the partition classes of the refinement"),
        )
        .arg(
            Arg::new("no-print")
                .long("no-print")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("do not print the transition table of the result"),
        )
        .arg(
            Arg::new("save")
                .short('s')
                .long("save")
                .global(true)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("write the minimal automaton to a binary file"),
        )
        .subcommand(
            Command::new("dfa-string")
                .about("reads a dfa string like 001_101222")
                .arg(Arg::new("string").required(true)),
        )
        .subcommand(
            Command::new("nfa-string")
                .about("reads an nfa string like {01}0{}2{}{}--+ and determinizes it")
                .arg(Arg::new("string").required(true)),
        )
        .subcommand(
            Command::new("bamboo")
                .about("a chain of states that ends in an accepting sink")
                .arg(size_arg("size", "number of states"))
                .arg(size_arg("alphabet", "number of symbols")),
        )
        .subcommand(
            Command::new("circle")
                .about("a cycle of states with one accepting state")
                .arg(size_arg("size", "number of states"))
                .arg(size_arg("alphabet", "number of symbols")),
        )
        .subcommand(
            Command::new("repeated-cycle")
                .about("a unary cycle whose acceptance pattern repeats with the given period")
                .arg(size_arg("size", "number of states"))
                .arg(size_arg("cycle", "period of the acceptance pattern")),
        )
        .subcommand(
            Command::new("bin-file")
                .about("reads an automaton in the binary layout")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("compare")
                .about("minimizes two automata and checks whether they are the same")
                .arg(
                    Arg::new("left")
                        .required(true)
                        .help("dfa:<string>, nfa:<string> or bin:<path>"),
                )
                .arg(Arg::new("right").required(true)),
        )
}

fn setup_logging(matches: &ArgMatches) {
    let level = if matches.get_flag("debug") {
        filter::LevelFilter::TRACE
    } else {
        match matches
            .get_one::<String>("verbosity")
            .map(String::as_str)
            .unwrap_or("info")
        {
            "trace" => filter::LevelFilter::TRACE,
            "debug" => filter::LevelFilter::DEBUG,
            _ => filter::LevelFilter::INFO,
        }
    };

    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();

    trace!("setup {level} logging");
}

fn required<'a, T: Clone + Send + Sync + 'static>(matches: &'a ArgMatches, id: &str) -> &'a T {
    matches
        .get_one::<T>(id)
        .expect("clap enforces required arguments")
}

/// Builds the automaton that the subcommand `name` describes.
fn load_source(name: &str, matches: &ArgMatches) -> Result<Dfa> {
    match name {
        "dfa-string" => text::parse_dfa_string(required::<String>(matches, "string")),
        "nfa-string" => {
            text::parse_nfa_string(required::<String>(matches, "string"))?.determinize()
        }
        "bamboo" => generate::bamboo(*required(matches, "size"), *required(matches, "alphabet")),
        "circle" => generate::circle(*required(matches, "size"), *required(matches, "alphabet")),
        "repeated-cycle" => {
            generate::repeated_cycle(*required(matches, "size"), *required(matches, "cycle"))
        }
        "bin-file" => binary::load(required::<PathBuf>(matches, "path")),
        _ => unreachable!("clap only accepts the declared subcommands"),
    }
}

/// Reads an operand of `compare`, which names its source with a `dfa:`, `nfa:` or `bin:`
/// prefix. Operands without a prefix are paths to binary files.
fn load_operand(operand: &str) -> Result<Dfa> {
    match operand.split_once(':') {
        Some(("dfa", string)) => text::parse_dfa_string(string),
        Some(("nfa", string)) => text::parse_nfa_string(string)?.determinize(),
        Some(("bin", path)) => binary::load(path),
        _ => binary::load(operand),
    }
}

fn compare(matches: &ArgMatches) -> Result<bool> {
    let left = load_operand(required::<String>(matches, "left"))?;
    let right = load_operand(required::<String>(matches, "right"))?;
    debug!(
        "comparing automata with {} and {} states",
        left.size(),
        right.size()
    );
    Ok(left.minimize().is_isomorphic_to(&right.minimize()))
}

fn run(name: &str, matches: &ArgMatches) -> Result<()> {
    if name == "compare" {
        let equal = compare(matches)?;
        println!("{}", if equal { "equal!" } else { "different!" });
        return Ok(());
    }

    let dfa = load_source(name, matches)?;
    info!(
        "read dfa with {} states over {} symbols",
        dfa.size(),
        dfa.alphabet_size()
    );

    let options = MinimizeOptions {
        trace_classes: matches.get_flag("debug"),
    };
    let start = Instant::now();
    let Minimized {
        dfa: minimal,
        report,
    } = Minimizer::with_options(&dfa, options).run();
    let elapsed = start.elapsed();
    info!("{report}");

    if matches.get_flag("time") {
        println!("Execution time: {} seconds.", elapsed.as_secs_f64());
    }
    if !matches.get_flag("no-print") {
        print!("{minimal}");
    }
    if let Some(path) = matches.get_one::<PathBuf>("save") {
        binary::save(&minimal, path)?;
        println!("Saved successfully to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    let Some((name, sub_matches)) = matches.subcommand() else {
        unreachable!("a subcommand is required")
    };

    setup_logging(sub_matches);

    match run(name, sub_matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}
