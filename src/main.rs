use clap::{arg, command, value_parser, Arg, ArgMatches, Command};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::Level;

use treenet::fixtures::{self, Scenario};
use treenet::runtime::Step;
use treenet::test_runner::run_checks;
use treenet::{Config, Reducer, RuntimeError, Schedule};

fn cli() -> Command {
    command!()
        .subcommand_required(true)
        .arg(
            arg!(--log <LEVEL> "Log level written to stderr")
                .global(true)
                .value_parser(value_parser!(Level))
                .default_value("warn"),
        )
        .arg(
            arg!(--config <FILE> "JSON file with engine settings")
                .global(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .subcommand(
            Command::new("check")
                .about("Reduce the closure net of every rule and every scenario")
                .arg(arg!([filter] "Only run checks whose name contains this")),
        )
        .subcommand(
            Command::new("demo")
                .about("Reduce a built-in scenario and print its read-back")
                .arg(arg!([scenario] "Scenario to run; all of them if omitted"))
                .arg(arg!(--stats "Print rewrite statistics"))
                .arg(arg!(--dump "Print a JSON snapshot of the net after every step"))
                .arg(
                    Arg::new("schedule")
                        .long("schedule")
                        .help("Order in which pending redexes are reduced")
                        .value_parser(["lifo", "random"]),
                )
                .arg(
                    arg!(--seed <SEED> "Seed for the random schedule; implies --schedule random")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    arg!(--"max-steps" <STEPS> "Give up after this many interactions")
                        .value_parser(value_parser!(u64)),
                ),
        )
}

fn main() -> ExitCode {
    let matches = cli().get_matches();

    let level = *matches.get_one::<Level>("log").unwrap();
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = match load_config(matches.get_one::<PathBuf>("config")) {
        Ok(config) => config,
        Err(err) => {
            println!("{:?}", miette::Report::new(err));
            return ExitCode::FAILURE;
        }
    };

    let ok = match matches.subcommand() {
        Some(("check", args)) => run_checks(
            &config,
            args.get_one::<String>("filter").map(String::as_str),
        ),
        Some(("demo", args)) => run_demo(config, args),
        _ => unreachable!(),
    };
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn load_config(file: Option<&PathBuf>) -> Result<Config, RuntimeError> {
    let Some(file) = file else {
        return Ok(Config::default());
    };
    let source = std::fs::read_to_string(file).map_err(|err| {
        RuntimeError::InvalidConfig(format!("cannot read {}: {err}", file.display()))
    })?;
    Config::from_json(&source)
}

fn run_demo(mut config: Config, args: &ArgMatches) -> bool {
    match demo_schedule(args) {
        Ok(Some(schedule)) => config.schedule = schedule,
        Ok(None) => {}
        Err(msg) => {
            println!("{}", msg.bright_red());
            return false;
        }
    }
    if let Some(steps) = args.get_one::<u64>("max-steps") {
        config.max_steps = Some(*steps);
    }

    let scenarios = match args.get_one::<String>("scenario") {
        Some(name) => match fixtures::scenario(name) {
            Some(scenario) => vec![scenario],
            None => {
                println!("{}: {}", "No such scenario".bright_red(), name);
                let names: Vec<&str> = fixtures::scenarios().iter().map(|s| s.name).collect();
                println!("Available: {}", names.join(", "));
                return false;
            }
        },
        None => fixtures::scenarios(),
    };

    let mut ok = true;
    for scenario in &scenarios {
        match demo(scenario, &config, args.get_flag("stats"), args.get_flag("dump")) {
            Ok(matched) => ok &= matched,
            Err(err) => {
                println!("{:?}", miette::Report::new(err));
                ok = false;
            }
        }
    }
    ok
}

/// The schedule asked for on the command line, if any. `--seed` on its own selects the
/// random schedule.
fn demo_schedule(args: &ArgMatches) -> Result<Option<Schedule>, &'static str> {
    let seed = args.get_one::<u64>("seed").copied();
    match (args.get_one::<String>("schedule").map(String::as_str), seed) {
        (Some("lifo"), Some(_)) => Err("--seed only applies to the random schedule"),
        (Some("lifo"), None) => Ok(Some(Schedule::Lifo)),
        (None, None) => Ok(None),
        (_, seed) => Ok(Some(Schedule::Random {
            seed: seed.unwrap_or(0),
        })),
    }
}

fn demo(scenario: &Scenario, config: &Config, stats: bool, dump: bool) -> Result<bool, RuntimeError> {
    println!("{} {}", scenario.name.bright_white(), scenario.about.dimmed());
    let start = Instant::now();
    let mut reducer = Reducer::new(scenario.build(config)?, config.clone());
    if dump {
        loop {
            print_snapshot(&reducer);
            if let Step::Halted(_) = reducer.step()? {
                break;
            }
        }
    } else {
        reducer.execute()?;
    }

    let output = reducer.net().render_root()?;
    let matched = output == scenario.expected;
    if matched {
        println!("  {} {}", "=>".green(), output);
    } else {
        println!(
            "  {} {} {}",
            "=>".red(),
            output,
            format!("(expected {})", scenario.expected).red()
        );
    }
    if stats {
        print!("{}", reducer.rewrites().show(start.elapsed()));
    }
    Ok(matched)
}

fn print_snapshot(reducer: &Reducer) {
    match serde_json::to_string(&reducer.net().snapshot(reducer.steps())) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("{}: {err}", "Could not serialize snapshot".bright_red()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule_of(args: &[&str]) -> Result<Option<Schedule>, &'static str> {
        let matches = cli()
            .try_get_matches_from(["treenet", "demo"].into_iter().chain(args.iter().copied()))
            .unwrap();
        let (_, demo) = matches.subcommand().unwrap();
        demo_schedule(demo)
    }

    #[test]
    fn test_seed_selects_random_schedule() {
        assert_eq!(schedule_of(&[]), Ok(None));
        assert_eq!(
            schedule_of(&["--seed", "9"]),
            Ok(Some(Schedule::Random { seed: 9 }))
        );
        assert_eq!(
            schedule_of(&["--schedule", "random"]),
            Ok(Some(Schedule::Random { seed: 0 }))
        );
        assert_eq!(schedule_of(&["--schedule", "lifo"]), Ok(Some(Schedule::Lifo)));
        assert!(schedule_of(&["--schedule", "lifo", "--seed", "9"]).is_err());
    }
}
