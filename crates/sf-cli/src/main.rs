use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use sf_cli::{commands, load_project, Output, VERSION};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("storyforge")
        .version(VERSION)
        .about("Inspect references in a StoryForge project")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("project")
                .long("project")
                .short('p')
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to the project YAML file"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Output as JSON"),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve one reference to its selected content")
                .arg(
                    Arg::new("reference")
                        .required(true)
                        .help("Reference, e.g. character:alice or [alice:summary]"),
                ),
        )
        .subcommand(
            Command::new("expand")
                .about("Expand every reference in a text or a stage template")
                .arg(
                    Arg::new("text")
                        .required_unless_present("stage")
                        .conflicts_with("stage")
                        .help("Template text to expand"),
                )
                .arg(
                    Arg::new("stage")
                        .long("stage")
                        .value_name("CATEGORY:BLOCK:STAGE")
                        .help("Expand the input template of this stage"),
                ),
        )
        .subcommand(
            Command::new("uses")
                .about("List references used by a block")
                .arg(Arg::new("category").required(true))
                .arg(Arg::new("block").required(true)),
        )
        .subcommand(
            Command::new("used-by")
                .about("List stages that reference a block")
                .arg(Arg::new("category").required(true))
                .arg(Arg::new("block").required(true)),
        )
        .subcommand(Command::new("check").about("Report every broken reference in the project"))
}

fn run(matches: &ArgMatches) -> Result<bool> {
    let path = matches
        .get_one::<PathBuf>("project")
        .context("missing --project")?;
    let project = load_project(path)?;

    let output = match matches.subcommand() {
        Some(("resolve", args)) => commands::resolve(&project, required(args, "reference")?),
        Some(("expand", args)) => match args.get_one::<String>("stage") {
            Some(stage) => commands::expand_stage(&project, stage)?,
            None => commands::expand_text(&project, required(args, "text")?),
        },
        Some(("uses", args)) => {
            commands::uses(&project, required(args, "category")?, required(args, "block")?)?
        }
        Some(("used-by", args)) => {
            commands::used_by(&project, required(args, "category")?, required(args, "block")?)?
        }
        Some(("check", _)) => commands::check(&project),
        _ => bail!("unknown subcommand"),
    };

    print(&output, matches.get_flag("json"))?;
    Ok(output.ok)
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing <{name}>"))
}

fn print(output: &Output, json: bool) -> Result<()> {
    let rendered = output.render(json)?;
    if !rendered.is_empty() {
        println!("{rendered}");
    }
    if !json {
        for diagnostic in &output.diagnostics {
            eprintln!("{diagnostic}");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli().get_matches()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
