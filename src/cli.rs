// src/cli.rs
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::*;
use std::{env, path::PathBuf};

use crate::commands::{self, ProjectArgs, init::InitArgs, run::RunArgs};
use crate::core::planner::Selection;
use crate::infra::t;

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` or `--lang=<VALUE>` argument.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--lang") {
        return args.get(pos + 1).cloned();
    }
    args.iter()
        .find_map(|arg| arg.strip_prefix("--lang=").map(str::to_string))
}

fn project_args() -> Vec<Arg> {
    vec![
        Arg::new("project-dir")
            .long("project-dir")
            .help(t!("arg.project_dir").to_string())
            .value_name("PROJECT_DIR")
            .default_value(".")
            .value_parser(clap::value_parser!(PathBuf))
            .action(ArgAction::Set),
        Arg::new("config")
            .short('c')
            .long("config")
            .help(t!("arg.config").to_string())
            .value_name("CONFIG")
            .value_parser(clap::value_parser!(PathBuf))
            .action(ArgAction::Set),
        Arg::new("session")
            .short('s')
            .long("session")
            .help(t!("arg.session").to_string())
            .value_name("SESSION")
            .action(ArgAction::Append),
        Arg::new("python")
            .short('p')
            .long("python")
            .help(t!("arg.python").to_string())
            .value_name("VERSION")
            .action(ArgAction::Append),
        Arg::new("keyword")
            .short('k')
            .long("keyword")
            .help(t!("arg.keyword").to_string())
            .value_name("KEYWORD")
            .action(ArgAction::Append),
    ]
}

pub fn build_cli() -> Command {
    Command::new("plugin-matrix")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about").to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.lang").to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cmd.run_about").to_string())
                .args(project_args())
                .arg(
                    Arg::new("reuse-existing-virtualenvs")
                        .short('r')
                        .long("reuse-existing-virtualenvs")
                        .help(t!("arg.reuse").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("error-on-missing-interpreters")
                        .long("error-on-missing-interpreters")
                        .help(t!("arg.error_on_missing_interpreters").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("stop-on-first-error")
                        .short('x')
                        .long("stop-on-first-error")
                        .help(t!("arg.stop_on_first_error").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("verbose")
                        .short('v')
                        .long("verbose")
                        .help(t!("arg.verbose").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("total-runners")
                        .long("total-runners")
                        .help(t!("arg.total_runners").to_string())
                        .value_name("TOTAL_RUNNERS")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set)
                        .requires("runner-index"),
                )
                .arg(
                    Arg::new("runner-index")
                        .long("runner-index")
                        .help(t!("arg.runner_index").to_string())
                        .value_name("RUNNER_INDEX")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set)
                        .requires("total-runners"),
                )
                .arg(
                    Arg::new("html")
                        .long("html")
                        .help(t!("arg.html").to_string())
                        .value_name("HTML")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help(t!("arg.json").to_string())
                        .value_name("JSON")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("list")
                .about(t!("cmd.list_about").to_string())
                .args(project_args()),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cmd.init_about").to_string())
                .arg(
                    Arg::new("project-dir")
                        .long("project-dir")
                        .help(t!("arg.project_dir").to_string())
                        .value_name("PROJECT_DIR")
                        .default_value(".")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("arg.non_interactive").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .help(t!("arg.force").to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn parse_project_args(matches: &ArgMatches, explicit_language: bool) -> ProjectArgs {
    ProjectArgs {
        project_dir: matches
            .get_one::<PathBuf>("project-dir")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(".")),
        config: matches.get_one::<PathBuf>("config").cloned(),
        selection: Selection {
            sessions: strings(matches, "session"),
            pythons: strings(matches, "python"),
            keywords: strings(matches, "keyword"),
        },
        explicit_language,
    }
}

pub async fn run() -> Result<()> {
    // Pre-parse language and initialize i18n first.
    let requested_language = pre_parse_language();
    match &requested_language {
        Some(language) => rust_i18n::set_locale(crate::resolve_locale(language)),
        None => crate::init(),
    }
    let explicit_language = requested_language.is_some();
    let language = rust_i18n::locale().to_string();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let args = RunArgs {
                project: parse_project_args(run_matches, explicit_language),
                total_runners: run_matches.get_one::<usize>("total-runners").copied(),
                runner_index: run_matches.get_one::<usize>("runner-index").copied(),
                reuse_venvs: run_matches.get_flag("reuse-existing-virtualenvs"),
                error_on_missing_interpreters: run_matches
                    .get_flag("error-on-missing-interpreters"),
                stop_on_first_error: run_matches.get_flag("stop-on-first-error"),
                verbose: run_matches.get_flag("verbose"),
                html: run_matches.get_one::<PathBuf>("html").cloned(),
                json: run_matches.get_one::<PathBuf>("json").cloned(),
            };
            commands::run::execute(args).await?;
        }
        Some(("list", list_matches)) => {
            commands::list::execute(parse_project_args(list_matches, explicit_language))?;
        }
        Some(("init", init_matches)) => {
            if !explicit_language {
                println!(
                    "🌐 {}",
                    t!("cli.system_language_detected", lang = &language).dimmed()
                );
            }
            commands::init::execute(InitArgs {
                project_dir: init_matches
                    .get_one::<PathBuf>("project-dir")
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(".")),
                non_interactive: init_matches.get_flag("non-interactive"),
                force: init_matches.get_flag("force"),
                language,
            })?;
        }
        _ => {
            // subcommand_required: clap has already printed help and exited.
        }
    }
    Ok(())
}
