use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use adv_api::{compile_story, create_player, CreateEngineOptions};
use adv_core::AdventureError;
use adv_runtime::StoryEngineOptions;
use clap::Parser;
use tokio::sync::mpsc::unbounded_channel;

mod cli_args;
mod console;
mod error_map;
mod fetch;
mod source_loader;

pub(crate) use cli_args::{CheckArgs, Cli, Mode, PlayArgs};
pub(crate) use console::{spawn_stdin_reader, ConsoleDisplay};
pub(crate) use error_map::{
    emit_error, map_cli_runtime, map_cli_source_path, map_cli_source_read, map_cli_source_scan,
};
pub(crate) use fetch::CliFetcher;
pub(crate) use source_loader::{
    collect_story_files, read_story, resolve_story_dir, resolve_story_file,
};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            if let Err(print_error) = error.print() {
                log::debug!("clap output failed: {}", print_error);
            }
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, AdventureError> {
    match cli.command {
        Mode::Play(args) => run_play(args),
        Mode::Check(args) => run_check(args),
    }
}

fn run_play(args: PlayArgs) -> Result<i32, AdventureError> {
    let story_path = resolve_story_file(&args.story)?;
    let story_json = read_story(&story_path)?;
    let base_dir = story_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(map_cli_runtime)?;

    let (requests, pending_requests) = unbounded_channel();
    let (player, handle) = create_player(
        CreateEngineOptions {
            story_json,
            entry: args.entry,
            engine: StoryEngineOptions {
                acknowledge_text: args.acknowledge,
                ..StoryEngineOptions::default()
            },
        },
        Arc::new(ConsoleDisplay::new(requests)),
        Arc::new(CliFetcher::new(base_dir)),
    )?;
    spawn_stdin_reader(pending_requests, handle);

    let summary = runtime.block_on(player.run())?;
    log::debug!("play finished: {:?}", summary);

    if summary.plays_failed > 0 {
        return Ok(1);
    }
    if summary.plays_ended == 0 {
        return Err(AdventureError::io(
            "CLI_INPUT_CLOSED",
            "Input closed before the story reached an end.",
        ));
    }
    Ok(0)
}

fn run_check(args: CheckArgs) -> Result<i32, AdventureError> {
    let stories = match (args.story, args.dir) {
        (Some(story), _) => vec![resolve_story_file(&story)?],
        (None, Some(dir)) => collect_story_files(&resolve_story_dir(&dir)?)?,
        (None, None) => {
            return Err(AdventureError::io(
                "CLI_ARGS",
                "check expects --story or --dir",
            ))
        }
    };

    let mut failures = 0usize;
    for path in &stories {
        match read_story(path).and_then(|story_json| compile_story(&story_json)) {
            Ok(graph) => println!("OK {} nodes={}", path.display(), graph.len()),
            Err(error) => {
                failures += 1;
                println!("ERROR {} {}: {}", path.display(), error.code, error.message);
            }
        }
    }

    Ok(if failures == 0 { 0 } else { 1 })
}
