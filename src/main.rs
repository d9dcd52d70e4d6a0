// linkfix: refactor Plan 9 linker sources into liblink form

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use linkfix::config::RefactorConfig;
use linkfix::pipeline::{self, RunReport};
use linkfix::ui::App;

fn main() -> Result<()> {
    linkfix::init_tracing();

    let matches = Command::new("linkfix")
        .version(linkfix::VERSION)
        .about("Refactor Plan 9 linker sources into liblink form, one recorded stage per pass")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("JSON configuration replacing the built-in arm64 port"),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .value_name("DIR")
                .help("Directory holding the input sources"),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .value_name("DIR")
                .help("Directory receiving l.<n> stages and patches"),
        )
        .arg(
            Arg::new("no-diff")
                .long("no-diff")
                .help("Skip writing patches between stages")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("view")
                .long("view")
                .help("Browse the recorded stages when the run finishes")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("files")
                .value_name("FILE")
                .help("Extra input files, routed to the overflow destinations")
                .num_args(0..)
                .index(1),
        )
        .get_matches();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => RefactorConfig::load(Path::new(path))
            .with_context(|| format!("loading configuration {}", path))?,
        None => RefactorConfig::default(),
    };
    if let Some(root) = matches.get_one::<String>("root") {
        config.root = PathBuf::from(root);
    }
    if let Some(out) = matches.get_one::<String>("out") {
        config.output = PathBuf::from(out);
    }
    if let Some(extra) = matches.get_many::<String>("files") {
        for file in extra {
            config.files.entry(file.clone()).or_default();
        }
    }
    config.validate()?;

    let diff = !matches.get_flag("no-diff");
    let report = pipeline::run(config, diff).context("refactoring failed")?;
    summarize(&report);

    if matches.get_flag("view") {
        view(report)?;
    }
    Ok(())
}

fn summarize(report: &RunReport) {
    info!(
        stages = report.stages.len(),
        patches = report.patches.len(),
        pruned = report.pruned,
        staticized = report.staticized,
        renamed = report.renamed,
        sentinels = report.sentinels,
        "done"
    );
    for thread in &report.threads {
        info!(
            param = %thread.param,
            functions = thread.functions.len(),
            call_sites = thread.call_sites,
            "threaded parameter"
        );
    }
}

fn view(report: RunReport) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(report.stages, report.patches);
    let res = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("stage viewer failed")
}
