//! The full refactoring run
//!
//! ```text
//! read → parse → extract → staticize → rename → thread ×N → sentinels → patches
//! ```
//!
//! Every stage after parsing is emitted to its own `l.<n>` directory.

use crate::config::RefactorConfig;
use crate::emit::diff::{self, Patch};
use crate::emit::stage::{Snapshot, StageRecorder};
use crate::emit::{self as emitter, FileRouting};
use crate::errors::{RefactorError, Result};
use crate::program::Program;
use crate::transform::{thread, Refactor, ThreadReport};
use std::fs;
use tracing::{debug, info};

/// Per-run state shared by the stages
pub struct PipelineContext {
    pub config: RefactorConfig,
    pub routing: FileRouting,
    pub stages: StageRecorder,
}

impl PipelineContext {
    pub fn new(config: RefactorConfig, program: &Program) -> Self {
        let routing = FileRouting::new(program.files(), &config);
        let stages = StageRecorder::new(config.output.clone());
        PipelineContext {
            config,
            routing,
            stages,
        }
    }

    /// Emit the current program as the next stage
    pub fn record(&mut self, refactor: &Refactor, label: &str) -> Result<()> {
        let files = emitter::emit(
            &refactor.program,
            &refactor.catalog,
            &self.routing,
            &self.config,
        );
        let snapshot = self.stages.record(label, files)?;
        info!(
            stage = snapshot.index,
            label,
            symbols = refactor.catalog.len(),
            "stage recorded"
        );
        Ok(())
    }
}

/// What a run produced
#[derive(Debug, Default)]
pub struct RunReport {
    pub stages: Vec<Snapshot>,
    pub patches: Vec<Patch>,
    pub pruned: usize,
    pub staticized: usize,
    pub renamed: usize,
    pub threads: Vec<ThreadReport>,
    pub sentinels: usize,
}

/// Read and parse every configured input file
pub fn load_program(config: &RefactorConfig) -> Result<Program> {
    if !config.root.is_dir() {
        return Err(RefactorError::MissingRoot(config.root.clone()));
    }

    let mut sources = Vec::with_capacity(config.files.len());
    for file in config.files.keys() {
        let path = config.source_path(file);
        let text = fs::read_to_string(&path).map_err(|e| RefactorError::io(&path, e))?;
        debug!(file = %file, bytes = text.len(), "read");
        sources.push((file.clone(), text));
    }

    let program = Program::parse(&sources, &config.type_names)?;
    info!(
        files = program.files().len(),
        decls = program.decl_ids().count(),
        "parsed"
    );
    Ok(program)
}

/// Run every stage. With `diff` set, patches between stages are written
/// next to the stage directories.
pub fn run(config: RefactorConfig, diff: bool) -> Result<RunReport> {
    let program = load_program(&config)?;
    fs::create_dir_all(&config.output).map_err(|e| RefactorError::io(&config.output, e))?;

    let mut ctx = PipelineContext::new(config, &program);
    let mut refactor = Refactor::new(program);
    let mut report = RunReport::default();

    report.pruned = refactor.extract(&ctx.config.start)?;
    ctx.record(&refactor, "extract")?;

    report.staticized = refactor.staticize(&ctx.routing, &ctx.config.start);
    ctx.record(&refactor, "static")?;

    report.renamed = refactor.rename(&ctx.config.rename)?;
    ctx.record(&refactor, "rename")?;

    for spec in ctx.config.threads.clone() {
        let fields = thread::field_seeds(&spec, &ctx.config)?;
        let threaded = refactor.thread(&spec, &fields)?;
        ctx.record(&refactor, &format!("thread {}", spec.param))?;
        report.threads.push(threaded);
    }

    report.sentinels = refactor.strip_sentinels(&ctx.config.sentinels);
    ctx.record(&refactor, "sentinels")?;

    if diff {
        report.patches = diff::write_patches(
            &ctx.config.diff_command,
            ctx.stages.root(),
            ctx.stages.len(),
        )?;
        info!(patches = report.patches.len(), "diffed");
    }

    report.stages = ctx.stages.into_snapshots();
    Ok(report)
}
