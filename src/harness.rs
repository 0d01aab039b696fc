//! The top-level run loop.
//!
//! [`Harness`] owns the one-per-process execution resources: the direct
//! dialect's script host and the DSL dialect's strategy, including the
//! long-lived fast-path context. It drives discovery, per-test execution,
//! golden comparison, and the final summary, strictly sequentially. Owning
//! the context here rather than in ambient global state keeps the
//! single-owner invariant explicit; a parallel harness would hold one
//! context per worker.

use std::path::{Path, PathBuf};

use termcolor::ColorChoice;

use crate::discovery::{self, file_skip_marker, Dialect, TestCase};
use crate::engine::ScriptHost;
use crate::errors::HarnessError;
use crate::executor::{DirectExecutor, DslExecutor, DslStrategy, Executor};
use crate::golden::GoldenManager;
use crate::output::LineFilter;
use crate::reporter::{RunSummary, BANNER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Compare against goldens; mismatches fail.
    Verify,
    /// Rewrite goldens from produced output.
    Update,
}

pub struct HarnessConfig {
    /// Root directory of the test tree.
    pub root: PathBuf,
    pub mode: Mode,
    pub filter: LineFilter,
    /// File names inside the tree that are never tests, e.g. a legacy runner
    /// script kept next to the suites.
    pub exclude_files: Vec<String>,
    pub color: ColorChoice,
}

impl HarnessConfig {
    pub fn new(root: impl Into<PathBuf>, mode: Mode) -> Self {
        Self {
            root: root.into(),
            mode,
            filter: LineFilter::default(),
            exclude_files: vec!["runTests.py".to_string()],
            color: ColorChoice::Never,
        }
    }
}

pub struct Harness {
    config: HarnessConfig,
    direct: DirectExecutor,
    dsl: DslExecutor,
    golden: GoldenManager,
    summary: RunSummary,
}

impl Harness {
    /// Builds a harness around its collaborators. Called once per process;
    /// a fast-path context inside `strategy` lives for all tests of the run.
    pub fn new(config: HarnessConfig, host: Box<dyn ScriptHost>, strategy: DslStrategy) -> Self {
        let direct = DirectExecutor::new(host, config.filter.clone());
        let dsl = DslExecutor::new(strategy, config.filter.clone());
        let golden = GoldenManager::new(config.color);
        Self {
            config,
            direct,
            dsl,
            golden,
            summary: RunSummary::new(),
        }
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Runs per the command surface: one file, a scoped folder, or the whole
    /// tree. Only tree runs print the end-of-run summary.
    pub fn run(
        &mut self,
        file: Option<&Path>,
        folder: Option<&Path>,
    ) -> Result<(), HarnessError> {
        println!("{}", BANNER);
        println!("Running Tests in {}", self.config.root.display());

        if let Some(file) = file {
            let path = self.resolve_file(file)?;
            return self.run_path(&path);
        }

        let dir = match folder {
            Some(folder) => {
                let dir = self.config.root.join(folder);
                if !dir.is_dir() {
                    return Err(HarnessError::FolderNotFound(dir));
                }
                dir
            }
            None => self.config.root.clone(),
        };

        let tests = discovery::discover(&dir, &self.config.exclude_files)?;
        for test in &tests {
            self.run_test(test)?;
        }
        self.summary
            .print(self.config.mode == Mode::Update, self.config.color);
        Ok(())
    }

    /// `--file` targets resolve as given first, then under the root.
    fn resolve_file(&self, file: &Path) -> Result<PathBuf, HarnessError> {
        if file.exists() {
            return Ok(file.to_path_buf());
        }
        let under_root = self.config.root.join(file);
        if under_root.exists() {
            return Ok(under_root);
        }
        Err(HarnessError::TestNotFound(file.to_path_buf()))
    }

    /// Runs a single explicit path, honoring its skip marker. An extension
    /// with no executor is an error here: the user asked for this exact file.
    fn run_path(&mut self, path: &Path) -> Result<(), HarnessError> {
        if file_skip_marker(path).exists() {
            println!("Test Skipped:{}", path.display());
            return Ok(());
        }
        let Some(dialect) = Dialect::from_path(path) else {
            return Err(HarnessError::UnknownDialect(path.to_path_buf()));
        };
        self.run_test(&TestCase {
            path: path.to_path_buf(),
            dialect,
        })
    }

    /// One test, start to finish: execute, compare, record.
    fn run_test(&mut self, test: &TestCase) -> Result<(), HarnessError> {
        let output = match test.dialect {
            Dialect::DirectSource => self.direct.run(test)?,
            Dialect::ExternalDsl => self.dsl.run(test)?,
        };
        let outcome = self
            .golden
            .decide(&test.path, &output, self.config.mode == Mode::Update)?;
        self.summary.record(&test.path, outcome);
        Ok(())
    }
}
