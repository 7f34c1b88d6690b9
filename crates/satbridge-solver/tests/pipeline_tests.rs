//! End-to-end tests for the solve pipeline.
//!
//! Real-process tests use small shell scripts as stand-in solvers, so they
//! only run on Unix. Tests that must observe how often the solver is
//! launched use an in-process [`SolverLauncher`] double instead.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use satbridge_solver::{
    ErrorReason, FormulaRequest, InputMode, LaunchError, ProcessLauncher, SolveReport,
    SolvePipeline, SolverConfig, SolverLauncher, SolverOutcome, StagedInput, Stager, Verdict,
};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Launcher double that records launches and returns a canned outcome.
struct CountingLauncher {
    launches: AtomicUsize,
    outcome: SolverOutcome,
}

impl CountingLauncher {
    fn new(outcome: SolverOutcome) -> Self {
        CountingLauncher {
            launches: AtomicUsize::new(0),
            outcome,
        }
    }

    fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SolverLauncher for CountingLauncher {
    async fn launch(
        &self,
        staged: &StagedInput,
        _timeout: Duration,
    ) -> Result<SolverOutcome, LaunchError> {
        assert!(staged.path().exists(), "artifact must exist while solver runs");
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(self.outcome.clone())
    }
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn config(solver: &Path, staging: &Path) -> SolverConfig {
    SolverConfig {
        executable: solver.to_path_buf(),
        staging_dir: staging.to_path_buf(),
        timeout_ms: 5_000,
        ..SolverConfig::default()
    }
}

fn staging_is_empty(dir: &Path) -> bool {
    match fs::read_dir(dir) {
        Ok(entries) => entries.count() == 0,
        Err(_) => true,
    }
}

/// True when `pid` is running. Zombies count as dead: they hold no resources
/// beyond their process table slot and are waiting to be reaped by init.
#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    match fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => {
            let state = stat
                .rsplit(')')
                .next()
                .and_then(|rest| rest.trim_start().chars().next());
            !matches!(state, Some('Z') | Some('X'))
        }
        Err(_) => false,
    }
}

async fn solve_text(pipeline: &SolvePipeline, text: &str) -> SolveReport {
    pipeline.solve(&FormulaRequest::new(text)).await
}

// ---------------------------------------------------------------------------
// Verdict mapping through real processes
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[tokio::test]
async fn sat_solver_yields_satisfiable() {
    let dir = tempfile::tempdir().unwrap();
    let solver = write_script(dir.path(), "sat.sh", "echo SAT");
    let staging = dir.path().join("staging");
    let pipeline = SolvePipeline::from_config(&config(&solver, &staging));

    let report = solve_text(&pipeline, "p cnf 1 1\n1 0\n").await;
    assert_eq!(report.verdict, Verdict::Satisfiable);
    assert!(report.artifact_id.is_some());
    assert_eq!(report.outcome.unwrap().exit_code, Some(0));
    assert!(staging_is_empty(&staging));
}

#[cfg(unix)]
#[tokio::test]
async fn unsat_solver_yields_unsatisfiable() {
    let dir = tempfile::tempdir().unwrap();
    let solver = write_script(dir.path(), "unsat.sh", "echo UNSAT");
    let staging = dir.path().join("staging");
    let pipeline = SolvePipeline::from_config(&config(&solver, &staging));

    let report = solve_text(&pipeline, "p cnf 1 2\n1 0\n-1 0\n").await;
    assert_eq!(report.verdict, Verdict::Unsatisfiable);
    assert!(staging_is_empty(&staging));
}

#[cfg(unix)]
#[tokio::test]
async fn silent_successful_solver_counts_as_unsatisfiable() {
    let dir = tempfile::tempdir().unwrap();
    let solver = write_script(dir.path(), "silent.sh", "exit 0");
    let pipeline = SolvePipeline::from_config(&config(&solver, &dir.path().join("staging")));

    let report = solve_text(&pipeline, "").await;
    assert_eq!(report.verdict, Verdict::Unsatisfiable);
}

#[cfg(unix)]
#[tokio::test]
async fn failing_solver_yields_error_with_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let solver = write_script(
        dir.path(),
        "fail.sh",
        "echo 'Error parsing problem line.' >&2\nexit 1",
    );
    let staging = dir.path().join("staging");
    let pipeline = SolvePipeline::from_config(&config(&solver, &staging));

    let report = solve_text(&pipeline, "p cnf x y").await;
    assert_eq!(
        report.verdict,
        Verdict::Error(ErrorReason::SolverFailed {
            exit_code: Some(1),
            stderr: "Error parsing problem line.".to_string(),
        })
    );
    assert!(staging_is_empty(&staging));
}

#[cfg(unix)]
#[tokio::test]
async fn solver_reads_exact_staged_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let solver = write_script(dir.path(), "cat.sh", "cat \"$1\"");
    let pipeline = SolvePipeline::from_config(&config(&solver, &dir.path().join("staging")));

    let text = "c $PATH `id` \"q\" 'q' ; | &\n1 -2 0\n";
    let report = solve_text(&pipeline, text).await;
    assert_eq!(report.outcome.unwrap().stdout, text.as_bytes());
    assert_eq!(report.verdict, Verdict::Unsatisfiable);
}

#[cfg(unix)]
#[tokio::test]
async fn stdin_mode_streams_staged_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let solver = write_script(
        dir.path(),
        "stdin.sh",
        "if [ \"$#\" -ne 0 ]; then exit 3; fi\ngrep -q '^1 0$' && echo SAT",
    );
    let mut cfg = config(&solver, &dir.path().join("staging"));
    cfg.input_mode = InputMode::Stdin;
    let pipeline = SolvePipeline::from_config(&cfg);

    assert_eq!(
        solve_text(&pipeline, "p cnf 1 1\n1 0\n").await.verdict,
        Verdict::Satisfiable
    );
    assert_eq!(
        solve_text(&pipeline, "p cnf 1 1\n-1 0\n").await.verdict,
        Verdict::Error(ErrorReason::SolverFailed {
            exit_code: Some(1),
            stderr: String::new(),
        })
    );
}

#[cfg(unix)]
#[tokio::test]
async fn extra_args_precede_staged_path() {
    let dir = tempfile::tempdir().unwrap();
    let solver = write_script(
        dir.path(),
        "args.sh",
        "if [ \"$1\" = \"--ltl\" ] && [ -f \"$2\" ]; then echo SAT; fi",
    );
    let mut cfg = config(&solver, &dir.path().join("staging"));
    cfg.args = vec!["--ltl".to_string()];
    let pipeline = SolvePipeline::from_config(&cfg);

    assert_eq!(solve_text(&pipeline, "G p").await.verdict, Verdict::Satisfiable);
}

// ---------------------------------------------------------------------------
// Operational failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_executable_is_launch_error() {
    let dir = tempfile::tempdir().unwrap();
    let staging = dir.path().join("staging");
    let pipeline =
        SolvePipeline::from_config(&config(&dir.path().join("LTLSolver"), &staging));

    let report = solve_text(&pipeline, "1 0").await;
    assert!(
        matches!(report.verdict, Verdict::Error(ErrorReason::Launch { .. })),
        "got {:?}",
        report.verdict
    );
    assert!(report.outcome.is_none());
    assert!(staging_is_empty(&staging));
}

#[cfg(unix)]
#[tokio::test]
async fn non_executable_file_is_launch_error() {
    let dir = tempfile::tempdir().unwrap();
    let solver = dir.path().join("not-executable.sh");
    fs::write(&solver, "#!/bin/sh\necho SAT\n").unwrap();
    let pipeline = SolvePipeline::from_config(&config(&solver, &dir.path().join("staging")));

    let report = solve_text(&pipeline, "1 0").await;
    assert!(matches!(report.verdict, Verdict::Error(ErrorReason::Launch { .. })));
}

#[cfg(unix)]
#[tokio::test]
async fn timeout_kills_solver_and_its_children() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("pids");
    let solver = write_script(
        dir.path(),
        "hang.sh",
        &format!(
            "sleep 30 &\necho \"$$ $!\" > {}\nwait",
            pid_file.display()
        ),
    );
    let staging = dir.path().join("staging");
    let mut cfg = config(&solver, &staging);
    cfg.timeout_ms = 500;
    let pipeline = SolvePipeline::from_config(&cfg);

    let start = Instant::now();
    let report = solve_text(&pipeline, "1 0").await;
    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(
        report.verdict,
        Verdict::Error(ErrorReason::Timeout { timeout_ms: 500 })
    );
    assert!(report.outcome.unwrap().timed_out);
    assert!(staging_is_empty(&staging));

    let pids: Vec<u32> = fs::read_to_string(&pid_file)
        .unwrap()
        .split_whitespace()
        .map(|p| p.parse().unwrap())
        .collect();
    assert_eq!(pids.len(), 2);

    // Give init a moment to reap the orphaned grandchild.
    tokio::time::sleep(Duration::from_millis(200)).await;
    for pid in pids {
        assert!(!process_alive(pid), "process {pid} survived the timeout");
    }
}

#[cfg(unix)]
#[tokio::test]
async fn answer_survives_helper_holding_stdout_open() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("helper");
    let solver = write_script(
        dir.path(),
        "forks.sh",
        &format!(
            "echo SAT\nsleep 30 &\necho $! > {}\nexit 0",
            pid_file.display()
        ),
    );
    let staging = dir.path().join("staging");
    let pipeline = SolvePipeline::from_config(&config(&solver, &staging));

    let start = Instant::now();
    let report = solve_text(&pipeline, "p cnf 1 1\n1 0\n").await;
    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(report.verdict, Verdict::Satisfiable);
    let outcome = report.outcome.unwrap();
    assert_eq!(outcome.exit_code, Some(0));
    assert_eq!(outcome.trimmed_stdout(), "SAT");
    assert!(staging_is_empty(&staging));

    let helper: u32 = fs::read_to_string(&pid_file).unwrap().trim().parse().unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!process_alive(helper), "helper {helper} outlived the solver");
}

#[tokio::test]
async fn unwritable_staging_dir_fails_before_launch() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, "").unwrap();

    let launcher = Arc::new(CountingLauncher::new(SolverOutcome::completed(0, "SAT")));
    let pipeline = SolvePipeline::new(
        Stager::new(blocker.join("staging"), "cnf"),
        launcher.clone(),
        Duration::from_secs(1),
        0,
    );

    let report = solve_text(&pipeline, "1 0").await;
    assert!(
        matches!(report.verdict, Verdict::Error(ErrorReason::Staging { .. })),
        "got {:?}",
        report.verdict
    );
    assert!(report.artifact_id.is_none());
    assert_eq!(launcher.launches(), 0);
}

// ---------------------------------------------------------------------------
// Launcher seam and concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn launcher_double_drives_verdict() {
    let dir = tempfile::tempdir().unwrap();
    let launcher = Arc::new(CountingLauncher::new(SolverOutcome::completed(0, "SAT\n")));
    let pipeline = SolvePipeline::new(
        Stager::new(dir.path(), "cnf"),
        launcher.clone(),
        Duration::from_secs(1),
        0,
    );

    for _ in 0..3 {
        assert_eq!(solve_text(&pipeline, "").await.verdict, Verdict::Satisfiable);
    }
    assert_eq!(launcher.launches(), 3);
    assert!(staging_is_empty(dir.path()));
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_solves_keep_inputs_separate() {
    let dir = tempfile::tempdir().unwrap();
    let solver = write_script(
        dir.path(),
        "grep.sh",
        "sleep 0.1\nif grep -q '^c want-sat' \"$1\"; then echo SAT; else echo UNSAT; fi",
    );
    let staging = dir.path().join("staging");
    let pipeline = SolvePipeline::from_config(&config(&solver, &staging));

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let pipeline = pipeline.clone();
            tokio::spawn(async move {
                let want_sat = i % 2 == 0;
                let text = if want_sat {
                    format!("c want-sat {i}\n1 0\n")
                } else {
                    format!("c want-unsat {i}\n1 0\n-1 0\n")
                };
                (want_sat, pipeline.solve(&FormulaRequest::new(text)).await)
            })
        })
        .collect();

    let start = Instant::now();
    for task in tasks {
        let (want_sat, report) = task.await.unwrap();
        let expected = if want_sat {
            Verdict::Satisfiable
        } else {
            Verdict::Unsatisfiable
        };
        assert_eq!(report.verdict, expected);
    }
    // 16 runs of 100 ms each would take 1.6 s if serialized.
    assert!(start.elapsed() < Duration::from_millis(1_500));
    assert!(staging_is_empty(&staging));
}

#[tokio::test]
async fn process_launcher_is_usable_as_trait_object() {
    let launcher: Arc<dyn SolverLauncher> = Arc::new(ProcessLauncher::new("definitely-missing"));
    let dir = tempfile::tempdir().unwrap();
    let pipeline = SolvePipeline::new(
        Stager::new(dir.path(), "ltl"),
        launcher,
        Duration::from_secs(1),
        0,
    );
    assert!(solve_text(&pipeline, "F q").await.verdict.is_error());
}
