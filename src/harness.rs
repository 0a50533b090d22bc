//! Runs a day's puzzle variants side by side.
//!
//! Every task gets its own thread.  The harness waits for each task to
//! publish its result on that task's channel, in the order the tasks were
//! added, and then joins every thread.  Only once both have happened is
//! the day reported, as a single log event.  Nothing is cancelled, retried
//! or reported early: if any task fails, the whole run fails.

use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{event, Level};

use crate::error::Error;

type Payload<'env> = Box<dyn FnOnce() -> crate::Result<i64> + Send + 'env>;

struct Task<'env> {
    label: String,
    payload: Payload<'env>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub label: String,
    pub answer: i64,
    pub elapsed: Duration,
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("there are no tasks to run")]
    NoTasks,
    #[error("more than one task is labelled '{0}'")]
    DuplicateLabel(String),
    #[error("failed to start task {label}: {source}")]
    Spawn {
        label: String,
        #[source]
        source: io::Error,
    },
    #[error("task {label} failed: {source}")]
    TaskFailed {
        label: String,
        #[source]
        source: Error,
    },
    #[error("task {label} panicked")]
    TaskPanicked { label: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running(usize),
    AllPublished,
    AllJoined,
    Reported,
}

/// The answers and timings of a completed run, in the order the tasks
/// were added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    title: String,
    results: Vec<TaskResult>,
}

impl Report {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn results(&self) -> &[TaskResult] {
        &self.results
    }

    fn get(&self, label: &str) -> Option<&TaskResult> {
        self.results.iter().find(|r| r.label == label)
    }

    pub fn answer(&self, label: &str) -> Option<i64> {
        self.get(label).map(|r| r.answer)
    }

    pub fn elapsed(&self, label: &str) -> Option<Duration> {
        self.get(label).map(|r| r.elapsed)
    }

    /// Named integer fields: `<label>-answer` and `<label>-duration` (in
    /// nanoseconds) for each task, in the order the tasks were added.
    pub fn fields(&self) -> impl Iterator<Item = (String, i128)> + '_ {
        self.results.iter().flat_map(|r| {
            [
                (format!("{}-answer", r.label), i128::from(r.answer)),
                (
                    format!("{}-duration", r.label),
                    r.elapsed.as_nanos() as i128,
                ),
            ]
        })
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first: bool = true;
        for (name, value) in self.fields() {
            if first {
                first = false;
            } else {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

pub struct Harness<'env> {
    title: String,
    tasks: Vec<Task<'env>>,
    phase: Phase,
}

impl<'env> Harness<'env> {
    pub fn new(title: &str) -> Harness<'env> {
        Harness {
            title: title.to_string(),
            tasks: Vec::new(),
            phase: Phase::Idle,
        }
    }

    /// Adds a task.  The payload should load its own input.  It may borrow
    /// from the caller for as long as the harness lives; anything it
    /// captures must be `Send`.
    pub fn task<F>(mut self, label: &str, payload: F) -> Harness<'env>
    where
        F: FnOnce() -> crate::Result<i64> + Send + 'env,
    {
        self.tasks.push(Task {
            label: label.to_string(),
            payload: Box::new(payload),
        });
        self
    }

    fn advance(&mut self, next: Phase) {
        event!(
            Level::TRACE,
            title = %self.title,
            from = ?self.phase,
            to = ?next,
            "harness phase change"
        );
        self.phase = next;
    }

    fn check_labels(&self) -> Result<(), HarnessError> {
        if self.tasks.is_empty() {
            return Err(HarnessError::NoTasks);
        }
        let mut labels: HashSet<&str> = HashSet::with_capacity(self.tasks.len());
        for task in &self.tasks {
            if !labels.insert(task.label.as_str()) {
                return Err(HarnessError::DuplicateLabel(task.label.clone()));
            }
        }
        Ok(())
    }

    /// Runs every task to completion, then logs and returns the report.
    pub fn run(mut self) -> Result<Report, HarnessError> {
        self.check_labels()?;
        let tasks = std::mem::take(&mut self.tasks);
        let count = tasks.len();

        let results = thread::scope(|scope| -> Result<Vec<TaskResult>, HarnessError> {
            let mut pending = Vec::with_capacity(count);
            for task in tasks {
                let label = task.label.clone();
                // Room for the one result, so a task that finishes early
                // need not wait for the orchestrator to ask for it.
                let (sender, receiver) = mpsc::sync_channel::<crate::Result<TaskResult>>(1);
                let spawned = thread::Builder::new()
                    .name(label.clone())
                    .spawn_scoped(scope, move || {
                        event!(Level::DEBUG, task = %task.label, "started");
                        let start = Instant::now();
                        let outcome = (task.payload)().map(|answer| TaskResult {
                            label: task.label.clone(),
                            answer,
                            elapsed: start.elapsed(),
                        });
                        event!(
                            Level::DEBUG,
                            task = %task.label,
                            ok = outcome.is_ok(),
                            "finished"
                        );
                        if sender.send(outcome).is_err() {
                            event!(Level::WARN, task = %task.label, "nobody took the result");
                        }
                    });
                match spawned {
                    Ok(handle) => pending.push((label, receiver, handle)),
                    Err(source) => {
                        return Err(HarnessError::Spawn { label, source });
                    }
                }
            }
            self.advance(Phase::Running(count));

            let published: Vec<_> = pending
                .iter()
                .map(|(_, receiver, _)| receiver.recv())
                .collect();
            self.advance(Phase::AllPublished);

            let mut results: Vec<TaskResult> = Vec::with_capacity(count);
            let mut failure: Option<HarnessError> = None;
            for ((label, _, handle), outcome) in pending.into_iter().zip(published) {
                let joined = handle.join();
                if failure.is_some() {
                    continue;
                }
                match (joined, outcome) {
                    // A task which panicked never sent anything.
                    (Err(_), _) | (Ok(()), Err(_)) => {
                        failure = Some(HarnessError::TaskPanicked { label });
                    }
                    (Ok(()), Ok(Err(source))) => {
                        failure = Some(HarnessError::TaskFailed { label, source });
                    }
                    (Ok(()), Ok(Ok(result))) => {
                        results.push(result);
                    }
                }
            }
            self.advance(Phase::AllJoined);
            match failure {
                Some(e) => Err(e),
                None => Ok(results),
            }
        })?;

        let report = Report {
            title: self.title.clone(),
            results,
        };
        event!(Level::INFO, results = %report, "{}", report.title);
        self.advance(Phase::Reported);
        Ok(report)
    }
}

#[test]
fn test_reports_every_answer() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let counter = AtomicUsize::new(0);
    let finished = &counter;
    let sleep_then = move |millis: u64, answer: i64| {
        move || -> crate::Result<i64> {
            thread::sleep(Duration::from_millis(millis));
            finished.fetch_add(1, Ordering::SeqCst);
            Ok(answer)
        }
    };
    // The first task added is the last to finish.
    let report = Harness::new("day 00")
        .task("a", sleep_then(60, 7))
        .task("b", sleep_then(30, 13))
        .task("c", sleep_then(0, 42))
        .run()
        .expect("no task fails");

    assert_eq!(finished.load(Ordering::SeqCst), 3);
    assert_eq!(report.title(), "day 00");
    assert_eq!(report.answer("a"), Some(7));
    assert_eq!(report.answer("b"), Some(13));
    assert_eq!(report.answer("c"), Some(42));
    assert_eq!(report.answer("d"), None);
    let labels: Vec<&str> = report.results().iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["a", "b", "c"]);
    assert!(report.elapsed("a").expect("a ran") >= Duration::from_millis(60));
}

#[test]
fn test_tasks_run_in_parallel() {
    use std::sync::Barrier;

    // Would deadlock unless all three tasks are running at once.
    let barrier = Barrier::new(3);
    let meet = || -> crate::Result<i64> {
        barrier.wait();
        Ok(1)
    };
    let report = Harness::new("barrier")
        .task("one", meet)
        .task("two", meet)
        .task("three", meet)
        .run()
        .expect("no task fails");
    assert_eq!(report.results().len(), 3);
}

#[test]
fn test_tasks_share_input() {
    let lines: Vec<String> = vec!["199".to_string(), "200".to_string(), "208".to_string()];
    let report = Harness::new("shared")
        .task("count", || Ok(lines.len() as i64))
        .task("sum", || {
            lines
                .iter()
                .map(|s| s.parse::<i64>().map_err(|e| Error::Malformed(e.to_string())))
                .sum()
        })
        .run()
        .expect("no task fails");
    assert_eq!(report.answer("count"), Some(3));
    assert_eq!(report.answer("sum"), Some(607));
}

#[test]
fn test_failure_discards_results() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let finished = AtomicUsize::new(0);
    let result = Harness::new("failing")
        .task("good", || {
            thread::sleep(Duration::from_millis(20));
            finished.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        })
        .task("bad", || {
            finished.fetch_add(1, Ordering::SeqCst);
            Err(Error::Malformed("not a number".to_string()))
        })
        .run();
    match result {
        Err(HarnessError::TaskFailed { label, source }) => {
            assert_eq!(label, "bad");
            assert!(matches!(source, Error::Malformed(_)));
        }
        other => panic!("expected a task failure, got {:?}", other),
    }
    assert_eq!(finished.load(Ordering::SeqCst), 2);
}

#[test]
fn test_panic_is_reported() {
    let result = Harness::new("panicking")
        .task("fine", || Ok(1))
        .task("boom", || -> crate::Result<i64> { panic!("deliberate") })
        .run();
    match result {
        Err(HarnessError::TaskPanicked { label }) => assert_eq!(label, "boom"),
        other => panic!("expected a panic report, got {:?}", other),
    }
}

#[test]
fn test_bad_task_lists() {
    use std::sync::atomic::{AtomicBool, Ordering};

    assert!(matches!(
        Harness::new("empty").run(),
        Err(HarnessError::NoTasks)
    ));

    let ran = AtomicBool::new(false);
    let result = Harness::new("twins")
        .task("part-one", || {
            ran.store(true, Ordering::SeqCst);
            Ok(1)
        })
        .task("part-one", || Ok(2))
        .run();
    match result {
        Err(HarnessError::DuplicateLabel(label)) => assert_eq!(label, "part-one"),
        other => panic!("expected a duplicate label error, got {:?}", other),
    }
    assert!(!ran.load(Ordering::SeqCst));
}

#[test]
fn test_report_display() {
    let report = Report {
        title: "day 11".to_string(),
        results: vec![
            TaskResult {
                label: "example-one".to_string(),
                answer: 1656,
                elapsed: Duration::from_nanos(1500),
            },
            TaskResult {
                label: "part-one".to_string(),
                answer: 1632,
                elapsed: Duration::from_micros(2),
            },
        ],
    };
    assert_eq!(
        report.to_string(),
        "example-one-answer=1656 example-one-duration=1500 part-one-answer=1632 part-one-duration=2000"
    );
}

#[test]
fn test_report_fields() {
    let report = Report {
        title: "day 09".to_string(),
        results: vec![TaskResult {
            label: "part-two".to_string(),
            answer: -3,
            elapsed: Duration::from_nanos(250),
        }],
    };
    let fields: Vec<(String, i128)> = report.fields().collect();
    assert_eq!(
        fields,
        vec![
            ("part-two-answer".to_string(), -3),
            ("part-two-duration".to_string(), 250),
        ]
    );
}

#[cfg(test)]
#[derive(Clone, Default)]
struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

#[cfg(test)]
impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("log buffer lock")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
impl CapturedLog {
    fn contents(&self) -> String {
        let bytes = self.0.lock().expect("log buffer lock").clone();
        String::from_utf8(bytes).expect("log output is UTF-8")
    }
}

// Only events from the calling thread are captured; task threads do not
// inherit a thread-local subscriber.
#[cfg(test)]
fn run_capturing(
    level: tracing_subscriber::filter::LevelFilter,
    harness: Harness<'_>,
) -> (Result<Report, HarnessError>, String) {
    use tracing_subscriber::prelude::*;

    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::registry().with(level).with(
        tracing_subscriber::fmt::layer()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time(),
    );
    let result = tracing::subscriber::with_default(subscriber, || harness.run());
    (result, log.contents())
}

#[test]
fn test_single_report_event() {
    use tracing_subscriber::filter::LevelFilter;

    let harness = Harness::new("day 00")
        .task("a", || Ok(7))
        .task("b", || Ok(13))
        .task("c", || Ok(42));
    let (result, log) = run_capturing(LevelFilter::INFO, harness);
    let report = result.expect("no task fails");

    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 1, "expected exactly one line in:\n{}", log);
    let line = lines[0];
    assert!(line.contains("INFO"));
    assert!(line.contains("day 00"));
    for label in ["a", "b", "c"] {
        assert!(line.contains(&format!("{}-answer=", label)));
        assert!(line.contains(&format!("{}-duration=", label)));
    }
    assert!(line.contains("a-answer=7 "));
    assert!(line.contains("b-answer=13 "));
    assert!(line.contains("c-answer=42 "));
    for (name, value) in report.fields() {
        assert!(line.contains(&format!("{}={}", name, value)));
    }
}

#[test]
fn test_report_follows_join() {
    use tracing_subscriber::filter::LevelFilter;

    let harness = Harness::new("day 00")
        .task("a", || Ok(7))
        .task("b", || Ok(13));
    let (result, log) = run_capturing(LevelFilter::TRACE, harness);
    assert!(result.is_ok());

    let position = |needle: &str| -> usize {
        match log.find(needle) {
            Some(pos) => pos,
            None => panic!("no '{}' in:\n{}", needle, log),
        }
    };
    let running = position("to=Running(2)");
    let published = position("to=AllPublished");
    let joined = position("to=AllJoined");
    let reported_line = position("a-answer=7");
    let reported = position("to=Reported");
    assert!(running < published);
    assert!(published < joined);
    assert!(joined < reported_line);
    assert!(reported_line < reported);
}

#[test]
fn test_failed_run_logs_no_report() {
    use tracing_subscriber::filter::LevelFilter;

    let harness = Harness::new("day 00")
        .task("a", || Ok(7))
        .task("b", || Err(Error::Malformed("no digits".to_string())));
    let (result, log) = run_capturing(LevelFilter::INFO, harness);
    assert!(matches!(result, Err(HarnessError::TaskFailed { .. })));
    assert_eq!(log, "");
}
