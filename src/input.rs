use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read input {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InputError {
    fn io(path: &Path, source: io::Error) -> InputError {
        InputError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub fn read_text(path: &Path) -> Result<String, InputError> {
    fs::read_to_string(path).map_err(|e| InputError::io(path, e))
}

/// The lines of the file, without line terminators.
pub fn read_lines(path: &Path) -> Result<Vec<String>, InputError> {
    Ok(read_text(path)?.lines().map(|line| line.to_string()).collect())
}

/// Loads `path` and hands its lines to `solve`: the usual body of a
/// harness task.
pub fn solve_lines<T, F>(path: &Path, solve: F) -> crate::Result<T>
where
    F: FnOnce(&[String]) -> crate::Result<T>,
{
    let lines = read_lines(path)?;
    solve(&lines)
}

#[cfg(test)]
fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("aoc2021-{}-{}", std::process::id(), name));
    fs::write(&path, contents).expect("should be able to write a scratch file");
    path
}

#[test]
fn test_read_lines() {
    let path = scratch_file("lines", "12\n34\n");
    let lines = read_lines(&path).expect("file exists");
    assert_eq!(lines, vec!["12".to_string(), "34".to_string()]);
    fs::remove_file(path).ok();
}

#[test]
fn test_read_text() {
    let path = scratch_file("text", "3,4,3,1,2\n");
    assert_eq!(read_text(&path).expect("file exists"), "3,4,3,1,2\n");
    fs::remove_file(path).ok();
}

#[test]
fn test_solve_lines() {
    let path = scratch_file("solve", "forward 5\ndown 5\n");
    let count = solve_lines(&path, |lines| Ok(lines.len())).expect("file exists");
    assert_eq!(count, 2);
    fs::remove_file(&path).ok();
    assert!(matches!(
        solve_lines(&path, |lines| Ok(lines.len())),
        Err(crate::Error::Input(InputError::Io { .. }))
    ));
}

#[test]
fn test_missing_file() {
    let path = Path::new("no/such/directory/puzzle-input.dat");
    match read_lines(path) {
        Err(InputError::Io { path: p, source }) => {
            assert_eq!(p, path);
            assert_eq!(source.kind(), io::ErrorKind::NotFound);
        }
        Ok(lines) => {
            panic!("expected an error, got {:?}", lines);
        }
    }
}
