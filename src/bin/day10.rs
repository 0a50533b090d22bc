use std::process;

use aoc2021::{input, logging, Config, Error, Harness, Stack};

#[derive(Debug, PartialEq, Eq)]
enum Checked {
    /// The first closing character which did not match.
    Corrupted(char),
    /// The closing characters still owed, innermost on top.
    Incomplete(Stack<char>),
}

fn check(line: &str) -> aoc2021::Result<Checked> {
    let mut owed: Stack<char> = Stack::new();
    for ch in line.chars() {
        match ch {
            '(' => owed.push(')'),
            '[' => owed.push(']'),
            '{' => owed.push('}'),
            '<' => owed.push('>'),
            ')' | ']' | '}' | '>' => match owed.pop() {
                Ok(expected) if expected == ch => (),
                // A closer with nothing open is as wrong as a mismatch.
                _ => return Ok(Checked::Corrupted(ch)),
            },
            _ => {
                return Err(Error::Malformed(format!(
                    "unexpected character '{}' in {}",
                    ch, line
                )));
            }
        }
    }
    Ok(Checked::Incomplete(owed))
}

#[test]
fn test_check() {
    fn corrupted(s: &str) -> Option<char> {
        match check(s).expect("valid test input") {
            Checked::Corrupted(ch) => Some(ch),
            Checked::Incomplete(_) => None,
        }
    }
    assert_eq!(None, corrupted(""));
    assert_eq!(None, corrupted("()"));
    assert_eq!(None, corrupted("<([])>"));
    assert_eq!(None, corrupted("[[<"));
    assert_eq!(Some(']'), corrupted("(]"));
    assert_eq!(Some('}'), corrupted("<<}"));
    assert_eq!(Some(')'), corrupted(")"));
    assert!(check("(x)").is_err());
}

fn syntax_error_score(ch: char) -> i64 {
    match ch {
        ')' => 3,
        ']' => 57,
        '}' => 1197,
        '>' => 25137,
        _ => 0,
    }
}

fn autocomplete_score(mut owed: Stack<char>) -> i64 {
    owed.drain().into_iter().fold(0, |score, ch| {
        let n = match ch {
            ')' => 1,
            ']' => 2,
            '}' => 3,
            '>' => 4,
            _ => 0,
        };
        score * 5 + n
    })
}

#[test]
fn test_autocomplete_score() {
    fn score(s: &str) -> Option<i64> {
        match check(s).expect("valid test input") {
            Checked::Incomplete(owed) => Some(autocomplete_score(owed)),
            Checked::Corrupted(_) => None,
        }
    }
    assert_eq!(score("[({(<(())[]>[[{[]{<()<>>"), Some(288957));
    assert_eq!(score("<{([{{}}[<[[[<>{}]]]>[]]"), Some(294));
    assert_eq!(score("[)"), None);
}

fn part1(lines: &[String]) -> aoc2021::Result<i64> {
    let mut total: i64 = 0;
    for line in lines {
        if let Checked::Corrupted(ch) = check(line)? {
            total += syntax_error_score(ch);
        }
    }
    Ok(total)
}

fn part2(lines: &[String]) -> aoc2021::Result<i64> {
    let mut scores: Vec<i64> = Vec::new();
    for line in lines {
        match check(line)? {
            Checked::Incomplete(owed) if !owed.is_empty() => {
                scores.push(autocomplete_score(owed));
            }
            _ => (),
        }
    }
    if scores.is_empty() {
        return Err(Error::Malformed("no incomplete lines".to_string()));
    }
    scores.sort_unstable();
    Ok(scores[scores.len() / 2])
}

#[cfg(test)]
const EXAMPLE: &[&str] = &[
    "[({(<(())[]>[[{[]{<()<>>",
    "[(()[<>])]({[<{<<[]>>(",
    "{([(<{}[<>[]}>{[]{[(<()>",
    "(((({<>}<{<{<>}{[]{[]{}",
    "[[<[([]))<([[{}[[()]]]",
    "[{[{({}]{}}([{[{{{}}([]",
    "{<[[]]>}<{[{[{[]{()[[[]",
    "[<(<(<(<{}))><([]([]()",
    "<{([([[(<>()){}]>(<<{{",
    "<{([{{}}[<[[[<>{}]]]>[]]",
];

#[test]
fn test_parts() {
    let lines: Vec<String> = EXAMPLE.iter().map(|line| line.to_string()).collect();
    assert_eq!(part1(&lines).expect("valid test input"), 26397);
    assert_eq!(part2(&lines).expect("valid test input"), 288957);
}

fn run() -> Result<(), String> {
    let config = Config::from_env().map_err(|e| e.to_string())?;
    logging::init(&config.log).map_err(|e| e.to_string())?;

    let inputs = config.day("day10");
    let example = inputs.example();
    let puzzle = inputs.puzzle();
    Harness::new("day 10")
        .task("example-one", || input::solve_lines(&example, part1))
        .task("example-two", || input::solve_lines(&example, part2))
        .task("part-one", || input::solve_lines(&puzzle, part1))
        .task("part-two", || input::solve_lines(&puzzle, part2))
        .run()
        .map_err(|e| e.to_string())?;
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        process::exit(1);
    }
}
