use std::process;

use tracing::{event, Level};

use aoc2021::{input, logging, BorderedGrid, Config, Coordinate, Error, Harness};

const SENTINEL: i32 = -1;
const HIGHEST_POINT: i32 = 9;

fn low_points(heights: &BorderedGrid) -> Vec<Coordinate> {
    heights
        .interior()
        .filter(|c| {
            let h = heights.value(*c);
            heights.neighbours(*c).all(|(_, neighbour)| h < neighbour)
        })
        .collect()
}

fn basin_sizes(heights: &BorderedGrid) -> Vec<usize> {
    low_points(heights)
        .into_iter()
        .map(|low| {
            let size = heights.reachable_from(low, |h| h != HIGHEST_POINT).len();
            event!(Level::DEBUG, size, low_point = %low, "found a basin");
            size
        })
        .collect()
}

fn part1(lines: &[String]) -> aoc2021::Result<i64> {
    let heights = BorderedGrid::populate(lines, SENTINEL)?;
    Ok(low_points(&heights)
        .iter()
        .map(|c| 1 + heights.value(*c) as i64)
        .sum::<i64>())
}

fn part2(lines: &[String]) -> aoc2021::Result<i64> {
    let heights = BorderedGrid::populate(lines, SENTINEL)?;
    let mut sizes = basin_sizes(&heights);
    if sizes.len() < 3 {
        return Err(Error::Malformed(format!(
            "expected at least 3 basins, found {}",
            sizes.len()
        )));
    }
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    Ok(sizes.iter().take(3).product::<usize>() as i64)
}

#[cfg(test)]
const EXAMPLE: &[&str] = &[
    "2199943210",
    "3987894921",
    "9856789892",
    "8767896789",
    "9899965678",
];

#[cfg(test)]
fn example_lines() -> Vec<String> {
    EXAMPLE.iter().map(|line| line.to_string()).collect()
}

#[test]
fn test_low_points() {
    let heights = BorderedGrid::populate(EXAMPLE, SENTINEL).expect("valid test input");
    let mut lows: Vec<i32> = low_points(&heights)
        .iter()
        .map(|c| heights.value(*c))
        .collect();
    lows.sort_unstable();
    assert_eq!(lows, vec![0, 1, 5, 5]);
}

#[test]
fn test_basin_sizes() {
    let heights = BorderedGrid::populate(EXAMPLE, SENTINEL).expect("valid test input");
    let mut sizes = basin_sizes(&heights);
    sizes.sort_unstable();
    assert_eq!(sizes, vec![3, 9, 9, 14]);
}

#[test]
fn test_parts() {
    let lines = example_lines();
    assert_eq!(part1(&lines).expect("valid test input"), 15);
    assert_eq!(part2(&lines).expect("valid test input"), 1134);
}

#[test]
fn test_too_few_basins() {
    let lines: Vec<String> = vec!["090".to_string()];
    assert!(matches!(part2(&lines), Err(Error::Malformed(_))));
}

fn run() -> Result<(), String> {
    let config = Config::from_env().map_err(|e| e.to_string())?;
    logging::init(&config.log).map_err(|e| e.to_string())?;

    let inputs = config.day("day09");
    let example = inputs.example();
    let puzzle = inputs.puzzle();
    Harness::new("day 09")
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
