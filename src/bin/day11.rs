use std::collections::HashSet;
use std::process;

use tracing::{event, Level};

use aoc2021::{input, logging, BorderedGrid, Config, Coordinate, Harness};

const SENTINEL: i32 = -1;
const FLASH_POINT: i32 = 9;

/// Advances every octopus by one step and returns the number which
/// flashed.
fn step(grid: &mut BorderedGrid) -> usize {
    grid.visit_each(|_, energy| energy + 1);

    // An octopus flashes at most once per step, but each flash can push
    // its neighbours over the flash point, so keep going until no new
    // octopus flashes.
    let mut flashed: HashSet<Coordinate> = HashSet::new();
    loop {
        let mut flashing: Vec<Coordinate> = Vec::new();
        grid.visit_each(|c, energy| {
            if energy > FLASH_POINT && !flashed.contains(&c) {
                flashing.push(c);
            }
            energy
        });
        if flashing.is_empty() {
            break;
        }
        flashed.extend(flashing.iter().copied());
        grid.for_each_adjacent_in(&flashing, |_, energy| energy + 1);
    }

    let flashed: Vec<Coordinate> = flashed.into_iter().collect();
    grid.for_each_in(&flashed, |_| 0);
    flashed.len()
}

fn flashes_after(grid: &BorderedGrid, steps: usize) -> usize {
    let mut grid = grid.clone();
    (0..steps).map(|_| step(&mut grid)).sum()
}

fn first_synchronized_flash(grid: &BorderedGrid) -> usize {
    let mut grid = grid.clone();
    let everyone = grid.size();
    let mut steps: usize = 0;
    loop {
        steps += 1;
        let flashes = step(&mut grid);
        event!(Level::TRACE, steps, flashes, "after step");
        if flashes == everyone {
            return steps;
        }
    }
}

fn part1(lines: &[String]) -> aoc2021::Result<i64> {
    const STEPS: usize = 100;
    let grid = BorderedGrid::populate(lines, SENTINEL)?;
    Ok(flashes_after(&grid, STEPS) as i64)
}

fn part2(lines: &[String]) -> aoc2021::Result<i64> {
    let grid = BorderedGrid::populate(lines, SENTINEL)?;
    Ok(first_synchronized_flash(&grid) as i64)
}

#[cfg(test)]
fn to_lines(rows: &[&str]) -> Vec<String> {
    rows.iter().map(|row| row.to_string()).collect()
}

#[cfg(test)]
const EXAMPLE: &[&str] = &[
    "5483143223",
    "2745854711",
    "5264556173",
    "6141336146",
    "6357385478",
    "4167524645",
    "2176841721",
    "6882881134",
    "4846848554",
    "5283751526",
];

#[test]
fn test_step() {
    let mut grid = BorderedGrid::populate(&["11111", "19991", "19191", "19991", "11111"], SENTINEL)
        .expect("valid test input");
    assert_eq!(step(&mut grid), 9);
    let expected = BorderedGrid::populate(&["34543", "40004", "50005", "40004", "34543"], SENTINEL)
        .expect("valid test input");
    assert_eq!(grid, expected);

    assert_eq!(step(&mut grid), 0);
    let expected = BorderedGrid::populate(&["45654", "51115", "61116", "51115", "45654"], SENTINEL)
        .expect("valid test input");
    assert_eq!(grid, expected);
}

#[test]
fn test_flashes_after() {
    let grid = BorderedGrid::populate(EXAMPLE, SENTINEL).expect("valid test input");
    assert_eq!(flashes_after(&grid, 10), 204);
    assert_eq!(flashes_after(&grid, 100), 1656);
}

#[test]
fn test_parts() {
    let lines = to_lines(EXAMPLE);
    assert_eq!(part1(&lines).expect("valid test input"), 1656);
    assert_eq!(part2(&lines).expect("valid test input"), 195);
}

#[test]
fn test_bad_grid() {
    let lines = to_lines(&["123", "45"]);
    assert!(part1(&lines).is_err());
}

fn run() -> Result<(), String> {
    let config = Config::from_env().map_err(|e| e.to_string())?;
    logging::init(&config.log).map_err(|e| e.to_string())?;

    let inputs = config.day("day11");
    let example = inputs.example();
    let puzzle = inputs.puzzle();
    Harness::new("day 11")
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
