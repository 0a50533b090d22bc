use std::fmt::{self, Display, Formatter};

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub fn new(x: i32, y: i32) -> Coordinate {
        Coordinate { x, y }
    }

    /// Neighbours are N, S, E, W.
    pub fn adjacent(&self) -> [Coordinate; 4] {
        let Coordinate { x, y } = *self;
        [
            Coordinate::new(x, y - 1),
            Coordinate::new(x, y + 1),
            Coordinate::new(x + 1, y),
            Coordinate::new(x - 1, y),
        ]
    }

    /// As `adjacent()` plus NE, SE, SW, NW.
    pub fn all_adjacent(&self) -> [Coordinate; 8] {
        let Coordinate { x, y } = *self;
        [
            Coordinate::new(x, y - 1),
            Coordinate::new(x, y + 1),
            Coordinate::new(x + 1, y),
            Coordinate::new(x - 1, y),
            Coordinate::new(x + 1, y - 1),
            Coordinate::new(x + 1, y + 1),
            Coordinate::new(x - 1, y + 1),
            Coordinate::new(x - 1, y - 1),
        ]
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[test]
fn test_adjacent() {
    let mut got = Coordinate::new(3, 5).adjacent().to_vec();
    got.sort();
    assert_eq!(
        got,
        vec![
            Coordinate::new(2, 5),
            Coordinate::new(3, 4),
            Coordinate::new(3, 6),
            Coordinate::new(4, 5),
        ]
    );
}

#[test]
fn test_all_adjacent() {
    let origin = Coordinate::new(1, 1);
    let all = origin.all_adjacent();
    assert!(!all.contains(&origin));
    for n in all {
        assert!((n.x - origin.x).abs() <= 1);
        assert!((n.y - origin.y).abs() <= 1);
    }
    let mut deduped = all.to_vec();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), 8);
}

#[test]
fn test_display() {
    assert_eq!(Coordinate::new(-1, 7).to_string(), "(-1,7)");
}
