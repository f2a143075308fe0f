//! Closed enumerations: degree courses (score dimensions) and node ranks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Degree course a survey answer can point toward.
///
/// Declaration order is significant: it is the seeding order of default
/// estimation sets and the tie-break order of rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DegreeCourse {
    AC,
    MC,
    HSD,
    MTD,
    KWM,
    DA,
    SE,
    SI,
    MBI,
    Undefined,
}

impl DegreeCourse {
    /// Every course that carries a score (all but `Undefined`).
    pub const SCORED: [DegreeCourse; 9] = [
        DegreeCourse::AC,
        DegreeCourse::MC,
        DegreeCourse::HSD,
        DegreeCourse::MTD,
        DegreeCourse::KWM,
        DegreeCourse::DA,
        DegreeCourse::SE,
        DegreeCourse::SI,
        DegreeCourse::MBI,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DegreeCourse::AC => "AC",
            DegreeCourse::MC => "MC",
            DegreeCourse::HSD => "HSD",
            DegreeCourse::MTD => "MTD",
            DegreeCourse::KWM => "KWM",
            DegreeCourse::DA => "DA",
            DegreeCourse::SE => "SE",
            DegreeCourse::SI => "SI",
            DegreeCourse::MBI => "MBI",
            DegreeCourse::Undefined => "Undefined",
        }
    }
}

impl fmt::Display for DegreeCourse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed depth class of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    Root,
    L1,
    L2,
    L3,
    Undefined,
}

impl Level {
    /// Rank of the children of a node at this rank.
    pub fn child(&self) -> Option<Level> {
        match self {
            Level::Root => Some(Level::L1),
            Level::L1 => Some(Level::L2),
            Level::L2 => Some(Level::L3),
            Level::L3 | Level::Undefined => None,
        }
    }

    /// How many ranks may still hang below a node at this rank.
    pub fn remaining_depth(&self) -> usize {
        match self {
            Level::Root => 3,
            Level::L1 => 2,
            Level::L2 => 1,
            Level::L3 | Level::Undefined => 0,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Root => "Root",
            Level::L1 => "L1",
            Level::L2 => "L2",
            Level::L3 => "L3",
            Level::Undefined => "Undefined",
        };
        f.write_str(s)
    }
}
