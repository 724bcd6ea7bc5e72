//! Slalom: a skier starts in any cell of the top row and descends one row per step, moving to
//! the column below or one of its two diagonal neighbours. Each visited cell adds its value to
//! the score; the task asks for the best achievable score.
//!
//! Input: one test case per grid, introduced by the number of rows, one row of
//! whitespace separated integers per line. Output: `index score`.

use std::collections::HashMap;

use crate::config::HarnessConfig;
use crate::io::fields::{parse_fields, split_index};

pub type Grid = [Vec<i64>];

/// Returns the maximum score of a descent through `grid`. Rows may differ in width; a move is
/// only possible to columns that exist in the next row and a descent ends early in a cell
/// without successors. An empty grid scores 0.
pub fn max_path_score(grid: &Grid) -> i64 {
    Search::new(grid).run()
}

/// Depth-first search with memoization. Branches whose optimistic bound cannot beat the best
/// sibling found so far are skipped.
struct Search<'a> {
    grid: &'a Grid,
    optimistic: Vec<i64>,
    memo: HashMap<(usize, usize), i64>,
}

impl<'a> Search<'a> {
    fn new(grid: &'a Grid) -> Self {
        // optimistic[r]: upper bound for any descent starting in row r
        let mut optimistic = vec![0; grid.len() + 1];
        for r in (0..grid.len()).rev() {
            optimistic[r] = match grid[r].iter().max() {
                Some(&row_max) => row_max + optimistic[r + 1].max(0),
                None => 0,
            };
        }

        Self {
            grid,
            optimistic,
            memo: HashMap::new(),
        }
    }

    fn run(&mut self) -> i64 {
        let Some(top) = self.grid.first() else {
            return 0;
        };

        self.best_of(0, 0..top.len()).unwrap_or(0)
    }

    /// Upper bound for a descent starting in `(row, col)`.
    fn bound(&self, row: usize, col: usize) -> i64 {
        self.grid[row][col] + self.optimistic[row + 1].max(0)
    }

    /// Best exact score among the descents starting in `row` at one of `cols`.
    fn best_of(&mut self, row: usize, cols: impl Iterator<Item = usize>) -> Option<i64> {
        let mut cols: Vec<_> = cols.collect();
        cols.sort_unstable_by_key(|&c| std::cmp::Reverse(self.grid[row][c]));

        let mut best: Option<i64> = None;
        for col in cols {
            if best.is_some_and(|b| b >= self.bound(row, col)) {
                continue;
            }

            let score = self.descend(row, col);
            best = Some(best.map_or(score, |b| b.max(score)));
        }

        best
    }

    fn descend(&mut self, row: usize, col: usize) -> i64 {
        if let Some(&score) = self.memo.get(&(row, col)) {
            return score;
        }

        let next = row + 1;
        let successors = match self.grid.get(next) {
            Some(below) => col.saturating_sub(1)..(col + 2).min(below.len()),
            None => 0..0,
        };

        let score = self.grid[row][col] + self.best_of(next, successors).unwrap_or(0);
        self.memo.insert((row, col), score);
        score
    }
}

pub fn config() -> HarnessConfig<Vec<i64>, i64> {
    HarnessConfig::new(
        |line| Ok(parse_fields(line)?),
        |line| {
            let (index, rest) = split_index(line)?;
            Ok((index, rest.parse()?))
        },
    )
}

/// Adapter for [`crate::Harness::run_groups`]: a test case is the list of grid rows.
pub fn solve(rows: &[Vec<i64>]) -> Vec<i64> {
    vec![max_path_score(rows)]
}
