//! Round search: choosing where to place all three pieces of a round.
//!
//! # How It Works
//!
//! The search runs through these phases:
//!
//! 1. **Enumerate** - For each of the 6 piece orders, every combination of anchor
//!    positions that keeps each piece's bounding box on the board becomes a [`Job`]
//! 2. **Evaluate** - A pool of scoped worker threads claims jobs in chunks. Each job
//!    places the three pieces in order on a private copy of the state; a collision
//!    discards the job, otherwise the final board is scored
//! 3. **Collect** - Every worker reports its best candidate over a channel; the
//!    search waits for all workers to finish before going on
//! 4. **Select** - The highest score wins; ties go to the job enumerated first
//! 5. **Reconstruct** - The winning job becomes an ordered list of [`Move`]s
//!
//! The score of a job is the state's score after the three placements (line-clear
//! bonuses included) plus the [`BoardEvaluator`] delta of the final board.
//!
//! # Design: Exhaustive Search
//!
//! Every job is evaluated unless a time limit is configured. With a limit, workers
//! stop evaluating jobs once it expires and the best job found so far is used.
//! Because ties are broken by enumeration order, a search that runs to completion
//! always returns the same plan for the same input, whatever the worker count.
//!
//! # Usage
//!
//! ```
//! use blockblast_engine::{BitBoard, GameState, PieceShape};
//! use blockblast_evaluator::{
//!     board_evaluator::PenaltyEvaluator,
//!     search::{SearchConfig, SearchOrchestrator},
//! };
//!
//! let pieces = [
//!     PieceShape::rectangle(2, 2),
//!     PieceShape::rectangle(3, 1),
//!     PieceShape::rectangle(1, 1),
//! ];
//! let state = GameState::new(BitBoard::EMPTY, pieces);
//!
//! let evaluator = Box::new(PenaltyEvaluator::default());
//! let search = SearchOrchestrator::new(evaluator, SearchConfig::default());
//! let plan = search.find_best_moves(&state).unwrap();
//! assert_eq!(plan.moves().len(), 3);
//! ```

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc,
    },
    thread,
    time::{Duration, Instant},
};

use blockblast_engine::{
    BitBoard, GameState, Move, PIECE_COUNT, PieceBounds, PieceShape, Position,
};
use serde::Serialize;

use crate::board_evaluator::BoardEvaluator;

/// All orders in which the three pieces can be placed.
pub const PERMUTATIONS: [[usize; PIECE_COUNT]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// Number of jobs a worker claims at once.
const CHUNK_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("no valid placement of all three pieces")]
pub struct NoValidMoveError;

/// Tuning knobs of the search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Number of worker threads (at least one is always used).
    pub workers: usize,
    /// Stop dispatching jobs after this long and keep the best result so far.
    pub time_limit: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            time_limit: None,
        }
    }
}

/// One candidate round: a piece order and an anchor for each piece in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    permutation: u8,
    positions: [Position; PIECE_COUNT],
}

impl Job {
    /// Index into [`PERMUTATIONS`].
    #[must_use]
    pub fn permutation_index(self) -> usize {
        usize::from(self.permutation)
    }

    /// Piece indices in placement order.
    #[must_use]
    pub fn piece_order(self) -> [usize; PIECE_COUNT] {
        PERMUTATIONS[self.permutation_index()]
    }

    /// Anchor of each placement, in placement order.
    #[must_use]
    pub fn positions(self) -> [Position; PIECE_COUNT] {
        self.positions
    }

    /// Moves in placement order, with piece indices taken from the permutation.
    #[must_use]
    pub fn moves(self) -> [Move; PIECE_COUNT] {
        let order = self.piece_order();
        std::array::from_fn(|i| Move::new(order[i], self.positions[i]))
    }
}

/// Every anchor that keeps a piece with `bounds` on the board, x-major.
#[expect(clippy::cast_possible_truncation)]
fn anchors(bounds: PieceBounds) -> Vec<Position> {
    let (Some(max_x), Some(max_y)) = (
        BitBoard::WIDTH.checked_sub(bounds.width),
        BitBoard::HEIGHT.checked_sub(bounds.height),
    ) else {
        return vec![];
    };
    (0..=max_x)
        .flat_map(|x| (0..=max_y).map(move |y| Position::new(x as u8, y as u8)))
        .collect()
}

/// Lists every job for `pieces`, in enumeration order.
///
/// Jobs are grouped by permutation; inside a permutation the anchors vary like
/// nested loops over `x1, y1, x2, y2, x3, y3` with `y3` innermost.
#[must_use]
pub fn enumerate_jobs(pieces: &[PieceShape; PIECE_COUNT]) -> Vec<Job> {
    let mut jobs = Vec::new();
    for (permutation, order) in PERMUTATIONS.iter().enumerate() {
        let [a1, a2, a3] = order.map(|i| anchors(pieces[i].bounds()));
        #[expect(clippy::cast_possible_truncation)]
        let permutation = permutation as u8;
        for &p1 in &a1 {
            for &p2 in &a2 {
                for &p3 in &a3 {
                    jobs.push(Job {
                        permutation,
                        positions: [p1, p2, p3],
                    });
                }
            }
        }
    }
    jobs
}

/// A valid job with the score of its final board.
#[derive(Debug, Clone, Copy)]
struct ScoredJob {
    job: Job,
    /// Position in the enumeration, used to break ties.
    index: usize,
    score: i32,
    final_board: BitBoard,
}

impl ScoredJob {
    fn beats(&self, other: &ScoredJob) -> bool {
        self.score > other.score || (self.score == other.score && self.index < other.index)
    }
}

/// What a single worker found.
#[derive(Debug, Default)]
struct WorkerReport {
    best: Option<ScoredJob>,
    evaluated_jobs: usize,
    valid_jobs: usize,
    timed_out: bool,
}

/// Counters describing one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub total_jobs: usize,
    pub evaluated_jobs: usize,
    pub valid_jobs: usize,
    pub elapsed: Duration,
    pub timed_out: bool,
}

/// The chosen placements of a round.
#[derive(Debug, Clone, Serialize)]
pub struct RoundPlan {
    moves: [Move; PIECE_COUNT],
    score: i32,
    final_board: BitBoard,
    stats: SearchStats,
}

impl RoundPlan {
    /// Moves in the order they must be played.
    #[must_use]
    pub fn moves(&self) -> &[Move; PIECE_COUNT] {
        &self.moves
    }

    /// Heuristic score of the plan.
    #[must_use]
    pub fn score(&self) -> i32 {
        self.score
    }

    /// Board after all three placements and line clears.
    #[must_use]
    pub fn final_board(&self) -> BitBoard {
        self.final_board
    }

    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }
}

/// Searches every placement of a round's three pieces for the best score.
#[derive(Debug)]
pub struct SearchOrchestrator<'a> {
    evaluator: Box<dyn BoardEvaluator + 'a>,
    config: SearchConfig,
}

impl<'a> SearchOrchestrator<'a> {
    #[must_use]
    pub fn new(evaluator: Box<dyn BoardEvaluator + 'a>, config: SearchConfig) -> Self {
        Self { evaluator, config }
    }

    /// Finds the best ordered placement of all three pieces of `state`.
    ///
    /// Returns [`NoValidMoveError`] when no order and no combination of positions
    /// lets all three pieces fit (or none was found before the time limit).
    pub fn find_best_moves(&self, state: &GameState) -> Result<RoundPlan, NoValidMoveError> {
        let start = Instant::now();
        let deadline = self.config.time_limit.map(|limit| start + limit);

        let jobs = enumerate_jobs(state.pieces());
        log::debug!("enumerated {} jobs", jobs.len());

        let reports = self.run_workers(state, &jobs, deadline);

        let mut stats = SearchStats {
            total_jobs: jobs.len(),
            ..SearchStats::default()
        };
        let mut best: Option<ScoredJob> = None;
        for report in reports {
            stats.evaluated_jobs += report.evaluated_jobs;
            stats.valid_jobs += report.valid_jobs;
            stats.timed_out |= report.timed_out;
            if let Some(candidate) = report.best
                && best.is_none_or(|best| candidate.beats(&best))
            {
                best = Some(candidate);
            }
        }
        stats.elapsed = start.elapsed();

        if stats.timed_out {
            log::warn!(
                "search stopped by time limit after {} of {} jobs",
                stats.evaluated_jobs,
                stats.total_jobs
            );
        }
        log::debug!(
            "{} of {} evaluated jobs are valid ({:?})",
            stats.valid_jobs,
            stats.evaluated_jobs,
            stats.elapsed
        );

        let Some(best) = best else {
            log::info!("no valid move for this round");
            return Err(NoValidMoveError);
        };
        log::info!("best score: {}", best.score);

        Ok(RoundPlan {
            moves: best.job.moves(),
            score: best.score,
            final_board: best.final_board,
            stats,
        })
    }

    /// Scores a single job, or returns `None` if any placement collides.
    #[must_use]
    pub fn evaluate_job(&self, state: &GameState, job: Job) -> Option<(i32, BitBoard)> {
        let pieces = state.pieces();
        let end = job
            .moves()
            .iter()
            .try_fold(state.clone(), |current, mv| {
                current.place(&pieces[mv.piece_index()], mv.position()).ok()
            })?;
        let score = end
            .score()
            .saturating_add(self.evaluator.evaluate_board(end.board()));
        Some((score, end.board()))
    }

    fn run_workers(
        &self,
        state: &GameState,
        jobs: &[Job],
        deadline: Option<Instant>,
    ) -> Vec<WorkerReport> {
        let workers = self.config.workers.max(1);
        let cursor = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel();

        thread::scope(|s| {
            for _ in 0..workers {
                let tx = tx.clone();
                let cursor = &cursor;
                // each worker gets its own copy of the round
                let state = GameState::new(state.board(), state.pieces().clone())
                    .with_score(state.score());
                s.spawn(move || {
                    let report = self.drain_jobs(&state, jobs, cursor, deadline);
                    // the receiver outlives the scope
                    let _ = tx.send(report);
                });
            }
        });
        drop(tx);

        rx.into_iter().collect()
    }

    fn drain_jobs(
        &self,
        state: &GameState,
        jobs: &[Job],
        cursor: &AtomicUsize,
        deadline: Option<Instant>,
    ) -> WorkerReport {
        let expired = || deadline.is_some_and(|deadline| Instant::now() >= deadline);
        let mut report = WorkerReport::default();
        loop {
            let start = cursor.fetch_add(CHUNK_SIZE, Ordering::Relaxed);
            if start >= jobs.len() {
                break;
            }
            let end = (start + CHUNK_SIZE).min(jobs.len());
            for (index, job) in (start..end).zip(&jobs[start..end]) {
                if expired() {
                    report.timed_out = true;
                    return report;
                }
                report.evaluated_jobs += 1;
                let Some((score, final_board)) = self.evaluate_job(state, *job) else {
                    continue;
                };
                report.valid_jobs += 1;
                let candidate = ScoredJob {
                    job: *job,
                    index,
                    score,
                    final_board,
                };
                if report.best.is_none_or(|best| candidate.beats(&best)) {
                    report.best = Some(candidate);
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use blockblast_engine::PieceShape;

    use super::*;
    use crate::board_evaluator::PenaltyEvaluator;

    fn search(workers: usize) -> SearchOrchestrator<'static> {
        SearchOrchestrator::new(
            Box::new(PenaltyEvaluator::default()),
            SearchConfig {
                workers,
                time_limit: None,
            },
        )
    }

    fn dots() -> [PieceShape; PIECE_COUNT] {
        [
            PieceShape::rectangle(1, 1),
            PieceShape::rectangle(1, 1),
            PieceShape::rectangle(1, 1),
        ]
    }

    #[test]
    fn test_job_count() {
        let pieces = [
            PieceShape::rectangle(1, 1),
            PieceShape::rectangle(2, 2),
            PieceShape::rectangle(8, 1),
        ];
        let jobs = enumerate_jobs(&pieces);
        assert_eq!(jobs.len(), 6 * (8 * 8) * (7 * 7) * 8);
    }

    #[test]
    fn test_jobs_keep_pieces_on_board() {
        let pieces = [
            PieceShape::rectangle(3, 2),
            PieceShape::from_ascii(
                "
                .##
                ##.
                ",
            ),
            PieceShape::rectangle(1, 5),
        ];
        for job in enumerate_jobs(&pieces) {
            for (piece, pos) in job.piece_order().into_iter().zip(job.positions()) {
                let bounds = pieces[piece].bounds();
                assert!(pos.x() + bounds.width <= BitBoard::WIDTH);
                assert!(pos.y() + bounds.height <= BitBoard::HEIGHT);
                assert_eq!(
                    pieces[piece].project(pos.x(), pos.y()).count_occupied(),
                    pieces[piece].cell_count()
                );
            }
        }
    }

    #[test]
    fn test_job_moves_follow_permutation() {
        let job = Job {
            permutation: 3,
            positions: [Position::new(1, 2), Position::new(3, 4), Position::new(5, 6)],
        };
        let moves = job.moves();
        assert_eq!(moves[0], Move::new(1, Position::new(1, 2)));
        assert_eq!(moves[1], Move::new(2, Position::new(3, 4)));
        assert_eq!(moves[2], Move::new(0, Position::new(5, 6)));
    }

    #[test]
    fn test_evaluate_job_rejects_collisions() {
        let state = GameState::new(BitBoard::cell(4, 4), dots());
        let search = search(1);
        let clash = Job {
            permutation: 0,
            positions: [Position::new(0, 0), Position::new(0, 0), Position::new(1, 1)],
        };
        assert_eq!(search.evaluate_job(&state, clash), None);
        let occupied = Job {
            permutation: 0,
            positions: [Position::new(4, 4), Position::new(0, 0), Position::new(1, 1)],
        };
        assert_eq!(search.evaluate_job(&state, occupied), None);
    }

    #[test]
    fn test_empty_board_with_single_cells() {
        let state = GameState::new(BitBoard::EMPTY, dots());
        let plan = search(4).find_best_moves(&state).unwrap();

        let positions: Vec<Position> = plan.moves().iter().map(|mv| mv.position()).collect();
        assert_ne!(positions[0], positions[1]);
        assert_ne!(positions[0], positions[2]);
        assert_ne!(positions[1], positions[2]);

        let mut indices: Vec<usize> = plan.moves().iter().map(|mv| mv.piece_index()).collect();
        indices.sort_unstable();
        assert_eq!(indices, [0, 1, 2]);

        let end = state.apply_moves(plan.moves()).unwrap();
        assert_eq!(end.board(), plan.final_board());
        assert_eq!(
            plan.score(),
            PenaltyEvaluator::default().evaluate_board(end.board())
        );
        assert_eq!(plan.stats().total_jobs, 6 * 64 * 64 * 64);
        assert_eq!(plan.stats().evaluated_jobs, plan.stats().total_jobs);
        assert!(!plan.stats().timed_out);
    }

    #[test]
    fn test_full_board_has_no_valid_move() {
        let state = GameState::new(BitBoard::FULL, dots());
        assert_eq!(search(2).find_best_moves(&state).unwrap_err(), NoValidMoveError);
    }

    #[test]
    fn test_pieces_that_cannot_all_fit() {
        let pieces = [
            PieceShape::rectangle(8, 8),
            PieceShape::rectangle(1, 1),
            PieceShape::rectangle(1, 1),
        ];
        let board = BitBoard::cell(0, 0);
        let state = GameState::new(board, pieces);
        assert!(search(2).find_best_moves(&state).is_err());
    }

    #[test]
    fn test_prefers_clearing_a_line() {
        let board = BitBoard::from_ascii(
            r"
            #####...
            ........
            ........
            ........
            ........
            ........
            ........
            ........
            ",
        );
        let pieces = [
            PieceShape::rectangle(3, 1),
            PieceShape::rectangle(1, 1),
            PieceShape::rectangle(1, 1),
        ];
        let state = GameState::new(board, pieces);
        let plan = search(3).find_best_moves(&state).unwrap();

        assert!(plan.moves().contains(&Move::new(0, Position::new(5, 0))));
        // 50 for the row, then two adjacent blocks against the border
        assert_eq!(plan.score(), 44);
        assert_eq!(plan.final_board().count_occupied(), 2);
    }

    #[test]
    fn test_same_result_for_any_worker_count() {
        let board = BitBoard::from_ascii(
            r"
            ##....##
            #......#
            ........
            ...##...
            ...##...
            ........
            #......#
            ##....##
            ",
        );
        let pieces = [
            PieceShape::rectangle(2, 2),
            PieceShape::from_ascii(
                "
                #.
                #.
                ##
                ",
            ),
            PieceShape::rectangle(3, 1),
        ];
        let state = GameState::new(board, pieces);

        let single = search(1).find_best_moves(&state).unwrap();
        let many = search(8).find_best_moves(&state).unwrap();
        let again = search(8).find_best_moves(&state).unwrap();
        assert_eq!(single.score(), many.score());
        assert_eq!(single.moves(), many.moves());
        assert_eq!(many.moves(), again.moves());
        assert_eq!(single.final_board(), again.final_board());
    }

    #[test]
    fn test_expired_time_limit_stops_search() {
        let state = GameState::new(BitBoard::EMPTY, dots());
        let search = SearchOrchestrator::new(
            Box::new(PenaltyEvaluator::default()),
            SearchConfig {
                workers: 2,
                time_limit: Some(Duration::ZERO),
            },
        );
        assert_eq!(search.find_best_moves(&state).unwrap_err(), NoValidMoveError);
    }

    /// Takes a millisecond per board so a search outlives a short time limit.
    #[derive(Debug)]
    struct SlowEvaluator;

    impl BoardEvaluator for SlowEvaluator {
        fn evaluate_board(&self, _board: BitBoard) -> i32 {
            thread::sleep(Duration::from_millis(1));
            0
        }
    }

    #[test]
    fn test_time_limit_keeps_best_plan_so_far() {
        let bars = [
            PieceShape::rectangle(8, 1),
            PieceShape::rectangle(8, 1),
            PieceShape::rectangle(8, 1),
        ];
        let state = GameState::new(BitBoard::EMPTY, bars);
        let search = SearchOrchestrator::new(
            Box::new(SlowEvaluator),
            SearchConfig {
                workers: 1,
                time_limit: Some(Duration::from_millis(200)),
            },
        );
        let plan = search.find_best_moves(&state).unwrap();

        let stats = plan.stats();
        assert!(stats.timed_out);
        assert_eq!(stats.total_jobs, 6 * 8 * 8 * 8);
        assert!(stats.evaluated_jobs > 0);
        assert!(stats.evaluated_jobs < stats.total_jobs);

        let end = state.apply_moves(plan.moves()).unwrap();
        assert_eq!(end.board(), plan.final_board());
        assert_eq!(end.score(), plan.score());
    }
}
