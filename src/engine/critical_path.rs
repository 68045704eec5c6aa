//! Critical path method (CPM).
//!
//! # Algorithm
//!
//! 1. Order tasks topologically (fails on cycles).
//! 2. Forward pass: `EF = ES + d`, where `ES` is the largest bound
//!    imposed by any incoming dependency, floored at 0:
//!    FS → `EF_p`, SS → `ES_p`, FF → `EF_p - d`, SF → `ES_p - d`.
//! 3. The task with the largest `EF` ends the critical path; the path is
//!    rebuilt by following, from each task, the predecessor that set its
//!    `ES` (the "driver"). A task whose start comes from the 0 floor has
//!    no driver.
//! 4. Backward pass (slack only): latest finish from the project finish,
//!    `slack = LS - ES`.
//!
//! Ties (equal bounds, equal finishes) go to the task earliest in input
//! order, so repeated runs on the same snapshot agree. Among tasks with
//! an equal finish, sinks are preferred.
//!
//! # Complexity
//! O((n + e) log n).
//!
//! # Reference
//! Kelley & Walker (1959), "Critical-Path Planning and Scheduling"

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::graph::{DependencyGraph, Edge};
use crate::models::DependencyType;

/// Slack below this counts as zero.
const SLACK_EPSILON: f64 = 1e-9;

/// Longest duration-weighted chain through the graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPath {
    /// Task IDs from the first task of the chain to the last.
    pub task_ids: Vec<String>,
    /// Project duration along the chain.
    pub total_duration: f64,
}

impl CriticalPath {
    /// Whether a task lies on the path.
    pub fn contains(&self, task_id: &str) -> bool {
        self.task_ids.iter().any(|id| id == task_id)
    }

    pub fn is_empty(&self) -> bool {
        self.task_ids.is_empty()
    }
}

/// CPM timings for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTiming {
    pub task_id: String,
    pub duration: f64,
    pub earliest_start: f64,
    pub earliest_finish: f64,
    pub latest_start: f64,
    pub latest_finish: f64,
    /// Total float: how far the task can slip without delaying the finish.
    pub slack: f64,
    pub is_critical: bool,
}

struct ForwardPass {
    order: Vec<usize>,
    durations: Vec<f64>,
    earliest_start: Vec<f64>,
    earliest_finish: Vec<f64>,
    driver: Vec<Option<usize>>,
}

impl ForwardPass {
    fn run(graph: &DependencyGraph, default_duration: f64) -> Result<Self, EngineError> {
        let order = graph.topological_indices()?;
        let n = graph.len();
        let durations: Vec<f64> = graph
            .tasks()
            .iter()
            .map(|t| t.duration().unwrap_or(default_duration))
            .collect();

        let mut earliest_start = vec![0.0; n];
        let mut earliest_finish = vec![0.0; n];
        let mut driver = vec![None; n];

        for &node in &order {
            let d = durations[node];

            let mut incoming: Vec<&Edge> = graph.predecessor_edges(node).collect();
            incoming.sort_by_key(|e| e.depends_on);

            let mut best: Option<(f64, usize)> = None;
            for edge in incoming {
                let p = edge.depends_on;
                let bound = match edge.kind {
                    DependencyType::FinishToStart => earliest_finish[p],
                    DependencyType::StartToStart => earliest_start[p],
                    DependencyType::FinishToFinish => earliest_finish[p] - d,
                    DependencyType::StartToFinish => earliest_start[p] - d,
                };
                // Strictly greater: the first predecessor in input order keeps ties.
                if best.map_or(true, |(b, _)| bound > b) {
                    best = Some((bound, p));
                }
            }

            if let Some((bound, p)) = best {
                earliest_start[node] = bound.max(0.0);
                // A negative FF/SF bound is overridden by the floor; then
                // nothing upstream sets this task's start.
                if bound >= 0.0 {
                    driver[node] = Some(p);
                }
            }
            earliest_finish[node] = earliest_start[node] + d;
        }

        Ok(Self {
            order,
            durations,
            earliest_start,
            earliest_finish,
            driver,
        })
    }

    /// Task with the largest earliest finish.
    ///
    /// On ties a sink beats a task with dependents, then input order decides.
    fn finish_node(&self, graph: &DependencyGraph) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (idx, &ef) in self.earliest_finish.iter().enumerate() {
            let better = match best {
                None => true,
                Some(b) => {
                    let best_ef = self.earliest_finish[b];
                    ef > best_ef || (ef == best_ef && graph.is_sink(idx) && !graph.is_sink(b))
                }
            };
            if better {
                best = Some(idx);
            }
        }
        best
    }
}

/// Computes the critical path.
///
/// An empty graph yields an empty path with zero duration.
///
/// # Errors
/// [`EngineError::Cycle`] if the graph is cyclic.
pub fn compute_critical_path(
    graph: &DependencyGraph,
    default_duration: f64,
) -> Result<CriticalPath, EngineError> {
    let pass = ForwardPass::run(graph, default_duration)?;
    let Some(last) = pass.finish_node(graph) else {
        return Ok(CriticalPath::default());
    };

    let mut chain = vec![last];
    let mut current = last;
    while let Some(prev) = pass.driver[current] {
        chain.push(prev);
        current = prev;
    }
    chain.reverse();

    Ok(CriticalPath {
        task_ids: chain
            .into_iter()
            .map(|idx| graph.task_at(idx).id.clone())
            .collect(),
        total_duration: pass.earliest_finish[last],
    })
}

/// Computes earliest/latest times and slack for every task, in input order.
///
/// # Errors
/// [`EngineError::Cycle`] if the graph is cyclic.
pub fn compute_slack(
    graph: &DependencyGraph,
    default_duration: f64,
) -> Result<Vec<TaskTiming>, EngineError> {
    let pass = ForwardPass::run(graph, default_duration)?;
    let n = graph.len();
    let finish = pass
        .finish_node(graph)
        .map(|idx| pass.earliest_finish[idx])
        .unwrap_or(0.0);

    let mut latest_finish = vec![finish; n];
    let mut latest_start = vec![0.0; n];

    for &node in pass.order.iter().rev() {
        let d = pass.durations[node];
        for edge in graph.successor_edges(node) {
            let s = edge.dependent;
            let bound = match edge.kind {
                DependencyType::FinishToStart => latest_start[s],
                DependencyType::StartToStart => latest_start[s] + d,
                DependencyType::FinishToFinish => latest_finish[s],
                DependencyType::StartToFinish => latest_finish[s] + d,
            };
            latest_finish[node] = latest_finish[node].min(bound);
        }
        latest_start[node] = latest_finish[node] - d;
    }

    Ok((0..n)
        .map(|idx| {
            let slack = latest_start[idx] - pass.earliest_start[idx];
            TaskTiming {
                task_id: graph.task_at(idx).id.clone(),
                duration: pass.durations[idx],
                earliest_start: pass.earliest_start[idx],
                earliest_finish: pass.earliest_finish[idx],
                latest_start: latest_start[idx],
                latest_finish: latest_finish[idx],
                slack,
                is_critical: slack.abs() < SLACK_EPSILON,
            }
        })
        .collect())
}
