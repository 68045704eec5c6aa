//! Dependency graph built from a task snapshot.
//!
//! Nodes are tasks keyed by ID and kept in input order; edges point from
//! a dependent task to the task it depends on. The graph is rebuilt from
//! scratch for every computation and never edited afterwards.
//!
//! # Algorithms
//! - Topological order: Kahn's algorithm with a min-heap on input
//!   position, so ties always resolve the same way.
//! - Cycle search: iterative three-color DFS, reporting every back edge.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.3–22.4

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use crate::error::EngineError;
use crate::models::{DependencyType, Task};

/// A typed edge: `dependent` depends on `depends_on`.
///
/// Endpoints are node positions in input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub dependent: usize,
    pub depends_on: usize,
    pub kind: DependencyType,
}

/// A dependency whose target is not in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingRef {
    pub task_id: String,
    pub missing_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Unvisited,
    InProgress,
    Done,
}

/// Task dependency graph.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<Task>,
    index: HashMap<String, usize>,
    edges: Vec<Edge>,
    /// Per node: edges where it is the dependent, in declaration order.
    predecessors: Vec<Vec<usize>>,
    /// Per node: edges where it is depended on.
    successors: Vec<Vec<usize>>,
    dangling: Vec<DanglingRef>,
    duplicates: Vec<String>,
}

impl DependencyGraph {
    /// Builds a graph from a task snapshot. O(n + e).
    ///
    /// The first task with a given ID wins; later duplicates are recorded
    /// and otherwise ignored. Dependencies on unknown IDs are recorded as
    /// dangling references instead of edges.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut graph = Self::default();

        // First pass: nodes
        for task in tasks {
            if graph.index.contains_key(&task.id) {
                graph.duplicates.push(task.id.clone());
                continue;
            }
            graph.index.insert(task.id.clone(), graph.nodes.len());
            graph.nodes.push(task.clone());
        }
        graph.predecessors = vec![Vec::new(); graph.nodes.len()];
        graph.successors = vec![Vec::new(); graph.nodes.len()];

        // Second pass: edges
        for (dependent, task) in graph.nodes.iter().enumerate() {
            for dep in &task.dependencies {
                match graph.index.get(&dep.task_id) {
                    Some(&depends_on) => {
                        let edge_idx = graph.edges.len();
                        graph.edges.push(Edge {
                            dependent,
                            depends_on,
                            kind: dep.kind,
                        });
                        graph.predecessors[dependent].push(edge_idx);
                        graph.successors[depends_on].push(edge_idx);
                    }
                    None => graph.dangling.push(DanglingRef {
                        task_id: task.id.clone(),
                        missing_id: dep.task_id.clone(),
                    }),
                }
            }
        }

        graph
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Tasks in input order.
    pub fn tasks(&self) -> &[Task] {
        &self.nodes
    }

    /// Task at a node position.
    pub fn task_at(&self, idx: usize) -> &Task {
        &self.nodes[idx]
    }

    /// Looks up a task by ID.
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.index_of(id).map(|idx| &self.nodes[idx])
    }

    /// Node position of a task ID.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All resolved edges.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Dependencies whose target does not exist.
    pub fn dangling(&self) -> &[DanglingRef] {
        &self.dangling
    }

    /// IDs that appeared more than once in the snapshot.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// Edges where `idx` is the dependent, in declaration order.
    pub fn predecessor_edges(&self, idx: usize) -> impl Iterator<Item = &Edge> + '_ {
        self.predecessors[idx].iter().map(move |&e| &self.edges[e])
    }

    /// Edges where `idx` is depended on.
    pub fn successor_edges(&self, idx: usize) -> impl Iterator<Item = &Edge> + '_ {
        self.successors[idx].iter().map(move |&e| &self.edges[e])
    }

    /// Whether nothing depends on `idx`.
    pub fn is_sink(&self, idx: usize) -> bool {
        self.successors[idx].is_empty()
    }

    /// Direct dependencies of a task.
    pub fn dependencies_of(&self, id: &str) -> Vec<&Task> {
        match self.index_of(id) {
            Some(idx) => self
                .predecessor_edges(idx)
                .map(|e| &self.nodes[e.depends_on])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Tasks that directly depend on a task.
    pub fn dependents_of(&self, id: &str) -> Vec<&Task> {
        match self.index_of(id) {
            Some(idx) => self
                .successor_edges(idx)
                .map(|e| &self.nodes[e.dependent])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Whether adding "`dependent` depends on `depends_on`" would close a cycle.
    ///
    /// True for a self-dependency, or when `depends_on` already depends on
    /// `dependent` directly or transitively. Unknown IDs never form a cycle.
    pub fn would_create_cycle(&self, dependent: &str, depends_on: &str) -> bool {
        let (Some(from), Some(target)) = (self.index_of(depends_on), self.index_of(dependent))
        else {
            return false;
        };
        if from == target {
            return true;
        }

        let mut seen = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([from]);
        seen[from] = true;

        while let Some(node) = queue.pop_front() {
            for edge in self.predecessor_edges(node) {
                let next = edge.depends_on;
                if next == target {
                    return true;
                }
                if !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
        false
    }

    /// Node positions in dependency order (Kahn's algorithm).
    ///
    /// Among ready nodes, the one earliest in input order goes first.
    ///
    /// # Errors
    /// [`EngineError::Cycle`] naming every node left unresolved, in input order.
    pub fn topological_indices(&self) -> Result<Vec<usize>, EngineError> {
        let n = self.nodes.len();
        let mut in_degree: Vec<usize> = self.predecessors.iter().map(Vec::len).collect();
        let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
            .filter(|&i| in_degree[i] == 0)
            .map(Reverse)
            .collect();
        let mut order = Vec::with_capacity(n);

        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for &e in &self.successors[node] {
                let dependent = self.edges[e].dependent;
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        if order.len() < n {
            let task_ids = (0..n)
                .filter(|&i| in_degree[i] > 0)
                .map(|i| self.nodes[i].id.clone())
                .collect();
            return Err(EngineError::Cycle { task_ids });
        }

        Ok(order)
    }

    /// Finds cycles by iterative DFS along dependency edges.
    ///
    /// Each back edge yields one cycle, listed in dependency direction:
    /// every node depends on the next and the last depends on the first.
    /// Roots are tried in input order so results are deterministic.
    pub fn find_cycles(&self) -> Vec<Vec<usize>> {
        let n = self.nodes.len();
        let mut state = vec![NodeState::Unvisited; n];
        let mut cycles: Vec<Vec<usize>> = Vec::new();

        for root in 0..n {
            if state[root] != NodeState::Unvisited {
                continue;
            }

            // (node, next predecessor edge to follow)
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            state[root] = NodeState::InProgress;

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                let Some(&edge) = self.predecessors[node].get(frame.1) else {
                    state[node] = NodeState::Done;
                    stack.pop();
                    continue;
                };
                frame.1 += 1;

                let next = self.edges[edge].depends_on;
                match state[next] {
                    NodeState::Unvisited => {
                        state[next] = NodeState::InProgress;
                        stack.push((next, 0));
                    }
                    NodeState::InProgress => {
                        if let Some(pos) = stack.iter().position(|&(i, _)| i == next) {
                            let cycle: Vec<usize> = stack[pos..].iter().map(|&(i, _)| i).collect();
                            if !cycles.contains(&cycle) {
                                cycles.push(cycle);
                            }
                        }
                    }
                    NodeState::Done => {}
                }
            }
        }

        cycles
    }

    /// Whether the graph has no cycles.
    pub fn is_acyclic(&self) -> bool {
        self.topological_indices().is_ok()
    }
}
