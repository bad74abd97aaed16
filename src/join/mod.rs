//! The join graph: table reachability and join-path resolution.
//!
//! A directed graph over query objects rooted at a query's base table.
//! `path` computes the minimal ordered join sequence reaching a set of
//! target tables, using BFS with parent pointers; results are cached
//! per target set until the graph mutates.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::error::{QueryError, QueryResult};

/// How a join edge is rendered. LEFT unless the model says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    #[default]
    Left,
    Inner,
    Right,
}

impl JoinKind {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Right => "RIGHT JOIN",
        }
    }
}

/// One join step: the joining table, the joined table, the foreign-key
/// column on the joining side, and the join kind.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinEdge {
    pub from: String,
    pub to: String,
    pub foreign_key: String,
    pub kind: JoinKind,
}

/// Parent information for path reconstruction.
struct ParentInfo {
    parent: NodeIndex,
    edge_idx: EdgeIndex,
}

/// A per-compilation join graph rooted at the base table.
#[derive(Debug)]
pub struct JoinGraph {
    graph: DiGraph<String, JoinEdge>,
    root: NodeIndex,
    nodes: HashMap<String, NodeIndex>,
    /// Keyed by the sorted target set; cleared on every mutation.
    cache: HashMap<Vec<String>, Arc<[JoinEdge]>>,
}

impl JoinGraph {
    pub fn new(root: impl Into<String>) -> Self {
        let root_name = root.into();
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();
        let root = graph.add_node(root_name.clone());
        nodes.insert(root_name, root);
        Self {
            graph,
            root,
            nodes,
            cache: HashMap::new(),
        }
    }

    /// The root table's name.
    pub fn root(&self) -> &str {
        &self.graph[self.root]
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Add a join edge. Re-adding an edge with the same (from, to) pair
    /// is a no-op; any addition invalidates the path cache.
    pub fn add_edge(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        foreign_key: impl Into<String>,
        kind: JoinKind,
    ) {
        let from = from.into();
        let to = to.into();
        let from_idx = self.intern(&from);
        let to_idx = self.intern(&to);
        if self.graph.find_edge(from_idx, to_idx).is_some() {
            return;
        }
        let foreign_key = foreign_key.into();
        debug!(from = %from, to = %to, fk = %foreign_key, "join edge added");
        self.graph.add_edge(
            from_idx,
            to_idx,
            JoinEdge {
                from,
                to,
                foreign_key,
                kind,
            },
        );
        self.cache.clear();
    }

    fn intern(&mut self, name: &str) -> NodeIndex {
        if let Some(idx) = self.nodes.get(name) {
            return *idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), idx);
        idx
    }

    /// The ordered join sequence reaching every table in `targets` from
    /// the root. The root itself needs no edge; shared path prefixes
    /// appear once; repeated calls with the same target set return the
    /// same cached sequence until the graph mutates.
    pub fn path(&mut self, targets: &BTreeSet<String>) -> QueryResult<Arc<[JoinEdge]>> {
        let key: Vec<String> = targets
            .iter()
            .filter(|t| *t != self.root())
            .cloned()
            .collect();
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached.clone());
        }
        let path = self.resolve_path(&key)?;
        debug!(targets = ?key, edges = path.len(), "join path resolved");
        self.cache.insert(key, path.clone());
        Ok(path)
    }

    fn resolve_path(&self, targets: &[String]) -> QueryResult<Arc<[JoinEdge]>> {
        if targets.is_empty() {
            return Ok(Arc::from(Vec::new().into_boxed_slice()));
        }

        // BFS with parent pointers, recording discovery order so the
        // collected edges come out already topologically sorted.
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut parents: HashMap<NodeIndex, ParentInfo> = HashMap::new();
        let mut discovery: HashMap<NodeIndex, usize> = HashMap::new();
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();

        visited.insert(self.root);
        discovery.insert(self.root, 0);
        queue.push_back(self.root);

        while let Some(current) = queue.pop_front() {
            for edge_ref in self.graph.edges(current) {
                let neighbor = edge_ref.target();
                if visited.contains(&neighbor) {
                    continue;
                }
                visited.insert(neighbor);
                discovery.insert(neighbor, discovery.len());
                parents.insert(
                    neighbor,
                    ParentInfo {
                        parent: current,
                        edge_idx: edge_ref.id(),
                    },
                );
                queue.push_back(neighbor);
            }
        }

        // Walk each target's parent chain back to the root, collecting
        // the touched edges once.
        let mut needed: HashSet<EdgeIndex> = HashSet::new();
        for target in targets {
            let target_idx = self
                .nodes
                .get(target)
                .filter(|idx| visited.contains(idx))
                .ok_or_else(|| QueryError::UnreachableTarget(target.clone()))?;
            let mut current = *target_idx;
            while current != self.root {
                let info = &parents[&current];
                needed.insert(info.edge_idx);
                current = info.parent;
            }
        }

        let mut edge_indices: Vec<EdgeIndex> = needed.into_iter().collect();
        edge_indices.sort_by_key(|idx| {
            self.graph
                .edge_endpoints(*idx)
                .and_then(|(_, to)| discovery.get(&to).copied())
                .unwrap_or(usize::MAX)
        });

        let edges: Vec<JoinEdge> = edge_indices
            .into_iter()
            .map(|idx| self.graph[idx].clone())
            .collect();
        Ok(Arc::from(edges.into_boxed_slice()))
    }

    /// Fail with the offending edge if a cycle is reachable from the
    /// root; a DAG passes silently.
    pub fn validate(&self) -> QueryResult<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            InProgress,
            Done,
        }

        let mut marks: HashMap<NodeIndex, Mark> = HashMap::new();
        // Iterative DFS; a second visit to an in-progress node is a
        // back edge.
        let mut stack: Vec<(NodeIndex, bool)> = vec![(self.root, false)];
        while let Some((node, children_done)) = stack.pop() {
            if children_done {
                marks.insert(node, Mark::Done);
                continue;
            }
            if marks.get(&node) == Some(&Mark::Done) {
                continue;
            }
            marks.insert(node, Mark::InProgress);
            stack.push((node, true));
            for edge_ref in self.graph.edges(node) {
                let neighbor = edge_ref.target();
                match marks.get(&neighbor) {
                    Some(Mark::InProgress) => {
                        let edge = edge_ref.weight();
                        return Err(QueryError::CyclicJoinGraph {
                            from: edge.from.clone(),
                            to: edge.to.clone(),
                        });
                    }
                    Some(Mark::Done) => {}
                    None => stack.push((neighbor, false)),
                }
            }
        }
        Ok(())
    }
}
