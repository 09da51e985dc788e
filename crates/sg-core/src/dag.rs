//! Dependency graph building and topological sorting

use crate::error::{CoreError, CoreResult};
use crate::metadata::{FieldDependency, TypeMetadata};
use crate::names::{StorageName, TypeName};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// A resolved foreign-key reference: which node's values feed which field.
#[derive(Debug, Clone)]
pub struct DependencyRef {
    pub dependency: FieldDependency,
    /// Node holding the dependency's values
    pub source: NodeIndex,
}

/// One record type participating in a build.
#[derive(Debug)]
pub struct TypeNode<V> {
    metadata: Arc<TypeMetadata>,
    /// Value groups in attachment order; positions run across groups
    values: Vec<V>,
    dependencies: Vec<DependencyRef>,
}

impl<V> TypeNode<V> {
    pub fn type_name(&self) -> &TypeName {
        &self.metadata.type_name
    }

    pub fn storage_name(&self) -> &StorageName {
        &self.metadata.storage_name
    }

    pub fn omitted_fields(&self) -> &BTreeSet<&'static str> {
        &self.metadata.omitted_fields
    }

    pub fn metadata(&self) -> &Arc<TypeMetadata> {
        &self.metadata
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [V] {
        &mut self.values
    }

    pub fn dependencies(&self) -> &[DependencyRef] {
        &self.dependencies
    }

    pub fn into_values(self) -> Vec<V> {
        self.values
    }
}

/// A value group handed to [`DependencyGraph::build`].
pub struct GraphGroup<V> {
    pub metadata: Arc<TypeMetadata>,
    pub values: V,
}

/// A directed graph of record type dependencies for one build.
///
/// Edges point from a dependency to its dependent, so a dependency-first
/// order is an insertion-safe order.
#[derive(Debug)]
pub struct DependencyGraph<V> {
    graph: DiGraph<TypeName, ()>,
    node_map: HashMap<TypeName, NodeIndex>,
    nodes: Vec<TypeNode<V>>,
    root: Option<NodeIndex>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

struct Frame {
    node: NodeIndex,
    upstream: Vec<NodeIndex>,
    next: usize,
}

impl<V> DependencyGraph<V> {
    /// Build the graph from value groups; the last group is the root.
    ///
    /// Groups of the same type are attached to one node in order. A
    /// dependency on a type with no group contributes no edge.
    pub fn build(groups: Vec<GraphGroup<V>>) -> CoreResult<Self> {
        let mut dag = Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
            nodes: Vec::new(),
            root: None,
        };

        for group in groups {
            let idx = dag.add_type(&group.metadata);
            dag.nodes[idx.index()].values.push(group.values);
            dag.root = Some(idx);
        }

        for idx in dag.graph.node_indices() {
            let metadata = Arc::clone(&dag.nodes[idx.index()].metadata);
            for dep in metadata.dependencies() {
                if dep.omitted {
                    log::debug!(
                        "Skipping omitted dependency {}.{} -> {}",
                        metadata.type_name,
                        dep.foreign_key_field,
                        dep.target_type
                    );
                    continue;
                }
                let Some(&source) = dag.node_map.get(&dep.target_type) else {
                    log::warn!(
                        "{} depends on {} through '{}', but no {} values were attached",
                        metadata.type_name,
                        dep.target_type,
                        dep.foreign_key_field,
                        dep.target_type
                    );
                    continue;
                };
                dag.graph.update_edge(source, idx, ());
                dag.nodes[idx.index()].dependencies.push(DependencyRef {
                    dependency: dep.clone(),
                    source,
                });
            }
        }

        Ok(dag)
    }

    fn add_type(&mut self, metadata: &Arc<TypeMetadata>) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(&metadata.type_name) {
            return idx;
        }
        let idx = self.graph.add_node(metadata.type_name.clone());
        self.node_map.insert(metadata.type_name.clone(), idx);
        self.nodes.push(TypeNode {
            metadata: Arc::clone(metadata),
            values: Vec::new(),
            dependencies: Vec::new(),
        });
        idx
    }

    /// Node of the last attached group.
    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    pub fn node(&self, idx: NodeIndex) -> &TypeNode<V> {
        &self.nodes[idx.index()]
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> &mut TypeNode<V> {
        &mut self.nodes[idx.index()]
    }

    pub fn index_of(&self, type_name: &str) -> Option<NodeIndex> {
        self.node_map.get(type_name).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Consume the graph, yielding nodes by index.
    pub fn into_nodes(self) -> Vec<TypeNode<V>> {
        self.nodes
    }

    /// Direct dependencies in declaration order.
    fn upstream(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        // petgraph yields the most recently added edge first
        let mut deps: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .collect();
        deps.reverse();
        deps
    }

    pub fn dependencies(&self, type_name: &str) -> Vec<TypeName> {
        self.index_of(type_name)
            .map(|idx| {
                self.upstream(idx)
                    .into_iter()
                    .map(|n| self.graph[n].clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn dependents(&self, type_name: &str) -> Vec<TypeName> {
        self.index_of(type_name)
            .map(|idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Outgoing)
                    .map(|n| self.graph[n].clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Order nodes so every dependency precedes its dependents.
    ///
    /// Iterative depth-first search with three marks; reaching a node that
    /// is still in progress is a cycle. Traversal starts from nodes in
    /// registration order and follows dependencies in declaration order.
    pub fn insertion_order(&self) -> CoreResult<Vec<NodeIndex>> {
        let mut marks = vec![Mark::Unvisited; self.graph.node_count()];
        let mut order = Vec::with_capacity(self.graph.node_count());

        for start in self.graph.node_indices() {
            if marks[start.index()] != Mark::Unvisited {
                continue;
            }
            marks[start.index()] = Mark::InProgress;
            let mut stack = vec![Frame {
                node: start,
                upstream: self.upstream(start),
                next: 0,
            }];

            while let Some(frame) = stack.last_mut() {
                let Some(&dep) = frame.upstream.get(frame.next) else {
                    let finished = frame.node;
                    stack.pop();
                    marks[finished.index()] = Mark::Done;
                    order.push(finished);
                    continue;
                };
                frame.next += 1;

                match marks[dep.index()] {
                    Mark::Unvisited => {
                        marks[dep.index()] = Mark::InProgress;
                        stack.push(Frame {
                            node: dep,
                            upstream: self.upstream(dep),
                            next: 0,
                        });
                    }
                    Mark::InProgress => {
                        return Err(CoreError::CycleDependency {
                            cycle: self.cycle_path(&stack, dep),
                        });
                    }
                    Mark::Done => {}
                }
            }
        }

        Ok(order)
    }

    /// Render the cycle closed by `repeat` as `A -> B -> A`.
    fn cycle_path(&self, stack: &[Frame], repeat: NodeIndex) -> String {
        let from = stack.iter().position(|f| f.node == repeat).unwrap_or(0);
        let mut path: Vec<&str> = stack[from..]
            .iter()
            .map(|f| self.graph[f.node].as_str())
            .collect();
        path.push(self.graph[repeat].as_str());
        path.join(" -> ")
    }

    /// Type names in insertion order.
    pub fn topological_order(&self) -> CoreResult<Vec<TypeName>> {
        Ok(self
            .insertion_order()?
            .into_iter()
            .map(|idx| self.graph[idx].clone())
            .collect())
    }
}

#[cfg(test)]
#[path = "dag_test.rs"]
mod tests;
