//! Distribution and wiring engine
//!
//! Walks the dependency graph in insertion order. For every node it copies
//! identifiers (and, when declared, whole records) from already inserted
//! dependencies into the node's values, fills the remaining zero fields and
//! inserts the node's values in one batch.

use crate::batch::RecordBatch;
use crate::error::FactoryResult;
use crate::synth::{BackendOverrides, Synthesizer};
use sg_core::{DependencyGraph, DependencyRef, GraphGroup, Identifier, TypeNode};
use sg_db::{Database, RowBox};
use std::any::Any;

/// A boxed value group as stored in graph nodes.
pub type Batch<'a> = Box<dyn RecordBatch + 'a>;

/// What a dependent needs from one inserted dependency value.
struct Parent {
    id: Option<Identifier>,
    record: Option<Box<dyn Any + Send>>,
}

/// Insert every group in dependency order, returning the root node's groups.
///
/// The graph's cycle check runs before anything is written, so a cyclic
/// build performs no inserts.
pub async fn resolve<'a>(
    groups: Vec<GraphGroup<Batch<'a>>>,
    db: &dyn Database,
    synth: &mut dyn Synthesizer,
) -> FactoryResult<Vec<Batch<'a>>> {
    let mut graph = DependencyGraph::build(groups)?;
    let order = graph.insertion_order()?;
    log::debug!(
        "Resolved insertion order: {}",
        order
            .iter()
            .map(|&idx| graph.node(idx).type_name().as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut source = BackendOverrides { db, inner: synth };
    for idx in order {
        let node = graph.node(idx);
        let dependencies = node.dependencies().to_vec();
        let parents = dependencies
            .iter()
            .map(|dep| gather_parents(graph.node(dep.source), dep))
            .collect::<FactoryResult<Vec<_>>>()?;

        let node = graph.node_mut(idx);
        wire_node(node, &dependencies, &parents, &mut source)?;

        let storage = node.storage_name().clone();
        let type_name = node.type_name().clone();
        let mut rows: Vec<RowBox<'_>> = node
            .values_mut()
            .iter_mut()
            .flat_map(|batch| batch.rows())
            .collect();
        if rows.is_empty() {
            log::debug!("No {} values to insert", type_name);
            continue;
        }
        db.insert_many(&storage, &mut rows).await?;
        log::debug!("Inserted {} {} values into {}", rows.len(), type_name, storage);
    }

    let Some(root) = graph.root() else {
        return Ok(Vec::new());
    };
    let mut nodes = graph.into_nodes();
    Ok(nodes.swap_remove(root.index()).into_values())
}

fn gather_parents(
    source: &TypeNode<Batch<'_>>,
    dep: &DependencyRef,
) -> FactoryResult<Vec<Parent>> {
    let mut parents = Vec::new();
    for batch in source.values() {
        for index in 0..batch.len() {
            parents.push(Parent {
                id: batch.identifier(index)?,
                record: dep
                    .dependency
                    .foreign_value_field
                    .map(|_| batch.clone_record(index)),
            });
        }
    }
    Ok(parents)
}

/// Wire and synthesize every value of `node`.
///
/// Value `i` takes dependency value `i`; once a dependency runs out, the
/// last dependency value used for that field keeps being reused.
fn wire_node(
    node: &mut TypeNode<Batch<'_>>,
    dependencies: &[DependencyRef],
    parents: &[Vec<Parent>],
    synth: &mut dyn Synthesizer,
) -> FactoryResult<()> {
    let omitted = node.omitted_fields().clone();
    let mut last_seen: Vec<Option<usize>> = vec![None; dependencies.len()];
    let mut position = 0;

    for batch in node.values_mut() {
        for index in 0..batch.len() {
            for (d, dep) in dependencies.iter().enumerate() {
                if position < parents[d].len() {
                    last_seen[d] = Some(position);
                }
                let Some(selected) = last_seen[d] else {
                    continue;
                };
                let parent = &parents[d][selected];
                let field = &dep.dependency;

                let Some(id) = parent.id else {
                    log::warn!(
                        "{} value {} has no identifier after insertion; leaving {}.{} unset",
                        field.target_type,
                        selected,
                        batch.type_name(),
                        field.foreign_key_field
                    );
                    continue;
                };
                batch.set_foreign_key(index, field.foreign_key_field, id)?;

                if let (Some(value_field), Some(record)) = (field.foreign_value_field, &parent.record) {
                    batch.set_foreign_value(
                        index,
                        value_field,
                        &**record,
                        &field.target_type,
                    )?;
                }
            }
            batch.synthesize(index, synth, &omitted)?;
            position += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "wiring_test.rs"]
mod tests;
