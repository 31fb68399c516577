use std::collections::{BTreeMap, BTreeSet};

use crate::graph::node::DerivedParameter;
use crate::prelude::{DeriveError, DeriveResult};

/// Explicit set of derivable parameters and the order they run in.
///
/// Nodes are grouped into waves: a node sits one wave after the latest node
/// whose output it reads, so nodes within a wave never depend on each other.
pub struct NodeRegistry {
    nodes: Vec<Box<dyn DerivedParameter>>,
    waves: Vec<Vec<usize>>,
}

impl NodeRegistry {
    pub fn new(nodes: Vec<Box<dyn DerivedParameter>>) -> DeriveResult<Self> {
        let mut index = BTreeMap::new();
        for (idx, node) in nodes.iter().enumerate() {
            if index.insert(node.name(), idx).is_some() {
                return Err(DeriveError::DuplicateNode(node.name().to_string()));
            }
        }
        let waves = plan_waves(&nodes, &index)?;
        Ok(Self { nodes, waves })
    }

    /// Adds a node and re-plans.
    pub fn register(self, node: Box<dyn DerivedParameter>) -> DeriveResult<Self> {
        let mut nodes = self.nodes;
        nodes.push(node);
        Self::new(nodes)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.nodes.iter().map(|node| node.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn DerivedParameter> {
        self.nodes
            .iter()
            .find(|node| node.name() == name)
            .map(|node| node.as_ref())
    }

    pub(crate) fn node(&self, idx: usize) -> &dyn DerivedParameter {
        self.nodes[idx].as_ref()
    }

    pub(crate) fn wave_indices(&self) -> &[Vec<usize>] {
        &self.waves
    }

    /// Node names per wave, in execution order.
    pub fn waves(&self) -> Vec<Vec<&'static str>> {
        self.waves
            .iter()
            .map(|wave| wave.iter().map(|&idx| self.nodes[idx].name()).collect())
            .collect()
    }
}

fn plan_waves(
    nodes: &[Box<dyn DerivedParameter>],
    index: &BTreeMap<&'static str, usize>,
) -> DeriveResult<Vec<Vec<usize>>> {
    // upstream[n] holds the nodes whose output n reads.
    let upstream: Vec<BTreeSet<usize>> = nodes
        .iter()
        .map(|node| {
            node.dependencies()
                .all()
                .filter_map(|name| index.get(name).copied())
                .collect()
        })
        .collect();

    let mut indegree: Vec<usize> = upstream.iter().map(BTreeSet::len).collect();
    let mut downstream = vec![Vec::new(); nodes.len()];
    for (node, deps) in upstream.iter().enumerate() {
        for &dep in deps {
            downstream[dep].push(node);
        }
    }

    let mut waves = Vec::new();
    let mut ready: Vec<usize> = (0..nodes.len()).filter(|&n| indegree[n] == 0).collect();
    let mut placed = 0;
    while !ready.is_empty() {
        let mut next = Vec::new();
        for &node in &ready {
            for &child in &downstream[node] {
                indegree[child] -= 1;
                if indegree[child] == 0 {
                    next.push(child);
                }
            }
        }
        placed += ready.len();
        next.sort_unstable();
        waves.push(std::mem::replace(&mut ready, next));
    }

    if placed < nodes.len() {
        let stuck = (0..nodes.len())
            .filter(|&n| indegree[n] > 0)
            .map(|n| nodes[n].name().to_string())
            .collect();
        return Err(DeriveError::DependencyCycle(stuck));
    }
    Ok(waves)
}
