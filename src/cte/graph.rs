//! CTE dependency graph
//!
//! Nodes are CTE names (case-folded); edges point from a CTE to the CTEs it
//! reads. Insertion order is preserved so topological output is
//! deterministic: among ready nodes, source order wins.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::CteError;

#[derive(Debug, Default)]
pub(crate) struct DependencyGraph {
    /// node → direct dependencies, in discovery order
    edges: IndexMap<SmolStr, Vec<SmolStr>>,
}

impl DependencyGraph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_node(&mut self, name: SmolStr) {
        self.edges.entry(name).or_default();
    }

    pub(crate) fn add_dependency(&mut self, from: &str, to: SmolStr) {
        let deps = self.edges.entry(SmolStr::new(from)).or_default();
        if !deps.contains(&to) {
            deps.push(to);
        }
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    pub(crate) fn dependencies_of(&self, name: &str) -> &[SmolStr] {
        self.edges.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn dependents_of(&self, name: &str) -> Vec<SmolStr> {
        self.edges
            .iter()
            .filter(|(node, deps)| node.as_str() != name && deps.iter().any(|d| d == name))
            .map(|(node, _)| node.clone())
            .collect()
    }

    /// Does the node read itself?
    pub(crate) fn is_self_referential(&self, name: &str) -> bool {
        self.dependencies_of(name).iter().any(|d| d == name)
    }

    /// Names the node transitively depends on, in topological order,
    /// excluding the node itself.
    pub(crate) fn transitive_dependencies(&self, name: &str) -> Vec<SmolStr> {
        let mut seen = FxHashSet::default();
        let mut ordered = Vec::new();
        self.visit_deps(name, name, &mut seen, &mut ordered);
        ordered
    }

    fn visit_deps(
        &self,
        root: &str,
        name: &str,
        seen: &mut FxHashSet<SmolStr>,
        ordered: &mut Vec<SmolStr>,
    ) {
        for dep in self.dependencies_of(name) {
            if dep.as_str() == root || !seen.insert(dep.clone()) {
                continue;
            }
            self.visit_deps(root, dep, seen, ordered);
            ordered.push(dep.clone());
        }
    }

    /// All nodes in topological order (dependencies first). Self-loops are
    /// permitted (recursive CTEs); any other cycle is an error.
    pub(crate) fn topological_order(&self) -> Result<Vec<SmolStr>, CteError> {
        let mut remaining: IndexMap<&SmolStr, Vec<&SmolStr>> = self
            .edges
            .iter()
            .map(|(node, deps)| {
                let deps = deps
                    .iter()
                    .filter(|d| *d != node && self.edges.contains_key(d.as_str()))
                    .collect();
                (node, deps)
            })
            .collect();

        let mut ordered = Vec::with_capacity(remaining.len());
        while !remaining.is_empty() {
            let ready = remaining
                .iter()
                .find(|(_, deps)| {
                    deps.iter()
                        .all(|d| ordered.iter().any(|o: &SmolStr| o == *d))
                })
                .map(|(node, _)| (*node).clone());
            match ready {
                Some(node) => {
                    remaining.shift_remove(&node);
                    ordered.push(node);
                }
                None => {
                    let cycle = remaining.keys().map(|n| n.to_string()).collect();
                    return Err(CteError::CyclicDependency { names: cycle });
                }
            }
        }
        Ok(ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &[&str])]) -> DependencyGraph {
        let mut g = DependencyGraph::new();
        for (node, deps) in edges {
            g.add_node(SmolStr::new(node));
            for dep in *deps {
                g.add_dependency(node, SmolStr::new(dep));
            }
        }
        g
    }

    #[test]
    fn topo_puts_dependencies_first() {
        let g = graph(&[("b", &["a"]), ("a", &[]), ("c", &["b", "a"])]);
        let order = g.topological_order().unwrap();
        let pos = |n: &str| order.iter().position(|o| o == n).unwrap();
        assert!(pos("a") < pos("b"));
        assert!(pos("b") < pos("c"));
    }

    #[test]
    fn topo_is_deterministic_for_independent_nodes() {
        let g = graph(&[("z", &[]), ("a", &[]), ("m", &[])]);
        let order = g.topological_order().unwrap();
        assert_eq!(order, vec!["z", "a", "m"]);
    }

    #[test]
    fn self_loop_is_not_a_cycle() {
        let g = graph(&[("r", &["r"])]);
        assert!(g.is_self_referential("r"));
        assert_eq!(g.topological_order().unwrap(), vec!["r"]);
    }

    #[test]
    fn mutual_cycle_errors() {
        let g = graph(&[("a", &["b"]), ("b", &["a"])]);
        let err = g.topological_order().unwrap_err();
        assert!(matches!(err, CteError::CyclicDependency { .. }));
    }

    #[test]
    fn transitive_dependencies_are_ordered() {
        let g = graph(&[("a", &[]), ("b", &["a"]), ("c", &["b"])]);
        assert_eq!(g.transitive_dependencies("c"), vec!["a", "b"]);
    }

    #[test]
    fn dependents_lists_direct_readers() {
        let g = graph(&[("a", &[]), ("b", &["a"]), ("c", &["a"])]);
        assert_eq!(g.dependents_of("a"), vec!["b", "c"]);
    }
}
