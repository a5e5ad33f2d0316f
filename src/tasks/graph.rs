//! Task reference graph utilities.

use std::collections::HashMap;

/// Names that cannot be ordered because they sit on, or depend on, a
/// reference cycle. Uses Kahn's algorithm.
///
/// `nodes` pairs each task name with the names it references. References to
/// names not in `nodes` are ignored. The result is sorted; an empty result
/// means the graph is acyclic.
#[must_use]
pub fn unresolved<'a>(nodes: &[(&'a str, &[&'a str])]) -> Vec<&'a str> {
    let name_to_idx: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (*name, i))
        .collect();

    let mut in_degree: Vec<usize> = nodes
        .iter()
        .map(|(_, refs)| {
            refs.iter()
                .filter(|r| name_to_idx.contains_key(*r))
                .count()
        })
        .collect();

    let mut reverse_refs: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (i, (_, refs)) in nodes.iter().enumerate() {
        for r in *refs {
            if let Some(&ref_idx) = name_to_idx.get(r)
                && let Some(rr) = reverse_refs.get_mut(ref_idx)
            {
                rr.push(i);
            }
        }
    }

    let mut queue: Vec<usize> = in_degree
        .iter()
        .enumerate()
        .filter_map(|(i, &d)| if d == 0 { Some(i) } else { None })
        .collect();

    while let Some(idx) = queue.pop() {
        if let Some(dependents) = reverse_refs.get(idx) {
            for &dep in dependents {
                if let Some(count) = in_degree.get_mut(dep) {
                    *count -= 1;
                    if *count == 0 {
                        queue.push(dep);
                    }
                }
            }
        }
    }

    let mut stuck: Vec<&str> = nodes
        .iter()
        .zip(&in_degree)
        .filter(|(_, d)| **d > 0)
        .map(|((name, _), _)| *name)
        .collect();
    stuck.sort_unstable();
    stuck
}
