// This file builds the unbranching-path view of an AssemblyGraph: maximal chains of edges whose
// interior nodes all have one edge in and one edge out. The haplotype-simplification passes work
// on this view rather than on raw edges.

// Copyright 2024 Ryan Wick (rrwick@gmail.com)
// https://github.com/rrwick/Haplopurge

// This file is part of Haplopurge. Haplopurge is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version. Haplopurge
// is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the
// implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General
// Public License for more details. You should have received a copy of the GNU General Public
// License along with Haplopurge. If not, see <http://www.gnu.org/licenses/>.

use std::cell::RefCell;
use std::rc::Rc;

use fxhash::FxHashSet;

use crate::assembly_graph::{AssemblyGraph, GraphEdge, GraphNode};


// Unbranching paths are extracted in strand pairs and given fresh signed ids: the path discovered
// first gets +n and its reverse-complement partner gets -n. The ids are only meaningful within
// one extraction pass (the passes re-extract after every structural change).
pub struct UnbranchingPath {
    pub id: i32,
    pub edges: Vec<Rc<RefCell<GraphEdge>>>,
    pub is_looped: bool,
}

impl UnbranchingPath {
    pub fn strand(&self) -> bool {
        self.id > 0
    }

    pub fn first_edge(&self) -> Rc<RefCell<GraphEdge>> {
        Rc::clone(self.edges.first().unwrap())
    }

    pub fn last_edge(&self) -> Rc<RefCell<GraphEdge>> {
        Rc::clone(self.edges.last().unwrap())
    }

    pub fn node_left(&self) -> Rc<RefCell<GraphNode>> {
        self.edges.first().unwrap().borrow().node_left.clone()
    }

    pub fn node_right(&self) -> Rc<RefCell<GraphNode>> {
        self.edges.last().unwrap().borrow().node_right.clone()
    }

    pub fn length(&self) -> u32 {
        self.edges.iter().map(|e| e.borrow().length).sum()
    }

    pub fn mean_coverage(&self) -> f64 {
        // Length-weighted mean of the member edges' coverages.
        let total_length: u64 = self.edges.iter().map(|e| e.borrow().length as u64).sum();
        if total_length == 0 {
            return 0.0;
        }
        let coverage_sum: f64 = self.edges.iter()
            .map(|e| e.borrow().mean_coverage * e.borrow().length as f64).sum();
        coverage_sum / total_length as f64
    }
}


pub fn extract_unbranching_paths(graph: &AssemblyGraph) -> Vec<UnbranchingPath> {
    // Returns unbranching paths covering every edge exactly once per strand. A looped path is one
    // that starts and ends at the same node (a chain returning to its junction, or an isolated
    // circular component).
    let mut paths = Vec::new();
    let mut visited: FxHashSet<i32> = FxHashSet::default();
    let mut next_path_id: i32 = 1;
    for edge_rc in &graph.edges {
        if visited.contains(&edge_rc.borrow().id) {
            continue;
        }
        let chain = walk_chain(graph, edge_rc);
        let complement_chain: Vec<_> = chain.iter().rev()
            .map(|e| graph.complement_edge(e)).collect();
        for e in chain.iter().chain(complement_chain.iter()) {
            visited.insert(e.borrow().id);
        }
        let left = chain.first().unwrap().borrow().node_left.clone();
        let right = chain.last().unwrap().borrow().node_right.clone();
        let is_looped = Rc::ptr_eq(&left, &right);

        // A palindromic chain is its own reverse complement and gets only one entry.
        let self_complementary = chain.iter().zip(&complement_chain)
            .all(|(a, b)| Rc::ptr_eq(a, b));
        paths.push(UnbranchingPath { id: next_path_id, edges: chain, is_looped });
        if !self_complementary {
            paths.push(UnbranchingPath { id: -next_path_id, edges: complement_chain, is_looped });
        }
        next_path_id += 1;
    }
    paths
}


fn walk_chain(graph: &AssemblyGraph,
              start: &Rc<RefCell<GraphEdge>>) -> Vec<Rc<RefCell<GraphEdge>>> {
    let mut chain = vec![Rc::clone(start)];
    let mut chain_ids: FxHashSet<i32> = FxHashSet::default();
    chain_ids.insert(start.borrow().id);

    // Extend the chain forward through unbranching junctions.
    loop {
        let cur = Rc::clone(chain.last().unwrap());
        let right = cur.borrow().node_right.clone();
        let next = {
            let node = right.borrow();
            if node.in_edges.len() != 1 || node.out_edges.len() != 1 { break; }
            Rc::clone(&node.out_edges[0])
        };
        if Rc::ptr_eq(&next, &graph.complement_edge(&cur)) { break; }  // hairpin: don't cross strands
        let next_id = next.borrow().id;
        if chain_ids.contains(&next_id) { break; }  // closed a cycle
        chain.push(next);
        chain_ids.insert(next_id);
    }

    // Then extend it backward.
    loop {
        let cur = Rc::clone(chain.first().unwrap());
        let left = cur.borrow().node_left.clone();
        let prev = {
            let node = left.borrow();
            if node.in_edges.len() != 1 || node.out_edges.len() != 1 { break; }
            Rc::clone(&node.in_edges[0])
        };
        if Rc::ptr_eq(&prev, &graph.complement_edge(&cur)) { break; }
        let prev_id = prev.borrow().id;
        if chain_ids.contains(&prev_id) { break; }
        chain.insert(0, prev);
        chain_ids.insert(prev_id);
    }
    chain
}


#[cfg(test)]
mod tests {
    use crate::test_gfa::*;
    use crate::tests::assert_almost_eq;
    use super::*;

    fn path_edge_ids(path: &UnbranchingPath) -> Vec<i32> {
        path.edges.iter().map(|e| e.borrow().id).collect()
    }

    #[test]
    fn test_extract_bulge() {
        let graph = AssemblyGraph::from_gfa_lines(&get_test_gfa_bulge());
        let paths = extract_unbranching_paths(&graph);
        assert_eq!(paths.len(), 8);
        assert_eq!(paths.iter().filter(|p| p.strand()).count(), 4);
        assert!(paths.iter().all(|p| !p.is_looped));
        assert!(paths.iter().all(|p| p.edges.len() == 1));
    }

    #[test]
    fn test_extract_merges_chains() {
        let graph = AssemblyGraph::from_gfa_lines(&get_test_gfa_chain());
        let paths = extract_unbranching_paths(&graph);
        assert_eq!(paths.len(), 2);
        assert_eq!(path_edge_ids(&paths[0]), vec![1, 2]);
        assert_eq!(path_edge_ids(&paths[1]), vec![-2, -1]);
        assert_eq!(paths[0].length(), 400);
        assert_almost_eq(paths[0].mean_coverage(), 17.5, 1e-9);  // (100*10 + 300*20) / 400
        assert_almost_eq(paths[1].mean_coverage(), 17.5, 1e-9);
    }

    #[test]
    fn test_extract_complex() {
        let graph = AssemblyGraph::from_gfa_lines(&get_test_gfa_complex());
        let paths = extract_unbranching_paths(&graph);
        assert_eq!(paths.len(), 8);

        let start_path = paths.iter().find(|p| path_edge_ids(p) == vec![9, 10]).unwrap();
        assert_eq!(start_path.length(), 5000);
        assert_eq!(start_path.node_right().borrow().out_edges.len(), 2);

        let exit_path = paths.iter().find(|p| path_edge_ids(p) == vec![13, 14]).unwrap();
        assert_eq!(exit_path.length(), 5000);
        assert_almost_eq(exit_path.mean_coverage(), 30.0, 1e-9);
    }

    #[test]
    fn test_extract_loop() {
        let graph = AssemblyGraph::from_gfa_lines(&get_test_gfa_loop(20.0));
        let paths = extract_unbranching_paths(&graph);
        assert_eq!(paths.len(), 6);

        let looped: Vec<_> = paths.iter().filter(|p| p.is_looped).collect();
        assert_eq!(looped.len(), 2);
        for lp in &looped {
            assert_eq!(lp.edges.len(), 1);
            assert!(Rc::ptr_eq(&lp.node_left(), &lp.node_right()));
        }
    }

    #[test]
    fn test_extract_circular_component() {
        let graph = AssemblyGraph::from_gfa_lines(&get_test_gfa_circle());
        let paths = extract_unbranching_paths(&graph);
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.is_looped));
        assert_eq!(paths[0].edges.len(), 2);
        assert_eq!(paths[0].length(), 400);
    }

    #[test]
    fn test_strand_pairing() {
        let graph = AssemblyGraph::from_gfa_lines(&get_test_gfa_complex());
        let paths = extract_unbranching_paths(&graph);
        for path in paths.iter().filter(|p| p.strand()) {
            let partner = paths.iter().find(|p| p.id == -path.id).unwrap();
            let expected: Vec<i32> = path_edge_ids(path).iter().rev().map(|id| -id).collect();
            assert_eq!(path_edge_ids(partner), expected);
            assert_eq!(partner.length(), path.length());
            assert_almost_eq(partner.mean_coverage(), path.mean_coverage(), 1e-9);
        }
    }
}
