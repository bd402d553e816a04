// This file contains the haplotype-simplification passes: functions which find structures in the
// assembly graph caused by heterozygosity (alternative haplotypes or strain variants) and either
// mask them (flag the edges) or collapse them (rewire the graph so only the consensus remains).

// Copyright 2024 Ryan Wick (rrwick@gmail.com)
// https://github.com/rrwick/Haplopurge

// This file is part of Haplopurge. Haplopurge is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version. Haplopurge
// is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the
// implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General
// Public License for more details. You should have received a copy of the GNU General Public
// License along with Haplopurge. If not, see <http://www.gnu.org/licenses/>.

use std::collections::HashSet;
use std::rc::Rc;

use fxhash::FxHashSet;

use crate::alignment::{build_alignment_index, GraphAlignment, ReadAligner};
use crate::assembly_graph::{vec_remove, AssemblyGraph};
use crate::config::Config;
use crate::path_extraction::{extract_unbranching_paths, UnbranchingPath};


const MAX_COV_VAR: f64 = 1.5;
const COV_MULT: f64 = 1.5;


// This function collapses simple bubbles caused by alternative haplotypes or strains. A
// candidate bubble has:
// 1. one entrance, two parallel branches and one exit: -<>-
// 2. each branch no longer than the configured maximum bubble length
// 3. combined branch coverage roughly equal to (or less than) the entrance/exit coverage
// 4. each branch shorter than both the entrance and the exit, which distinguishes a bubble from
//    two consecutive repeats of multiplicity two
// No global coverage assumptions are used, only the local neighbourhood.
//
// In masking mode the branches of each bubble are flagged as alternative-haplotype and the count
// of newly masked bubbles is returned. In apply mode the weaker branch is excised (detached onto
// fresh nodes), its coverage is folded into the stronger branch, and the count of excised bubbles
// is returned (each strand pair counted once).
pub fn collapse_heterozygous_bulges(graph: &mut AssemblyGraph, aligner: &mut ReadAligner,
                                    config: &Config, remove_alternatives: bool) -> usize {
    let max_bubble_len = config.get("max_bubble_length") as u32;
    let paths = extract_unbranching_paths(graph);

    let mut to_separate: HashSet<i32> = HashSet::new();
    let mut num_masked = 0;
    for path in &paths {
        if path.is_looped { continue; }
        let left = path.node_left();
        let right = path.node_right();

        let two_paths: Vec<&UnbranchingPath> = paths.iter()
            .filter(|cand| Rc::ptr_eq(&cand.node_left(), &left) &&
                           Rc::ptr_eq(&cand.node_right(), &right))
            .collect();

        // Make sure the structure is okay.
        if two_paths.len() != 2 { continue; }
        if two_paths[0].id == -two_paths[1].id { continue; }
        if to_separate.contains(&two_paths[0].id) ||
            to_separate.contains(&two_paths[1].id) { continue; }
        {
            let l = left.borrow();
            let r = right.borrow();
            if l.in_edges.len() != 1 || l.out_edges.len() != 2 ||
                r.in_edges.len() != 2 || r.out_edges.len() != 1 { continue; }
        }

        let entrance = paths.iter().find(|cand| Rc::ptr_eq(&cand.node_right(), &left));
        let exit = paths.iter().find(|cand| Rc::ptr_eq(&cand.node_left(), &right));
        let (entrance, exit) = match (entrance, exit) {
            (Some(entrance), Some(exit)) => (entrance, exit),
            _ => continue,
        };

        // Sanity check for the maximum bubble size.
        if two_paths[0].length().max(two_paths[1].length()) > max_bubble_len { continue; }

        // Coverage requirement: the sum over the two branches should roughly equal the entrance
        // and exit coverages, or less.
        let cov_sum = two_paths[0].mean_coverage() + two_paths[1].mean_coverage();
        if cov_sum > (entrance.mean_coverage() * MAX_COV_VAR)
                         .min(exit.mean_coverage() * MAX_COV_VAR) { continue; }

        // Require the branches to be shorter than the entrance or exit, to distinguish a bubble
        // from two consecutive repeats of multiplicity two.
        if two_paths[0].length().max(two_paths[1].length()) >
            entrance.length().max(exit.length()) { continue; }

        // The weaker branch is the one that gets collapsed into the stronger.
        let (weaker, stronger) = if two_paths[0].mean_coverage() > two_paths[1].mean_coverage() {
            (two_paths[1], two_paths[0])
        } else {
            (two_paths[0], two_paths[1])
        };

        if !weaker.first_edge().borrow().alt_haplotype ||
            !stronger.first_edge().borrow().alt_haplotype {
            num_masked += 1;
        }
        for branch in [weaker, stronger] {
            for edge in &branch.edges {
                graph.set_alt_haplotype(edge, true);
            }
        }

        if remove_alternatives {
            to_separate.insert(weaker.id);
            to_separate.insert(-weaker.id);
            let weaker_coverage = weaker.mean_coverage();
            for edge in &stronger.edges {
                graph.add_coverage(edge, weaker_coverage);
                graph.set_alt_haplotype(edge, false);  // the consensus branch is not alternative
            }
        }
    }

    if remove_alternatives {
        for path in &paths {
            if to_separate.contains(&path.id) {
                separate_path(graph, path);
            }
        }
        eprintln!("removed {} heterozygous bulges", to_separate.len() / 2);
        aligner.update_alignments(graph);
        to_separate.len() / 2
    } else {
        eprintln!("masked {} heterozygous bulges", num_masked);
        num_masked
    }
}


// This function collapses simple heterozygous loops: a single self-returning path on a node that
// also carries one entrance and one exit. A candidate loop:
// 1. is not self-complementary
// 2. sits on a junction with exactly two edges in and two edges out
// 3. is no longer than the entrance and exit
// 4. has coverage roughly equal to (or less than) the entrance coverage
// A masked loop is flagged as alternative-haplotype. In apply mode a well-supported loop is
// unrolled (moved out of line so it appears once in a linear traversal) while a poorly-supported
// one is detached entirely, and the count of collapsed loops is returned (strand pairs counted
// once).
pub fn collapse_heterozygous_loops(graph: &mut AssemblyGraph, aligner: &mut ReadAligner,
                                   remove_alternatives: bool) -> usize {
    let paths = extract_unbranching_paths(graph);

    let mut to_unroll: HashSet<i32> = HashSet::new();
    let mut to_remove: HashSet<i32> = HashSet::new();
    let mut num_masked = 0;
    for looped_path in &paths {
        if !looped_path.strand() { continue; }
        if !looped_path.is_looped { continue; }
        if looped_path.first_edge().borrow().self_complement { continue; }

        let node = looped_path.node_left();
        {
            let n = node.borrow();
            if n.in_edges.len() != 2 || n.out_edges.len() != 2 { continue; }
        }

        let entrance = paths.iter().find(|cand| Rc::ptr_eq(&cand.node_right(), &node) &&
                                                cand.id != looped_path.id);
        let exit = paths.iter().find(|cand| Rc::ptr_eq(&cand.node_left(), &node) &&
                                            cand.id != looped_path.id);
        let (entrance, exit) = match (entrance, exit) {
            (Some(entrance), Some(exit)) => (entrance, exit),
            _ => continue,
        };

        if entrance.is_looped { continue; }
        if entrance.id == -exit.id { continue; }

        // Loop coverage should be roughly equal to the neighbourhood or less.
        // TODO: the exit coverage plays no part in this bound (entrance appears twice) - is that
        //       intended?
        if looped_path.mean_coverage() >
            COV_MULT * entrance.mean_coverage().min(entrance.mean_coverage()) { continue; }

        // The loop should not be longer than the other branches.
        if looped_path.length() > entrance.length().max(exit.length()) { continue; }

        if !looped_path.first_edge().borrow().alt_haplotype {
            num_masked += 1;
        }
        for edge in &looped_path.edges {
            graph.set_alt_haplotype(edge, true);
        }

        // Either remove or unroll the loop, depending on its coverage.
        if looped_path.mean_coverage() <
            (entrance.mean_coverage() + exit.mean_coverage()) / 4.0 {
            to_remove.insert(looped_path.id);
            to_remove.insert(-looped_path.id);
        } else {
            to_unroll.insert(looped_path.id);
            to_unroll.insert(-looped_path.id);
        }
    }

    if remove_alternatives {
        for path in &paths {
            if to_unroll.contains(&path.id) {
                unroll_loop(graph, path);
            }
            if to_remove.contains(&path.id) {
                separate_path(graph, path);
            }
        }
        eprintln!("removed {} heterozygous loops", (to_remove.len() + to_unroll.len()) / 2);
        aligner.update_alignments(graph);
        (to_remove.len() + to_unroll.len()) / 2
    } else {
        eprintln!("masked {} heterozygous loops", num_masked);
        num_masked
    }
}


fn separate_path(graph: &mut AssemblyGraph, path: &UnbranchingPath) {
    // Detaches a path from the graph by rewiring its two endpoint edges onto fresh nodes. The
    // path becomes a dangling chain with no entrance or exit; nothing is deleted. Each strand of
    // a separated pair goes through here on its own and gets its own fresh nodes.
    let new_left = graph.add_node();
    let new_right = graph.add_node();
    let first = path.first_edge();
    let last = path.last_edge();
    let old_left = first.borrow().node_left.clone();
    let old_right = last.borrow().node_right.clone();
    vec_remove(&mut old_left.borrow_mut().out_edges, &first);
    vec_remove(&mut old_right.borrow_mut().in_edges, &last);
    first.borrow_mut().node_left = Rc::clone(&new_left);
    last.borrow_mut().node_right = Rc::clone(&new_right);
    new_left.borrow_mut().out_edges.push(first);
    new_right.borrow_mut().in_edges.push(last);
}


fn unroll_loop(graph: &mut AssemblyGraph, path: &UnbranchingPath) {
    // Moves a loop out of line: a fresh node is inserted so the entrance flows into the loop,
    // through it once, and back to the junction where the exit continues.
    let new_node = graph.add_node();
    let junction = path.node_left();
    let first = path.first_edge();
    let last = path.last_edge();
    let prev_edge = {
        // The junction has two incoming edges: the loop's own last edge and the entrance.
        let n = junction.borrow();
        if Rc::ptr_eq(&n.in_edges[0], &last) {
            Rc::clone(&n.in_edges[1])
        } else {
            Rc::clone(&n.in_edges[0])
        }
    };
    vec_remove(&mut junction.borrow_mut().out_edges, &first);
    vec_remove(&mut junction.borrow_mut().in_edges, &prev_edge);
    first.borrow_mut().node_left = Rc::clone(&new_node);
    new_node.borrow_mut().out_edges.push(first);
    prev_edge.borrow_mut().node_right = Rc::clone(&new_node);
    new_node.borrow_mut().in_edges.push(prev_edge);
}


// A candidate path through a complex bubble, together with the number of read alignments that
// support it.
#[derive(Clone, Debug)]
pub struct ScoredPath {
    pub path: GraphAlignment,
    pub score: usize,
}


// A multi-branch bubble found from read-alignment evidence: the edge where the branches diverge,
// the edge where they converge again, and the supported branch paths between the two.
#[derive(Debug)]
pub struct ComplexBubble {
    pub start_edge: i32,
    pub end_edge: i32,
    pub branches: Vec<ScoredPath>,
}


// This function reveals complex heterogeneities in the graph (more than just two alternative
// branches) using read paths. For each edge that opens a fork, the read alignments crossing it
// are grouped by prefix containment; well-supported groups that later reconverge on a shared
// edge describe a multi-branch bubble. The graph is not modified - the detected bubbles are
// returned for downstream use.
pub fn find_complex_haplotypes(graph: &AssemblyGraph, aligner: &ReadAligner) -> Vec<ComplexBubble> {
    let alignments = aligner.get_alignments();
    let alignment_index = build_alignment_index(alignments);

    let paths = extract_unbranching_paths(graph);
    let mut looped_edges: FxHashSet<i32> = FxHashSet::default();
    for path in &paths {
        if path.is_looped {
            for edge in &path.edges {
                looped_edges.insert(edge.borrow().id);
            }
        }
    }

    let mut bubbles = Vec::new();
    for start_path in &paths {
        if !start_path.strand() { continue; }
        if start_path.node_right().borrow().out_edges.len() < 2 { continue; }
        let start_edge = start_path.last_edge().borrow().id;
        if looped_edges.contains(&start_edge) { continue; }

        // First, extract the alignment paths moving out from the current edge and sort them from
        // longest to shortest read span.
        let mut out_paths: Vec<GraphAlignment> = Vec::new();
        if let Some(crossing) = alignment_index.get(&start_edge) {
            for &aln_id in crossing {
                let alignment = &alignments[aln_id];
                if let Some(i) = alignment.iter().position(|step| step.edge_id == start_edge) {
                    out_paths.push(alignment[i..].to_vec());
                }
            }
        }
        if out_paths.is_empty() { continue; }
        out_paths.sort_by_key(|p| {
            std::cmp::Reverse(p.last().unwrap().cur_end as i64 - p.first().unwrap().cur_end as i64)
        });

        // Now group the paths by containment. Each group is represented by its longest path (the
        // one that seeded it) and scored by the number of paths it contains.
        let min_score = std::cmp::max(2, out_paths.len() / 10);
        let mut path_groups: Vec<ScoredPath> = Vec::new();
        for target in &out_paths {
            let contained_in = path_groups.iter().position(|group| {
                let prefix_len = target.len().min(group.path.len());
                target[..prefix_len].iter().zip(&group.path[..prefix_len])
                    .all(|(a, b)| a.edge_id == b.edge_id)
            });
            match contained_in {
                Some(group_id) => path_groups[group_id].score += 1,
                None => path_groups.push(ScoredPath { path: target.clone(), score: 1 }),
            }
        }
        path_groups.retain(|group| group.score >= min_score);
        if path_groups.len() < 2 { continue; }

        // Mark edges that appear more than once within a group as repeats.
        let mut repeats: FxHashSet<i32> = FxHashSet::default();
        for group in &path_groups {
            let mut seen: FxHashSet<i32> = FxHashSet::default();
            for step in &group.path {
                if !seen.insert(step.edge_id) {
                    repeats.insert(step.edge_id);
                }
            }
        }

        // Set the longest path as the reference and find the edges where the other groups
        // converge with it.
        let ref_path = path_groups[0].path.clone();
        let mut convergence_edges: FxHashSet<i32> = ref_path.iter()
            .map(|step| step.edge_id)
            .filter(|id| !looped_edges.contains(id) && !repeats.contains(id))
            .collect();
        for group in &path_groups[1..] {
            let group_edges: FxHashSet<i32> = group.path.iter().map(|step| step.edge_id).collect();
            convergence_edges.retain(|id| group_edges.contains(id));
        }

        // Get the bubble start (the paths might stay convergent for a bit).
        let mut bubble_start_id = 0;
        loop {
            let next = bubble_start_id + 1;
            if next >= ref_path.len() { break; }
            let ref_edge = ref_path[next].edge_id;
            if !convergence_edges.contains(&ref_edge) { break; }
            let agreement = path_groups[1..].iter()
                .all(|group| next < group.path.len() && group.path[next].edge_id == ref_edge);
            if !agreement { break; }
            bubble_start_id = next;
        }

        // Get the bubble end: the next convergence edge on the reference.
        let bubble_end_id = match (bubble_start_id + 1..ref_path.len())
                .find(|&i| convergence_edges.contains(&ref_path[i].edge_id)) {
            Some(i) => i,
            None => continue,
        };

        // Shorten all the branches to the bubble boundaries, merging identical ones.
        let start_marker = ref_path[bubble_start_id].edge_id;
        let end_marker = ref_path[bubble_end_id].edge_id;
        let mut bubble_branches: Vec<ScoredPath> = Vec::new();
        for group in &path_groups {
            let mut group_start = 0;
            let mut group_end = 0;
            for (i, step) in group.path.iter().enumerate() {
                if step.edge_id == start_marker { group_start = i; }
                if step.edge_id == end_marker { group_end = i; }
            }
            if group_end < group_start { continue; }
            let branch_path = group.path[group_start..=group_end].to_vec();
            let duplicate = bubble_branches.iter_mut().find(|branch| {
                branch.path.len() == branch_path.len() &&
                    branch.path.iter().zip(&branch_path).all(|(a, b)| a.edge_id == b.edge_id)
            });
            match duplicate {
                Some(branch) => branch.score += group.score,
                None => bubble_branches.push(ScoredPath { path: branch_path,
                                                          score: group.score }),
            }
        }
        if bubble_branches.len() < 2 { continue; }

        bubbles.push(ComplexBubble { start_edge: start_marker, end_edge: end_marker,
                                     branches: bubble_branches });
    }
    bubbles
}
