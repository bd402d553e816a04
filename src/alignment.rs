// This file contains the read-to-graph alignment store. Alignments are produced externally and
// loaded from a TSV file; after the graph has been rewired, the store re-projects its alignments
// so they only run through junctions that still exist.

// Copyright 2024 Ryan Wick (rrwick@gmail.com)
// https://github.com/rrwick/Haplopurge

// This file is part of Haplopurge. Haplopurge is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version. Haplopurge
// is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the
// implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General
// Public License for more details. You should have received a copy of the GNU General Public
// License along with Haplopurge. If not, see <http://www.gnu.org/licenses/>.

use std::path::Path;

use fxhash::{FxHashMap, FxHashSet};

use crate::assembly_graph::AssemblyGraph;
use crate::misc::{load_file_lines, quit_with_error};


// One step of a read's path through the graph: the signed edge id it crosses and the interval of
// the read (cur_start..cur_end) that the step covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeAlignment {
    pub edge_id: i32,
    pub cur_start: u32,
    pub cur_end: u32,
}

pub type GraphAlignment = Vec<EdgeAlignment>;


pub struct ReadAligner {
    pub alignments: Vec<GraphAlignment>,
}

impl ReadAligner {
    pub fn new() -> Self {
        ReadAligner { alignments: Vec::new() }
    }

    pub fn from_tsv_file(filename: &Path) -> Self {
        // Loads alignments from a TSV file with one read per line:
        //   read_name<TAB>edge_id:start-end,edge_id:start-end,...
        // where edge ids are signed (negative for the reverse strand).
        let mut alignments = Vec::new();
        for line in load_file_lines(filename) {
            if line.is_empty() {
                continue;
            }
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < 2 {
                quit_with_error(&format!("alignment line does not have enough parts: {}", line));
            }
            alignments.push(parse_alignment_path(parts[1]));
        }
        ReadAligner { alignments }
    }

    pub fn get_alignments(&self) -> &[GraphAlignment] {
        &self.alignments
    }

    pub fn update_alignments(&mut self, graph: &AssemblyGraph) {
        // Re-projects the stored alignments onto the (possibly rewired) graph: each alignment is
        // split wherever two consecutive edges are no longer joined by a node.
        let mut updated = Vec::new();
        for alignment in &self.alignments {
            let mut current: GraphAlignment = Vec::new();
            for step in alignment {
                if let Some(prev) = current.last() {
                    if !graph.edges_joined(prev.edge_id, step.edge_id) {
                        updated.push(std::mem::take(&mut current));
                    }
                }
                current.push(step.clone());
            }
            if !current.is_empty() {
                updated.push(current);
            }
        }
        self.alignments = updated;
    }
}


fn parse_alignment_path(path_str: &str) -> GraphAlignment {
    path_str.split(',').map(|step| {
        let (id_str, range_str) = step.split_once(':').unwrap_or_else(|| {
            quit_with_error(&format!("invalid alignment step: {}", step));
        });
        let edge_id = id_str.parse::<i32>().unwrap_or_else(|_| {
            quit_with_error(&format!("unable to parse edge id: {}", id_str));
        });
        let (start_str, end_str) = range_str.split_once('-').unwrap_or_else(|| {
            quit_with_error(&format!("invalid alignment range: {}", range_str));
        });
        let cur_start = start_str.parse::<u32>().unwrap_or_else(|_| {
            quit_with_error(&format!("unable to parse read position: {}", start_str));
        });
        let cur_end = end_str.parse::<u32>().unwrap_or_else(|_| {
            quit_with_error(&format!("unable to parse read position: {}", end_str));
        });
        EdgeAlignment { edge_id, cur_start, cur_end }
    }).collect()
}


pub fn build_alignment_index(alignments: &[GraphAlignment]) -> FxHashMap<i32, Vec<usize>> {
    // Maps each edge id to the alignments that cross it, once per distinct edge. Alignments that
    // touch only a single edge carry no connectivity information and are skipped.
    let mut index: FxHashMap<i32, Vec<usize>> = FxHashMap::default();
    for (i, alignment) in alignments.iter().enumerate() {
        if alignment.len() < 2 {
            continue;
        }
        let unique_edges: FxHashSet<i32> = alignment.iter().map(|step| step.edge_id).collect();
        for edge_id in unique_edges {
            index.entry(edge_id).or_default().push(i);
        }
    }
    index
}
