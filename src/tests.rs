// This file contains some high-level tests for Haplopurge and functions common to other tests.

// Copyright 2024 Ryan Wick (rrwick@gmail.com)
// https://github.com/rrwick/Haplopurge

// This file is part of Haplopurge. Haplopurge is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version. Haplopurge
// is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the
// implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General
// Public License for more details. You should have received a copy of the GNU General Public
// License along with Haplopurge. If not, see <http://www.gnu.org/licenses/>.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

use crate::alignment::ReadAligner;
use crate::assembly_graph::AssemblyGraph;
use crate::config::Config;
use crate::haplotype_simplification::{collapse_heterozygous_bulges, collapse_heterozygous_loops};
use crate::test_gfa::get_test_gfa_bulge;


pub fn assert_almost_eq(a: f64, b: f64, epsilon: f64) {
    assert!((a - b).abs() < epsilon,
            "Numbers are not within {:?} of each other: {} vs {}", epsilon, a, b);
}


pub fn make_test_file(file_path: &Path, contents: &str) {
    let mut file = File::create(file_path).unwrap();
    write!(file, "{}", contents).unwrap();
}


pub fn make_gzipped_test_file(file_path: &Path, contents: &str) {
    let mut file = File::create(file_path).unwrap();
    let mut e = GzEncoder::new(Vec::new(), Compression::default());
    e.write_all(contents.as_bytes()).unwrap();
    let _ = file.write_all(&e.finish().unwrap());
}


#[test]
fn test_mask_then_collapse_through_files() {
    // Runs the masking pass and then the collapsing pass with a GFA file round trip in between,
    // the way the two subcommands are used together.
    let temp_dir = tempdir().unwrap();
    let input_gfa = temp_dir.path().join("input.gfa");
    let masked_gfa = temp_dir.path().join("masked.gfa");
    let collapsed_gfa = temp_dir.path().join("collapsed.gfa");
    make_test_file(&input_gfa, &(get_test_gfa_bulge().join("\n") + "\n"));

    // Mask.
    let mut graph = AssemblyGraph::from_gfa_file(&input_gfa);
    let mut aligner = ReadAligner::new();
    let config = Config::default();
    let masked = collapse_heterozygous_bulges(&mut graph, &mut aligner, &config, false)
        + collapse_heterozygous_loops(&mut graph, &mut aligner, false);
    assert_eq!(masked, 1);
    graph.check_symmetry();
    graph.save_gfa(&masked_gfa).unwrap();

    // The masked flags survive the file round trip.
    let mut graph = AssemblyGraph::from_gfa_file(&masked_gfa);
    graph.check_symmetry();
    assert!(graph.edge_index.get(&2).unwrap().borrow().alt_haplotype);
    assert!(graph.edge_index.get(&3).unwrap().borrow().alt_haplotype);
    assert!(!graph.edge_index.get(&1).unwrap().borrow().alt_haplotype);

    // Collapse.
    let mut aligner = ReadAligner::new();
    let collapsed = collapse_heterozygous_bulges(&mut graph, &mut aligner, &config, true)
        + collapse_heterozygous_loops(&mut graph, &mut aligner, true);
    assert_eq!(collapsed, 1);
    graph.check_symmetry();
    graph.save_gfa(&collapsed_gfa).unwrap();

    // After collapsing, the consensus branch carries the combined coverage and the weaker branch
    // dangles with no connections.
    let graph = AssemblyGraph::from_gfa_file(&collapsed_gfa);
    graph.check_symmetry();
    assert_eq!(graph.edge_pair_count(), 4);
    assert_almost_eq(graph.edge_index.get(&3).unwrap().borrow().mean_coverage, 26.0, 0.01);
    assert!(graph.edges_joined(1, 3));
    assert!(graph.edges_joined(3, 4));
    assert!(!graph.edges_joined(1, 2));
    assert!(!graph.edges_joined(2, 4));
}
