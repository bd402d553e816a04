// This file contains the code for the haplopurge mask subcommand.

// Copyright 2024 Ryan Wick (rrwick@gmail.com)
// https://github.com/rrwick/Haplopurge

// This file is part of Haplopurge. Haplopurge is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version. Haplopurge
// is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the
// implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General
// Public License for more details. You should have received a copy of the GNU General Public
// License along with Haplopurge. If not, see <http://www.gnu.org/licenses/>.

use std::path::{Path, PathBuf};

use crate::alignment::ReadAligner;
use crate::assembly_graph::AssemblyGraph;
use crate::config::Config;
use crate::haplotype_simplification::{collapse_heterozygous_bulges, collapse_heterozygous_loops};
use crate::log::{section_header, explanation};
use crate::misc::{check_if_file_exists, quit_with_error, spinner};


pub fn mask(in_gfa: PathBuf, out_gfa: PathBuf, alignments: Option<PathBuf>,
            max_bubble_length: i64) {
    check_settings(&in_gfa, &alignments, max_bubble_length);
    starting_message();
    print_settings(&in_gfa, &out_gfa, &alignments, max_bubble_length);
    let mut graph = load_graph(&in_gfa);
    let mut aligner = load_alignments(&alignments);
    let mut config = Config::default();
    config.set("max_bubble_length", max_bubble_length);

    section_header("Masking heterozygous structures");
    explanation("Simple bubbles and loops that look like alternative haplotypes are now flagged. \
                 The graph topology is left untouched.");
    let bulges = collapse_heterozygous_bulges(&mut graph, &mut aligner, &config, false);
    let loops = collapse_heterozygous_loops(&mut graph, &mut aligner, false);
    graph.check_symmetry();

    save_graph(&graph, &out_gfa);
    finished_message(&out_gfa, bulges, loops);
}


pub fn check_settings(in_gfa: &Path, alignments: &Option<PathBuf>, max_bubble_length: i64) {
    check_if_file_exists(in_gfa);
    if let Some(alignments) = alignments {
        check_if_file_exists(alignments);
    }
    if max_bubble_length <= 0 {
        quit_with_error("--max_bubble_length must be a positive integer");
    }
}


fn starting_message() {
    section_header("Starting haplopurge mask");
    explanation("This command finds simple heterozygous bubbles and loops in an assembly graph \
                 and marks their edges as alternative haplotypes, without changing the graph \
                 structure.");
}


fn print_settings(in_gfa: &Path, out_gfa: &Path, alignments: &Option<PathBuf>,
                  max_bubble_length: i64) {
    eprintln!("Settings:");
    eprintln!("  --in_gfa {}", in_gfa.display());
    eprintln!("  --out_gfa {}", out_gfa.display());
    if let Some(alignments) = alignments {
        eprintln!("  --alignments {}", alignments.display());
    }
    eprintln!("  --max_bubble_length {}", max_bubble_length);
    eprintln!();
}


fn finished_message(out_gfa: &Path, bulges: usize, loops: usize) {
    section_header("Finished!");
    eprintln!("Masked bubbles: {}", bulges);
    eprintln!("Masked loops: {}", loops);
    eprintln!("Annotated graph: {}", out_gfa.display());
    eprintln!();
}


pub fn load_graph(gfa: &Path) -> AssemblyGraph {
    section_header("Loading assembly graph");
    explanation("The assembly graph is now loaded into memory and checked for strand symmetry.");
    let graph = AssemblyGraph::from_gfa_file(gfa);
    graph.check_symmetry();
    graph.print_basic_info();
    graph
}


pub fn load_alignments(alignments: &Option<PathBuf>) -> ReadAligner {
    match alignments {
        Some(filename) => {
            let pb = spinner("loading alignments...");
            let aligner = ReadAligner::from_tsv_file(filename);
            pb.finish_and_clear();
            eprintln!("{} read alignments loaded", aligner.get_alignments().len());
            eprintln!();
            aligner
        },
        None => ReadAligner::new(),
    }
}


pub fn save_graph(graph: &AssemblyGraph, out_gfa: &Path) {
    graph.save_gfa(out_gfa).unwrap_or_else(|e| {
        quit_with_error(&format!("failed to write {}\n{}", out_gfa.display(), e));
    });
}
