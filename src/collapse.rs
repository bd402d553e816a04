// This file contains the code for the haplopurge collapse subcommand.

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

use crate::config::Config;
use crate::haplotype_simplification::{collapse_heterozygous_bulges, collapse_heterozygous_loops};
use crate::log::{section_header, explanation};
use crate::mask::{check_settings, load_alignments, load_graph, save_graph};


pub fn collapse(in_gfa: PathBuf, out_gfa: PathBuf, alignments: Option<PathBuf>,
                max_bubble_length: i64) {
    check_settings(&in_gfa, &alignments, max_bubble_length);
    starting_message();
    print_settings(&in_gfa, &out_gfa, &alignments, max_bubble_length);
    let mut graph = load_graph(&in_gfa);
    let mut aligner = load_alignments(&alignments);
    let mut config = Config::default();
    config.set("max_bubble_length", max_bubble_length);

    section_header("Collapsing heterozygous structures");
    explanation("The weaker branch of each heterozygous bubble is now detached and its coverage \
                 folded into the consensus branch. Heterozygous loops are unrolled into the \
                 linear traversal when well supported, or detached when not. Read alignments are \
                 re-projected onto the rewired graph after each pass.");
    let bulges = collapse_heterozygous_bulges(&mut graph, &mut aligner, &config, true);
    let loops = collapse_heterozygous_loops(&mut graph, &mut aligner, true);
    graph.check_symmetry();

    save_graph(&graph, &out_gfa);
    finished_message(&out_gfa, bulges, loops);
}


fn starting_message() {
    section_header("Starting haplopurge collapse");
    explanation("This command simplifies an assembly graph by collapsing structures caused by \
                 heterozygosity: the consensus backbone is kept while alternative-haplotype \
                 branches are detached from it.");
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
    eprintln!("Collapsed bubbles: {}", bulges);
    eprintln!("Collapsed loops: {}", loops);
    eprintln!("Simplified graph: {}", out_gfa.display());
    eprintln!();
}
