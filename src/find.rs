// This file contains the code for the haplopurge find subcommand.

// Copyright 2024 Ryan Wick (rrwick@gmail.com)
// https://github.com/rrwick/Haplopurge

// This file is part of Haplopurge. Haplopurge is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version. Haplopurge
// is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the
// implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General
// Public License for more details. You should have received a copy of the GNU General Public
// License along with Haplopurge. If not, see <http://www.gnu.org/licenses/>.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::haplotype_simplification::{find_complex_haplotypes, ComplexBubble};
use crate::log::{section_header, explanation};
use crate::mask::{load_alignments, load_graph};
use crate::misc::{check_if_file_exists, quit_with_error, sign_at_end, sign_at_end_vec};


pub fn find(in_gfa: PathBuf, alignments: PathBuf, out_tsv: Option<PathBuf>) {
    check_settings(&in_gfa, &alignments);
    starting_message();
    print_settings(&in_gfa, &alignments, &out_tsv);
    let graph = load_graph(&in_gfa);
    let aligner = load_alignments(&Some(alignments));

    section_header("Finding complex heterozygous bubbles");
    explanation("Read alignments are now grouped by the paths they take away from each fork in \
                 the graph. Forks where several well-supported groups of reads diverge and later \
                 reconverge on a shared edge are reported as complex bubbles.");
    let bubbles = find_complex_haplotypes(&graph, &aligner);
    print_bubbles(&bubbles);

    if let Some(out_tsv) = &out_tsv {
        save_bubbles(&bubbles, out_tsv).unwrap_or_else(|e| {
            quit_with_error(&format!("failed to write {}\n{}", out_tsv.display(), e));
        });
    }
    finished_message(&bubbles, &out_tsv);
}


fn check_settings(in_gfa: &Path, alignments: &Path) {
    check_if_file_exists(in_gfa);
    check_if_file_exists(alignments);
}


fn starting_message() {
    section_header("Starting haplopurge find");
    explanation("This command uses read paths to reveal complex heterogeneities in the assembly \
                 graph: bubbles with more than two alternative branches. The graph itself is not \
                 modified.");
}


fn print_settings(in_gfa: &Path, alignments: &Path, out_tsv: &Option<PathBuf>) {
    eprintln!("Settings:");
    eprintln!("  --in_gfa {}", in_gfa.display());
    eprintln!("  --alignments {}", alignments.display());
    if let Some(out_tsv) = out_tsv {
        eprintln!("  --out_tsv {}", out_tsv.display());
    }
    eprintln!();
}


fn print_bubbles(bubbles: &[ComplexBubble]) {
    for bubble in bubbles {
        eprintln!("bubble from {} to {}:",
                  sign_at_end(bubble.start_edge), sign_at_end(bubble.end_edge));
        for branch in &bubble.branches {
            let edge_ids: Vec<i32> = branch.path.iter().map(|step| step.edge_id).collect();
            eprintln!("  {} ({} reads)", sign_at_end_vec(&edge_ids), branch.score);
        }
    }
    if !bubbles.is_empty() {
        eprintln!();
    }
}


fn save_bubbles(bubbles: &[ComplexBubble], out_tsv: &Path) -> io::Result<()> {
    let mut file = File::create(out_tsv)?;
    writeln!(file, "start_edge\tend_edge\tbranch\tscore\tpath")?;
    for bubble in bubbles {
        for (i, branch) in bubble.branches.iter().enumerate() {
            let edge_ids: Vec<i32> = branch.path.iter().map(|step| step.edge_id).collect();
            writeln!(file, "{}\t{}\t{}\t{}\t{}",
                     sign_at_end(bubble.start_edge), sign_at_end(bubble.end_edge),
                     i + 1, branch.score, sign_at_end_vec(&edge_ids))?;
        }
    }
    Ok(())
}


fn finished_message(bubbles: &[ComplexBubble], out_tsv: &Option<PathBuf>) {
    section_header("Finished!");
    eprintln!("Complex bubbles found: {}", bubbles.len());
    if let Some(out_tsv) = out_tsv {
        eprintln!("Bubble table: {}", out_tsv.display());
    }
    eprintln!();
}
