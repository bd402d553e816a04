// This is the main file of Haplopurge and where execution starts. It mainly handles the CLI and
// then calls into other files to run whichever subcommand the user chose.

// Copyright 2024 Ryan Wick (rrwick@gmail.com)
// https://github.com/rrwick/Haplopurge

// This file is part of Haplopurge. Haplopurge is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version. Haplopurge
// is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the
// implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General
// Public License for more details. You should have received a copy of the GNU General Public
// License along with Haplopurge. If not, see <http://www.gnu.org/licenses/>.

use std::path::PathBuf;
use clap::{Parser, Subcommand, crate_version};

mod alignment;
mod assembly_graph;
mod collapse;
mod config;
mod find;
mod haplotype_simplification;
mod log;
mod mask;
mod misc;
mod path_extraction;
#[cfg(test)] mod test_gfa;
#[cfg(test)] mod tests;


#[derive(Parser)]
#[clap(name = "Haplopurge",
       version = concat!("v", crate_version!()),
       about = "a tool for collapsing heterozygous structures in long-read assembly graphs\n\
                Documentation: https://github.com/rrwick/Haplopurge/wiki",
       before_help = concat!(r#"  _    _             _                                  "#, "\n",
                             r#" | |  | |           | |                                 "#, "\n",
                             r#" | |__| | __ _ _ __ | | ___  _ __  _   _ _ __ __ _  ___ "#, "\n",
                             r#" |  __  |/ _` | '_ \| |/ _ \| '_ \| | | | '__/ _` |/ _ \"#, "\n",
                             r#" | |  | | (_| | |_) | | (_) | |_) | |_| | | | (_| |  __/"#, "\n",
                             r#" |_|  |_|\__,_| .__/|_|\___/| .__/ \__,_|_|  \__, |\___|"#, "\n",
                             r#"              | |           | |               __/ |     "#, "\n",
                             r#"              |_|           |_|              |___/      "#))]
#[command(author, version, long_about = None, disable_help_subcommand = true,
          propagate_version = true)]
#[clap(subcommand_required = true)]
#[clap(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// flag heterozygous bubbles and loops without changing the graph
    Mask {
        /// Input assembly graph (required)
        #[clap(short = 'i', long = "in_gfa", required = true)]
        in_gfa: PathBuf,

        /// Output annotated graph (required)
        #[clap(short = 'o', long = "out_gfa", required = true)]
        out_gfa: PathBuf,

        /// Read-to-graph alignments (TSV)
        #[clap(short = 'a', long = "alignments")]
        alignments: Option<PathBuf>,

        /// Maximum branch length for a heterozygous bubble
        #[clap(short = 'b', long = "max_bubble_length", default_value = "50000")]
        max_bubble_length: i64,
    },

    /// collapse heterozygous bubbles and loops down to the consensus backbone
    Collapse {
        /// Input assembly graph (required)
        #[clap(short = 'i', long = "in_gfa", required = true)]
        in_gfa: PathBuf,

        /// Output simplified graph (required)
        #[clap(short = 'o', long = "out_gfa", required = true)]
        out_gfa: PathBuf,

        /// Read-to-graph alignments (TSV)
        #[clap(short = 'a', long = "alignments")]
        alignments: Option<PathBuf>,

        /// Maximum branch length for a heterozygous bubble
        #[clap(short = 'b', long = "max_bubble_length", default_value = "50000")]
        max_bubble_length: i64,
    },

    /// find complex multi-branch bubbles from read alignments
    Find {
        /// Input assembly graph (required)
        #[clap(short = 'i', long = "in_gfa", required = true)]
        in_gfa: PathBuf,

        /// Read-to-graph alignments (TSV, required)
        #[clap(short = 'a', long = "alignments", required = true)]
        alignments: PathBuf,

        /// Output bubble table (TSV)
        #[clap(short = 'o', long = "out_tsv")]
        out_tsv: Option<PathBuf>,
    },
}


fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Mask { in_gfa, out_gfa, alignments, max_bubble_length }) => {
            mask::mask(in_gfa, out_gfa, alignments, max_bubble_length);
        },
        Some(Commands::Collapse { in_gfa, out_gfa, alignments, max_bubble_length }) => {
            collapse::collapse(in_gfa, out_gfa, alignments, max_bubble_length);
        },
        Some(Commands::Find { in_gfa, alignments, out_tsv }) => {
            find::find(in_gfa, alignments, out_tsv);
        },
        None => {}
    }
}
