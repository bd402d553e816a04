// This file contains some GFA fixtures for Haplopurge's unit tests.

// Copyright 2024 Ryan Wick (rrwick@gmail.com)
// https://github.com/rrwick/Haplopurge

// This file is part of Haplopurge. Haplopurge is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version. Haplopurge
// is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the
// implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General
// Public License for more details. You should have received a copy of the GNU General Public
// License along with Haplopurge. If not, see <http://www.gnu.org/licenses/>.


pub fn get_test_gfa_bulge() -> Vec<String> {
    // A simple two-branch bubble:
    //          2 (200 bp, 12x)
    //         / \
    //    1 ---   --- 4
    //         \ /
    //          3 (200 bp, 14x)
    get_test_gfa_bulge_with_covs(12.0, 14.0)
}


pub fn get_test_gfa_bulge_with_covs(cov_a: f64, cov_b: f64) -> Vec<String> {
    vec!["H\tVN:Z:1.0".to_string(),
         "S\t1\t*\tLN:i:5000\tDP:f:30".to_string(),
         format!("S\t2\t*\tLN:i:200\tDP:f:{}", cov_a),
         format!("S\t3\t*\tLN:i:200\tDP:f:{}", cov_b),
         "S\t4\t*\tLN:i:5000\tDP:f:29".to_string(),
         "L\t1\t+\t2\t+\t0M".to_string(),
         "L\t1\t+\t3\t+\t0M".to_string(),
         "L\t2\t+\t4\t+\t0M".to_string(),
         "L\t3\t+\t4\t+\t0M".to_string()]
}


pub fn get_test_gfa_bulge_long_branches() -> Vec<String> {
    // Like get_test_gfa_bulge, but with branches longer than the entrance and exit (the shape of
    // two consecutive repeats of multiplicity two, not a heterozygous bubble).
    vec!["H\tVN:Z:1.0",
         "S\t1\t*\tLN:i:5000\tDP:f:30",
         "S\t2\t*\tLN:i:6000\tDP:f:12",
         "S\t3\t*\tLN:i:6000\tDP:f:14",
         "S\t4\t*\tLN:i:5000\tDP:f:29",
         "L\t1\t+\t2\t+\t0M",
         "L\t1\t+\t3\t+\t0M",
         "L\t2\t+\t4\t+\t0M",
         "L\t3\t+\t4\t+\t0M"].into_iter().map(String::from).collect()
}


pub fn get_test_gfa_loop(loop_cov: f64) -> Vec<String> {
    // A backbone (1 -> 3) with a self-loop (2) on the junction between them:
    //         __
    //         \/ 2 (300 bp)
    //    1 ---o--- 3
    vec!["H\tVN:Z:1.0".to_string(),
         "S\t1\t*\tLN:i:5000\tDP:f:25".to_string(),
         format!("S\t2\t*\tLN:i:300\tDP:f:{}", loop_cov),
         "S\t3\t*\tLN:i:5000\tDP:f:25".to_string(),
         "L\t1\t+\t2\t+\t0M".to_string(),
         "L\t2\t+\t2\t+\t0M".to_string(),
         "L\t2\t+\t3\t+\t0M".to_string(),
         "L\t1\t+\t3\t+\t0M".to_string()]
}


pub fn get_test_gfa_complex() -> Vec<String> {
    // A fork after the 9 -> 10 chain with branches 11 and 12 that reconverge on the 13 -> 14
    // chain. Used for complex-bubble detection with read alignments.
    vec!["H\tVN:Z:1.0",
         "S\t9\t*\tLN:i:3000\tDP:f:30",
         "S\t10\t*\tLN:i:2000\tDP:f:30",
         "S\t11\t*\tLN:i:400\tDP:f:15",
         "S\t12\t*\tLN:i:400\tDP:f:15",
         "S\t13\t*\tLN:i:2000\tDP:f:30",
         "S\t14\t*\tLN:i:3000\tDP:f:30",
         "L\t9\t+\t10\t+\t0M",
         "L\t10\t+\t11\t+\t0M",
         "L\t10\t+\t12\t+\t0M",
         "L\t11\t+\t13\t+\t0M",
         "L\t12\t+\t13\t+\t0M",
         "L\t13\t+\t14\t+\t0M"].into_iter().map(String::from).collect()
}


pub fn get_test_gfa_complex_forked() -> Vec<String> {
    // A fork at the end of 10 whose 99 branch is a dead end no read supports, followed by a
    // three-way fork after 11 that reconverges on the 13 -> 14 chain. Reads through this graph
    // stay convergent across 11 before splitting between 12, 15 and 17.
    vec!["H\tVN:Z:1.0",
         "S\t10\t*\tLN:i:2000\tDP:f:30",
         "S\t99\t*\tLN:i:500\tDP:f:5",
         "S\t11\t*\tLN:i:600\tDP:f:30",
         "S\t12\t*\tLN:i:400\tDP:f:12",
         "S\t15\t*\tLN:i:400\tDP:f:10",
         "S\t17\t*\tLN:i:400\tDP:f:8",
         "S\t13\t*\tLN:i:2000\tDP:f:30",
         "S\t14\t*\tLN:i:3000\tDP:f:30",
         "L\t10\t+\t11\t+\t0M",
         "L\t10\t+\t99\t+\t0M",
         "L\t11\t+\t12\t+\t0M",
         "L\t11\t+\t15\t+\t0M",
         "L\t11\t+\t17\t+\t0M",
         "L\t12\t+\t13\t+\t0M",
         "L\t15\t+\t13\t+\t0M",
         "L\t17\t+\t13\t+\t0M",
         "L\t13\t+\t14\t+\t0M"].into_iter().map(String::from).collect()
}


pub fn get_test_gfa_chain() -> Vec<String> {
    // Two edges joined through an unbranching junction, for path-merging tests.
    vec!["H\tVN:Z:1.0",
         "S\t1\t*\tLN:i:100\tDP:f:10",
         "S\t2\t*\tLN:i:300\tDP:f:20",
         "L\t1\t+\t2\t+\t0M"].into_iter().map(String::from).collect()
}


pub fn get_test_gfa_circle() -> Vec<String> {
    // An isolated circular component.
    vec!["H\tVN:Z:1.0",
         "S\t1\t*\tLN:i:100\tDP:f:10",
         "S\t2\t*\tLN:i:300\tDP:f:10",
         "L\t1\t+\t2\t+\t0M",
         "L\t2\t+\t1\t+\t0M"].into_iter().map(String::from).collect()
}
