// This file defines the AssemblyGraph struct: a double-stranded repeat graph in which each edge
// represents a contig-like sequence and each node is a junction of overlapping reads. Every edge
// has a reverse-complement partner and all mutations must keep the two strands in sync.

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
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;

use fxhash::FxHashMap;

use crate::misc::{format_float, load_file_lines, quit_with_error, reverse_complement};


pub struct GraphNode {
    pub number: u32,
    pub in_edges: Vec<Rc<RefCell<GraphEdge>>>,
    pub out_edges: Vec<Rc<RefCell<GraphEdge>>>,
}


pub struct GraphEdge {
    pub id: i32,  // signed: -id is the reverse-complement partner
    pub node_left: Rc<RefCell<GraphNode>>,
    pub node_right: Rc<RefCell<GraphNode>>,
    pub seq: Vec<u8>,  // may be empty when the GFA used * segments
    pub length: u32,
    pub mean_coverage: f64,
    pub alt_haplotype: bool,
    pub self_complement: bool,
}

impl fmt::Display for GraphEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge {}: {} bp, {:.2}x", self.id, self.length, self.mean_coverage)
    }
}

impl fmt::Debug for GraphEdge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { fmt::Display::fmt(self, f) }
}


pub fn vec_remove(list: &mut Vec<Rc<RefCell<GraphEdge>>>, to_remove: &Rc<RefCell<GraphEdge>>) {
    // Removes one occurrence of the given edge from an adjacency list, preserving the order of
    // the other elements.
    if let Some(i) = list.iter().position(|e| Rc::ptr_eq(e, to_remove)) {
        list.remove(i);
    }
}


pub struct AssemblyGraph {
    pub nodes: Vec<Rc<RefCell<GraphNode>>>,
    pub edges: Vec<Rc<RefCell<GraphEdge>>>,
    pub edge_index: FxHashMap<i32, Rc<RefCell<GraphEdge>>>,
    next_node_number: u32,
}

impl AssemblyGraph {
    pub fn new() -> Self {
        AssemblyGraph {
            nodes: Vec::new(),
            edges: Vec::new(),
            edge_index: FxHashMap::default(),
            next_node_number: 0,
        }
    }

    pub fn add_node(&mut self) -> Rc<RefCell<GraphNode>> {
        self.next_node_number += 1;
        let node = Rc::new(RefCell::new(GraphNode {
            number: self.next_node_number,
            in_edges: Vec::new(),
            out_edges: Vec::new(),
        }));
        self.nodes.push(Rc::clone(&node));
        node
    }

    pub fn add_edge_pair(&mut self, number: u32,
                         left: &Rc<RefCell<GraphNode>>, right: &Rc<RefCell<GraphNode>>,
                         rev_left: &Rc<RefCell<GraphNode>>, rev_right: &Rc<RefCell<GraphNode>>,
                         seq: Vec<u8>, length: u32, mean_coverage: f64)
                         -> (Rc<RefCell<GraphEdge>>, Rc<RefCell<GraphEdge>>) {
        // Creates an edge and its reverse-complement partner in one step, so the pair invariant
        // holds from the moment of creation. The forward edge gets +number, the reverse -number.
        let id = number as i32;
        if self.edge_index.contains_key(&id) {
            quit_with_error(&format!("duplicate edge number: {}", number));
        }
        let rev_seq = if seq.is_empty() { Vec::new() } else { reverse_complement(&seq) };
        let forward = Rc::new(RefCell::new(GraphEdge {
            id,
            node_left: Rc::clone(left), node_right: Rc::clone(right),
            seq, length, mean_coverage,
            alt_haplotype: false, self_complement: false,
        }));
        let reverse = Rc::new(RefCell::new(GraphEdge {
            id: -id,
            node_left: Rc::clone(rev_left), node_right: Rc::clone(rev_right),
            seq: rev_seq, length, mean_coverage,
            alt_haplotype: false, self_complement: false,
        }));
        left.borrow_mut().out_edges.push(Rc::clone(&forward));
        right.borrow_mut().in_edges.push(Rc::clone(&forward));
        rev_left.borrow_mut().out_edges.push(Rc::clone(&reverse));
        rev_right.borrow_mut().in_edges.push(Rc::clone(&reverse));
        self.edge_index.insert(id, Rc::clone(&forward));
        self.edge_index.insert(-id, Rc::clone(&reverse));
        self.edges.push(Rc::clone(&forward));
        self.edges.push(Rc::clone(&reverse));
        (forward, reverse)
    }

    pub fn add_self_complement_edge(&mut self, number: u32,
                                    left: &Rc<RefCell<GraphNode>>, right: &Rc<RefCell<GraphNode>>,
                                    length: u32, mean_coverage: f64) -> Rc<RefCell<GraphEdge>> {
        // A self-complement edge is its own reverse-complement partner: one object registered
        // under both signed ids. The graph builder produces these for palindromic sequence, and
        // they carry an SC:i:1 tag in GFA.
        let id = number as i32;
        if self.edge_index.contains_key(&id) {
            quit_with_error(&format!("duplicate edge number: {}", number));
        }
        let edge = Rc::new(RefCell::new(GraphEdge {
            id,
            node_left: Rc::clone(left), node_right: Rc::clone(right),
            seq: Vec::new(), length, mean_coverage,
            alt_haplotype: false, self_complement: true,
        }));
        left.borrow_mut().out_edges.push(Rc::clone(&edge));
        right.borrow_mut().in_edges.push(Rc::clone(&edge));
        self.edge_index.insert(id, Rc::clone(&edge));
        self.edge_index.insert(-id, Rc::clone(&edge));
        self.edges.push(Rc::clone(&edge));
        edge
    }

    pub fn complement_edge(&self, edge: &Rc<RefCell<GraphEdge>>) -> Rc<RefCell<GraphEdge>> {
        let (id, self_complement) = {
            let e = edge.borrow();
            (e.id, e.self_complement)
        };
        if self_complement {
            return Rc::clone(edge);
        }
        match self.edge_index.get(&-id) {
            Some(complement) => Rc::clone(complement),
            None => panic!("edge {} has no complement", id),
        }
    }

    pub fn set_alt_haplotype(&self, edge: &Rc<RefCell<GraphEdge>>, value: bool) {
        // Flags (or unflags) an edge as alternative-haplotype on both strands.
        let complement = self.complement_edge(edge);
        edge.borrow_mut().alt_haplotype = value;
        if !Rc::ptr_eq(&complement, edge) {
            complement.borrow_mut().alt_haplotype = value;
        }
    }

    pub fn add_coverage(&self, edge: &Rc<RefCell<GraphEdge>>, amount: f64) {
        // Adds coverage to an edge on both strands.
        let complement = self.complement_edge(edge);
        edge.borrow_mut().mean_coverage += amount;
        if !Rc::ptr_eq(&complement, edge) {
            complement.borrow_mut().mean_coverage += amount;
        }
    }

    pub fn edges_joined(&self, first_id: i32, second_id: i32) -> bool {
        // Returns whether the first edge still flows directly into the second, i.e. the first
        // edge's right node is the second edge's left node.
        let first = match self.edge_index.get(&first_id) { Some(e) => e, None => return false };
        let second = match self.edge_index.get(&second_id) { Some(e) => e, None => return false };
        Rc::ptr_eq(&first.borrow().node_right, &second.borrow().node_left)
    }

    pub fn edge_pair_count(&self) -> usize {
        self.edges.iter().filter(|e| e.borrow().id > 0).count()
    }

    pub fn total_length(&self) -> u64 {
        self.edges.iter().filter(|e| e.borrow().id > 0).map(|e| e.borrow().length as u64).sum()
    }

    pub fn mean_coverage(&self) -> f64 {
        // Length-weighted mean coverage over the canonical strand.
        let total_length = self.total_length();
        if total_length == 0 {
            return 0.0;
        }
        let coverage_sum: f64 = self.edges.iter().filter(|e| e.borrow().id > 0)
            .map(|e| e.borrow().mean_coverage * e.borrow().length as f64).sum();
        coverage_sum / total_length as f64
    }

    pub fn print_basic_info(&self) {
        eprintln!("{} edge pairs, {} nodes", self.edge_pair_count(), self.nodes.len());
        eprintln!("total length: {} bp", self.total_length());
        eprintln!("mean coverage: {}x", format_float(self.mean_coverage()));
        eprintln!();
    }

    pub fn check_symmetry(&self) {
        // Makes sure the two strands of the graph agree:
        // * Each edge has a complement, and complementing twice returns the original edge.
        // * Complementary edges share length, coverage and the alt-haplotype flag.
        // * Adjacency lists and edge endpoints reference each other consistently.
        // If any of the above aren't true, this method will panic.
        for edge_rc in &self.edges {
            let complement = self.complement_edge(edge_rc);
            let double = self.complement_edge(&complement);
            if !Rc::ptr_eq(&double, edge_rc) { panic!("complement pairing is not symmetric"); }
            if !Rc::ptr_eq(&complement, edge_rc) {
                let e = edge_rc.borrow();
                let c = complement.borrow();
                if e.length != c.length { panic!("length differs between strands of edge {}", e.id); }
                if e.mean_coverage != c.mean_coverage {
                    panic!("coverage differs between strands of edge {}", e.id);
                }
                if e.alt_haplotype != c.alt_haplotype {
                    panic!("alt-haplotype flag differs between strands of edge {}", e.id);
                }
            }
            let e = edge_rc.borrow();
            if !e.node_left.borrow().out_edges.iter().any(|x| Rc::ptr_eq(x, edge_rc)) {
                panic!("edge {} missing from its left node's outgoing list", e.id);
            }
            if !e.node_right.borrow().in_edges.iter().any(|x| Rc::ptr_eq(x, edge_rc)) {
                panic!("edge {} missing from its right node's incoming list", e.id);
            }
        }
        for node_rc in &self.nodes {
            let node = node_rc.borrow();
            for edge in &node.out_edges {
                if !Rc::ptr_eq(&edge.borrow().node_left, node_rc) {
                    panic!("outgoing edge {} does not start at node {}", edge.borrow().id, node.number);
                }
            }
            for edge in &node.in_edges {
                if !Rc::ptr_eq(&edge.borrow().node_right, node_rc) {
                    panic!("incoming edge {} does not end at node {}", edge.borrow().id, node.number);
                }
            }
        }
    }

    pub fn from_gfa_file(gfa_filename: &Path) -> Self {
        let gfa_lines = load_file_lines(gfa_filename);
        Self::from_gfa_lines(&gfa_lines)
    }

    pub fn from_gfa_lines(gfa_lines: &[String]) -> Self {
        let mut segments = Vec::new();
        let mut links = Vec::new();
        for line in gfa_lines {
            let parts: Vec<&str> = line.trim_end_matches('\n').split('\t').collect();
            match parts.first() {
                Some(&"S") => segments.push(parse_segment_line(line)),
                Some(&"L") => links.push(parse_link_line(line)),
                _ => {}
            }
        }

        // The GFA's segments become graph edges. Junction nodes are not explicit in GFA, so they
        // are reconstructed by merging segment end-sides that the link lines join. Each segment
        // strand has a start side and an end side; a link a,sa -> b,sb merges a's end side with
        // b's start side (and the complementary sides, to keep the strands in sync).
        let mut positions = HashMap::new();
        for (i, segment) in segments.iter().enumerate() {
            if positions.insert(segment.number, i).is_some() {
                quit_with_error(&format!("duplicate segment number: {}", segment.number));
            }
        }
        let mut sides = UnionFind::new(segments.len() * 4);
        for (i, segment) in segments.iter().enumerate() {
            // A self-complement segment reads the same on both strands, so its reverse sides are
            // the same junctions as its forward sides.
            if segment.self_complement {
                sides.union(start_side(i, true), start_side(i, false));
                sides.union(end_side(i, true), end_side(i, false));
            }
        }
        for &(seg_a, strand_a, seg_b, strand_b) in &links {
            let pos_a = *positions.get(&seg_a).unwrap_or_else(|| {
                quit_with_error(&format!("link refers to nonexistent segment: {}", seg_a));
            });
            let pos_b = *positions.get(&seg_b).unwrap_or_else(|| {
                quit_with_error(&format!("link refers to nonexistent segment: {}", seg_b));
            });
            sides.union(end_side(pos_a, strand_a), start_side(pos_b, strand_b));
            sides.union(end_side(pos_b, !strand_b), start_side(pos_a, !strand_a));
        }

        let mut graph = AssemblyGraph::new();
        let mut class_nodes: HashMap<usize, Rc<RefCell<GraphNode>>> = HashMap::new();
        for (i, segment) in segments.iter().enumerate() {
            let left = node_for_side(&mut graph, &mut class_nodes, &mut sides, start_side(i, true));
            let right = node_for_side(&mut graph, &mut class_nodes, &mut sides, end_side(i, true));
            let forward = if segment.self_complement {
                graph.add_self_complement_edge(segment.number, &left, &right,
                                               segment.length, segment.mean_coverage)
            } else {
                let rev_left = node_for_side(&mut graph, &mut class_nodes, &mut sides,
                                             start_side(i, false));
                let rev_right = node_for_side(&mut graph, &mut class_nodes, &mut sides,
                                              end_side(i, false));
                graph.add_edge_pair(segment.number, &left, &right, &rev_left, &rev_right,
                                    segment.seq.clone(), segment.length, segment.mean_coverage).0
            };
            if segment.alt_haplotype {
                graph.set_alt_haplotype(&forward, true);
            }
        }
        graph
    }

    pub fn save_gfa(&self, gfa_filename: &Path) -> io::Result<()> {
        let mut file = File::create(gfa_filename)?;
        writeln!(file, "H\tVN:Z:1.0")?;
        for edge_rc in &self.edges {
            let edge = edge_rc.borrow();
            if edge.id <= 0 { continue; }
            let seq_str = if edge.seq.is_empty() { "*".to_string() }
                          else { String::from_utf8_lossy(&edge.seq).to_string() };
            let alt_tag = if edge.alt_haplotype { "\tHP:i:1" } else { "" };
            let sc_tag = if edge.self_complement { "\tSC:i:1" } else { "" };
            writeln!(file, "S\t{}\t{}\tLN:i:{}\tDP:f:{:.2}{}{}",
                     edge.id, seq_str, edge.length, edge.mean_coverage, alt_tag, sc_tag)?;
        }
        for node_rc in &self.nodes {
            let node = node_rc.borrow();
            for in_edge in &node.in_edges {
                for out_edge in &node.out_edges {
                    let (seg_a, strand_a) = segment_and_strand(in_edge.borrow().id);
                    let (seg_b, strand_b) = segment_and_strand(out_edge.borrow().id);
                    writeln!(file, "L\t{}\t{}\t{}\t{}\t0M", seg_a, strand_a, seg_b, strand_b)?;
                }
            }
        }
        Ok(())
    }
}


struct SegmentRecord {
    number: u32,
    seq: Vec<u8>,
    length: u32,
    mean_coverage: f64,
    alt_haplotype: bool,
    self_complement: bool,
}


fn parse_segment_line(line: &str) -> SegmentRecord {
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 3 {
        quit_with_error("GFA segment line does not have enough parts");
    }
    let number = parts[1].parse::<u32>().unwrap_or_else(|_| {
        quit_with_error(&format!("unable to parse segment number: {}", parts[1]));
    });
    let seq = if parts[2] == "*" { Vec::new() } else { parts[2].as_bytes().to_owned() };
    let mean_coverage = parts.iter()
        .find(|&p| p.starts_with("DP:f:")).and_then(|p| p[5..].parse::<f64>().ok())
        .unwrap_or_else(|| {
            quit_with_error(&format!("could not find a depth tag (e.g. DP:f:10.00) on the GFA \
                                      segment line for segment {}", number));
        });
    let length = match parts.iter().find(|&p| p.starts_with("LN:i:")) {
        Some(p) => p[5..].parse::<u32>().unwrap_or_else(|_| {
            quit_with_error(&format!("unable to parse length tag for segment {}", number));
        }),
        None => {
            if seq.is_empty() {
                quit_with_error(&format!("segment {} has no sequence and no LN:i: length tag",
                                         number));
            }
            seq.len() as u32
        }
    };
    let alt_haplotype = parts.iter().any(|&p| p == "HP:i:1");
    let self_complement = parts.iter().any(|&p| p == "SC:i:1");
    SegmentRecord { number, seq, length, mean_coverage, alt_haplotype, self_complement }
}


fn parse_link_line(line: &str) -> (u32, bool, u32, bool) {
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 6 || parts[5] != "0M" {
        quit_with_error("non-zero overlap found on a GFA link line.\n\
                         Are you sure this is a Haplopurge-compatible GFA file?");
    }
    let seg_a: u32 = parts[1].parse().unwrap_or_else(|_| {
        quit_with_error(&format!("unable to parse link segment: {}", parts[1]));
    });
    let seg_b: u32 = parts[3].parse().unwrap_or_else(|_| {
        quit_with_error(&format!("unable to parse link segment: {}", parts[3]));
    });
    let strand_a = match parts[2] { "+" => true, "-" => false,
        _ => quit_with_error(&format!("invalid link strand: {}", parts[2])) };
    let strand_b = match parts[4] { "+" => true, "-" => false,
        _ => quit_with_error(&format!("invalid link strand: {}", parts[4])) };
    (seg_a, strand_a, seg_b, strand_b)
}


fn start_side(position: usize, strand: bool) -> usize {
    position * 4 + if strand { 0 } else { 2 }
}


fn end_side(position: usize, strand: bool) -> usize {
    position * 4 + if strand { 1 } else { 3 }
}


fn segment_and_strand(id: i32) -> (u32, char) {
    if id > 0 { (id as u32, '+') } else { ((-id) as u32, '-') }
}


fn node_for_side(graph: &mut AssemblyGraph,
                 class_nodes: &mut HashMap<usize, Rc<RefCell<GraphNode>>>,
                 sides: &mut UnionFind, side: usize) -> Rc<RefCell<GraphNode>> {
    let root = sides.find(side);
    if let Some(node) = class_nodes.get(&root) {
        return Rc::clone(node);
    }
    let node = graph.add_node();
    class_nodes.insert(root, Rc::clone(&node));
    node
}


struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        UnionFind { parent: (0..size).collect() }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];  // path halving
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            self.parent[root_b] = root_a;
        }
    }
}
