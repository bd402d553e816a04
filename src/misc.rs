// This file contains miscellaneous functions used by various parts of Haplopurge.

// Copyright 2024 Ryan Wick (rrwick@gmail.com)
// https://github.com/rrwick/Haplopurge

// This file is part of Haplopurge. Haplopurge is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version. Haplopurge
// is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the
// implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General
// Public License for more details. You should have received a copy of the GNU General Public
// License along with Haplopurge. If not, see <http://www.gnu.org/licenses/>.

use indicatif::{ProgressBar, ProgressStyle};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{prelude::*, BufReader};
use std::path::Path;
use std::time::Duration;


pub fn check_if_file_exists(filename: &Path) {
    // Quits with an error if the given path is not an existing file.
    let path = Path::new(filename);
    if !path.exists() {
        quit_with_error(&format!("file does not exist: {}", path.display()));
    }
    if !path.is_file() {
        quit_with_error(&format!("{} is not a file", path.display()));
    }
}


#[cfg(not(test))]
pub fn quit_with_error(text: &str) -> ! {
    // For friendly error messages, this function normally just prints the error and quits.
    eprintln!();
    eprintln!("Error: {}", text);
    std::process::exit(1);
}
#[cfg(test)]
pub fn quit_with_error(text: &str) -> ! {
    // But when running unit tests, this function instead panics so I can catch it for the test.
    panic!("{}", text);
}


pub fn load_file_lines(filename: &Path) -> Vec<String> {
    // Loads a text file (plain or gzipped) into a vector of lines.
    let reader = open_file(filename);
    reader.lines().map(|line_result| {
        line_result.unwrap_or_else(|e| {
            quit_with_error(&format!("failed to read line\n{}", e));
        })
    }).collect()
}


fn open_file(filename: &Path) -> BufReader<Box<dyn Read>> {
    let file = File::open(filename).unwrap_or_else(|e| {
        quit_with_error(&format!("failed to open file {}\n{}", filename.display(), e));
    });
    let reader: Box<dyn Read> = if is_file_gzipped(filename) {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    BufReader::new(reader)
}


fn is_file_gzipped(filename: &Path) -> bool {
    // This function returns true if the file appears to be gzipped (based on the first two bytes)
    // and false if not. If it can't open the file, it will quit with an error message.
    let open_result = File::open(filename);
    match open_result {
        Ok(_)  => (),
        Err(e) => quit_with_error(&format!("unable to open {}\n{}", filename.display(), e)),
    }
    let file = open_result.unwrap();
    let mut reader = BufReader::new(file);
    let mut buf = vec![0u8; 2];
    match reader.read_exact(&mut buf) {
        Ok(_)  => (),
        Err(_) => return false,
    }
    buf[0] == 31 && buf[1] == 139
}


fn complement_base(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'G' => b'C',
        b'C' => b'G',
        b'.' => b'.',
        _ => b'N'
    }
}


pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    let mut rev_seq: Vec<u8> = Vec::with_capacity(seq.len());
    for &b in seq.iter().rev() {
        rev_seq.push(complement_base(b));
    }
    rev_seq
}


pub fn format_float(num: f64) -> String {
    // Formats a float with up to six decimal places but then drops trailing zeros.
    let mut formatted = format!("{:.6}", num);
    if !formatted.contains('.') { return formatted }
    while formatted.ends_with('0') { formatted.pop(); }
    if formatted.ends_with('.') { formatted.pop(); }
    formatted
}


pub fn sign_at_end(num: i32) -> String {
    if num >= 0 {
        format!("{}+", num.abs())
    } else {
        format!("{}-", num.abs())
    }
}


pub fn sign_at_end_vec(nums: &[i32]) -> String {
    nums.iter().map(|&n| sign_at_end(n)).collect::<Vec<_>>().join(",")
}


pub fn spinner(message: &str) -> ProgressBar {
    if cfg!(test) {
        ProgressBar::hidden() // don't show a spinner during unit tests
    } else {
        let pb = ProgressBar::new_spinner();
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_style(
            ProgressStyle::default_spinner()
                .tick_strings(&["⠋", "⠙", "⠚", "⠞", "⠖", "⠦", "⠴", "⠲", "⠳", "⠓"])  // dots3 from github.com/sindresorhus/cli-spinners
                .template("{spinner} {msg}").unwrap(),
        );
        pb.set_message(message.to_string().clone());
        pb
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    use crate::tests::{make_test_file, make_gzipped_test_file};

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement(b"GGTATCACTCAGGAAGC"), b"GCTTCCTGAGTGATACC");
        assert_eq!(reverse_complement(b"XYZ"), b"NNN");
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(0.0), "0");
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(0.111111), "0.111111");
        assert_eq!(format_float(0.1111111), "0.111111");
        assert_eq!(format_float(10.0), "10");
        assert_eq!(format_float(26.5), "26.5");
    }

    #[test]
    fn test_sign_at_end() {
        assert_eq!(sign_at_end(123), "123+".to_string());
        assert_eq!(sign_at_end(-321), "321-".to_string());
    }

    #[test]
    fn test_sign_at_end_vec() {
        assert_eq!(sign_at_end_vec(&[8]), "8+".to_string());
        assert_eq!(sign_at_end_vec(&[123, -321]), "123+,321-".to_string());
        assert_eq!(sign_at_end_vec(&[-4, -5, 67, 34345, 1]), "4-,5-,67+,34345+,1+".to_string());
    }

    #[test]
    fn test_load_file_lines() {
        let dir = tempdir().unwrap();
        let filename = dir.path().join("temp.tsv");

        make_test_file(&filename, "abc\tdef\nghi\n");
        assert_eq!(load_file_lines(&filename), vec!["abc\tdef".to_string(), "ghi".to_string()]);

        make_gzipped_test_file(&filename, "abc\tdef\nghi\n");
        assert_eq!(load_file_lines(&filename), vec!["abc\tdef".to_string(), "ghi".to_string()]);
    }
}
