// This file contains functions for displaying nicely formatted messages to stderr.

// Copyright 2024 Ryan Wick (rrwick@gmail.com)
// https://github.com/rrwick/Haplopurge

// This file is part of Haplopurge. Haplopurge is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version. Haplopurge
// is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the
// implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General
// Public License for more details. You should have received a copy of the GNU General Public
// License along with Haplopurge. If not, see <http://www.gnu.org/licenses/>.

use colored::Colorize;


const WRAP_WIDTH: usize = 80;


pub fn section_header(text: &str) {
    eprintln!();
    eprintln!("{}", text.bold().bright_yellow().underline());
}


pub fn explanation(text: &str) {
    // Prints a dimmed explanatory paragraph, wrapped to a fixed width.
    for line in wrap_text(text, WRAP_WIDTH) {
        eprintln!("{}", line.dimmed());
    }
    eprintln!();
}


fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("short line", 80), vec!["short line".to_string()]);
        assert_eq!(wrap_text("a b c d", 3), vec!["a b".to_string(), "c d".to_string()]);
        assert_eq!(wrap_text("", 80), Vec::<String>::new());
        assert_eq!(wrap_text("   spaced    out   words ", 80),
                   vec!["spaced out words".to_string()]);
    }
}
