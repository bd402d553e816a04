// This file defines the Config struct which holds the tunable integer parameters consumed by the
// haplotype-simplification passes.

// Copyright 2024 Ryan Wick (rrwick@gmail.com)
// https://github.com/rrwick/Haplopurge

// This file is part of Haplopurge. Haplopurge is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version. Haplopurge
// is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the
// implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General
// Public License for more details. You should have received a copy of the GNU General Public
// License along with Haplopurge. If not, see <http://www.gnu.org/licenses/>.

use std::collections::HashMap;


pub struct Config {
    values: HashMap<String, i64>,
}

impl Default for Config {
    fn default() -> Self {
        let mut values = HashMap::new();
        values.insert("max_bubble_length".to_string(), 50000);
        Config { values }
    }
}

impl Config {
    pub fn get(&self, key: &str) -> i64 {
        // Looking up a key that was never defined is a programming error, not a user error.
        *self.values.get(key)
            .unwrap_or_else(|| panic!("unknown configuration key: {}", key))
    }

    pub fn set(&mut self, key: &str, value: i64) {
        if !self.values.contains_key(key) {
            panic!("unknown configuration key: {}", key);
        }
        self.values.insert(key.to_string(), value);
    }
}
