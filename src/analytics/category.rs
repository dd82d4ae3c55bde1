// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Data,
    Utilities,
    Other,
}

/// Keyword table, checked top to bottom. The first category with a keyword
/// contained in the label wins.
pub const KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Food,
        &[
            "food",
            "lunch",
            "dinner",
            "breakfast",
            "snacks",
            "bread",
            "rice",
            "fish",
            "milk",
            "soup",
            "pear",
            "ice",
        ],
    ),
    (
        Category::Transport,
        &["transport", "fuel", "taxi", "bus", "uber"],
    ),
    (Category::Data, &["data", "airtime", "internet"]),
    (
        Category::Utilities,
        &["electricity", "water", "gas", "phone"],
    ),
];

static MATCHERS: Lazy<Vec<(Category, Regex)>> = Lazy::new(|| {
    KEYWORDS
        .iter()
        .filter_map(|(cat, words)| {
            let alternation = words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            RegexBuilder::new(&alternation)
                .case_insensitive(true)
                .build()
                .ok()
                .map(|re| (*cat, re))
        })
        .collect()
});

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Transport,
        Category::Data,
        Category::Utilities,
        Category::Other,
    ];

    pub fn classify(label: &str) -> Category {
        MATCHERS
            .iter()
            .find(|(_, re)| re.is_match(label))
            .map(|(cat, _)| *cat)
            .unwrap_or(Category::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Data => "Data",
            Category::Utilities => "Utilities",
            Category::Other => "Other",
        }
    }

    /// Lower-case key used for category budgets in the settings store.
    pub fn key(&self) -> String {
        self.as_str().to_lowercase()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("Unknown category '{}'", s))
    }
}

/// Capitalises a backend category name (`"food"` -> `"Food"`).
pub fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "N/A".to_string(),
    }
}
