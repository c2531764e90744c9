//! Text rendering of the aggregated summary

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::types::{IgnoreSet, LanguageEntry, TallySummary};

/// Cells in each language's proportional bar
pub const BAR_WIDTH: usize = 20;

const TITLE: &str = "Coding activity";

/// Glyph for languages missing from the emoji table
const DEFAULT_EMOJI: &str = "💻";

/// Format seconds as a compact duration: "1d 2h 3m", "45m", "30s".
/// Seconds are only shown when the duration is under a minute.
pub fn format_duration(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let mins = (seconds % 3_600) / 60;

    let parts: Vec<String> = [(days, "d"), (hours, "h"), (mins, "m")]
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect();

    if parts.is_empty() {
        format!("{}s", seconds)
    } else {
        parts.join(" ")
    }
}

/// Format a percentage bar with filled/empty blocks
/// Example: 50.0% with width 10 → "█████░░░░░"
pub fn format_percentage_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Emoji for a language name (exact match)
pub fn language_emoji(name: &str) -> &'static str {
    match name {
        "Rust" => "🦀",
        "Python" => "🐍",
        "Go" => "🐹",
        "JavaScript" => "🟨",
        "TypeScript" => "🔷",
        "Java" => "☕",
        "Kotlin" => "🟣",
        "Swift" => "🐦",
        "Ruby" => "💎",
        "PHP" => "🐘",
        "C" => "🔧",
        "C++" => "⚙️",
        "C#" => "🎯",
        "Haskell" => "λ",
        "Elixir" => "💧",
        "Erlang" => "📡",
        "Scala" => "🔺",
        "Dart" => "🎯",
        "Lua" => "🌙",
        "R" => "📈",
        "Julia" => "🔬",
        "Zig" => "⚡",
        "Nix" => "❄️",
        "HTML" => "🌐",
        "CSS" | "SCSS" | "Sass" => "🎨",
        "Vue.js" => "💚",
        "Svelte" => "🧡",
        "SQL" => "🗃️",
        "Bash" | "Shell Script" | "Zsh" | "Fish" => "🐚",
        "PowerShell" => "🖥️",
        "Markdown" => "📝",
        "JSON" | "YAML" | "TOML" | "INI" => "🧾",
        "Docker" | "Dockerfile" => "🐳",
        "Makefile" => "🛠️",
        "Terraform" | "HCL" => "🏗️",
        "Vim script" => "📗",
        "Emacs Lisp" => "📘",
        "Git" | "Git Config" => "🌿",
        "Text" => "📄",
        _ => DEFAULT_EMOJI,
    }
}

/// "last_7_days" → "Last 7 Days"
pub fn humanize_range_label(label: &str) -> String {
    label
        .split(|c: char| c == '_' || c == '-' || c == ' ')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders a [`TallySummary`] into the README block
#[derive(Debug, Clone)]
pub struct Renderer {
    top_n: usize,
    ignore: IgnoreSet,
    range_label: String,
}

impl Renderer {
    /// `top_n == 0` keeps every language
    pub fn new(top_n: usize, ignore: IgnoreSet, range_label: impl Into<String>) -> Self {
        Self {
            top_n,
            ignore,
            range_label: range_label.into(),
        }
    }

    /// Filtered, ranked and truncated languages with their percentages
    pub fn entries(&self, summary: &TallySummary) -> Vec<LanguageEntry> {
        let grand_total = summary.grand_total_seconds as f64;

        let mut entries: Vec<LanguageEntry> = summary
            .languages
            .iter()
            .filter(|lang| !self.ignore.contains(&lang.name))
            .map(|lang| {
                let percent = if grand_total > 0.0 {
                    lang.total_seconds / grand_total * 100.0
                } else {
                    0.0
                };
                LanguageEntry {
                    name: lang.name.clone(),
                    total_seconds: lang.total_seconds,
                    percent,
                    display_text: format_duration(lang.total_seconds.max(0.0).round() as u64),
                }
            })
            .collect();

        // Stable: ties keep first-encounter order
        entries.sort_by(|a, b| {
            b.total_seconds
                .partial_cmp(&a.total_seconds)
                .unwrap_or(Ordering::Equal)
        });

        if self.top_n > 0 {
            entries.truncate(self.top_n);
        }
        entries
    }

    /// Range line for the stored span, or the configured label when empty
    pub fn range_line(&self, span: Option<(NaiveDate, NaiveDate)>) -> String {
        match span {
            Some((first, last)) => format!(
                "From: {} - To: {}",
                first.format("%B %d, %Y"),
                last.format("%B %d, %Y")
            ),
            None => format!("Range: {}", humanize_range_label(&self.range_label)),
        }
    }

    /// Title, range, blank, total, blank, one line per language
    pub fn render(&self, summary: &TallySummary, span: Option<(NaiveDate, NaiveDate)>) -> String {
        let entries = self.entries(summary);

        let mut lines = vec![
            TITLE.to_string(),
            self.range_line(span),
            String::new(),
            format!(
                "Total time: {}",
                format_duration(summary.grand_total_seconds)
            ),
            String::new(),
        ];

        if entries.is_empty() {
            lines.push("No activity recorded yet.".to_string());
        }

        let name_width = entries
            .iter()
            .map(|e| e.name.chars().count())
            .max()
            .unwrap_or(0);
        let time_width = entries
            .iter()
            .map(|e| e.display_text.chars().count())
            .max()
            .unwrap_or(0);

        for entry in &entries {
            lines.push(format!(
                "{} {:<name_width$}  {:<time_width$}  {}  {:>6.2}%",
                language_emoji(&entry.name),
                entry.name,
                entry.display_text,
                format_percentage_bar(entry.percent, BAR_WIDTH),
                entry.percent,
            ));
        }

        lines.join("\n")
    }
}
