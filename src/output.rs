use clap::ValueEnum;
use colored::Colorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
    Minimal,
}

/// `label: value` row with a dimmed label, as used by the pretty reports.
pub fn print_row(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", format!("{label}:").dimmed(), value);
}

/// `<n> texts, <n> articles, <n> redirects, <n> crashes`
pub fn summary_line(texts: usize, articles: usize, redirects: usize, crashes: usize) -> String {
    format!("{texts} texts, {articles} articles, {redirects} redirects, {crashes} crashes")
}
