use colored::Colorize;
use serde::Serialize;

use crate::build_info;
use crate::error::Result;
use crate::model::{Article, ArticleRedirect, Crash, RecordKind, Text};
use crate::output::{Format, print_row, summary_line};
use crate::parse::{parse_articles, parse_crashes, parse_texts};
use crate::redirect::extract_redirects;
use crate::renumber::{IdMapEntry, renumber_texts};
use crate::serialize;
use crate::store::blobs::{BlobSummary, copy_text_blobs, relocate_crash_blobs};
use crate::store::files::{read_required, write_atomic};
use crate::store::layout::Layout;
use crate::verify::verify_versions;

/// Parsed, verified and renumbered records, ready to be written out.
#[derive(Debug)]
pub struct Dataset {
    pub texts: Vec<Text>,
    pub articles: Vec<Article>,
    pub crashes: Vec<Crash>,
    pub redirects: Vec<ArticleRedirect>,
    pub id_map: Vec<IdMapEntry>,
}

#[derive(Debug, Serialize)]
pub struct MigrationReport {
    pub dry_run: bool,
    pub src_root: String,
    pub dst_root: String,
    pub texts: usize,
    pub articles: usize,
    pub redirects: usize,
    pub crashes: usize,
    /// Texts whose legacy id differs from the dense one.
    pub texts_renumbered: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_blobs: Option<BlobSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crash_blobs: Option<BlobSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_git_sha: Option<&'static str>,
}

impl MigrationReport {
    fn new(layout: &Layout, dataset: &Dataset, dry_run: bool) -> Self {
        Self {
            dry_run,
            src_root: layout.src_root().display().to_string(),
            dst_root: layout.dst_root().display().to_string(),
            texts: dataset.texts.len(),
            articles: dataset.articles.len(),
            redirects: dataset.redirects.len(),
            crashes: dataset.crashes.len(),
            texts_renumbered: dataset
                .id_map
                .iter()
                .filter(|entry| entry.old_id != entry.new_id)
                .count(),
            text_blobs: None,
            crash_blobs: None,
            outputs: Vec::new(),
            build_git_sha: build_info::git_sha(),
        }
    }

    pub fn summary(&self) -> String {
        summary_line(self.texts, self.articles, self.redirects, self.crashes)
    }
}

/// Parse all three dumps, verify references, renumber texts and derive
/// redirects. Nothing is written.
pub fn load(layout: &Layout) -> Result<Dataset> {
    let mut texts = parse_texts(&read_required(&layout.source_dump(RecordKind::Text))?)?;
    let mut articles =
        parse_articles(&read_required(&layout.source_dump(RecordKind::Article))?)?;
    let crashes = parse_crashes(&read_required(&layout.source_dump(RecordKind::Crash))?)?;
    tracing::info!(
        texts = texts.len(),
        articles = articles.len(),
        crashes = crashes.len(),
        "parsed legacy dumps"
    );

    verify_versions(&texts, &articles)?;
    let id_map = renumber_texts(&mut texts, &mut articles)?;
    let redirects = extract_redirects(&articles);

    Ok(Dataset {
        texts,
        articles,
        crashes,
        redirects,
        id_map,
    })
}

/// Run the whole migration. The first error aborts before any data file is
/// written; blobs relocated before the failure stay in place and are skipped
/// on the next run.
pub fn migrate(layout: &Layout) -> Result<MigrationReport> {
    let mut dataset = load(layout)?;

    let blog_data = serialize::blog_data(&dataset.texts, &dataset.articles);
    // Relocation rewrites crash hashes, so it has to happen before crashes are serialized.
    let crash_blobs = relocate_crash_blobs(layout, &mut dataset.crashes)?;
    let crashes_data = serialize::crashes_data(&dataset.crashes);
    let redirects_data = serialize::redirects_data(&dataset.redirects);
    let text_blobs = copy_text_blobs(layout, &dataset.texts)?;

    let outputs = [
        (layout.blog_data_path(), blog_data),
        (layout.redirects_path(), redirects_data),
        (layout.crashes_data_path(), crashes_data),
    ];
    for (path, contents) in &outputs {
        write_atomic(path, contents.as_bytes())?;
        tracing::info!(path = %path.display(), bytes = contents.len(), "wrote data file");
    }

    let mut report = MigrationReport::new(layout, &dataset, false);
    report.text_blobs = Some(text_blobs);
    report.crash_blobs = Some(crash_blobs);
    report.outputs = outputs
        .iter()
        .map(|(path, _)| path.display().to_string())
        .collect();
    Ok(report)
}

/// Dry run: everything [`migrate`] checks, without touching the destination.
pub fn check(layout: &Layout) -> Result<MigrationReport> {
    let dataset = load(layout)?;
    Ok(MigrationReport::new(layout, &dataset, true))
}

pub fn run(layout: &Layout, dry_run: bool, format: Format) -> Result<()> {
    let report = if dry_run {
        check(layout)?
    } else {
        migrate(layout)?
    };
    print_report(&report, format)
}

fn print_blob_row(label: &str, summary: Option<&BlobSummary>) {
    if let Some(summary) = summary {
        print_row(
            label,
            format!(
                "{} written, {} already present",
                summary.written, summary.skipped
            ),
        );
    }
}

fn print_report(report: &MigrationReport, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(report)?),
        Format::Pretty => {
            let mode = if report.dry_run { "check" } else { "migrate" };
            println!("{} {}", "blogimport".bold(), format!("({mode})").dimmed());
            print_row("source", &report.src_root);
            print_row("destination", &report.dst_root);
            print_row("texts", report.texts);
            print_row("texts renumbered", report.texts_renumbered);
            print_row("articles", report.articles);
            print_row("redirects", report.redirects);
            print_row("crashes", report.crashes);
            print_blob_row("text blobs", report.text_blobs.as_ref());
            print_blob_row("crash blobs", report.crash_blobs.as_ref());
            for output in &report.outputs {
                print_row("wrote", output);
            }
            if let Some(sha) = build_info::short_git_sha() {
                print_row("build", sha);
            }
            if report.dry_run {
                println!("\n{}", "Check passed; no files were written.".green());
            } else {
                println!("\n{}", report.summary().green().bold());
            }
        }
        Format::Minimal => println!("{}", report.summary()),
    }
    Ok(())
}
