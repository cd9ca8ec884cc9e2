//! `ocr-terms`: search page-text files for OCR-tolerant term matches.
//!
//! Each input file is one page. Pages are split into word windows, searched
//! in parallel, and written to stdout as one JSON row per chunk.

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use rust_ocr_terms::{ChunkRow, PageMeta, Settings, TermSearchEngine, chunk_by_words};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ocr-terms", version, about = "OCR-tolerant term search over newspaper page text")]
struct Cli {
    /// Page text files, one page each (reads stdin when omitted)
    files: Vec<PathBuf>,

    /// TOML settings file with terms, chunk_words and bounds
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Search term; repeat for several. Replaces terms from the config file
    #[arg(short = 't', long = "term")]
    terms: Vec<String>,

    /// Words per chunk
    #[arg(long)]
    chunk_words: Option<usize>,

    /// Item identifier (defaults to the file stem)
    #[arg(long)]
    item_id: Option<String>,

    #[arg(long, default_value = "")]
    publisher: String,

    #[arg(long, default_value = "")]
    title: String,

    /// Publication date as given by the archive
    #[arg(long, default_value = "")]
    pub_date: String,

    /// Page number of the first file
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Only print chunks where at least one term matched
    #[arg(long)]
    hits_only: bool,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Errors only
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with_writer(io::stderr)
        .init();

    let settings = resolve_settings(&cli)?;
    let engine = TermSearchEngine::from_settings(&settings).context("failed to compile search terms")?;
    info!(terms = engine.term_count(), chunk_words = settings.chunk_words, "engine ready");

    let sources: Vec<Option<&Path>> = if cli.files.is_empty() {
        vec![None]
    } else {
        cli.files.iter().map(|p| Some(p.as_path())).collect()
    };

    let mut out = BufWriter::new(io::stdout().lock());
    let mut total = PageStats::default();

    for (offset, source) in sources.into_iter().enumerate() {
        let text = read_page(source)?;
        let meta = page_meta(&cli, page_name(source), offset);
        let stats = write_page(&mut out, &engine, &meta, &text, settings.chunk_words, cli.hits_only)?;
        debug!(item = %meta.item_id, page = meta.page_num, chunks = stats.chunks, hits = stats.hits, "page searched");
        total.chunks += stats.chunks;
        total.hits += stats.hits;
    }
    out.flush()?;

    info!(chunks = total.chunks, hits = total.hits, "search finished");
    Ok(())
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct PageStats {
    chunks: usize,
    hits: usize,
}

/// Row metadata for the page at `offset` in the input list.
fn page_meta(cli: &Cli, name: String, offset: usize) -> PageMeta {
    PageMeta {
        item_id: cli.item_id.clone().unwrap_or(name),
        publisher: cli.publisher.clone(),
        title: cli.title.clone(),
        pub_date: cli.pub_date.clone(),
        page_num: cli.page.saturating_add(u32::try_from(offset).unwrap_or(u32::MAX)),
    }
}

/// Chunk one page, search it, and write one JSON line per reported chunk.
fn write_page<W: Write>(
    out: &mut W,
    engine: &TermSearchEngine,
    meta: &PageMeta,
    text: &str,
    chunk_words: usize,
    hits_only: bool,
) -> Result<PageStats> {
    let chunks = chunk_by_words(text, chunk_words);
    let results = engine.search_batch(&chunks);
    let mut stats = PageStats {
        chunks: chunks.len(),
        hits: 0,
    };

    for (chunk, result) in chunks.iter().zip(&results) {
        if result.success() {
            stats.hits += 1;
        } else if hits_only {
            continue;
        }
        serde_json::to_writer(&mut *out, &ChunkRow::new(meta, chunk, result))?;
        out.write_all(b"\n")?;
    }
    Ok(stats)
}

/// Settings file, then command-line overrides.
fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Settings::default(),
    };
    if !cli.terms.is_empty() {
        settings.terms = cli.terms.clone();
    }
    if let Some(words) = cli.chunk_words {
        settings.chunk_words = words;
    }
    settings.validate()?;
    if settings.terms.is_empty() {
        bail!("no search terms: pass --term or a config file with `terms`");
    }
    Ok(settings)
}

/// File stem of the page, or `stdin`.
fn page_name(source: Option<&Path>) -> String {
    match source {
        Some(path) => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
        None => "stdin".to_string(),
    }
}

/// Page text from a file, or from stdin for `None`.
fn read_page(source: Option<&Path>) -> Result<String> {
    match source {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).context("reading stdin")?;
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("ocr-terms").chain(args.iter().copied()))
    }

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_config_terms_used_without_overrides() {
        let file = config_file("terms = [\"Anarchismus\", \"Revolution\"]\nchunk_words = 50\n");
        let cli = parse(&["--config", file.path().to_str().unwrap()]);
        let settings = resolve_settings(&cli).unwrap();
        assert_eq!(settings.terms, ["Anarchismus", "Revolution"]);
        assert_eq!(settings.chunk_words, 50);
    }

    #[test]
    fn test_term_flags_replace_config_terms() {
        let file = config_file("terms = [\"Anarchismus\", \"Revolution\"]\n");
        let cli = parse(&[
            "--config",
            file.path().to_str().unwrap(),
            "-t",
            "Kommunist",
            "--term",
            "Terrorismus",
            "--chunk-words",
            "7",
        ]);
        let settings = resolve_settings(&cli).unwrap();
        assert_eq!(settings.terms, ["Kommunist", "Terrorismus"]);
        assert_eq!(settings.chunk_words, 7);
    }

    #[test]
    fn test_empty_vocabulary_is_an_error() {
        assert!(resolve_settings(&parse(&[])).is_err());

        let file = config_file("terms = []\n");
        let cli = parse(&["--config", file.path().to_str().unwrap()]);
        let err = resolve_settings(&cli).unwrap_err();
        assert!(err.to_string().contains("no search terms"), "{err}");
    }

    #[test]
    fn test_invalid_chunk_words_rejected() {
        let cli = parse(&["-t", "Revolution", "--chunk-words", "0"]);
        assert!(resolve_settings(&cli).is_err());
    }

    #[test]
    fn test_page_num_starts_at_page_flag_and_increments() {
        let cli = parse(&["-t", "Revolution", "--page", "4", "a.txt", "b.txt", "c.txt"]);
        let nums: Vec<u32> = (0..cli.files.len())
            .map(|offset| page_meta(&cli, page_name(Some(cli.files[offset].as_path())), offset).page_num)
            .collect();
        assert_eq!(nums, [4, 5, 6]);
        assert_eq!(page_meta(&parse(&["-t", "x"]), "stdin".into(), 0).page_num, 1);
    }

    #[test]
    fn test_item_id_defaults_to_file_stem_or_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zeitung_1848-03-18.txt");
        fs::write(&path, "Revolution in Berlin").unwrap();

        let cli = parse(&["-t", "Revolution"]);
        assert_eq!(page_name(Some(path.as_path())), "zeitung_1848-03-18");
        assert_eq!(page_meta(&cli, page_name(Some(path.as_path())), 0).item_id, "zeitung_1848-03-18");
        assert_eq!(page_meta(&cli, page_name(None), 0).item_id, "stdin");
        assert_eq!(read_page(Some(path.as_path())).unwrap(), "Revolution in Berlin");

        let cli = parse(&["-t", "Revolution", "--item-id", "item-42"]);
        assert_eq!(page_meta(&cli, page_name(Some(path.as_path())), 0).item_id, "item-42");
    }

    #[test]
    fn test_write_page_emits_one_row_per_chunk() {
        let cli = parse(&["-t", "Revolution", "--publisher", "Vossische Zeitung", "--page", "2"]);
        let engine = TermSearchEngine::new(["Revolution"]).unwrap();
        let meta = page_meta(&cli, "page".into(), 0);

        let mut out = Vec::new();
        let text = "Die Revolution siegt. Heute regnet es.";
        let stats = write_page(&mut out, &engine, &meta, text, 3, false).unwrap();
        assert_eq!(stats, PageStats { chunks: 2, hits: 1 });

        let rows: Vec<serde_json::Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["chunk"], "Die Revolution siegt.");
        assert_eq!(rows[0]["success"], true);
        assert_eq!(rows[0]["word1"], serde_json::json!(["Revolution"]));
        assert_eq!(rows[0]["publisher"], "Vossische Zeitung");
        assert_eq!(rows[0]["page_num"], 2);
        assert_eq!(rows[1]["success"], false);
    }

    #[test]
    fn test_write_page_hits_only() {
        let cli = parse(&["-t", "Revolution"]);
        let engine = TermSearchEngine::new(["Revolution"]).unwrap();
        let meta = page_meta(&cli, "page".into(), 0);

        let mut out = Vec::new();
        let text = "Die Revolution siegt. Heute regnet es.";
        let stats = write_page(&mut out, &engine, &meta, text, 3, true).unwrap();
        assert_eq!(stats, PageStats { chunks: 2, hits: 1 });

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("\"chunk\":\"Die Revolution siegt.\""), "{text}");
    }
}
