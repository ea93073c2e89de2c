//! CardLink CLI - Turn URLs into link preview cards from the command line

mod mcp;

use cardlink::{
    is_url, CardLinker, Conversion, Editor, Position, TextBuffer, FETCH_FAILED_NOTICE, TOOL_LLMTXT,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Output format for card subcommand
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Card callout markup
    #[default]
    Md,
    /// Metadata as JSON
    Json,
}

/// CardLink - link preview cards for markdown notes
#[derive(Parser, Debug)]
#[command(name = "cardlink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,

    /// Custom User-Agent
    #[arg(long, global = true, env = "CARDLINK_USER_AGENT")]
    user_agent: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "CARDLINK_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    /// Only fetch URLs starting with this prefix (repeatable)
    #[arg(long = "allow-prefix", global = true)]
    allow_prefixes: Vec<String>,

    /// Never fetch URLs starting with this prefix (repeatable)
    #[arg(long = "block-prefix", global = true)]
    block_prefixes: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as MCP (Model Context Protocol) server over stdio
    Mcp,
    /// Fetch URL and print its card
    Card {
        /// URL to render
        url: String,

        /// Output format
        #[arg(long, short, default_value = "md")]
        output: OutputFormat,
    },
    /// Paste a card for URL into a file at a position
    Paste {
        /// Markdown file to edit
        file: PathBuf,

        /// URL to paste
        url: String,

        /// Zero-based line to paste at (default: end of file)
        #[arg(long)]
        line: Option<usize>,

        /// Zero-based character within the line
        #[arg(long, default_value_t = 0, requires = "line")]
        ch: usize,

        /// Write the result back to the file instead of stdout
        #[arg(long)]
        in_place: bool,
    },
    /// Replace every line that is only a URL with its card
    Enhance {
        /// Markdown file to edit
        file: PathBuf,

        /// Write the result back to the file instead of stdout
        #[arg(long)]
        in_place: bool,
    },
}

impl Cli {
    fn linker(&self) -> CardLinker {
        let mut builder = CardLinker::builder().timeout(Duration::from_secs(self.timeout_secs));
        if let Some(ref ua) = self.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        for prefix in &self.allow_prefixes {
            builder = builder.allow_prefix(prefix.clone());
        }
        for prefix in &self.block_prefixes {
            builder = builder.block_prefix(prefix.clone());
        }
        builder.build()
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if cli.llmtxt {
        writeln_safe(TOOL_LLMTXT);
        std::process::exit(0);
    }

    let linker = cli.linker();

    match cli.command {
        Some(Commands::Mcp) => {
            mcp::run_server(linker).await;
        }
        Some(Commands::Card { url, output }) => {
            run_card(&linker, &url, output).await;
        }
        Some(Commands::Paste {
            file,
            url,
            line,
            ch,
            in_place,
        }) => {
            let cursor = line.map(|line| Position::new(line, ch));
            run_paste(&linker, &file, &url, cursor, in_place).await;
        }
        Some(Commands::Enhance { file, in_place }) => {
            run_enhance(&linker, &file, in_place).await;
        }
        None => {
            eprintln!("Usage: cardlink card <URL>");
            eprintln!("   or: cardlink paste <FILE> <URL>");
            eprintln!("   or: cardlink enhance <FILE>");
            eprintln!("   or: cardlink mcp");
            eprintln!("   or: cardlink --help");
            std::process::exit(1);
        }
    }
}

/// Log to stderr so stdout only carries cards and MCP frames
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run_card(linker: &CardLinker, url: &str, output: OutputFormat) {
    let meta = match linker.fetch_metadata(url).await {
        Ok(meta) => meta,
        Err(e) => {
            eprintln!("{}: {}", FETCH_FAILED_NOTICE, e);
            std::process::exit(1);
        }
    };

    match output {
        OutputFormat::Md => writeln_safe(&cardlink::render_card(&meta)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&meta).unwrap_or_else(|e| {
                eprintln!("Error serializing metadata: {}", e);
                std::process::exit(1);
            });
            writeln_safe(&json);
        }
    }
}

async fn run_paste(
    linker: &CardLinker,
    file: &Path,
    url: &str,
    cursor: Option<Position>,
    in_place: bool,
) {
    let mut doc = TextBuffer::new(read_file(file));
    if let Some(pos) = cursor {
        doc.set_cursor(pos);
    }

    let conversion = linker.convert_url(&mut doc, url).await;
    report(url, &conversion);

    write_document(file, doc.text(), in_place);
    if !conversion.is_card() {
        std::process::exit(1);
    }
}

async fn run_enhance(linker: &CardLinker, file: &Path, in_place: bool) {
    let mut doc = TextBuffer::new(read_file(file));
    let (converted, failed) = enhance_document(linker, &mut doc).await;

    write_document(file, doc.text(), in_place);
    eprintln!("{} converted, {} failed", converted, failed);
}

/// Convert every URL-only line of `doc`, top to bottom.
/// Returns how many lines became cards and how many failed.
async fn enhance_document(linker: &CardLinker, doc: &mut TextBuffer) -> (usize, usize) {
    let mut converted = 0;
    let mut failed = 0;
    let mut from = 0;

    while let Some((line, url_len)) = next_url_line(doc.text(), from) {
        doc.select(Position::new(line, 0), Position::new(line, url_len));
        let url = doc.selection().trim().to_string();

        match linker.convert_selection(doc).await {
            Ok(conversion) => {
                report(&url, &conversion);
                if conversion.is_card() {
                    converted += 1;
                } else {
                    failed += 1;
                }
            }
            Err(e) => {
                eprintln!("{}: {}", url, e);
                failed += 1;
            }
        }

        // cursor sits after the card, or after the restored URL
        from = doc.cursor().line + 1;
    }

    (converted, failed)
}

/// Find the first line at or after `from` that is only a URL.
/// Returns its index and its length in characters.
fn next_url_line(text: &str, from: usize) -> Option<(usize, usize)> {
    text.lines()
        .enumerate()
        .skip(from)
        .find(|(_, line)| is_url(line))
        .map(|(i, line)| (i, line.chars().count()))
}

fn report(url: &str, conversion: &Conversion) {
    match conversion {
        Conversion::Card { .. } => {}
        Conversion::Reverted { error, .. } => {
            eprintln!("{} ({}): {}", FETCH_FAILED_NOTICE, url, error);
        }
        Conversion::PlaceholderMissing { placeholder } => {
            eprintln!("Placeholder {} not found, document left unchanged", placeholder);
        }
    }
}

fn read_file(file: &Path) -> String {
    std::fs::read_to_string(file).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", file.display(), e);
        std::process::exit(1);
    })
}

fn write_document(file: &Path, text: &str, in_place: bool) {
    if in_place {
        if let Err(e) = std::fs::write(file, text) {
            eprintln!("Error writing {}: {}", file.display(), e);
            std::process::exit(1);
        }
    } else {
        write_safe(text);
    }
}

/// Write a line to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    write_safe(&format!("{}\n", s));
}

/// Write to stdout, exit silently on broken pipe
fn write_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = handle.write_all(s.as_bytes()).and_then(|_| handle.flush()) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cardlink::{CardError, FetchOptions, Fetcher, LinkMetadata};
    use url::Url;

    #[test]
    fn test_next_url_line() {
        let text = "# Title\nhttps://a.example\nsome text https://b.example\n  https://c.example  \n";
        assert_eq!(next_url_line(text, 0), Some((1, 17)));
        assert_eq!(next_url_line(text, 2), Some((3, 21)));
        assert_eq!(next_url_line(text, 4), None);
        assert_eq!(next_url_line("", 0), None);
    }

    /// Card for `ok.test` pages, HTTP 500 for `down.test`
    struct Stub;

    #[async_trait]
    impl Fetcher for Stub {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn matches(&self, url: &Url) -> bool {
            url.host_str().is_some_and(|h| h.ends_with(".test"))
        }

        async fn fetch(
            &self,
            raw: &str,
            url: &Url,
            _options: &FetchOptions,
        ) -> Result<LinkMetadata, CardError> {
            if url.host_str() == Some("down.test") {
                return Err(CardError::BadStatus(500));
            }
            Ok(LinkMetadata::new(raw, url.path()))
        }
    }

    #[tokio::test]
    async fn test_enhance_document() {
        let linker = CardLinker::builder().fetcher(Box::new(Stub)).build();
        let mut doc = TextBuffer::new(
            "# Links\nhttps://ok.test/a\nhttps://down.test/b\nhttps://ok.test/c\nsee https://ok.test/d\n",
        );

        let (converted, failed) = enhance_document(&linker, &mut doc).await;

        assert_eq!((converted, failed), (2, 1));
        assert_eq!(
            doc.text(),
            "# Links\n\
\n> [!card-link] [](https://ok.test/a)\n> ### [/a](https://ok.test/a)\n\n\
https://down.test/b\n\
\n> [!card-link] [](https://ok.test/c)\n> ### [/c](https://ok.test/c)\n\n\
see https://ok.test/d\n"
        );
    }

    #[tokio::test]
    async fn test_enhance_document_without_urls() {
        let linker = CardLinker::builder().fetcher(Box::new(Stub)).build();
        let mut doc = TextBuffer::new("just text\nHTTPS://ok.test/upper\n");

        assert_eq!(enhance_document(&linker, &mut doc).await, (0, 0));
        assert_eq!(doc.text(), "just text\nHTTPS://ok.test/upper\n");
    }

    #[test]
    fn test_cli_ch_requires_line() {
        let result = Cli::try_parse_from([
            "cardlink",
            "paste",
            "notes.md",
            "https://example.com",
            "--ch",
            "2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parses_paste() {
        let cli = Cli::try_parse_from([
            "cardlink",
            "paste",
            "notes.md",
            "https://example.com",
            "--line",
            "3",
            "--ch",
            "2",
            "--block-prefix",
            "http://localhost",
        ])
        .unwrap();

        assert_eq!(cli.block_prefixes, vec!["http://localhost"]);
        match cli.command {
            Some(Commands::Paste {
                file,
                url,
                line,
                ch,
                in_place,
            }) => {
                assert_eq!(file, PathBuf::from("notes.md"));
                assert_eq!(url, "https://example.com");
                assert_eq!(line, Some(3));
                assert_eq!(ch, 2);
                assert!(!in_place);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_cli_linker_options() {
        let cli = Cli::try_parse_from([
            "cardlink",
            "--timeout-secs",
            "3",
            "--user-agent",
            "Test/1.0",
            "card",
            "https://example.com",
            "-o",
            "json",
        ])
        .unwrap();

        let linker = cli.linker();
        assert_eq!(linker.options().timeout, Duration::from_secs(3));
        assert_eq!(linker.options().user_agent.as_deref(), Some("Test/1.0"));
        assert!(matches!(
            cli.command,
            Some(Commands::Card {
                output: OutputFormat::Json,
                ..
            })
        ));
    }
}
