//! paperparse CLI - academic PDF structure recovery

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use paperparse::{
    is_pdf_bytes, list_tools, Envelope, Error, ErrorMode, JsonFormat, PdfSource, PdfTools, ToolCall,
    ToolConfig,
};

type CliResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "paperparse")]
#[command(version)]
#[command(about = "Recover text, sections, tables and references from academic PDFs", long_about = None)]
struct Cli {
    /// Remote fetch timeout in seconds
    #[arg(long, global = true, env = "PAPERPARSE_FETCH_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Detect tables on one thread
    #[arg(long, global = true, env = "PAPERPARSE_SEQUENTIAL")]
    sequential: bool,

    /// Fail when any page cannot be decoded
    #[arg(long, global = true)]
    strict: bool,

    /// Print compact JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract page text and metadata
    Text {
        /// PDF file, URL, or base64 payload
        #[arg(value_name = "INPUT")]
        input: String,
    },

    /// Extract tables
    Tables {
        /// PDF file, URL, or base64 payload
        #[arg(value_name = "INPUT")]
        input: String,
    },

    /// Detect section headings
    Sections {
        /// Text file, PDF file, or `-` for stdin
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Parse the references section
    #[command(alias = "refs")]
    References {
        /// Text file, PDF file, or `-` for stdin
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show document information
    Info {
        /// PDF file, URL, or base64 payload
        #[arg(value_name = "INPUT")]
        input: String,
    },

    /// List the tools and their input schemas
    Tools,

    /// Answer one JSON tool call per stdin line
    Serve,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let format = if cli.compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let result = match tools_for(&cli) {
        Ok(tools) => run(&tools, cli.command, format).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn tools_for(cli: &Cli) -> CliResult<PdfTools> {
    let mode = if cli.strict {
        ErrorMode::Strict
    } else {
        ErrorMode::Lenient
    };
    let mut config = ToolConfig::new()
        .with_fetch_timeout(Duration::from_secs(cli.timeout))
        .with_error_mode(mode);
    if cli.sequential {
        config = config.sequential();
    }
    Ok(PdfTools::new(config)?)
}

/// Run a command; `Ok(false)` means a failure envelope was printed.
async fn run(tools: &PdfTools, command: Commands, format: JsonFormat) -> CliResult<bool> {
    match command {
        Commands::Text { input } => {
            let envelope = tools.pdf_to_text_from(pdf_source(&input)?).await;
            emit(&envelope, format)
        }
        Commands::Tables { input } => {
            let envelope = tools.extract_tables_from(pdf_source(&input)?).await;
            emit(&envelope, format)
        }
        Commands::Sections { input } => match document_text(tools, &input)? {
            DocumentText::Text(text) => emit(&tools.extract_sections(&text), format),
            DocumentText::Failed(envelope) => emit(&envelope, format),
        },
        Commands::References { input } => match document_text(tools, &input)? {
            DocumentText::Text(text) => emit(&tools.extract_references(&text), format),
            DocumentText::Failed(envelope) => emit(&envelope, format),
        },
        Commands::Info { input } => cmd_info(tools, &input).await,
        Commands::Tools => {
            let listing = Value::Array(list_tools());
            let json = match format {
                JsonFormat::Pretty => serde_json::to_string_pretty(&listing)?,
                JsonFormat::Compact => serde_json::to_string(&listing)?,
            };
            println!("{}", json);
            Ok(true)
        }
        Commands::Serve => {
            cmd_serve(tools).await?;
            Ok(true)
        }
        Commands::Version => {
            cmd_version();
            Ok(true)
        }
    }
}

/// Print an envelope on stdout and its warnings or error on stderr.
fn emit<T: serde::Serialize>(envelope: &Envelope<T>, format: JsonFormat) -> CliResult<bool> {
    println!("{}", envelope.to_json(format)?);

    for warning in envelope.warnings() {
        eprintln!("{}: {}", "warning".yellow().bold(), warning);
    }
    if let Some(error) = envelope.error() {
        eprintln!("{} [{}]: {}", "Error".red().bold(), error.code, error.message);
    }
    Ok(envelope.is_ok())
}

/// A local file becomes raw bytes; anything else is a URL or base64.
fn pdf_source(input: &str) -> CliResult<PdfSource> {
    let source = PdfSource::parse(input);
    if source.url().is_some() || !Path::new(input).is_file() {
        return Ok(source);
    }

    let source = PdfSource::from_file(input)?;
    if let PdfSource::Bytes(bytes) = &source {
        if !is_pdf_bytes(bytes) {
            log::warn!("{} has no PDF header", input);
        }
    }
    Ok(source)
}

enum DocumentText {
    Text(String),
    Failed(Envelope<paperparse::TextPayload>),
}

/// Text for the text-analysis tools. PDF files are run through text extraction first.
fn document_text(tools: &PdfTools, input: &Path) -> CliResult<DocumentText> {
    let bytes = if input == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        std::fs::read(input)?
    };

    if !is_pdf_bytes(&bytes) {
        return Ok(DocumentText::Text(String::from_utf8_lossy(&bytes).into_owned()));
    }

    log::info!("{} is a PDF; extracting text first", input.display());
    let envelope = tools.text_from_bytes(&bytes);
    match envelope.data() {
        Some(data) => Ok(DocumentText::Text(data.text.clone())),
        None => Ok(DocumentText::Failed(envelope)),
    }
}

async fn cmd_info(tools: &PdfTools, input: &str) -> CliResult<bool> {
    let envelope = tools.pdf_to_text_from(pdf_source(input)?).await;
    let Some(data) = envelope.data() else {
        return emit(&envelope, JsonFormat::Pretty);
    };

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Input".bold(), abbreviate(input));
    println!("{}: {}", "Pages".bold(), data.page_count);
    println!("{}: {}", "Characters".bold(), data.text.chars().count());

    let meta = &data.metadata;
    for (label, value) in [
        ("Title", &meta.title),
        ("Author", &meta.author),
        ("Subject", &meta.subject),
        ("Creator", &meta.creator),
        ("Producer", &meta.producer),
    ] {
        if let Some(value) = value {
            println!("{}: {}", label.bold(), value);
        }
    }

    let sections = tools.extract_sections(&data.text);
    if let Some(outline) = sections.data() {
        println!(
            "{}: {} ({})",
            "Sections".bold(),
            outline.section_count,
            outline.heading_style
        );
    }
    let references = tools.extract_references(&data.text);
    if let Some(refs) = references.data() {
        println!(
            "{}: {} ({})",
            "References".bold(),
            refs.reference_count,
            refs.citation_style
        );
    }

    for warning in envelope.warnings() {
        println!("{}: {}", "Warning".yellow().bold(), warning);
    }
    Ok(true)
}

/// Base64 payloads are long; show only their head.
fn abbreviate(input: &str) -> String {
    const MAX: usize = 60;
    if input.chars().count() <= MAX {
        input.to_string()
    } else {
        format!("{}...", input.chars().take(MAX).collect::<String>())
    }
}

async fn cmd_serve(tools: &PdfTools) -> CliResult<()> {
    let config = tools.config();
    log::info!(
        "serving {} tools on stdio (fetch timeout {:?}, {:?} mode)",
        list_tools().len(),
        config.fetch_timeout,
        config.error_mode
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<ToolCall>(line) {
            Ok(call) => tools.call(&call.tool, &call.arguments).await,
            Err(e) => {
                log::warn!("malformed request: {}", e);
                Envelope::<()>::from_error(Error::InvalidRequest(format!(
                    "Malformed request: {}",
                    e
                )))
                .into_value()
            }
        };

        let mut out = serde_json::to_string(&response)?;
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "paperparse".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Academic PDF structure recovery");
    println!();
    println!(
        "Tools: {}",
        list_tools()
            .iter()
            .filter_map(|t| t["name"].as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_pdf_source_prefers_local_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.4\n").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        assert_eq!(
            pdf_source(&path).unwrap(),
            PdfSource::Bytes(b"%PDF-1.4\n".to_vec())
        );
        assert!(pdf_source("https://example.com/a.pdf").unwrap().url().is_some());
        assert_eq!(
            pdf_source("JVBERi0xLjc=").unwrap(),
            PdfSource::Base64("JVBERi0xLjc=".to_string())
        );
    }

    #[test]
    fn test_document_text_reads_plain_files() {
        let tools = PdfTools::new(ToolConfig::default()).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"1. Introduction\nHello\n").unwrap();

        match document_text(&tools, file.path()).unwrap() {
            DocumentText::Text(text) => assert_eq!(text, "1. Introduction\nHello\n"),
            DocumentText::Failed(_) => panic!("plain text should not go through PDF decoding"),
        }
    }

    #[test]
    fn test_document_text_reports_broken_pdf() {
        let tools = PdfTools::new(ToolConfig::default()).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.7\n1 0 obj\n<<").unwrap();

        match document_text(&tools, file.path()).unwrap() {
            DocumentText::Failed(envelope) => assert!(!envelope.is_ok()),
            DocumentText::Text(_) => panic!("truncated PDF should fail"),
        }
    }

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate("short"), "short");
        let long = "A".repeat(100);
        assert_eq!(abbreviate(&long).len(), 63);
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from(["paperparse", "--compact", "tables", "x", "--timeout", "5"])
            .unwrap();
        assert!(cli.compact);
        assert_eq!(cli.timeout, 5);
        assert!(matches!(cli.command, Commands::Tables { .. }));
    }

    #[test]
    fn test_tools_for_applies_flags() {
        let cli = Cli::try_parse_from(["paperparse", "--strict", "--sequential", "tools"]).unwrap();
        let tools = tools_for(&cli).unwrap();
        assert_eq!(tools.config().error_mode, ErrorMode::Strict);
        assert!(!tools.config().parallel);

        let cli = Cli::try_parse_from(["paperparse", "tools"]).unwrap();
        assert_eq!(tools_for(&cli).unwrap().config().error_mode, ErrorMode::Lenient);
    }
}
