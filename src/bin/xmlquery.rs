//! xmlquery -- parse XML/HTML files, run `XPath` queries, print results.
//!
//! A small front end over the xmlhandle wrappers, modeled on `xmllint`.

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use clap::Parser;
use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use xmlhandle::{
    Document, HtmlDocument, Library, NodeRef, ParseOptions, XPathValue, XmlDocument,
};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// xmlquery -- parse XML/HTML files and evaluate `XPath` expressions.
#[derive(Parser, Debug)]
#[command(name = "xmlquery", version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// UTF-8 files to process (use `-` for stdin).
    #[arg(required = true)]
    files: Vec<String>,

    /// Log parser and query activity to stderr.
    #[arg(long)]
    verbose: bool,

    // -- Parsing options ---------------------------------------------------
    /// Parse input as HTML instead of XML.
    #[arg(long)]
    html: bool,

    /// Recover from parsing errors (produce partial tree).
    #[arg(long)]
    recover: bool,

    /// Remove ignorable blank (whitespace-only) text nodes.
    #[arg(long)]
    noblanks: bool,

    // -- Queries -----------------------------------------------------------
    /// Evaluate an `XPath` expression against the document and print the result.
    #[arg(long, value_name = "EXPR")]
    xpath: Option<String>,

    /// List the root element's children with their text values.
    #[arg(long)]
    children: bool,

    // -- Output options ----------------------------------------------------
    /// Pretty-print (indent) the output.
    #[arg(long)]
    format: bool,

    /// Do not output the result tree.
    #[arg(long)]
    noout: bool,
}

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

const EXIT_SUCCESS: u8 = 0;
const EXIT_PARSE_ERROR: u8 = 1;
const EXIT_XPATH_ERROR: u8 = 2;

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let _library = match Library::init() {
        Ok(lib) => lib,
        Err(e) => {
            eprintln!("xmlquery: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut worst_exit = EXIT_SUCCESS;
    for file in &cli.files {
        worst_exit = worst_exit.max(process_file(&cli, file));
    }
    ExitCode::from(worst_exit)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "xmlhandle=debug,xmlquery=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

/// Processes a single input file and returns an exit code.
fn process_file(cli: &Cli, filename: &str) -> u8 {
    let input = match read_input(filename) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("{filename}: failed to read: {e}");
            return EXIT_PARSE_ERROR;
        }
    };
    debug!(filename, bytes = input.len(), "read input");

    let doc = match parse(cli, &input) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{filename}: {e}");
            return EXIT_PARSE_ERROR;
        }
    };

    let mut exit_code = EXIT_SUCCESS;

    if cli.children {
        print_children(doc.root_node());
    }

    if let Some(ref expr) = cli.xpath {
        exit_code = exit_code.max(evaluate_xpath(cli, filename, &doc, expr));
    }

    if !cli.noout && cli.xpath.is_none() && !cli.children {
        print!("{}", serialize_document(cli, &doc));
    }

    exit_code
}

// ---------------------------------------------------------------------------
// Input reading
// ---------------------------------------------------------------------------

/// Reads input from a file or stdin (when filename is `-`).
fn read_input(filename: &str) -> io::Result<String> {
    let bytes = if filename == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(filename)?
    };
    decode_input(&bytes)
}

/// Decodes raw input as UTF-8, dropping a UTF-8 byte order mark.
///
/// The parser is always handed UTF-8 text, so other encodings are refused
/// here with a message instead of being misread.
fn decode_input(bytes: &[u8]) -> io::Result<String> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        if encoding != UTF_8 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} input is not supported, convert it to UTF-8", encoding.name()),
            ));
        }
    }
    let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
    if had_errors {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "input is not valid UTF-8",
        ));
    }
    Ok(text.into_owned())
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn parse(cli: &Cli, input: &str) -> xmlhandle::Result<Document> {
    let opts = ParseOptions::strict()
        .recover(cli.recover || cli.html)
        .no_blanks(cli.noblanks);
    if cli.html {
        HtmlDocument::parse_with_options(input, opts).map(Document::from)
    } else {
        XmlDocument::parse_with_options(input, opts).map(Document::from)
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Prints each child of `root` as name and value, one pair per line.
fn print_children(root: NodeRef<'_>) {
    let Some(root) = root.non_null() else {
        println!("root node is null");
        return;
    };
    println!("{}", root.name());
    for node in root.children() {
        println!("node name: {}", node.name());
        println!("node value: {}", node.value().unwrap_or_default());
    }
}

/// Evaluates an `XPath` expression and prints the result to stdout.
fn evaluate_xpath(cli: &Cli, filename: &str, doc: &Document, expression: &str) -> u8 {
    let result = doc
        .xpath_context()
        .and_then(|ctx| ctx.eval(expression));
    let result = match result {
        Ok(r) => r,
        Err(e) => {
            warn!(filename, expression, "query failed");
            eprintln!("{filename}: {e}");
            return EXIT_XPATH_ERROR;
        }
    };
    match result.value() {
        XPathValue::NodeSet(nodes) => {
            for (i, node) in nodes.iter().enumerate() {
                match nodes.namespace_at(i) {
                    Some(ns) => match ns.prefix {
                        Some(prefix) => println!("xmlns:{prefix}=\"{}\"", ns.uri),
                        None => println!("xmlns=\"{}\"", ns.uri),
                    },
                    None => println!("{}", node.to_string(cli.format)),
                }
            }
        }
        XPathValue::String(s) => println!("{s}"),
        XPathValue::Number(n) => println!("{n}"),
        XPathValue::Boolean(b) => println!("{b}"),
    }
    EXIT_SUCCESS
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

fn serialize_document(cli: &Cli, doc: &Document) -> String {
    if cli.html {
        doc.view().to_html_string(cli.format)
    } else {
        doc.to_string(cli.format)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_input_strips_utf8_bom() {
        assert_eq!(decode_input(b"\xEF\xBB\xBF<a/>").unwrap(), "<a/>");
        assert_eq!(decode_input("<a>\u{e9}</a>".as_bytes()).unwrap(), "<a>\u{e9}</a>");
    }

    #[test]
    fn test_decode_input_refuses_other_encodings() {
        let err = decode_input(b"\xFF\xFE<\0a\0/\0>\0").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("UTF-16LE"));

        let err = decode_input(b"<a>\xE9</a>").unwrap_err();
        assert_eq!(err.to_string(), "input is not valid UTF-8");
    }
}
