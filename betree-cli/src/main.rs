use std::path::{Path, PathBuf};

use ariadne::{ColorGenerator, Config, IndexType, Label, Report, ReportKind, Source};
use betree::{
    Error,
    codec::{Codec, CodecConfig},
    encoding::{EncodedNode, magic},
    node::LogicalNode,
    parser::parse,
    value::{AttributeMap, AttributeValue},
};
use clap::{Parser as ClapParser, Subcommand};
use log::{debug, info};
use thiserror::Error as ThisError;

#[derive(ClapParser)]
#[command(version, about)]
pub struct Arguments {
    /// Codec configuration file (defaults to `$BETREE_CONFIG_PATH` or the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse an expression and write its serialized form
    Parse {
        /// Expression, e.g. `val1 == "1" && !(val2 > 10)`
        expr: String,
        /// Output file for the serialized tree
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Evaluate a tree against attributes given on the command line
    Eval {
        /// Serialized tree, or an expression with `--expr`
        input: String,
        /// Treat `input` as an expression instead of a file path
        #[arg(long)]
        expr: bool,
        /// Integer attribute, as `key=value`
        #[arg(short = 'i', long = "int", value_parser = parse_int_attribute)]
        ints: Vec<(String, i64)>,
        /// Text attribute, as `key=value`
        #[arg(short = 's', long = "text", value_parser = parse_text_attribute)]
        texts: Vec<(String, String)>,
    },
    /// Show the structure of a serialized tree
    Inspect {
        /// Serialized tree
        input: PathBuf,
    },
}

#[derive(Debug, ThisError)]
enum CliError {
    #[error(transparent)]
    Betree(#[from] Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Attribute `{0}` is given more than once")]
    DuplicateAttribute(String),
}

fn split_attribute(s: &str) -> Result<(&str, &str), String> {
    s.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected `key=value`, got `{s}`"))
}

fn parse_int_attribute(s: &str) -> Result<(String, i64), String> {
    let (key, value) = split_attribute(s)?;
    let value = value
        .parse::<i64>()
        .map_err(|e| format!("invalid integer `{value}`: {e}"))?;
    Ok((key.to_string(), value))
}

fn parse_text_attribute(s: &str) -> Result<(String, String), String> {
    let (key, value) = split_attribute(s)?;
    Ok((key.to_string(), value.to_string()))
}

/// Prints parser diagnostics against the expression text. Spans are byte offsets.
fn report_parse_error(src: &str, error: &Error) -> std::io::Result<()> {
    let file = "<expr>".to_string();
    let mut colors = ColorGenerator::new();
    let a = colors.next();

    let diagnostics: Vec<(String, std::ops::Range<usize>)> = match error {
        Error::ParserErrors { errors } => errors
            .iter()
            .map(|e| (e.message.clone(), e.start..e.end))
            .collect(),
        Error::UnsupportedOperand { start, end, .. } => vec![(error.to_string(), *start..*end)],
        _ => return Ok(()),
    };

    for (message, range) in diagnostics {
        let span = (file.clone(), range);
        Report::build(ReportKind::Error, span.clone())
            .with_config(Config::default().with_index_type(IndexType::Byte))
            .with_message(message)
            .with_label(
                Label::new(span)
                    .with_message("The error occurred here")
                    .with_color(a),
            )
            .finish()
            .eprint((file.clone(), Source::from(src.to_string())))?;
    }
    Ok(())
}

fn parse_reported(src: &str) -> Result<LogicalNode, Error> {
    parse(src).inspect_err(|error| {
        if let Err(e) = report_parse_error(src, error) {
            debug!("Failed to render diagnostics: {e}");
        }
    })
}

fn print_structure(node: &EncodedNode, indent: usize) {
    let name = magic::tag_name(node.tag()).unwrap_or("?");
    let detail = match node {
        EncodedNode::EqInt(l)
        | EncodedNode::NotEqInt(l)
        | EncodedNode::LtInt(l)
        | EncodedNode::GtInt(l) => format!(" {} {}", l.key, l.value),
        EncodedNode::EqText(l)
        | EncodedNode::NotEqText(l)
        | EncodedNode::LtText(l)
        | EncodedNode::GtText(l) => {
            format!(" {} {}", l.key, AttributeValue::Text(l.value.clone()))
        }
        _ => String::new(),
    };
    println!("{:indent$}0x{:02x} {name}{detail}", "", node.tag());
    for child in node.children() {
        print_structure(child, indent + 2);
    }
}

fn read_blob(path: &Path) -> Result<Vec<u8>, Error> {
    let bytes = std::fs::read(path)?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

/// Merges `-i` and `-s` attributes. A key may appear once across both.
fn build_attributes(
    ints: Vec<(String, i64)>,
    texts: Vec<(String, String)>,
) -> Result<AttributeMap, CliError> {
    let mut attrs = AttributeMap::new();
    let entries = ints
        .into_iter()
        .map(|(k, v)| (k, AttributeValue::from(v)))
        .chain(texts.into_iter().map(|(k, v)| (k, AttributeValue::from(v))));
    for (key, value) in entries {
        if attrs.contains_key(&key) {
            return Err(CliError::DuplicateAttribute(key));
        }
        attrs.insert(key, value);
    }
    Ok(attrs)
}

fn run(args: Arguments) -> Result<(), CliError> {
    let config = match &args.config {
        Some(path) => CodecConfig::load_from_toml(path)?,
        None => CodecConfig::load_or_default()?,
    };
    debug!("Using codec configuration {config:?}");
    let codec = Codec::new(config);

    match args.command {
        Command::Parse { expr, output } => {
            let tree = parse_reported(&expr)?;
            let bytes = codec.serialize(&tree)?;
            std::fs::write(&output, &bytes)?;
            info!("Wrote {} bytes to {}", bytes.len(), output.display());
            println!("{tree}");
        }
        Command::Eval {
            input,
            expr,
            ints,
            texts,
        } => {
            let tree = if expr {
                parse_reported(&input)?
            } else {
                codec.deserialize(&read_blob(Path::new(&input))?)?
            };

            let attrs = build_attributes(ints, texts)?;

            println!("{}", tree.eval(&attrs)?);
        }
        Command::Inspect { input } => {
            let bytes = read_blob(&input)?;
            let encoded = codec.deserialize_encoded(&bytes)?;
            print_structure(&encoded, 0);

            let tree = encoded.decode();
            println!();
            println!("expression : {tree}");
            println!("depth      : {}", tree.depth());
            println!("leaves     : {}", tree.leaf_count());
            println!("blob size  : {} bytes", bytes.len());
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Arguments::parse();

    if let Err(error) = run(args) {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
