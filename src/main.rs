//! wheelwriter - IBM 6788 / Wheelwriter document converter

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use wheelwriter::markup::MarkupSink;
use wheelwriter::{DecoderConfig, DocumentInfo, Error, Format, MarkupEvent, XmlWriter};

#[derive(Parser)]
#[command(name = "wheelwriter")]
#[command(version, about = "IBM 6788 / Wheelwriter document converter", long_about = None)]
#[command(after_help = "EXAMPLES:
    wheelwriter letter.txt letter.xml     Decode to XML
    wheelwriter letter.xml letter.txt     Encode XML back to a typewriter file
    wheelwriter letter.txt                Decode to stdout
    wheelwriter -i letter.txt             Show the file header and title")]
struct Cli {
    /// Input file (typewriter file, or XML/HTML to encode)
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (stdout when omitted)
    #[arg(value_name = "OUTPUT")]
    output: Option<String>,

    /// Show the file header and title without converting
    #[arg(short, long)]
    info: bool,

    /// Print decoded events as JSON lines
    #[arg(long, conflicts_with = "info")]
    json: bool,

    /// Emit well-nested bold/underline markup
    #[arg(long)]
    nested: bool,

    /// Typewriter format (ibm6788)
    #[arg(short, long, default_value = "ibm6788")]
    format: Format,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = if cli.info {
        show_info(&cli)
    } else if is_markup(&cli.input) {
        encode(&cli)
    } else {
        decode(&cli)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn is_markup(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "xml" | "html" | "xhtml" | "htm"))
}

fn decoder_config(cli: &Cli) -> DecoderConfig {
    DecoderConfig::new().with_nested_decorations(cli.nested)
}

fn output_writer(path: Option<&str>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn show_info(cli: &Cli) -> Result<(), Error> {
    let input = BufReader::new(File::open(&cli.input)?);
    let mut events = Vec::new();
    let info = cli.format.decode_reader(input, &mut events, decoder_config(cli))?;
    print_info(&cli.input, cli.format, &info);
    Ok(())
}

fn print_info(path: &str, format: Format, info: &DocumentInfo) {
    println!("File: {path}");
    println!("Format: {}", format.description());
    match &info.header {
        Some(header) => {
            println!("Id: {}", header.id.trim());
            println!("Length: {}", header.file_length());
            println!("Status: 0x{:02x}", header.status);
            let words: Vec<String> = header.words.iter().map(u16::to_string).collect();
            println!("Margins/tabs: {}", words.join(" "));
        }
        None => println!("Header: none"),
    }
    if let Some(title) = &info.title {
        println!("Title: {}", title.trim());
    }
}

fn decode(cli: &Cli) -> Result<(), Error> {
    let input = BufReader::new(File::open(&cli.input)?);
    let out = output_writer(cli.output.as_deref())?;
    let config = decoder_config(cli);

    if cli.json {
        let mut sink = JsonLines { out };
        cli.format.decode_reader(input, &mut sink, config)?;
        sink.out.flush()?;
    } else {
        let mut writer = XmlWriter::new(out);
        writer.start_document()?;
        cli.format.decode_reader(input, &mut writer, config)?;
        writer.finish()?;
    }

    if let Some(output) = &cli.output
        && !cli.quiet
    {
        eprintln!("Decoded {} -> {output}", cli.input);
    }
    Ok(())
}

fn encode(cli: &Cli) -> Result<(), Error> {
    let xml = std::fs::read_to_string(&cli.input)?;
    let events = wheelwriter::markup::read_events(&xml)?;
    let bytes = cli.format.encode_events(events, Default::default());

    let mut out = output_writer(cli.output.as_deref())?;
    out.write_all(&bytes)?;
    out.flush()?;

    if let Some(output) = &cli.output
        && !cli.quiet
    {
        eprintln!("Encoded {} -> {output} ({} bytes)", cli.input, bytes.len());
    }
    Ok(())
}

/// Writes one JSON object per event.
struct JsonLines<W: Write> {
    out: W,
}

impl<W: Write> MarkupSink for JsonLines<W> {
    type Error = Error;

    fn event(&mut self, event: MarkupEvent) -> Result<(), Error> {
        serde_json::to_writer(&mut self.out, &event).map_err(io::Error::from)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }
}
