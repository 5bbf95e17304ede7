//! # consent-pdf CLI
//!
//! Usage:
//!   consent-pdf consent.json -o consent.pdf
//!   echo '{ ... }' | consent-pdf -o consent.pdf
//!   consent-pdf consent.json --config layout.json --base64 -o consent.b64
//!   consent-pdf --example > consent.json

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use consent_pdf::{ConsentDocument, LayoutConfig};

#[derive(Parser)]
#[command(name = "consent-pdf")]
#[command(version)]
#[command(about = "Render consent documents to PDF", long_about = None)]
struct Cli {
    /// Input document JSON (stdin if not specified)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file
    #[arg(short, long, value_name = "FILE", default_value = "output.pdf")]
    output: PathBuf,

    /// Layout config JSON, replacing the document's own `config`
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the PDF base64-encoded
    #[arg(long)]
    base64: bool,

    /// Print an example document and exit
    #[arg(long)]
    example: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if cli.example {
        print!("{}", example_document_json());
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(written) => {
            eprintln!("✓ Written {} bytes to {}", written, cli.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> consent_pdf::Result<usize> {
    let input = match &cli.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mut document: ConsentDocument = serde_json::from_str(&input)?;
    if let Some(path) = &cli.config {
        document.config = LayoutConfig::from_file(path)?;
    }

    let bytes = if cli.base64 {
        consent_pdf::render_base64(&document)?.into_bytes()
    } else {
        consent_pdf::render(&document)?
    };
    fs::write(&cli.output, &bytes)?;
    Ok(bytes.len())
}

fn example_document_json() -> &'static str {
    r##"{
  "title": "Player Consent Form",
  "subtitle": "Season 2024/2025",
  "headerLayout": "portrait",
  "infoLines": [
    { "label": "Player:", "value": "Alex Morgan" },
    { "label": "Card number:", "value": "0042-1187" }
  ],
  "bodyHtml": "<h1>Data protection notice</h1><p>We process your personal data to manage your <b>membership</b> and, with your consent, to send you <a href=\"#\">news and promotions</a>.</p><h2>Your rights</h2><ol><li>Access your data</li><li>Rectify or erase it<ol><li>online</li><li>at the front desk</li></ol></li><li>Withdraw consent at any time</li></ol><p class=\"ql-align-justify\">Consent is valid for the period shown below and can be renewed at any visit.</p>",
  "mandatory": {
    "label": "Terms and conditions.",
    "description": "I have read and accept the processing of my data described above.",
    "checked": true
  },
  "optional": {
    "label": "Marketing.",
    "description": "I agree to receive promotional communications.",
    "checked": false
  },
  "consentDate": "2024-09-01",
  "version": "3.2",
  "metadata": {
    "title": "Player Consent Form",
    "author": "Club Administration"
  },
  "config": {
    "validityYears": 2
  }
}
"##
}
