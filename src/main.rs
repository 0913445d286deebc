#![allow(clippy::print_stderr, clippy::print_stdout)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use namedraw::controller::DrawController;
use namedraw::draw::Assignment;
use namedraw::export::{self, ClipboardFormat};
use namedraw::ports::{
    ClipboardWriter, DirExporter, FileClipboard, LogRenderer, StreamClipboard, TerminalRenderer,
    WithFallback,
};
use namedraw::session;
use namedraw::shuffle;
use serde::Serialize;
use std::io::{Read, Write};
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;

#[derive(Parser)]
#[command(
    name = "namedraw",
    version,
    about = "Assign every name in a list a unique random number"
)]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw once for names from --names, --file, or stdin.
    Draw {
        /// Names separated by commas, semicolons or newlines; repeatable.
        #[arg(long, short = 'n')]
        names: Vec<String>,
        /// Read names from a file.
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long, value_enum, env = "NAMEDRAW_FORMAT", default_value_t = ClipboardFormat::Numbered)]
        format: ClipboardFormat,
        /// Also write draw.csv into this directory.
        #[arg(long, env = "NAMEDRAW_OUT_DIR")]
        out_dir: Option<PathBuf>,
        /// Also write the result text to this file.
        #[arg(long)]
        copy_to: Option<PathBuf>,
    },
    /// Interactive session reading names and `:commands` from stdin.
    Session {
        #[arg(long, value_enum, env = "NAMEDRAW_FORMAT", default_value_t = ClipboardFormat::Numbered)]
        format: ClipboardFormat,
        /// Where `:csv` writes draw.csv.
        #[arg(long, env = "NAMEDRAW_OUT_DIR", default_value = ".")]
        out_dir: PathBuf,
    },
    /// Print a random permutation of 1..=COUNT.
    Shuffle {
        #[arg(long)]
        count: usize,
    },
}

#[derive(Debug, Serialize)]
struct DrawReport {
    names: Vec<String>,
    assignments: Vec<Assignment>,
    drawn_at: Option<String>,
    csv_file: Option<PathBuf>,
}

struct DrawRequest {
    inputs: Vec<String>,
    format: ClipboardFormat,
    out_dir: Option<PathBuf>,
    json: bool,
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Draw {
            names,
            file,
            format,
            out_dir,
            copy_to,
        } => {
            let mut inputs = names;
            if let Some(path) = file {
                inputs.push(
                    std::fs::read_to_string(&path)
                        .with_context(|| format!("read names file {}", path.display()))?,
                );
            }
            if inputs.is_empty() {
                inputs.push(read_stdin_to_string().context("read names from stdin")?);
            }
            let req = DrawRequest {
                inputs,
                format,
                out_dir,
                json: cli.json,
            };

            match copy_to {
                Some(path) => {
                    let clipboard = WithFallback::new(
                        FileClipboard::new(path),
                        StreamClipboard::new(std::io::stderr()),
                    );
                    run_draw(&req, clipboard, false)?;
                }
                None => {
                    // Without --copy-to the "clipboard" is stdout itself.
                    run_draw(&req, StreamClipboard::new(std::io::stdout()), true)?;
                }
            }
        }

        Commands::Session { format, out_dir } => {
            let mut controller = DrawController::new(
                TerminalRenderer::new(std::io::stdout()),
                WithFallback::new(
                    StreamClipboard::new(std::io::stdout()),
                    StreamClipboard::new(std::io::stderr()),
                ),
                DirExporter::new(out_dir),
            )
            .with_format(format);
            let stdin = std::io::stdin();
            session::run_session(&mut controller, stdin.lock(), std::io::stderr())?;
        }

        Commands::Shuffle { count } => {
            let numbers = shuffle::os_shuffled_sequence(count)?;
            if cli.json {
                write_json(&numbers)?;
            } else {
                let mut stdout = std::io::stdout().lock();
                for n in numbers {
                    writeln!(stdout, "{n}").context("write stdout")?;
                }
            }
        }
    }

    Ok(())
}

fn run_draw<C: ClipboardWriter>(
    req: &DrawRequest,
    clipboard: C,
    clipboard_is_stdout: bool,
) -> anyhow::Result<()> {
    let exporter = DirExporter::new(req.out_dir.clone().unwrap_or_else(|| PathBuf::from(".")));
    let mut controller =
        DrawController::new(LogRenderer, clipboard, exporter).with_format(req.format);

    for input in &req.inputs {
        controller.submit_input(input)?;
    }
    controller.draw()?;

    let csv_file = match req.out_dir {
        Some(_) => controller.export_csv()?,
        None => None,
    };
    if !(clipboard_is_stdout && req.json) {
        controller.copy_results()?;
    }

    let drawer = controller.drawer();
    if req.json {
        let drawn_at = drawer
            .drawn_at()
            .map(|t| t.format(&Rfc3339))
            .transpose()
            .context("format RFC3339 timestamp")?;
        write_json(&DrawReport {
            names: drawer.names().to_vec(),
            assignments: drawer.sorted_assignments(),
            drawn_at,
            csv_file,
        })?;
    } else if !clipboard_is_stdout {
        let text = export::clipboard_text(drawer.assignments(), req.format);
        if !text.is_empty() {
            println!("{text}");
        }
    }
    Ok(())
}

fn read_stdin_to_string() -> anyhow::Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("read stdin")?;
    Ok(buf)
}

fn write_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    let raw = serde_json::to_string_pretty(value).context("serialize JSON")?;
    stdout.write_all(raw.as_bytes()).context("write stdout")?;
    stdout.write_all(b"\n").context("write stdout newline")?;
    Ok(())
}
