//! Collaborators the controller talks to, and the terminal/filesystem
//! implementations the CLI wires in.
//!
//! The controller never touches stdout or the filesystem directly; it goes
//! through these traits so it can be driven by recording fakes in tests.

use crate::controller::Controls;
use crate::draw::Assignment;
use crate::names;
use crate::shuffle;
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Presents state changes to the user.
pub trait Renderer {
    /// Show the current name list.
    ///
    /// # Errors
    /// Returns an error if the output cannot be written.
    fn render_names(&mut self, names: &[String]) -> anyhow::Result<()>;

    /// Show draw results, already ordered by number.
    ///
    /// # Errors
    /// Returns an error if the output cannot be written.
    fn render_results(&mut self, sorted: &[Assignment]) -> anyhow::Result<()>;

    /// Reflect which actions are currently available.
    ///
    /// # Errors
    /// Returns an error if the output cannot be written.
    fn render_controls(&mut self, controls: Controls) -> anyhow::Result<()>;

    /// Short status message ("3 names added.").
    ///
    /// # Errors
    /// Returns an error if the output cannot be written.
    fn announce(&mut self, message: &str) -> anyhow::Result<()>;
}

/// Destination for copied result text.
pub trait ClipboardWriter {
    /// Replace the clipboard contents with `text`.
    ///
    /// # Errors
    /// Returns an error if the text could not be stored.
    fn write_text(&mut self, text: &str) -> anyhow::Result<()>;
}

/// Saves downloadable files.
pub trait FileExporter {
    /// Store `bytes` under `file_name` and return where they ended up.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    fn export(&mut self, file_name: &str, bytes: &[u8]) -> anyhow::Result<PathBuf>;
}

/// Plain-text renderer for interactive terminal use.
#[derive(Debug)]
pub struct TerminalRenderer<W> {
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    /// Render into `out`.
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render_names(&mut self, names: &[String]) -> anyhow::Result<()> {
        writeln!(self.out, "{}", names::count_label(names.len())).context("write names")?;
        for (i, name) in names.iter().enumerate() {
            writeln!(self.out, "  [{}] {name}", i + 1).context("write names")?;
        }
        Ok(())
    }

    fn render_results(&mut self, sorted: &[Assignment]) -> anyhow::Result<()> {
        let width = sorted.last().map_or(1, |a| a.number.to_string().len());
        for a in sorted {
            writeln!(self.out, "{:>width$}  {}", a.number, a.name).context("write results")?;
        }
        Ok(())
    }

    fn render_controls(&mut self, controls: Controls) -> anyhow::Result<()> {
        log::debug!("controls: {controls:?}");
        Ok(())
    }

    fn announce(&mut self, message: &str) -> anyhow::Result<()> {
        writeln!(self.out, "-- {message}").context("write status")?;
        Ok(())
    }
}

/// Renderer for non-interactive runs; everything goes to the debug log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn render_names(&mut self, names: &[String]) -> anyhow::Result<()> {
        log::debug!("{}", names::count_label(names.len()));
        Ok(())
    }

    fn render_results(&mut self, sorted: &[Assignment]) -> anyhow::Result<()> {
        log::debug!("rendered {} results", sorted.len());
        Ok(())
    }

    fn render_controls(&mut self, controls: Controls) -> anyhow::Result<()> {
        log::debug!("controls: {controls:?}");
        Ok(())
    }

    fn announce(&mut self, message: &str) -> anyhow::Result<()> {
        log::info!("{message}");
        Ok(())
    }
}

/// Clipboard that writes the text, newline-terminated, to a stream.
#[derive(Debug)]
pub struct StreamClipboard<W> {
    out: W,
}

impl<W: Write> StreamClipboard<W> {
    /// Copy into `out`.
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }

    #[cfg(test)]
    pub(crate) const fn get_ref(&self) -> &W {
        &self.out
    }
}

impl<W: Write> ClipboardWriter for StreamClipboard<W> {
    fn write_text(&mut self, text: &str) -> anyhow::Result<()> {
        writeln!(self.out, "{text}").context("write clipboard text")?;
        self.out.flush().context("flush clipboard text")
    }
}

/// Clipboard backed by a file that is replaced on every copy.
#[derive(Debug, Clone)]
pub struct FileClipboard {
    path: PathBuf,
}

impl FileClipboard {
    /// Copy into the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[cfg(test)]
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl ClipboardWriter for FileClipboard {
    fn write_text(&mut self, text: &str) -> anyhow::Result<()> {
        write_file_atomic(&self.path, text.as_bytes())
    }
}

/// Tries `primary`, then `fallback` when the primary write fails.
#[derive(Debug)]
pub struct WithFallback<P, S> {
    primary: P,
    fallback: S,
}

impl<P: ClipboardWriter, S: ClipboardWriter> WithFallback<P, S> {
    /// Pair a preferred clipboard with a backup.
    pub const fn new(primary: P, fallback: S) -> Self {
        Self { primary, fallback }
    }

    #[cfg(test)]
    pub(crate) fn into_parts(self) -> (P, S) {
        (self.primary, self.fallback)
    }

    #[cfg(test)]
    pub(crate) const fn fallback(&self) -> &S {
        &self.fallback
    }
}

impl<P: ClipboardWriter, S: ClipboardWriter> ClipboardWriter for WithFallback<P, S> {
    fn write_text(&mut self, text: &str) -> anyhow::Result<()> {
        match self.primary.write_text(text) {
            Ok(()) => Ok(()),
            Err(err) => {
                log::warn!("clipboard write failed, using fallback: {err:#}");
                self.fallback.write_text(text)
            }
        }
    }
}

/// Saves exports into a directory, replacing files of the same name.
#[derive(Debug, Clone)]
pub struct DirExporter {
    dir: PathBuf,
}

impl DirExporter {
    /// Export into `dir`; it is created on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[cfg(test)]
    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileExporter for DirExporter {
    fn export(&mut self, file_name: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create export dir {}", self.dir.display()))?;
        let path = self.dir.join(file_name);
        write_file_atomic(&path, bytes)?;
        Ok(path)
    }
}

/// Write `bytes` to a sibling temp file, then rename it over `path`.
fn write_file_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let file_name = path
        .file_name()
        .with_context(|| format!("no file name in {}", path.display()))?
        .to_string_lossy();
    let tag = shuffle::next_u32(&mut rand::rngs::OsRng)?;
    let tmp = path.with_file_name(format!(".{file_name}.tmp.{tag:08x}"));
    let result = write_then_rename(&tmp, path, bytes);
    if result.is_err() && tmp.exists() {
        if let Err(err) = fs::remove_file(&tmp) {
            log::warn!("remove temp file {}: {err}", tmp.display());
        }
    }
    result
}

fn write_then_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    fs::write(tmp, bytes).with_context(|| format!("write temp file {}", tmp.display()))?;

    // Best-effort cross-platform replacement:
    // - Unix: rename() replaces destination atomically.
    // - Windows: rename() fails if dest exists; remove then rename.
    #[cfg(windows)]
    {
        if path.exists() {
            fs::remove_file(path)
                .with_context(|| format!("remove existing file {}", path.display()))?;
        }
    }

    fs::rename(tmp, path)
        .with_context(|| format!("replace {} via {}", path.display(), tmp.display()))
}
