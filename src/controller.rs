//! The draw controller: one `Drawer` plus the collaborators that show and
//! export its state.
//!
//! Each user action maps to one method. Actions that are not currently
//! allowed (adding while locked, drawing nothing, copying before a draw) do
//! nothing and render nothing.

use crate::draw::Drawer;
use crate::export::{self, ClipboardFormat};
use crate::names;
use crate::ports::{ClipboardWriter, FileExporter, Renderer};
use rand::RngCore;
use std::path::PathBuf;

/// Which actions are available, derived from the drawer and pending input.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    /// A draw is possible (names present).
    pub draw: bool,
    /// There is something to reset.
    pub reset: bool,
    /// Names may be added.
    pub add: bool,
    /// Results exist and can be shown, copied or exported.
    pub results: bool,
}

impl Controls {
    /// Derive availability for `drawer` with `pending_input` in the input box.
    #[must_use]
    pub fn derive(drawer: &Drawer, pending_input: &str) -> Self {
        let has_names = !drawer.is_empty();
        Self {
            draw: has_names,
            reset: has_names || drawer.is_locked() || !pending_input.trim().is_empty(),
            add: !drawer.is_locked(),
            results: !drawer.assignments().is_empty(),
        }
    }
}

/// Owns the draw state and drives the collaborators.
#[derive(Debug)]
pub struct DrawController<R, C, F> {
    drawer: Drawer,
    pending: String,
    format: ClipboardFormat,
    renderer: R,
    clipboard: C,
    exporter: F,
}

impl<R, C, F> DrawController<R, C, F>
where
    R: Renderer,
    C: ClipboardWriter,
    F: FileExporter,
{
    /// Build a controller around an empty drawer.
    pub fn new(renderer: R, clipboard: C, exporter: F) -> Self {
        Self {
            drawer: Drawer::new(),
            pending: String::new(),
            format: ClipboardFormat::default(),
            renderer,
            clipboard,
            exporter,
        }
    }

    /// Use `format` for copied results.
    #[must_use]
    pub fn with_format(mut self, format: ClipboardFormat) -> Self {
        self.format = format;
        self
    }

    /// The underlying draw state.
    pub const fn drawer(&self) -> &Drawer {
        &self.drawer
    }

    /// Text typed but not yet committed as names.
    pub fn pending_input(&self) -> &str {
        &self.pending
    }

    /// Current action availability.
    pub fn controls(&self) -> Controls {
        Controls::derive(&self.drawer, &self.pending)
    }

    #[cfg(test)]
    pub(crate) const fn renderer(&self) -> &R {
        &self.renderer
    }

    #[cfg(test)]
    pub(crate) const fn clipboard(&self) -> &C {
        &self.clipboard
    }

    #[cfg(test)]
    pub(crate) const fn exporter(&self) -> &F {
        &self.exporter
    }

    /// Re-render the name list and, after a draw, the results.
    ///
    /// # Errors
    /// Returns an error if rendering fails.
    pub fn refresh(&mut self) -> anyhow::Result<()> {
        self.renderer.render_names(self.drawer.names())?;
        if !self.drawer.assignments().is_empty() {
            self.renderer
                .render_results(&self.drawer.sorted_assignments())?;
        }
        self.render_controls()
    }

    /// Render the initial (empty) state.
    ///
    /// # Errors
    /// Returns an error if rendering fails.
    pub fn start(&mut self) -> anyhow::Result<()> {
        self.renderer.render_names(self.drawer.names())?;
        self.render_controls()
    }

    /// Append `raw` to the input and commit all of it (Enter / Add).
    ///
    /// Returns how many names were added. Input is dropped while locked.
    ///
    /// # Errors
    /// Returns an error if rendering fails.
    pub fn submit_input(&mut self, raw: &str) -> anyhow::Result<usize> {
        if self.drawer.is_locked() {
            log::debug!("locked; dropping submitted input");
            return Ok(0);
        }
        self.pending.push_str(raw);
        self.submit()
    }

    /// Commit the pending input as names.
    ///
    /// Returns how many names were added; zero when locked or the input
    /// holds no names.
    ///
    /// # Errors
    /// Returns an error if rendering fails.
    pub fn submit(&mut self) -> anyhow::Result<usize> {
        if self.drawer.is_locked() {
            return Ok(0);
        }
        if self.pending.trim().is_empty() {
            self.render_controls()?;
            return Ok(0);
        }

        let parsed = names::parse_names(&self.pending);
        self.pending.clear();
        if parsed.is_empty() {
            self.render_controls()?;
            return Ok(0);
        }

        let added = self.drawer.extend_names(parsed);
        self.after_names_added(added)?;
        Ok(added)
    }

    /// Append typed text and commit every name already ended by a delimiter.
    ///
    /// Returns how many names were added. Typing is ignored while locked.
    ///
    /// # Errors
    /// Returns an error if rendering fails.
    pub fn type_input(&mut self, text: &str) -> anyhow::Result<usize> {
        if self.drawer.is_locked() {
            log::debug!("locked; ignoring typed input");
            return Ok(0);
        }
        self.pending.push_str(text);
        if self.pending.is_empty() {
            self.render_controls()?;
            return Ok(0);
        }

        let committed = names::split_committed(&self.pending);
        self.pending = committed.remainder;
        let added = self.drawer.extend_names(committed.names);
        if added > 0 {
            self.after_names_added(added)?;
        } else {
            self.render_controls()?;
        }
        Ok(added)
    }

    /// Remove the name at `index` (zero-based).
    ///
    /// # Errors
    /// Returns an error if rendering fails.
    pub fn remove_name_at(&mut self, index: usize) -> anyhow::Result<Option<String>> {
        let removed = self.drawer.remove_name_at(index);
        if removed.is_some() {
            self.renderer.render_names(self.drawer.names())?;
            self.render_controls()?;
        }
        Ok(removed)
    }

    /// Draw with OS randomness.
    ///
    /// # Errors
    /// Returns an error if randomness or rendering fails.
    pub fn draw(&mut self) -> anyhow::Result<usize> {
        self.draw_with(&mut rand::rngs::OsRng)
    }

    /// Draw with `rng`. Returns the number of assignments made; zero when
    /// there are no names or a draw already happened.
    ///
    /// # Errors
    /// Returns an error if randomness or rendering fails.
    pub fn draw_with<G: RngCore + ?Sized>(&mut self, rng: &mut G) -> anyhow::Result<usize> {
        if self.drawer.is_empty() || self.drawer.is_locked() {
            return Ok(0);
        }
        let n = self.drawer.draw_with(rng)?.len();
        self.renderer
            .render_results(&self.drawer.sorted_assignments())?;
        self.render_controls()?;
        self.renderer
            .announce(&format!("Draw complete. {n} assignments."))?;
        Ok(n)
    }

    /// Clear everything, including pending input, and unlock.
    ///
    /// # Errors
    /// Returns an error if rendering fails.
    pub fn reset(&mut self) -> anyhow::Result<()> {
        self.drawer.reset();
        self.pending.clear();
        self.renderer.render_results(&[])?;
        self.renderer.render_names(self.drawer.names())?;
        self.render_controls()?;
        self.renderer.announce("Reset complete")
    }

    /// Copy results to the clipboard.
    ///
    /// A failed clipboard write is logged and still reported as copied; wrap
    /// the clipboard in [`WithFallback`](crate::ports::WithFallback) to give
    /// it a second destination. Returns `false` when there is nothing to copy.
    ///
    /// # Errors
    /// Returns an error if rendering fails.
    pub fn copy_results(&mut self) -> anyhow::Result<bool> {
        if self.drawer.assignments().is_empty() {
            return Ok(false);
        }
        let text = export::clipboard_text(self.drawer.assignments(), self.format);
        if let Err(err) = self.clipboard.write_text(&text) {
            log::warn!("copy failed: {err:#}");
        }
        self.renderer.announce("Copied to clipboard")?;
        Ok(true)
    }

    /// Export results as `draw.csv`. Returns `None` when there are no results.
    ///
    /// # Errors
    /// Returns an error if encoding or writing the file fails.
    pub fn export_csv(&mut self) -> anyhow::Result<Option<PathBuf>> {
        if self.drawer.assignments().is_empty() {
            return Ok(None);
        }
        let bytes = export::encode_csv(self.drawer.assignments())?;
        let path = self.exporter.export(export::CSV_FILE_NAME, &bytes)?;
        log::info!("exported {}", path.display());
        Ok(Some(path))
    }

    fn after_names_added(&mut self, added: usize) -> anyhow::Result<()> {
        self.renderer.render_names(self.drawer.names())?;
        self.render_controls()?;
        self.renderer
            .announce(&format!("{} added.", names::count_label(added)))
    }

    fn render_controls(&mut self) -> anyhow::Result<()> {
        let controls = self.controls();
        self.renderer.render_controls(controls)
    }
}
