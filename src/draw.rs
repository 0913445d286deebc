//! The draw itself: a name list, its locked/unlocked phase, and the
//! assignments produced when the draw happens.
//!
//! A `Drawer` starts out empty and unlocked. Names may be added and removed
//! while unlocked. `draw` binds a random permutation of `1..=N` to the names
//! in their current order and locks the list; only `reset` unlocks it again.
//! Every rejected operation is a silent no-op.

use crate::names;
use crate::shuffle;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One name bound to its drawn number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    /// The entered name, exactly as stored in the list.
    pub name: String,
    /// Position in the draw, `1..=N`.
    pub number: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Whether the name list may still change.
pub enum DrawPhase {
    /// Collecting names.
    #[default]
    Unlocked,
    /// Drawn; names frozen until reset.
    Locked,
}

/// Owns the name list and the result of at most one draw.
#[derive(Debug, Clone, Default)]
pub struct Drawer {
    names: Vec<String>,
    assignments: Vec<Assignment>,
    phase: DrawPhase,
    drawn_at: Option<OffsetDateTime>,
}

impl Drawer {
    /// Create an empty, unlocked drawer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names in entry order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of names in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the list holds no names.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> DrawPhase {
        self.phase
    }

    /// Whether a draw has happened since the last reset.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.phase == DrawPhase::Locked
    }

    /// Assignments in name order; empty before a draw.
    #[must_use]
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Assignments ordered by ascending number.
    #[must_use]
    pub fn sorted_assignments(&self) -> Vec<Assignment> {
        let mut sorted = self.assignments.clone();
        sorted.sort_by_key(|a| a.number);
        sorted
    }

    /// When the current assignments were drawn.
    #[must_use]
    pub const fn drawn_at(&self) -> Option<OffsetDateTime> {
        self.drawn_at
    }

    /// Parse `raw` and append the names it contains.
    ///
    /// Returns how many names were added; zero when locked or when `raw`
    /// holds no names.
    pub fn add_names(&mut self, raw: &str) -> usize {
        self.extend_names(names::parse_names(raw))
    }

    /// Append already-parsed names. Blank entries are skipped.
    ///
    /// Returns how many names were added; zero when locked.
    pub fn extend_names<I>(&mut self, incoming: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        if self.is_locked() {
            log::debug!("ignoring names: list is locked");
            return 0;
        }
        let before = self.names.len();
        self.names.extend(
            incoming
                .into_iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        );
        self.names.len() - before
    }

    /// Remove the name at `index`.
    ///
    /// Returns the removed name; `None` when locked or out of bounds.
    pub fn remove_name_at(&mut self, index: usize) -> Option<String> {
        if self.is_locked() {
            log::debug!("ignoring removal of #{index}: list is locked");
            return None;
        }
        if index >= self.names.len() {
            log::debug!("ignoring removal of #{index}: only {} names", self.names.len());
            return None;
        }
        Some(self.names.remove(index))
    }

    /// Draw using OS randomness.
    ///
    /// See [`Drawer::draw_with`].
    ///
    /// # Errors
    /// Returns an error if OS randomness cannot be read.
    pub fn draw(&mut self) -> anyhow::Result<&[Assignment]> {
        self.draw_with(&mut rand::rngs::OsRng)
    }

    /// Bind a random permutation of `1..=N` to the names and lock the list.
    ///
    /// A no-op when the list is empty or already locked; the current
    /// assignments (possibly none) are returned either way.
    ///
    /// # Errors
    /// Returns an error if `rng` fails. The drawer is left unchanged.
    pub fn draw_with<R: RngCore + ?Sized>(&mut self, rng: &mut R) -> anyhow::Result<&[Assignment]> {
        if self.is_locked() {
            log::debug!("ignoring draw: already drawn");
            return Ok(&self.assignments);
        }
        if self.names.is_empty() {
            log::debug!("ignoring draw: no names");
            return Ok(&self.assignments);
        }

        let numbers = shuffle::shuffled_sequence(self.names.len(), rng)?;
        self.assignments = self
            .names
            .iter()
            .zip(numbers)
            .map(|(name, number)| Assignment {
                name: name.clone(),
                number,
            })
            .collect();
        self.phase = DrawPhase::Locked;
        self.drawn_at = Some(OffsetDateTime::now_utc());
        log::info!("drew {}", names::count_label(self.assignments.len()));
        Ok(&self.assignments)
    }

    /// Clear names and assignments and unlock.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::ensure;
    use proptest::prelude::any;
    use proptest::test_runner::TestCaseError;
    use proptest::{prop_assert, prop_assert_eq, proptest};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn drawer_with(raw: &str) -> Drawer {
        let mut d = Drawer::new();
        d.add_names(raw);
        d
    }

    fn numbers_form_permutation(d: &Drawer) -> bool {
        let mut numbers: Vec<u32> = d.assignments().iter().map(|a| a.number).collect();
        numbers.sort_unstable();
        numbers.iter().copied().eq(1..=u32::try_from(d.len()).unwrap_or(0))
    }

    #[test]
    fn draw_binds_each_name_to_a_unique_number() -> anyhow::Result<()> {
        let mut d = drawer_with("Ann, Bo, Cy");
        let mut rng = StdRng::seed_from_u64(7);
        let drawn = d.draw_with(&mut rng)?.to_vec();

        ensure!(drawn.len() == 3);
        let names: Vec<&str> = drawn.iter().map(|a| a.name.as_str()).collect();
        ensure!(names == ["Ann", "Bo", "Cy"]);
        ensure!(numbers_form_permutation(&d));
        ensure!(d.is_locked());
        ensure!(d.phase() == DrawPhase::Locked);
        ensure!(d.drawn_at().is_some());

        let sorted = d.sorted_assignments();
        ensure!(sorted.iter().map(|a| a.number).eq(1..=3));
        Ok(())
    }

    #[test]
    fn draw_with_no_names_is_a_noop() -> anyhow::Result<()> {
        let mut d = Drawer::new();
        ensure!(d.draw()?.is_empty());
        ensure!(!d.is_locked());
        ensure!(d.drawn_at().is_none());
        Ok(())
    }

    #[test]
    fn second_draw_keeps_first_result() -> anyhow::Result<()> {
        let mut d = drawer_with("a;b;c;d;e;f;g;h");
        let first = d.draw()?.to_vec();
        let second = d.draw()?.to_vec();
        ensure!(first == second);
        Ok(())
    }

    #[test]
    fn locked_list_rejects_mutation_until_reset() -> anyhow::Result<()> {
        let mut d = drawer_with("Ann\nBo");
        d.draw()?;

        ensure!(d.add_names("Cy") == 0);
        ensure!(d.extend_names(vec!["Dee".to_string()]) == 0);
        ensure!(d.remove_name_at(0).is_none());
        ensure!(d.names() == ["Ann", "Bo"]);
        ensure!(d.assignments().len() == 2);

        d.reset();
        ensure!(!d.is_locked());
        ensure!(d.add_names("Cy") == 1);
        ensure!(d.names() == ["Cy"]);
        Ok(())
    }

    #[test]
    fn reset_is_idempotent() -> anyhow::Result<()> {
        let mut d = drawer_with("x, y");
        d.draw()?;
        d.reset();
        let once = (d.names().to_vec(), d.assignments().to_vec(), d.phase(), d.drawn_at());
        d.reset();
        let twice = (d.names().to_vec(), d.assignments().to_vec(), d.phase(), d.drawn_at());
        ensure!(once == twice);
        ensure!(once == (Vec::new(), Vec::new(), DrawPhase::Unlocked, None));
        Ok(())
    }

    #[test]
    fn remove_name_at_checks_bounds() -> anyhow::Result<()> {
        let mut d = drawer_with("Ann, Bo, Ann");
        ensure!(d.remove_name_at(3).is_none());
        ensure!(d.remove_name_at(0).as_deref() == Some("Ann"));
        ensure!(d.names() == ["Bo", "Ann"]);
        Ok(())
    }

    #[test]
    fn extend_names_skips_blank_entries() -> anyhow::Result<()> {
        let mut d = Drawer::new();
        let added = d.extend_names(vec![" Ann ".to_string(), "  ".to_string(), "Bo".to_string()]);
        ensure!(added == 2);
        ensure!(d.names() == ["Ann", "Bo"]);
        Ok(())
    }

    proptest! {
        #[test]
        fn every_draw_is_a_bijection(
            names in proptest::collection::vec("[a-zA-Z ]{0,8}", 1..40),
            seed in any::<u64>(),
        ) {
            let mut d = Drawer::new();
            let added = d.extend_names(names);
            let mut rng = StdRng::seed_from_u64(seed);
            let drawn = d
                .draw_with(&mut rng)
                .map_err(|e| TestCaseError::fail(e.to_string()))?
                .len();
            prop_assert_eq!(drawn, added);
            prop_assert!(numbers_form_permutation(&d));
            prop_assert_eq!(d.is_locked(), added > 0);
        }
    }
}
