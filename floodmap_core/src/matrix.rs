// Copyright 2026 the Floodmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scenario matrix controller.
//!
//! A derived view over the scenario grid: one climate, one parameter, and a
//! set of maintenance levels crossed against the fixed return-period list.
//! The matrix holds selection axes only; it never owns visibility. Cell,
//! row, and column interactions are computed into [`LeafToggle`] batches
//! against the caller's current visible-id set, and the reconciler applies
//! them. Ids are built through [`catalog::scenario_layer_name`], the same
//! function the catalog used, so the two can never drift: correctness here
//! is string equality, not structural lookup.
//!
//! # Modes
//!
//! - **Single**: exactly one maintenance level is selected, and toggling a
//!   cell visible first forces every *other return period* of that same
//!   maintenance and parameter invisible, so at most one return period shows
//!   per maintenance axis.
//! - **Compare-all**: every maintenance level is selected and cells toggle
//!   independently.
//!
//! Switching modes only reshapes the selection (collapse to the first
//! selected element, or expand to the full set); layers already visible
//! under the old mode are left untouched. In compare-all mode the selection
//! can be narrowed one level at a time through
//! [`ScenarioMatrix::toggle_maintenance`]. The matrix affects visibility
//! going forward, through explicit toggle actions.

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;

use crate::catalog::{self, Climate, Maintenance, Parameter, RETURN_PERIODS};
use crate::reconciler::LeafToggle;

/// Single-scenario or compare-all selection mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatrixMode {
    /// One maintenance level at a time, with return-period exclusivity.
    Single,
    /// All maintenance levels side by side, independent cells.
    CompareAll,
}

/// Selection state of the scenario matrix.
#[derive(Clone, Debug)]
pub struct ScenarioMatrix {
    climate: Climate,
    mode: MatrixMode,
    parameter: Parameter,
    selected: Vec<Maintenance>,
}

impl Default for ScenarioMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioMatrix {
    /// Creates a matrix in single mode with the default axes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            climate: Climate::Present,
            mode: MatrixMode::Single,
            parameter: Parameter::MaxDepth,
            selected: alloc::vec![Maintenance::Breaches],
        }
    }

    /// Current climate axis.
    #[must_use]
    pub fn climate(&self) -> Climate {
        self.climate
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> MatrixMode {
        self.mode
    }

    /// Current parameter axis.
    #[must_use]
    pub fn parameter(&self) -> Parameter {
        self.parameter
    }

    /// Currently selected maintenance levels, in display order.
    #[must_use]
    pub fn selected(&self) -> &[Maintenance] {
        &self.selected
    }

    /// Sets the climate axis. Forward-looking only; nothing toggles.
    pub fn set_climate(&mut self, climate: Climate) {
        self.climate = climate;
    }

    /// Sets the parameter axis. Forward-looking only; nothing toggles.
    pub fn set_parameter(&mut self, parameter: Parameter) {
        self.parameter = parameter;
    }

    /// Switches selection mode.
    ///
    /// Compare-all → single collapses the maintenance selection to its first
    /// previously selected element (or the default). Single → compare-all
    /// expands to the full fixed set. Layers toggled visible under the old
    /// mode are never retroactively altered.
    pub fn set_mode(&mut self, mode: MatrixMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        match mode {
            MatrixMode::Single => {
                let first = self.selected.first().copied().unwrap_or(Maintenance::Breaches);
                self.selected.clear();
                self.selected.push(first);
            }
            MatrixMode::CompareAll => {
                self.selected = Maintenance::ALL.to_vec();
            }
        }
    }

    /// Toggles one maintenance level in or out of the compare-all selection.
    ///
    /// Only meaningful in compare-all mode; in single mode the single
    /// selected level is fixed by the mode transition, so this is a no-op.
    /// Deselecting the last remaining level is likewise a no-op: the
    /// selection never empties. The selection always keeps
    /// [`Maintenance::ALL`] display order.
    pub fn toggle_maintenance(&mut self, maintenance: Maintenance) {
        if self.mode != MatrixMode::CompareAll {
            return;
        }
        if self.selected.contains(&maintenance) {
            if self.selected.len() == 1 {
                return;
            }
            self.selected.retain(|&m| m != maintenance);
        } else {
            self.selected = Maintenance::ALL
                .into_iter()
                .filter(|m| *m == maintenance || self.selected.contains(m))
                .collect();
        }
    }

    /// The leaf id for a cell under the current climate and parameter axes.
    #[must_use]
    pub fn layer_id(&self, return_period: u16, maintenance: Maintenance) -> String {
        catalog::scenario_layer_name(return_period, self.climate, maintenance, self.parameter)
    }

    /// Computes the toggle batch for one `(return period, maintenance)` cell.
    ///
    /// In single mode with exactly one selected maintenance, all other
    /// return periods of that maintenance and parameter are forced invisible
    /// first. In compare-all mode the cell toggles independently. (The
    /// exclusivity pass deliberately keys on `selected.len() == 1` and only
    /// suppresses the same maintenance axis.)
    #[must_use]
    pub fn toggle_cell(
        &self,
        return_period: u16,
        maintenance: Maintenance,
        visible: &BTreeSet<String>,
    ) -> Vec<LeafToggle> {
        let id = self.layer_id(return_period, maintenance);
        let mut out = Vec::new();
        if self.mode == MatrixMode::Single && self.selected.len() == 1 {
            for other in RETURN_PERIODS {
                if other == return_period {
                    continue;
                }
                let other_id = self.layer_id(other, maintenance);
                if visible.contains(&other_id) {
                    out.push(LeafToggle::new(other_id, false));
                }
            }
        }
        let currently = visible.contains(&id);
        out.push(LeafToggle::new(id, !currently));
        out
    }

    /// Computes the toggle batch for a whole row: one return period across
    /// every currently selected maintenance.
    ///
    /// A single "any active" probe decides the direction: if any cell in the
    /// row is visible, the whole row hides; otherwise the whole row shows.
    #[must_use]
    pub fn toggle_row(&self, return_period: u16, visible: &BTreeSet<String>) -> Vec<LeafToggle> {
        let ids: Vec<String> = self
            .selected
            .iter()
            .map(|&m| self.layer_id(return_period, m))
            .collect();
        Self::bulk(ids, visible)
    }

    /// Computes the toggle batch for a whole column: one maintenance across
    /// every return period. Same any-active probe as rows.
    #[must_use]
    pub fn toggle_column(
        &self,
        maintenance: Maintenance,
        visible: &BTreeSet<String>,
    ) -> Vec<LeafToggle> {
        let ids: Vec<String> = RETURN_PERIODS
            .iter()
            .map(|&rp| self.layer_id(rp, maintenance))
            .collect();
        Self::bulk(ids, visible)
    }

    /// Probe first, then set every member to the opposite.
    fn bulk(ids: Vec<String>, visible: &BTreeSet<String>) -> Vec<LeafToggle> {
        let any_active = ids.iter().any(|id| visible.contains(id));
        ids.into_iter()
            .map(|id| LeafToggle::new(id, !any_active))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    fn visible_of(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    fn applied(visible: &BTreeSet<String>, batch: &[LeafToggle]) -> BTreeSet<String> {
        let mut out = visible.clone();
        for t in batch {
            if t.visible {
                out.insert(t.id.clone());
            } else {
                out.remove(&t.id);
            }
        }
        out
    }

    #[test]
    fn single_mode_cell_toggle_is_exclusive_per_maintenance() {
        let m = ScenarioMatrix::new();
        let visible = visible_of(&["t3_25yrs_present_breaches_maxdepth"]);
        let batch = m.toggle_cell(50, Maintenance::Breaches, &visible);

        let after = applied(&visible, &batch);
        assert!(after.contains("t3_50yrs_present_breaches_maxdepth"));
        assert!(!after.contains("t3_25yrs_present_breaches_maxdepth"));
        assert_eq!(after.len(), 1, "at most one return period per maintenance");
    }

    #[test]
    fn single_mode_toggle_off_clears_cell() {
        let m = ScenarioMatrix::new();
        let visible = visible_of(&["t3_50yrs_present_breaches_maxdepth"]);
        let batch = m.toggle_cell(50, Maintenance::Breaches, &visible);
        let after = applied(&visible, &batch);
        assert!(after.is_empty());
    }

    #[test]
    fn single_mode_exclusivity_spares_other_maintenances() {
        let m = ScenarioMatrix::new();
        // A perfect-maintenance layer is visible from earlier interaction.
        let visible = visible_of(&[
            "t3_25yrs_present_breaches_maxdepth",
            "t3_25yrs_present_perfect_maxdepth",
        ]);
        let batch = m.toggle_cell(50, Maintenance::Breaches, &visible);
        let after = applied(&visible, &batch);
        assert!(after.contains("t3_25yrs_present_perfect_maxdepth"));
        assert!(!after.contains("t3_25yrs_present_breaches_maxdepth"));
        assert!(after.contains("t3_50yrs_present_breaches_maxdepth"));
    }

    #[test]
    fn compare_mode_cells_are_independent() {
        let mut m = ScenarioMatrix::new();
        m.set_mode(MatrixMode::CompareAll);
        let visible = visible_of(&[
            "t3_25yrs_present_breaches_maxdepth",
            "t3_25yrs_present_perfect_maxdepth",
        ]);
        let batch = m.toggle_cell(25, Maintenance::Breaches, &visible);
        let after = applied(&visible, &batch);
        assert!(!after.contains("t3_25yrs_present_breaches_maxdepth"));
        assert!(
            after.contains("t3_25yrs_present_perfect_maxdepth"),
            "other maintenance stays untouched in compare mode"
        );
    }

    #[test]
    fn row_toggle_probes_then_flips_whole_row() {
        let mut m = ScenarioMatrix::new();
        m.set_mode(MatrixMode::CompareAll);
        // Narrow the selection the way a UI with checkboxes would.
        m.toggle_maintenance(Maintenance::Perfect);
        assert_eq!(m.selected(), &[Maintenance::Breaches, Maintenance::RedCapacity]);

        let visible = BTreeSet::new();
        let batch = m.toggle_row(100, &visible);
        let after = applied(&visible, &batch);
        assert!(after.contains("t3_100yrs_present_breaches_maxdepth"));
        assert!(after.contains("t3_100yrs_present_redcapacity_maxdepth"));

        // Any-active probe: now both are on, a second toggle hides both.
        let batch = m.toggle_row(100, &after);
        let after = applied(&after, &batch);
        assert!(after.is_empty());
    }

    #[test]
    fn row_toggle_hides_all_when_partially_active() {
        let mut m = ScenarioMatrix::new();
        m.set_mode(MatrixMode::CompareAll);
        let visible = visible_of(&["t3_100yrs_present_breaches_maxdepth"]);
        let batch = m.toggle_row(100, &visible);
        let after = applied(&visible, &batch);
        // One cell was active, so the probe says "hide the whole row".
        assert!(after.is_empty());
    }

    #[test]
    fn column_toggle_spans_all_return_periods() {
        let mut m = ScenarioMatrix::new();
        m.set_mode(MatrixMode::CompareAll);
        let visible = BTreeSet::new();
        let batch = m.toggle_column(Maintenance::Perfect, &visible);
        assert_eq!(batch.len(), RETURN_PERIODS.len());
        let after = applied(&visible, &batch);
        for rp in RETURN_PERIODS {
            assert!(after.contains(&m.layer_id(rp, Maintenance::Perfect)));
        }
    }

    #[test]
    fn mode_transition_reshapes_selection_only() {
        let mut m = ScenarioMatrix::new();
        m.set_mode(MatrixMode::CompareAll);
        assert_eq!(m.selected(), &Maintenance::ALL);

        // Collapse keeps the first previously selected element.
        m.set_mode(MatrixMode::Single);
        assert_eq!(m.selected(), &[Maintenance::Breaches]);

        // Setting the same mode again is a no-op.
        m.set_mode(MatrixMode::Single);
        assert_eq!(m.selected(), &[Maintenance::Breaches]);
    }

    #[test]
    fn maintenance_toggle_narrows_and_restores_display_order() {
        let mut m = ScenarioMatrix::new();
        m.set_mode(MatrixMode::CompareAll);

        m.toggle_maintenance(Maintenance::Breaches);
        assert_eq!(m.selected(), &[Maintenance::Perfect, Maintenance::RedCapacity]);

        // Reselecting slots the level back into display order.
        m.toggle_maintenance(Maintenance::Breaches);
        assert_eq!(m.selected(), &Maintenance::ALL);
    }

    #[test]
    fn maintenance_toggle_never_empties_selection() {
        let mut m = ScenarioMatrix::new();
        m.set_mode(MatrixMode::CompareAll);
        m.toggle_maintenance(Maintenance::Perfect);
        m.toggle_maintenance(Maintenance::RedCapacity);
        assert_eq!(m.selected(), &[Maintenance::Breaches]);

        // Deselecting the last level is refused.
        m.toggle_maintenance(Maintenance::Breaches);
        assert_eq!(m.selected(), &[Maintenance::Breaches]);
    }

    #[test]
    fn maintenance_toggle_is_inert_in_single_mode() {
        let mut m = ScenarioMatrix::new();
        m.toggle_maintenance(Maintenance::Perfect);
        assert_eq!(m.selected(), &[Maintenance::Breaches]);
    }

    #[test]
    fn climate_axis_flows_into_ids() {
        let mut m = ScenarioMatrix::new();
        m.set_climate(Climate::Future);
        m.set_parameter(Parameter::ArrivalTime);
        assert_eq!(
            m.layer_id(10, Maintenance::Perfect),
            "t3_10yrs_future_perfect_arrivaltime"
        );
    }
}
