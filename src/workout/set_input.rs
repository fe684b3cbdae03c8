// ABOUTME: Editable set rows for one exercise slot with per-row save state
// ABOUTME: Rows are seeded from targets and previous sets, then saved through the active workout store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use crate::errors::{AppError, AppResult};
use crate::models::{SetData, SetUpdate, WorkoutSet};
use crate::workout::session::{ActiveExercise, ActiveWorkoutStore};
use uuid::Uuid;

/// Save state of one input row
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RowState {
    /// Not saved yet
    #[default]
    Pristine,
    /// Save in flight
    Pending,
    /// Stored under this set id
    Confirmed(Uuid),
    /// Last save failed with this message
    Failed(String),
}

/// One editable set row
#[derive(Debug, Clone, PartialEq)]
pub struct SetInputRow {
    /// Position shown to the user
    pub set_number: u32,
    /// Entered weight
    pub weight: Option<f64>,
    /// Entered reps
    pub reps: Option<u32>,
    /// Warmup flag
    pub is_warmup: bool,
    /// Save state
    pub state: RowState,
    /// Id of the stored set once the row was saved, kept across failed edits
    pub record_id: Option<Uuid>,
}

impl SetInputRow {
    fn blank(set_number: u32) -> Self {
        Self {
            set_number,
            weight: None,
            reps: None,
            is_warmup: false,
            state: RowState::Pristine,
            record_id: None,
        }
    }

    fn from_logged(set: &WorkoutSet) -> Self {
        Self {
            set_number: set.set_number,
            weight: set.data.weight,
            reps: set.data.reps,
            is_warmup: set.data.is_warmup,
            state: RowState::Confirmed(set.id),
            record_id: Some(set.id),
        }
    }

    /// Values to store
    #[must_use]
    pub fn data(&self) -> SetData {
        SetData {
            weight: self.weight,
            reps: self.reps,
            is_warmup: self.is_warmup,
            ..SetData::default()
        }
    }

    /// Whether the row holds a confirmed save
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self.state, RowState::Confirmed(_))
    }

    /// Whether the row has a stored set behind it
    #[must_use]
    pub const fn is_stored(&self) -> bool {
        self.record_id.is_some()
    }
}

/// Input rows of one exercise slot
#[derive(Debug, Clone, PartialEq)]
pub struct SetInputModel {
    workout_exercise_id: Uuid,
    hidden_through: u32,
    rows: Vec<SetInputRow>,
}

impl SetInputModel {
    /// Rows for `slot`
    ///
    /// There is one row per target set, or per logged set if more were
    /// logged. Logged sets fill their rows as confirmed; the remaining rows
    /// are pre-filled with weight and reps from `previous` at the same
    /// position, falling back to the last previous set.
    ///
    /// Unsaved rows are numbered after the stored ones. The store numbers
    /// sets in the order they are saved, so saving a row relabels and
    /// reorders the rows: stored rows come first by `set_number`, unsaved
    /// rows follow in their existing order. A row's index can therefore
    /// change after a save; [`Self::position_of`] finds it again.
    #[must_use]
    pub fn seed(slot: &ActiveExercise, previous: &[WorkoutSet]) -> Self {
        let target = usize::try_from(slot.workout_exercise.target_sets).unwrap_or(0);
        let count = target.max(slot.sets.len());
        let rows = (0..count)
            .map(|index| {
                if let Some(logged) = slot.sets.get(index) {
                    return SetInputRow::from_logged(logged);
                }
                let mut row = SetInputRow::blank(slot.set_number_at(index));
                if let Some(prev) = previous.get(index).or_else(|| previous.last()) {
                    row.weight = prev.data.weight;
                    row.reps = prev.data.reps;
                }
                row
            })
            .collect();
        Self {
            workout_exercise_id: slot.id(),
            hidden_through: slot.hidden_through,
            rows,
        }
    }

    /// Slot the rows belong to
    #[must_use]
    pub const fn workout_exercise_id(&self) -> Uuid {
        self.workout_exercise_id
    }

    /// All rows in order
    #[must_use]
    pub fn rows(&self) -> &[SetInputRow] {
        &self.rows
    }

    /// Row at `index` for editing
    pub fn row_mut(&mut self, index: usize) -> Option<&mut SetInputRow> {
        self.rows.get_mut(index)
    }

    /// Index of the row stored as `set_id`
    #[must_use]
    pub fn position_of(&self, set_id: Uuid) -> Option<usize> {
        self.rows.iter().position(|r| r.record_id == Some(set_id))
    }

    fn number_after_last(&self) -> u32 {
        self.rows
            .iter()
            .map(|r| r.set_number)
            .max()
            .unwrap_or(self.hidden_through)
            .saturating_add(1)
    }

    /// Stored rows first by `set_number`, then unsaved rows numbered after them
    fn relabel(&mut self) {
        self.rows
            .sort_by_key(|r| if r.is_stored() { (0, r.set_number) } else { (1, 0) });
        let mut next = self
            .rows
            .iter()
            .filter(|r| r.is_stored())
            .map(|r| r.set_number)
            .max()
            .unwrap_or(self.hidden_through);
        for row in self.rows.iter_mut().filter(|r| !r.is_stored()) {
            next = next.saturating_add(1);
            row.set_number = next;
        }
    }

    /// Append a row pre-filled from the last one
    pub fn add_row(&mut self) -> usize {
        let mut row = SetInputRow::blank(self.number_after_last());
        if let Some(last) = self.rows.last() {
            row.weight = last.weight;
            row.reps = last.reps;
        }
        self.rows.push(row);
        self.rows.len() - 1
    }

    /// Rows not confirmed yet
    #[must_use]
    pub fn unsaved_count(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_confirmed()).count()
    }

    fn row(&self, index: usize) -> AppResult<&SetInputRow> {
        self.rows
            .get(index)
            .ok_or_else(|| AppError::invalid_input(format!("No set row at position {}", index + 1)))
    }

    /// Mark a row pending, returning its stored id (if any) and values
    ///
    /// Fails if the row is already saving or has no reps.
    pub fn begin_save(&mut self, index: usize) -> AppResult<(Option<Uuid>, SetData)> {
        let row = self.row(index)?;
        if row.state == RowState::Pending {
            return Err(AppError::invalid_state("This set is already being saved"));
        }
        if row.reps.is_none() {
            return Err(AppError::invalid_input("Enter reps before saving the set"));
        }
        let prepared = (row.record_id, row.data());
        if let Some(row) = self.rows.get_mut(index) {
            row.state = RowState::Pending;
        }
        Ok(prepared)
    }

    /// Mark a row saved as `set`, then relabel the rows
    pub fn confirm(&mut self, index: usize, set: &WorkoutSet) {
        if let Some(row) = self.rows.get_mut(index) {
            row.set_number = set.set_number;
            row.state = RowState::Confirmed(set.id);
            row.record_id = Some(set.id);
        }
        self.relabel();
    }

    /// Mark a row failed with `error`'s message
    pub fn fail(&mut self, index: usize, error: &AppError) {
        if let Some(row) = self.rows.get_mut(index) {
            row.state = RowState::Failed(error.user_message().to_owned());
        }
    }

    /// Save a row through `store`: a new set the first time, an update afterwards
    pub async fn save_row(
        &mut self,
        store: &ActiveWorkoutStore,
        index: usize,
    ) -> AppResult<WorkoutSet> {
        let (record_id, data) = self.begin_save(index)?;
        let result = match record_id {
            Some(id) => store.update_set(id, &SetUpdate::from_data(&data)).await,
            None => store.log_set(self.workout_exercise_id, data).await,
        };
        match result {
            Ok(set) => {
                self.confirm(index, &set);
                Ok(set)
            }
            Err(e) => {
                self.fail(index, &e);
                Err(e)
            }
        }
    }
}
