//! Crossword grid engine.
//!
//! The only mutable puzzle content is the sparse map of typed letters. The grid, the clue lists
//! and the completion state are projections of that map and the static entry list, rebuilt on
//! every read.

use chrono::{DateTime, Duration, Utc};
use leptos::logging::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

use crate::normalize::{fold_letter, normalize_strict};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Across,
    Down,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosswordEntry {
    pub id: String,
    pub number: u32,
    pub clue: String,
    pub answer: String,
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
}

impl CrosswordEntry {
    /// Upper-cased answer letters.
    pub fn letters(&self) -> Vec<char> {
        normalize_strict(&self.answer)
            .as_str()
            .to_uppercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }

    /// The cells this entry covers, in reading order. May run past the grid for a broken
    /// configuration; `CrosswordConfig::validate` reports that.
    pub fn cells(&self) -> Vec<CellPos> {
        (0..self.letters().len())
            .map(|i| match self.direction {
                Direction::Across => CellPos::new(self.row, self.col + i),
                Direction::Down => CellPos::new(self.row + i, self.col),
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosswordConfig {
    pub rows: usize,
    pub cols: usize,
    pub instructions: Option<String>,
    pub entries: Vec<CrosswordEntry>,
}

/// Content-authoring mistakes in a crossword definition.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CrosswordError {
    #[error("entry {id} runs outside the {rows}x{cols} grid")]
    OutOfBounds { id: String, rows: usize, cols: usize },
    #[error("entry id {0} is used more than once")]
    DuplicateId(String),
    #[error("entry {0} has an empty answer")]
    EmptyAnswer(String),
    #[error("entries {first} and {second} disagree at ({row}, {col}): {first_letter} vs {second_letter}")]
    ConflictingLetters {
        first: String,
        second: String,
        row: usize,
        col: usize,
        first_letter: char,
        second_letter: char,
    },
}

impl CrosswordConfig {
    pub fn in_bounds(&self, pos: CellPos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Checks the definition for authoring errors. The grid projection tolerates all of these,
    /// so a failure here never stops the puzzle from rendering.
    pub fn validate(&self) -> Result<(), CrosswordError> {
        let mut ids = HashSet::new();
        let mut letters: HashMap<CellPos, (&str, char)> = HashMap::new();
        for entry in &self.entries {
            if !ids.insert(entry.id.as_str()) {
                return Err(CrosswordError::DuplicateId(entry.id.clone()));
            }
            let answer = entry.letters();
            if answer.is_empty() {
                return Err(CrosswordError::EmptyAnswer(entry.id.clone()));
            }
            for (pos, letter) in entry.cells().into_iter().zip(answer) {
                if !self.in_bounds(pos) {
                    return Err(CrosswordError::OutOfBounds {
                        id: entry.id.clone(),
                        rows: self.rows,
                        cols: self.cols,
                    });
                }
                match letters.get(&pos) {
                    Some(&(other, existing)) if existing != letter => {
                        return Err(CrosswordError::ConflictingLetters {
                            first: other.to_string(),
                            second: entry.id.clone(),
                            row: pos.row,
                            col: pos.col,
                            first_letter: existing,
                            second_letter: letter,
                        });
                    }
                    Some(_) => {}
                    None => {
                        letters.insert(pos, (entry.id.as_str(), letter));
                    }
                }
            }
        }
        Ok(())
    }

    /// Every occupied, in-bounds cell with its solution letter. Later entries overwrite earlier
    /// ones at a contradictory crossing.
    fn solution_cells(&self) -> BTreeMap<CellPos, char> {
        let mut cells = BTreeMap::new();
        for entry in &self.entries {
            for (pos, letter) in entry.cells().into_iter().zip(entry.letters()) {
                if self.in_bounds(pos) {
                    cells.insert(pos, letter);
                }
            }
        }
        cells
    }

    pub fn entry(&self, entry_id: &str) -> Option<&CrosswordEntry> {
        self.entries.iter().find(|entry| entry.id == entry_id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub is_block: bool,
    pub number: Option<u32>,
    pub solution: Option<char>,
    pub value: Option<char>,
    pub entry_ids: Vec<String>,
    pub is_active: bool,
    pub is_correct: bool,
}

impl Cell {
    fn block(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            is_block: true,
            number: None,
            solution: None,
            value: None,
            entry_ids: Vec::new(),
            is_active: false,
            is_correct: false,
        }
    }
}

/// Whether a typed letter counts as the solution letter. Case and diacritics are ignored.
pub fn letters_match(typed: char, solution: char) -> bool {
    fold_letter(typed) == fold_letter(solution)
}

/// Projects the full grid from the entries and the typed letters.
pub fn build_grid(
    config: &CrosswordConfig,
    values: &BTreeMap<CellPos, char>,
    active_entry_id: Option<&str>,
) -> Vec<Vec<Cell>> {
    let mut grid: Vec<Vec<Cell>> = (0..config.rows)
        .map(|row| (0..config.cols).map(|col| Cell::block(row, col)).collect())
        .collect();

    for entry in &config.entries {
        let is_active = active_entry_id == Some(entry.id.as_str());
        for (index, (pos, solution)) in entry.cells().into_iter().zip(entry.letters()).enumerate() {
            let Some(cell) = grid.get_mut(pos.row).and_then(|row| row.get_mut(pos.col)) else {
                warn!(
                    "crossword entry {} leaves the {}x{} grid at ({}, {})",
                    entry.id, config.rows, config.cols, pos.row, pos.col
                );
                continue;
            };
            cell.is_block = false;
            cell.solution = Some(solution);
            cell.entry_ids.push(entry.id.clone());
            cell.value = values.get(&pos).copied();
            cell.is_correct = cell.value.is_some_and(|typed| letters_match(typed, solution));
            cell.is_active |= is_active;
            if index == 0 && cell.number.is_none() {
                cell.number = Some(entry.number);
            }
        }
    }

    grid
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueView {
    pub id: String,
    pub number: u32,
    pub clue: String,
    pub answer_length: usize,
    pub is_complete: bool,
    pub is_active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrosswordFeedback {
    Success { elapsed: Duration },
    NotCorrect,
}

/// One player's crossword session.
#[derive(Clone, Debug)]
pub struct CrosswordGame {
    config: CrosswordConfig,
    values: BTreeMap<CellPos, char>,
    active_entry_id: Option<String>,
    revealed: bool,
    has_completed: bool,
    feedback: Option<CrosswordFeedback>,
    last_signature: Option<String>,
    started_at: DateTime<Utc>,
}

impl CrosswordGame {
    pub fn new(config: CrosswordConfig) -> Self {
        Self::started_at(config, Utc::now())
    }

    pub fn started_at(config: CrosswordConfig, started_at: DateTime<Utc>) -> Self {
        if let Err(e) = config.validate() {
            warn!("crossword configuration error: {e}");
        }
        let active_entry_id = config.entries.first().map(|entry| entry.id.clone());
        Self {
            config,
            values: BTreeMap::new(),
            active_entry_id,
            revealed: false,
            has_completed: false,
            feedback: None,
            last_signature: None,
            started_at,
        }
    }

    pub fn config(&self) -> &CrosswordConfig {
        &self.config
    }

    pub fn board(&self) -> Vec<Vec<Cell>> {
        build_grid(&self.config, &self.values, self.active_entry_id.as_deref())
    }

    pub fn value_at(&self, row: usize, col: usize) -> Option<char> {
        self.values.get(&CellPos::new(row, col)).copied()
    }

    pub fn active_entry_id(&self) -> Option<&str> {
        self.active_entry_id.as_deref()
    }

    pub fn active_entry(&self) -> Option<&CrosswordEntry> {
        self.active_entry_id
            .as_deref()
            .and_then(|id| self.config.entry(id))
    }

    pub fn entry_cells(&self, entry_id: &str) -> Vec<CellPos> {
        self.config
            .entry(entry_id)
            .map(CrosswordEntry::cells)
            .unwrap_or_default()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn has_completed(&self) -> bool {
        self.has_completed
    }

    pub fn feedback(&self) -> Option<CrosswordFeedback> {
        self.feedback
    }

    pub fn dismiss_feedback(&mut self) {
        self.feedback = None;
    }

    pub fn across_clues(&self) -> Vec<ClueView> {
        self.clues(Direction::Across)
    }

    pub fn down_clues(&self) -> Vec<ClueView> {
        self.clues(Direction::Down)
    }

    fn clues(&self, direction: Direction) -> Vec<ClueView> {
        self.config
            .entries
            .iter()
            .filter(|entry| entry.direction == direction)
            .map(|entry| {
                let letters = entry.letters();
                let is_complete = entry.cells().iter().zip(&letters).all(|(pos, &solution)| {
                    self.values
                        .get(pos)
                        .is_some_and(|&typed| letters_match(typed, solution))
                });
                ClueView {
                    id: entry.id.clone(),
                    number: entry.number,
                    clue: entry.clue.clone(),
                    answer_length: letters.len(),
                    is_complete,
                    is_active: self.active_entry_id.as_deref() == Some(entry.id.as_str()),
                }
            })
            .collect()
    }

    fn entry_ids_at(&self, pos: CellPos) -> Vec<&str> {
        self.config
            .entries
            .iter()
            .filter(|entry| entry.cells().contains(&pos))
            .map(|entry| entry.id.as_str())
            .collect()
    }

    fn is_open_cell(&self, pos: CellPos) -> bool {
        self.config.in_bounds(pos) && !self.entry_ids_at(pos).is_empty()
    }

    /// Types into a cell. Keeps the last letter of `input`, erases on empty input and ignores
    /// anything else. Returns the completion event this edit produced, if any.
    pub fn set_cell_value(
        &mut self,
        row: usize,
        col: usize,
        input: &str,
    ) -> Option<CrosswordFeedback> {
        self.set_cell_value_at(row, col, input, Utc::now())
    }

    pub fn set_cell_value_at(
        &mut self,
        row: usize,
        col: usize,
        input: &str,
        now: DateTime<Utc>,
    ) -> Option<CrosswordFeedback> {
        let pos = CellPos::new(row, col);
        if self.revealed || !self.is_open_cell(pos) {
            return None;
        }

        let normalized = normalize_strict(input).as_str().to_uppercase();
        match normalized.chars().last() {
            None => {
                self.values.remove(&pos);
            }
            Some(letter) if letter.is_alphabetic() => {
                self.values.insert(pos, letter);
            }
            Some(_) => return None,
        }

        self.evaluate_completion(now)
    }

    /// True when every occupied cell holds a letter.
    pub fn is_full(&self) -> bool {
        self.config
            .solution_cells()
            .keys()
            .all(|pos| self.values.contains_key(pos))
    }

    fn evaluate_completion(&mut self, now: DateTime<Utc>) -> Option<CrosswordFeedback> {
        if self.revealed {
            return None;
        }

        let solution = self.config.solution_cells();
        let typed: Option<String> = solution
            .keys()
            .map(|pos| self.values.get(pos).copied())
            .collect();
        let Some(signature) = typed else {
            // Still filling in; no verdict until the board is full.
            self.has_completed = false;
            self.feedback = None;
            return None;
        };

        let all_correct = solution
            .iter()
            .all(|(pos, &letter)| self.values.get(pos).is_some_and(|&typed| letters_match(typed, letter)));
        self.has_completed = all_correct;

        // The same board content only gets one verdict.
        if self.last_signature.as_deref() == Some(signature.as_str()) {
            return None;
        }
        self.last_signature = Some(signature);

        let feedback = if all_correct {
            CrosswordFeedback::Success {
                elapsed: now - self.started_at,
            }
        } else {
            CrosswordFeedback::NotCorrect
        };
        self.feedback = Some(feedback);
        Some(feedback)
    }

    pub fn select_entry(&mut self, entry_id: &str) {
        if self.revealed || self.config.entry(entry_id).is_none() {
            return;
        }
        self.active_entry_id = Some(entry_id.to_string());
    }

    /// Makes the cell's first entry active, unless the cell already belongs to the active entry.
    pub fn focus_cell(&mut self, row: usize, col: usize) {
        if self.revealed {
            return;
        }
        let ids = self.entry_ids_at(CellPos::new(row, col));
        let Some(first) = ids.first() else {
            return;
        };
        if let Some(active) = self.active_entry_id.as_deref() {
            if ids.contains(&active) {
                return;
            }
        }
        self.active_entry_id = Some(first.to_string());
    }

    /// Switches between the across and down entry at a crossing cell.
    pub fn toggle_entry_at_cell(&mut self, row: usize, col: usize) {
        if self.revealed {
            return;
        }
        let ids = self.entry_ids_at(CellPos::new(row, col));
        if ids.len() < 2 {
            return;
        }
        let next = match self
            .active_entry_id
            .as_deref()
            .and_then(|active| ids.iter().position(|id| *id == active))
        {
            Some(index) => ids[(index + 1) % ids.len()],
            None => ids[0],
        };
        self.active_entry_id = Some(next.to_string());
    }

    /// A double click on a crossing prefers the down entry, and goes back across if down was
    /// already active.
    pub fn double_click_cell(&mut self, row: usize, col: usize) {
        if self.revealed {
            return;
        }
        let pos = CellPos::new(row, col);
        let at_cell = |direction: Direction| {
            self.config
                .entries
                .iter()
                .find(|entry| entry.direction == direction && entry.cells().contains(&pos))
                .map(|entry| entry.id.clone())
        };
        let (Some(down), Some(across)) = (at_cell(Direction::Down), at_cell(Direction::Across)) else {
            return;
        };
        if self.active_entry_id.as_deref() == Some(down.as_str()) {
            self.active_entry_id = Some(across);
        } else {
            self.active_entry_id = Some(down);
        }
    }

    /// Fills in the answer and locks the board for the rest of the session.
    pub fn reveal_solution(&mut self) {
        self.values = self.config.solution_cells();
        self.revealed = true;
        self.has_completed = true;
        self.feedback = None;
        self.active_entry_id = None;
        self.last_signature = None;
    }

    /// The cell `offset` steps along the active entry from `(row, col)`.
    pub fn step_within_entry(&self, row: usize, col: usize, offset: isize) -> Option<CellPos> {
        let cells = self.active_entry().map(CrosswordEntry::cells)?;
        let index = cells.iter().position(|pos| *pos == CellPos::new(row, col))?;
        let next = index.checked_add_signed(offset)?;
        cells.get(next).copied()
    }

    /// The nearest open cell from `(row, col)` moving in the given direction.
    pub fn step_in_grid(&self, row: usize, col: usize, d_row: isize, d_col: isize) -> Option<CellPos> {
        let (mut r, mut c) = (row, col);
        loop {
            r = r.checked_add_signed(d_row)?;
            c = c.checked_add_signed(d_col)?;
            let pos = CellPos::new(r, c);
            if !self.config.in_bounds(pos) {
                return None;
            }
            if self.is_open_cell(pos) {
                return Some(pos);
            }
        }
    }

    /// Where to put the cursor when an entry is selected: its first empty cell, or its start.
    pub fn first_empty_in_active_entry(&self) -> Option<CellPos> {
        let cells = self.active_entry().map(CrosswordEntry::cells)?;
        cells
            .iter()
            .find(|pos| self.config.in_bounds(**pos) && !self.values.contains_key(pos))
            .or_else(|| cells.first())
            .copied()
    }

    /// Types `input` and returns the cell to move to next along the active entry.
    pub fn input_letter(
        &mut self,
        row: usize,
        col: usize,
        input: &str,
    ) -> (Option<CrosswordFeedback>, Option<CellPos>) {
        let feedback = self.set_cell_value(row, col, input);
        if input.trim().is_empty() || self.value_at(row, col).is_none() {
            return (feedback, None);
        }
        (feedback, self.step_within_entry(row, col, 1))
    }

    /// Backspace: clears this cell, or the previous cell of the active entry when this one is
    /// already empty. Returns the cell that should receive focus.
    pub fn erase_backwards(&mut self, row: usize, col: usize) -> Option<CellPos> {
        if self.revealed {
            return None;
        }
        let previous = self.step_within_entry(row, col, -1);
        if self.value_at(row, col).is_some() {
            self.set_cell_value(row, col, "");
            return previous;
        }
        let previous = previous?;
        self.set_cell_value(previous.row, previous.col, "");
        Some(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, number: u32, answer: &str, row: usize, col: usize, direction: Direction) -> CrosswordEntry {
        CrosswordEntry {
            id: id.to_string(),
            number,
            clue: format!("Ledtråd {number}"),
            answer: answer.to_string(),
            row,
            col,
            direction,
        }
    }

    // The door 2 mini crossword: seven across words hanging off JULGRAN down column 4.
    fn julgran() -> CrosswordConfig {
        CrosswordConfig {
            rows: 7,
            cols: 9,
            instructions: None,
            entries: vec![
                entry("1A", 1, "JUL", 0, 4, Direction::Across),
                entry("2A", 2, "LJUS", 1, 2, Direction::Across),
                entry("3A", 3, "LUSSE", 2, 4, Direction::Across),
                entry("4A", 4, "GLÖGG", 3, 0, Direction::Across),
                entry("5A", 5, "RIS", 4, 4, Direction::Across),
                entry("6A", 6, "GRAN", 5, 2, Direction::Across),
                entry("7A", 7, "NATT", 6, 4, Direction::Across),
                entry("8D", 8, "JULGRAN", 0, 4, Direction::Down),
            ],
        }
    }

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_733_000_000, 0).expect("valid timestamp")
    }

    fn fill_solution(game: &mut CrosswordGame, now: DateTime<Utc>) -> Vec<CrosswordFeedback> {
        let solution = game.config().solution_cells();
        solution
            .iter()
            .filter_map(|(pos, letter)| game.set_cell_value_at(pos.row, pos.col, &letter.to_string(), now))
            .collect()
    }

    #[test]
    fn test_validate_sample() {
        assert_eq!(julgran().validate(), Ok(()));
        assert_eq!(julgran().solution_cells().len(), 28);
    }

    #[test]
    fn test_validate_out_of_bounds() {
        let mut config = julgran();
        config.entries.push(entry("9A", 9, "TOMTE", 0, 7, Direction::Across));
        assert!(matches!(
            config.validate(),
            Err(CrosswordError::OutOfBounds { ref id, .. }) if id == "9A"
        ));
        // The projection skips the overflow instead of panicking.
        let grid = build_grid(&config, &BTreeMap::new(), None);
        assert_eq!(grid.len(), 7);
        assert!(grid.iter().all(|row| row.len() == 9));
        assert!(!grid[0][8].is_block);
    }

    #[test]
    fn test_validate_conflicting_letters() {
        let mut config = julgran();
        config.entries.push(entry("9D", 9, "SNÖ", 1, 5, Direction::Down));
        assert!(matches!(
            config.validate(),
            Err(CrosswordError::ConflictingLetters { row: 2, col: 5, .. })
        ));
    }

    #[test]
    fn test_validate_duplicate_and_empty() {
        let mut config = julgran();
        config.entries.push(entry("1A", 1, "JUL", 0, 4, Direction::Across));
        assert_eq!(config.validate(), Err(CrosswordError::DuplicateId("1A".to_string())));

        let mut config = julgran();
        config.entries.push(entry("9A", 9, "  ", 0, 0, Direction::Across));
        assert_eq!(config.validate(), Err(CrosswordError::EmptyAnswer("9A".to_string())));
    }

    #[test]
    fn test_build_grid_projection() {
        let game = CrosswordGame::started_at(julgran(), start());
        let board = game.board();

        assert!(board[0][0].is_block);
        let crossing = &board[0][4];
        assert!(!crossing.is_block);
        assert_eq!(crossing.solution, Some('J'));
        assert_eq!(crossing.entry_ids, vec!["1A".to_string(), "8D".to_string()]);
        // The first entry starting here owns the number.
        assert_eq!(crossing.number, Some(1));
        assert_eq!(board[3][4].solution, Some('G'));
        assert_eq!(board[3][2].solution, Some('Ö'));
        assert_eq!(board[3][2].entry_ids, vec!["4A".to_string()]);

        // The first entry is active by default.
        assert!(board[0][5].is_active);
        assert!(!board[1][2].is_active);
    }

    #[test]
    fn test_set_cell_value_rules() {
        let mut game = CrosswordGame::started_at(julgran(), start());

        game.set_cell_value(0, 4, "j");
        assert_eq!(game.value_at(0, 4), Some('J'));

        // Typing into a cell that already holds a letter keeps the last one.
        game.set_cell_value(0, 4, "Jx");
        assert_eq!(game.value_at(0, 4), Some('X'));

        // Digits and symbols are ignored.
        game.set_cell_value(0, 4, "7");
        game.set_cell_value(0, 4, "!");
        assert_eq!(game.value_at(0, 4), Some('X'));

        // Block and out-of-range cells are ignored.
        game.set_cell_value(0, 0, "A");
        game.set_cell_value(40, 40, "A");
        assert_eq!(game.value_at(0, 0), None);

        // Swedish letters are kept as typed.
        game.set_cell_value(3, 2, "ö");
        assert_eq!(game.value_at(3, 2), Some('Ö'));
        assert!(game.board()[3][2].is_correct);

        // Empty input erases.
        game.set_cell_value(0, 4, "");
        assert_eq!(game.value_at(0, 4), None);
    }

    #[test]
    fn test_correct_fill_emits_one_success() {
        let mut game = CrosswordGame::started_at(julgran(), start());
        let later = start() + Duration::seconds(95);
        let events = fill_solution(&mut game, later);
        assert_eq!(
            events,
            vec![CrosswordFeedback::Success { elapsed: Duration::seconds(95) }]
        );
        assert!(game.has_completed());

        // Re-typing the same letter over a full, unchanged board stays quiet.
        assert_eq!(game.set_cell_value_at(0, 4, "J", later), None);
    }

    #[test]
    fn test_solved_board_erased_and_retyped_stays_completed() {
        let mut game = CrosswordGame::started_at(julgran(), start());
        fill_solution(&mut game, start());
        assert!(game.has_completed());

        assert_eq!(game.set_cell_value(0, 4, ""), None);
        assert!(!game.has_completed());

        // Same board as before: no second popup, but it is solved again.
        assert_eq!(game.set_cell_value(0, 4, "J"), None);
        assert!(game.is_full());
        assert!(game.has_completed());
        assert_eq!(game.feedback(), None);
    }

    #[test]
    fn test_partial_fill_is_silent() {
        let mut game = CrosswordGame::started_at(julgran(), start());
        let solution = game.config().solution_cells();
        let (last, _) = solution.iter().next_back().map(|(p, l)| (*p, *l)).expect("cells");
        for (pos, letter) in &solution {
            if *pos == last {
                continue;
            }
            assert_eq!(game.set_cell_value(pos.row, pos.col, &letter.to_string()), None);
        }
        assert!(!game.is_full());
        assert_eq!(game.feedback(), None);
        assert!(!game.has_completed());
    }

    #[test]
    fn test_wrong_letter_then_fix() {
        let mut game = CrosswordGame::started_at(julgran(), start());
        let solution = game.config().solution_cells();
        let mut events = Vec::new();
        for (pos, letter) in &solution {
            let typed = if *pos == CellPos::new(6, 7) { "X".to_string() } else { letter.to_string() };
            events.extend(game.set_cell_value(pos.row, pos.col, &typed));
        }
        assert_eq!(events, vec![CrosswordFeedback::NotCorrect]);
        assert!(!game.has_completed());

        // The same wrong board again stays quiet, even after erasing and re-typing.
        assert_eq!(game.set_cell_value(6, 7, "X"), None);
        assert_eq!(game.set_cell_value(6, 7, ""), None);
        assert_eq!(game.feedback(), None);
        assert_eq!(game.set_cell_value(6, 7, "x"), None);

        // A different wrong board is a new verdict.
        assert_eq!(game.set_cell_value(6, 7, "Q"), Some(CrosswordFeedback::NotCorrect));

        // Fixing the letter succeeds exactly once.
        assert!(matches!(
            game.set_cell_value(6, 7, "t"),
            Some(CrosswordFeedback::Success { .. })
        ));
        assert!(game.has_completed());
        assert_eq!(game.set_cell_value(6, 7, "T"), None);
    }

    #[test]
    fn test_completion_ignores_diacritics() {
        let mut game = CrosswordGame::started_at(julgran(), start());
        let solution = game.config().solution_cells();
        let mut events = Vec::new();
        for (pos, letter) in &solution {
            let typed = if *letter == 'Ö' { "o".to_string() } else { letter.to_lowercase().to_string() };
            events.extend(game.set_cell_value(pos.row, pos.col, &typed));
        }
        assert!(matches!(events.as_slice(), [CrosswordFeedback::Success { .. }]));
    }

    #[test]
    fn test_reveal_is_terminal() {
        let mut game = CrosswordGame::started_at(julgran(), start());
        game.set_cell_value(0, 4, "Q");
        game.reveal_solution();

        let before = game.board();
        assert!(game.is_revealed());
        assert!(game.has_completed());
        assert_eq!(game.active_entry_id(), None);
        assert_eq!(game.value_at(0, 4), Some('J'));
        assert!(before.iter().flatten().filter(|c| !c.is_block).all(|c| c.is_correct));

        assert_eq!(game.set_cell_value(0, 4, "Z"), None);
        assert_eq!(game.set_cell_value(0, 4, ""), None);
        assert_eq!(game.erase_backwards(0, 5), None);
        game.select_entry("4A");
        game.focus_cell(3, 0);
        assert_eq!(game.board(), before);
        assert_eq!(game.feedback(), None);
    }

    #[test]
    fn test_focus_keeps_active_entry_within_word() {
        let mut game = CrosswordGame::started_at(julgran(), start());
        game.select_entry("8D");
        // (0,4) is shared by 1A and 8D; 8D stays active.
        game.focus_cell(0, 4);
        assert_eq!(game.active_entry_id(), Some("8D"));
        // (3,0) only belongs to 4A.
        game.focus_cell(3, 0);
        assert_eq!(game.active_entry_id(), Some("4A"));
        // Blocks change nothing.
        game.focus_cell(0, 0);
        assert_eq!(game.active_entry_id(), Some("4A"));
        // Unknown ids are ignored.
        game.select_entry("99X");
        assert_eq!(game.active_entry_id(), Some("4A"));
    }

    #[test]
    fn test_toggle_entry_at_cell() {
        let mut game = CrosswordGame::started_at(julgran(), start());
        assert_eq!(game.active_entry_id(), Some("1A"));
        game.toggle_entry_at_cell(0, 4);
        assert_eq!(game.active_entry_id(), Some("8D"));
        game.toggle_entry_at_cell(0, 4);
        assert_eq!(game.active_entry_id(), Some("1A"));

        // Non-crossing cell.
        game.toggle_entry_at_cell(0, 5);
        assert_eq!(game.active_entry_id(), Some("1A"));
        game.select_entry("4A");
        game.toggle_entry_at_cell(0, 5);
        assert_eq!(game.active_entry_id(), Some("4A"));
    }

    #[test]
    fn test_double_click_prefers_down() {
        let mut game = CrosswordGame::started_at(julgran(), start());
        game.double_click_cell(2, 4);
        assert_eq!(game.active_entry_id(), Some("8D"));
        game.double_click_cell(2, 4);
        assert_eq!(game.active_entry_id(), Some("3A"));
    }

    #[test]
    fn test_clue_views() {
        let mut game = CrosswordGame::started_at(julgran(), start());
        assert_eq!(game.across_clues().len(), 7);
        let down = game.down_clues();
        assert_eq!(down.len(), 1);
        assert_eq!(down[0].answer_length, 7);
        assert!(!down[0].is_active);

        for (col, letter) in [(4, "j"), (5, "u"), (6, "l")] {
            game.set_cell_value(0, col, letter);
        }
        let across = game.across_clues();
        assert!(across[0].is_complete);
        assert!(across[0].is_active);
        assert!(!across[1].is_complete);
    }

    #[test]
    fn test_navigation() {
        let mut game = CrosswordGame::started_at(julgran(), start());
        game.select_entry("4A");
        assert_eq!(game.step_within_entry(3, 0, 1), Some(CellPos::new(3, 1)));
        assert_eq!(game.step_within_entry(3, 0, -1), None);
        assert_eq!(game.step_within_entry(3, 4, 1), None);
        assert_eq!(game.step_within_entry(0, 0, 1), None);

        // Moving down from (3,0) skips blocks until it runs off the grid.
        assert_eq!(game.step_in_grid(3, 0, 1, 0), None);
        assert_eq!(game.step_in_grid(3, 4, -1, 0), Some(CellPos::new(2, 4)));
        assert_eq!(game.step_in_grid(1, 2, 0, 1), Some(CellPos::new(1, 3)));
        assert_eq!(game.step_in_grid(0, 4, -1, 0), None);

        assert_eq!(game.first_empty_in_active_entry(), Some(CellPos::new(3, 0)));
        let (_, next) = game.input_letter(3, 0, "g");
        assert_eq!(next, Some(CellPos::new(3, 1)));
        let (_, next) = game.input_letter(3, 1, "%");
        assert_eq!(next, None);
        assert_eq!(game.first_empty_in_active_entry(), Some(CellPos::new(3, 1)));
    }

    #[test]
    fn test_erase_backwards() {
        let mut game = CrosswordGame::started_at(julgran(), start());
        game.select_entry("1A");
        game.set_cell_value(0, 4, "J");
        game.set_cell_value(0, 5, "U");

        // Filled cell: clear it and step back.
        assert_eq!(game.erase_backwards(0, 5), Some(CellPos::new(0, 4)));
        assert_eq!(game.value_at(0, 5), None);
        assert_eq!(game.value_at(0, 4), Some('J'));

        // Empty cell: clear the previous one.
        assert_eq!(game.erase_backwards(0, 5), Some(CellPos::new(0, 4)));
        assert_eq!(game.value_at(0, 4), None);

        // Start of the word with nothing to clear.
        assert_eq!(game.erase_backwards(0, 4), None);
    }
}
