use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::normalize::word_letters;

pub const DEFAULT_MAX_GUESSES: usize = 6;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordleConfig {
    pub solution: String,
    pub max_guesses: Option<usize>,
    pub instructions: Option<String>,
    pub hint: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterStatus {
    Correct, // green: right letter, right position
    Present, // yellow: right letter, wrong position
    Absent,  // gray: wrong letter
    Unused,  // default for keyboard
}

impl LetterStatus {
    fn priority(self) -> u8 {
        match self {
            LetterStatus::Correct => 3,
            LetterStatus::Present => 2,
            LetterStatus::Absent => 1,
            LetterStatus::Unused => 0,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            LetterStatus::Correct => "correct",
            LetterStatus::Present => "present",
            LetterStatus::Absent => "absent",
            LetterStatus::Unused => "",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterResult {
    pub letter: char,
    pub status: LetterStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessResult {
    pub guess: String,
    pub letters: Vec<LetterResult>,
    pub is_correct: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WordleError {
    #[error("Ordet måste vara {expected} bokstäver.")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("Spelet är slut.")]
    GameOver,
}

/// Scores `guess` against `solution`, letter by letter.
///
/// Both words are compared in their upper-cased letters-only form. A repeated letter is never
/// marked correct or present more times than it occurs in the solution.
pub fn evaluate(guess: &str, solution: &str) -> Result<Vec<LetterResult>, WordleError> {
    let guess: Vec<char> = word_letters(guess).chars().collect();
    let target: Vec<char> = word_letters(solution).chars().collect();
    if guess.len() != target.len() {
        return Err(WordleError::LengthMismatch {
            expected: target.len(),
            actual: guess.len(),
        });
    }

    let mut statuses = vec![LetterStatus::Absent; guess.len()];
    let mut target_counts: HashMap<char, usize> = HashMap::new();
    for &c in &target {
        *target_counts.entry(c).or_insert(0) += 1;
    }

    // First pass: Correct positions.
    for (i, &c) in guess.iter().enumerate() {
        if target[i] == c {
            statuses[i] = LetterStatus::Correct;
            if let Some(count) = target_counts.get_mut(&c) {
                *count -= 1;
            }
        }
    }

    // Second pass: Present but wrong position.
    for (i, &c) in guess.iter().enumerate() {
        if statuses[i] == LetterStatus::Correct {
            continue;
        }
        if let Some(count) = target_counts.get_mut(&c).filter(|count| **count > 0) {
            statuses[i] = LetterStatus::Present;
            *count -= 1;
        }
    }

    Ok(guess
        .into_iter()
        .zip(statuses)
        .map(|(letter, status)| LetterResult { letter, status })
        .collect())
}

/// Folds one guess into the per-letter keyboard state. A letter only ever moves up in priority:
/// Correct > Present > Absent.
pub fn merge_letter_statuses(keyboard: &mut HashMap<char, LetterStatus>, letters: &[LetterResult]) {
    for result in letters {
        let current = keyboard
            .get(&result.letter)
            .copied()
            .unwrap_or(LetterStatus::Unused);
        if result.status.priority() > current.priority() {
            keyboard.insert(result.letter, result.status);
        }
    }
}

/// One Wordle session. Guesses are append-only until the game is won or lost.
#[derive(Clone, Debug)]
pub struct WordleGame {
    solution: String,
    max_guesses: usize,
    guesses: Vec<GuessResult>,
    current_guess: String,
    status: GameStatus,
    error: Option<WordleError>,
}

impl WordleGame {
    pub fn new(config: &WordleConfig) -> Self {
        Self {
            solution: word_letters(&config.solution),
            max_guesses: config.max_guesses.unwrap_or(DEFAULT_MAX_GUESSES).max(1),
            guesses: Vec::new(),
            current_guess: String::new(),
            status: GameStatus::Playing,
            error: None,
        }
    }

    pub fn solution(&self) -> &str {
        &self.solution
    }

    pub fn solution_length(&self) -> usize {
        self.solution.chars().count()
    }

    pub fn max_guesses(&self) -> usize {
        self.max_guesses
    }

    pub fn guesses(&self) -> &[GuessResult] {
        &self.guesses
    }

    pub fn current_guess(&self) -> &str {
        &self.current_guess
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn error(&self) -> Option<&WordleError> {
        self.error.as_ref()
    }

    pub fn remaining_attempts(&self) -> usize {
        self.max_guesses.saturating_sub(self.guesses.len())
    }

    /// Replaces the pending guess with the sanitized form of `input`, cut to the solution
    /// length.
    pub fn update_guess(&mut self, input: &str) {
        if self.status != GameStatus::Playing {
            return;
        }
        self.current_guess = word_letters(input)
            .chars()
            .take(self.solution_length())
            .collect();
        self.error = None;
    }

    pub fn push_letter(&mut self, letter: char) {
        let mut next = self.current_guess.clone();
        next.push(letter);
        self.update_guess(&next);
    }

    pub fn pop_letter(&mut self) {
        if self.status != GameStatus::Playing {
            return;
        }
        self.current_guess.pop();
        self.error = None;
    }

    /// Submits the pending guess. A wrong-length guess is kept so the player can fix it, and the
    /// error is also exposed through `error()` for inline display.
    pub fn submit_current_guess(&mut self) -> Result<&GuessResult, WordleError> {
        let guess = self.current_guess.clone();
        self.submit(&guess)
    }

    pub fn submit(&mut self, guess: &str) -> Result<&GuessResult, WordleError> {
        if self.status != GameStatus::Playing {
            return Err(WordleError::GameOver);
        }

        let letters = match evaluate(guess, &self.solution) {
            Ok(letters) => letters,
            Err(e) => {
                self.error = Some(e.clone());
                return Err(e);
            }
        };
        let is_correct = letters.iter().all(|l| l.status == LetterStatus::Correct);
        self.guesses.push(GuessResult {
            guess: letters.iter().map(|l| l.letter).collect(),
            letters,
            is_correct,
        });
        self.current_guess.clear();
        self.error = None;

        // Check win/loss.
        if is_correct {
            self.status = GameStatus::Won;
        } else if self.guesses.len() >= self.max_guesses {
            self.status = GameStatus::Lost;
        }

        match self.guesses.last() {
            Some(result) => Ok(result),
            None => Err(WordleError::GameOver),
        }
    }

    /// Clears every guess and starts over with the same solution.
    pub fn reset(&mut self) {
        self.guesses.clear();
        self.current_guess.clear();
        self.status = GameStatus::Playing;
        self.error = None;
    }

    pub fn keyboard_statuses(&self) -> HashMap<char, LetterStatus> {
        let mut keyboard = HashMap::new();
        for guess in &self.guesses {
            merge_letter_statuses(&mut keyboard, &guess.letters);
        }
        keyboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn statuses(guess: &str, solution: &str) -> Vec<LetterStatus> {
        evaluate(guess, solution)
            .expect("same length")
            .into_iter()
            .map(|l| l.status)
            .collect()
    }

    fn glogg() -> WordleConfig {
        WordleConfig {
            solution: "glögg".to_string(),
            max_guesses: Some(6),
            instructions: None,
            hint: None,
        }
    }

    #[test]
    fn test_evaluate() {
        // Exact match.
        assert_eq!(statuses("APPLE", "APPLE"), vec![LetterStatus::Correct; 5]);

        // All absent.
        assert_eq!(statuses("APPLE", "CROWD"), vec![LetterStatus::Absent; 5]);

        // All present but jumbled with some correct.
        assert_eq!(
            statuses("STARE", "TEARS"),
            vec![
                LetterStatus::Present,
                LetterStatus::Present,
                LetterStatus::Correct,
                LetterStatus::Correct,
                LetterStatus::Present,
            ]
        );

        // Duplicates exceeding target count.
        assert_eq!(
            statuses("AAABB", "AACDD"),
            vec![
                LetterStatus::Correct,
                LetterStatus::Correct,
                LetterStatus::Absent,
                LetterStatus::Absent,
                LetterStatus::Absent
            ]
        );
    }

    #[test]
    fn test_evaluate_swedish_identity() {
        let result = evaluate("glögg", "glögg").expect("same length");
        assert_eq!(
            result.iter().map(|l| l.letter).collect::<String>(),
            "GLÖGG"
        );
        assert!(result.iter().all(|l| l.status == LetterStatus::Correct));
    }

    #[test]
    fn test_evaluate_each_solution_letter_used_once() {
        let result = evaluate("SIR", "RIS").expect("same length");
        assert_eq!(
            result,
            vec![
                LetterResult { letter: 'S', status: LetterStatus::Present },
                LetterResult { letter: 'I', status: LetterStatus::Correct },
                LetterResult { letter: 'R', status: LetterStatus::Present },
            ]
        );
    }

    #[test]
    fn test_evaluate_correct_takes_precedence_over_earlier_present() {
        // The second G of the guess is correct, so the first one must not claim it.
        assert_eq!(
            statuses("GGAAA", "XGXXX"),
            vec![
                LetterStatus::Absent,
                LetterStatus::Correct,
                LetterStatus::Absent,
                LetterStatus::Absent,
                LetterStatus::Absent
            ]
        );
    }

    #[test]
    fn test_evaluate_length_mismatch() {
        assert_eq!(
            evaluate("jul", "glögg"),
            Err(WordleError::LengthMismatch { expected: 5, actual: 3 })
        );
        assert_eq!(
            WordleError::LengthMismatch { expected: 5, actual: 3 }.to_string(),
            "Ordet måste vara 5 bokstäver."
        );
    }

    #[test]
    fn test_merge_letter_statuses() {
        let mut keyboard = HashMap::new();
        merge_letter_statuses(&mut keyboard, &evaluate("BREAD", "APPLE").expect("same length"));
        assert_eq!(keyboard.get(&'A'), Some(&LetterStatus::Present));
        assert_eq!(keyboard.get(&'B'), Some(&LetterStatus::Absent));
        assert_eq!(keyboard.get(&'E'), Some(&LetterStatus::Present));

        merge_letter_statuses(&mut keyboard, &evaluate("APPLE", "APPLE").expect("same length"));
        assert_eq!(keyboard.get(&'A'), Some(&LetterStatus::Correct));
        assert_eq!(keyboard.get(&'E'), Some(&LetterStatus::Correct));

        // A later absent never downgrades.
        merge_letter_statuses(&mut keyboard, &evaluate("AXXXX", "BBBBB").expect("same length"));
        assert_eq!(keyboard.get(&'A'), Some(&LetterStatus::Correct));
    }

    #[test]
    fn test_six_wrong_guesses_lose() {
        let mut game = WordleGame::new(&glogg());
        for guess in ["julen", "tomte", "snöar", "kalla", "granr", "ljusa"] {
            assert_eq!(game.status(), GameStatus::Playing);
            game.submit(guess).expect("valid guess");
        }
        assert_eq!(game.status(), GameStatus::Lost);
        assert_eq!(game.remaining_attempts(), 0);
        assert_eq!(game.submit("glögg"), Err(WordleError::GameOver));
        assert_eq!(game.guesses().len(), 6);
    }

    #[test]
    fn test_win_on_third_guess_ends_game() {
        let mut game = WordleGame::new(&glogg());
        game.submit("julen").expect("valid guess");
        game.submit("tomte").expect("valid guess");
        let result = game.submit("GLÖGG").expect("valid guess");
        assert!(result.is_correct);
        assert_eq!(game.status(), GameStatus::Won);
        assert_eq!(game.remaining_attempts(), 3);
        assert_eq!(game.submit("julen"), Err(WordleError::GameOver));
        assert_eq!(game.guesses().len(), 3);
    }

    #[test]
    fn test_wrong_length_is_recoverable() {
        let mut game = WordleGame::new(&glogg());
        game.update_guess("jul");
        assert_eq!(
            game.submit_current_guess(),
            Err(WordleError::LengthMismatch { expected: 5, actual: 3 })
        );
        assert!(game.error().is_some());
        assert_eq!(game.current_guess(), "JUL");
        assert!(game.guesses().is_empty());
        assert_eq!(game.status(), GameStatus::Playing);

        game.push_letter('e');
        assert!(game.error().is_none());
        game.push_letter('n');
        assert_eq!(game.current_guess(), "JULEN");
        game.submit_current_guess().expect("valid guess");
        assert_eq!(game.guesses().len(), 1);
        assert_eq!(game.current_guess(), "");
    }

    #[test]
    fn test_update_guess_sanitizes_and_truncates() {
        let mut game = WordleGame::new(&glogg());
        game.update_guess("gl ö-g g x y");
        assert_eq!(game.current_guess(), "GLÖGG");
        game.pop_letter();
        assert_eq!(game.current_guess(), "GLÖG");
    }

    #[test]
    fn test_reset_after_loss() {
        let mut game = WordleGame::new(&WordleConfig {
            max_guesses: Some(1),
            ..glogg()
        });
        game.submit("julen").expect("valid guess");
        assert_eq!(game.status(), GameStatus::Lost);
        game.update_guess("glögg");
        assert_eq!(game.current_guess(), "");

        game.reset();
        assert_eq!(game.status(), GameStatus::Playing);
        assert!(game.guesses().is_empty());
        assert!(game.keyboard_statuses().is_empty());
    }

    proptest! {
        #[test]
        fn test_marks_never_exceed_solution_counts(
            (solution, guess) in (1usize..8).prop_flat_map(|len| {
                (
                    proptest::collection::vec(proptest::sample::select(vec!['A', 'B', 'Ö', 'G']), len),
                    proptest::collection::vec(proptest::sample::select(vec!['A', 'B', 'Ö', 'G']), len),
                )
            })
        ) {
            let solution: String = solution.into_iter().collect();
            let guess: String = guess.into_iter().collect();
            let result = evaluate(&guess, &solution).expect("same length");
            for letter in ['A', 'B', 'Ö', 'G'] {
                let marked = result
                    .iter()
                    .filter(|l| l.letter == letter && l.status != LetterStatus::Absent)
                    .count();
                let available = solution.chars().filter(|c| *c == letter).count();
                prop_assert!(marked <= available);
            }
        }

        #[test]
        fn test_solution_against_itself_is_all_correct(solution in "[a-zåäö]{1,8}") {
            let result = evaluate(&solution, &solution).expect("same length");
            prop_assert!(result.iter().all(|l| l.status == LetterStatus::Correct));
        }
    }
}
