//! Guess-matching games: bounded-attempt answer guessing and its variants.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::normalize::{normalize_loose, AcceptedAnswers};
use crate::timer::{Countdown, Tick};

pub const DEFAULT_MAX_ATTEMPTS: usize = 6;

/// Pixel size per attempt for the pixelated image games.
pub const PIXELATION_STEPS: [u32; 6] = [96, 64, 40, 24, 12, 6];

/// Visible window of the flag, as `inset()` percentages, per attempt.
pub const FLAG_CLIP_STEPS: [ClipInset; 6] = [
    ClipInset::new(30, 40, 30, 40),
    ClipInset::new(40, 45, 25, 25),
    ClipInset::new(40, 15, 15, 15),
    ClipInset::new(40, 10, 10, 10),
    ClipInset::new(40, 10, 5, 5),
    ClipInset::new(0, 0, 0, 0),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipInset {
    pub top: u8,
    pub right: u8,
    pub bottom: u8,
    pub left: u8,
}

impl ClipInset {
    pub const fn new(top: u8, right: u8, bottom: u8, left: u8) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn css(&self) -> String {
        format!(
            "clip-path: inset({}% {}% {}% {}%)",
            self.top, self.right, self.bottom, self.left
        )
    }
}

/// Image-based guessing (pixelated photo, pixelated film still, flag).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessConfig {
    pub image: String,
    pub solution: String,
    #[serde(default)]
    pub accepted_answers: Vec<String>,
    pub reveal_message: Option<String>,
}

impl GuessConfig {
    pub fn answers(&self) -> AcceptedAnswers {
        AcceptedAnswers::new(&self.solution, self.accepted_answers.as_slice())
    }

    pub fn new_game(&self) -> GuessGame {
        GuessGame::new(self.answers(), DEFAULT_MAX_ATTEMPTS, PIXELATION_STEPS.len())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebusConfig {
    pub prompt: String,
    pub solution: String,
    #[serde(default)]
    pub accepted_answers: Vec<String>,
    pub hint: Option<String>,
}

impl RebusConfig {
    pub fn new_game(&self) -> GuessGame {
        let answers = AcceptedAnswers::new(&self.solution, self.accepted_answers.as_slice());
        GuessGame::new(answers, DEFAULT_MAX_ATTEMPTS, 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuessStatus {
    Playing,
    Solved,
    Revealed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuessOutcome {
    Correct,
    Wrong { remaining: usize },
    /// The last attempt was spent; the answer is shown.
    Revealed,
    /// Blank guess, or the game is already over.
    Ignored,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessRecord {
    pub guess: String,
    pub correct: bool,
}

/// Bounded-attempts guessing with a staged reveal.
#[derive(Clone, Debug)]
pub struct GuessGame {
    answers: AcceptedAnswers,
    max_attempts: usize,
    step_count: usize,
    attempts: usize,
    status: GuessStatus,
    history: Vec<GuessRecord>,
}

impl GuessGame {
    pub fn new(answers: AcceptedAnswers, max_attempts: usize, step_count: usize) -> Self {
        Self {
            answers,
            max_attempts: max_attempts.max(1),
            step_count: step_count.max(1),
            attempts: 0,
            status: GuessStatus::Playing,
            history: Vec::new(),
        }
    }

    pub fn is_match(&self, guess: &str) -> bool {
        self.answers.is_match(guess)
    }

    pub fn submit(&mut self, guess: &str) -> GuessOutcome {
        let correct = self.is_match(guess);
        self.record(guess, correct)
    }

    /// Records a guess that was judged by the caller.
    pub fn record(&mut self, guess: &str, correct: bool) -> GuessOutcome {
        let guess = guess.trim();
        if guess.is_empty() || self.is_over() {
            return GuessOutcome::Ignored;
        }
        self.history.push(GuessRecord {
            guess: guess.to_string(),
            correct,
        });
        if correct {
            self.status = GuessStatus::Solved;
            return GuessOutcome::Correct;
        }
        self.spend_attempt()
    }

    /// Spends an attempt without guessing.
    pub fn skip(&mut self) -> GuessOutcome {
        if self.is_over() {
            return GuessOutcome::Ignored;
        }
        self.spend_attempt()
    }

    fn spend_attempt(&mut self) -> GuessOutcome {
        self.attempts += 1;
        if self.attempts >= self.max_attempts {
            self.status = GuessStatus::Revealed;
            return GuessOutcome::Revealed;
        }
        GuessOutcome::Wrong {
            remaining: self.remaining_attempts(),
        }
    }

    /// Gives up and shows the answer.
    pub fn reveal(&mut self) {
        if !self.is_over() {
            self.status = GuessStatus::Revealed;
        }
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
        self.status = GuessStatus::Playing;
        self.history.clear();
    }

    /// Which reveal stage to show: one more per spent attempt, capped at the last stage.
    pub fn reveal_index(&self) -> usize {
        self.attempts.min(self.step_count - 1)
    }

    /// Once the game is over everything is shown.
    pub fn is_fully_revealed(&self) -> bool {
        self.is_over()
    }

    pub fn status(&self) -> GuessStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status != GuessStatus::Playing
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn remaining_attempts(&self) -> usize {
        self.max_attempts.saturating_sub(self.attempts)
    }

    pub fn history(&self) -> &[GuessRecord] {
        &self.history
    }
}

/// Pixel size to draw for the image games.
pub fn pixel_size(game: &GuessGame) -> u32 {
    if game.is_fully_revealed() {
        return 1;
    }
    PIXELATION_STEPS[game.reveal_index().min(PIXELATION_STEPS.len() - 1)]
}

pub fn flag_clip(game: &GuessGame) -> ClipInset {
    if game.is_fully_revealed() {
        return ClipInset::new(0, 0, 0, 0);
    }
    FLAG_CLIP_STEPS[game.reveal_index().min(FLAG_CLIP_STEPS.len() - 1)]
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeardleConfig {
    pub audio_src: String,
    /// Seconds added to the clip per stage.
    pub reveal_durations: Vec<u32>,
    pub solution: String,
    pub artist: String,
    #[serde(default)]
    pub accepted_answers: Vec<String>,
    pub video_url: Option<String>,
}

impl HeardleConfig {
    /// A guess matches when it contains an accepted title, so "lady gaga poker face" and
    /// "poker face by lady gaga" both count.
    pub fn is_match(&self, guess: &str) -> bool {
        let input = normalize_loose(guess);
        if input.is_empty() {
            return false;
        }
        AcceptedAnswers::new(&self.solution, self.accepted_answers.as_slice())
            .iter()
            .any(|title| input == *title || input.as_str().contains(title.as_str()))
    }

    /// Clip length at each stage: the running sum of `reveal_durations`.
    pub fn cumulative_durations(&self) -> Vec<u32> {
        self.reveal_durations
            .iter()
            .scan(0, |total, seconds| {
                *total += seconds;
                Some(*total)
            })
            .collect()
    }

    pub fn new_game(&self) -> HeardleGame {
        HeardleGame::new(self.clone())
    }
}

/// Song guessing from growing audio clips. Every wrong guess or skip unlocks a longer clip.
#[derive(Clone, Debug)]
pub struct HeardleGame {
    config: HeardleConfig,
    game: GuessGame,
}

impl HeardleGame {
    pub fn new(config: HeardleConfig) -> Self {
        let stages = config.reveal_durations.len().max(1);
        let answers = AcceptedAnswers::new(&config.solution, config.accepted_answers.as_slice());
        Self {
            game: GuessGame::new(answers, stages, stages),
            config,
        }
    }

    pub fn config(&self) -> &HeardleConfig {
        &self.config
    }

    pub fn game(&self) -> &GuessGame {
        &self.game
    }

    pub fn submit(&mut self, guess: &str) -> GuessOutcome {
        let correct = self.config.is_match(guess);
        self.game.record(guess, correct)
    }

    pub fn skip(&mut self) -> GuessOutcome {
        self.game.skip()
    }

    pub fn stage(&self) -> usize {
        self.game.reveal_index()
    }

    /// Seconds of audio to play at the current stage.
    pub fn clip_seconds(&self) -> u32 {
        self.config
            .cumulative_durations()
            .get(self.stage())
            .copied()
            .unwrap_or(1)
    }

    pub fn message(&self, outcome: GuessOutcome) -> Option<String> {
        match outcome {
            GuessOutcome::Correct => Some(format!(
                "AAAAHH en klassiker! Klart det är “{}” av {} 🎉",
                self.config.solution, self.config.artist
            )),
            GuessOutcome::Wrong { .. } => {
                Some("BUUUUHH kom igen nu då! Prova att skippa om du behöver höra mer.".to_string())
            }
            GuessOutcome::Revealed => Some(format!(
                "Låten var “{}” av {}.",
                self.config.solution, self.config.artist
            )),
            GuessOutcome::Ignored => None,
        }
    }
}

pub const LEVEL_SECONDS: u32 = 30;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnTheTrackLevel {
    pub points: u32,
    pub clue: String,
    pub image: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnTheTrackConfig {
    pub answer: String,
    #[serde(default)]
    pub accepted_answers: Vec<String>,
    pub video_url: Option<String>,
    pub levels: Vec<OnTheTrackLevel>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedGuess {
    pub guess: String,
    pub correct: bool,
    pub points: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackOutcome {
    Correct { points: u32 },
    Wrong { guess: String },
    NeverBraked,
}

/// "På spåret": clues worth fewer points the longer the journey goes on. The player pulls the
/// emergency brake to lock in one guess, then rides to the end to see whether it was right.
#[derive(Clone, Debug)]
pub struct OnTheTrackGame {
    config: OnTheTrackConfig,
    answers: AcceptedAnswers,
    started: bool,
    level_index: usize,
    countdown: Countdown,
    braking: bool,
    locked: Option<LockedGuess>,
}

impl OnTheTrackGame {
    pub fn new(config: OnTheTrackConfig) -> Self {
        let answers = AcceptedAnswers::new(&config.answer, config.accepted_answers.as_slice());
        Self {
            config,
            answers,
            started: false,
            level_index: 0,
            countdown: Countdown::new(LEVEL_SECONDS),
            braking: false,
            locked: None,
        }
    }

    pub fn config(&self) -> &OnTheTrackConfig {
        &self.config
    }

    /// Starts (or restarts) the journey from the first clue.
    pub fn start(&mut self) {
        self.started = true;
        self.level_index = 0;
        self.countdown.reset();
        self.braking = false;
        self.locked = None;
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn is_finished(&self) -> bool {
        self.started && self.level_index >= self.config.levels.len()
    }

    pub fn current_level(&self) -> Option<&OnTheTrackLevel> {
        if !self.started {
            return None;
        }
        self.config.levels.get(self.level_index)
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn countdown(&self) -> Countdown {
        self.countdown
    }

    pub fn is_braking(&self) -> bool {
        self.braking
    }

    pub fn locked_guess(&self) -> Option<&LockedGuess> {
        self.locked.as_ref()
    }

    /// The clock runs while a clue is on screen and the guess field is closed.
    pub fn clock_running(&self) -> bool {
        self.started && !self.is_finished() && !self.braking
    }

    /// One second passes. Returns true when this moved to the next clue.
    pub fn tick(&mut self) -> bool {
        if !self.clock_running() {
            return false;
        }
        match self.countdown.tick() {
            Tick::Running(_) => false,
            Tick::Expired => {
                self.advance_level();
                true
            }
        }
    }

    /// Moves on to the next clue, or to the result after the last one.
    pub fn advance_level(&mut self) {
        if !self.started || self.is_finished() {
            return;
        }
        self.braking = false;
        self.level_index += 1;
        self.countdown.reset();
    }

    /// Stops the clock and opens the guess field. Only one guess per journey.
    pub fn pull_brake(&mut self) {
        if self.clock_running() && self.locked.is_none() {
            self.braking = true;
        }
    }

    /// Closes the guess field without guessing; the clock resumes.
    pub fn release_brake(&mut self) {
        self.braking = false;
    }

    /// Locks in a guess for the current clue's points. Returns whether it was right.
    pub fn submit_guess(&mut self, guess: &str) -> Option<bool> {
        let guess = guess.trim();
        if !self.braking || self.locked.is_some() || guess.is_empty() {
            return None;
        }
        let correct = self.answers.is_match(guess);
        let points = self
            .config
            .levels
            .get(self.level_index)
            .map(|level| level.points)
            .unwrap_or(0);
        self.locked = Some(LockedGuess {
            guess: guess.to_string(),
            correct,
            points: if correct { points } else { 0 },
        });
        self.braking = false;
        Some(correct)
    }

    pub fn outcome(&self) -> Option<TrackOutcome> {
        if !self.is_finished() {
            return None;
        }
        Some(match &self.locked {
            None => TrackOutcome::NeverBraked,
            Some(locked) if locked.correct => TrackOutcome::Correct {
                points: locked.points,
            },
            Some(locked) => TrackOutcome::Wrong {
                guess: locked.guess.clone(),
            },
        })
    }

    pub fn message(&self) -> Option<String> {
        let answer = &self.config.answer;
        match self.outcome() {
            Some(TrackOutcome::NeverBraked) => {
                Some(format!("Du drog aldrig i nödbromsen:( Svaret var {answer}."))
            }
            Some(TrackOutcome::Correct { points }) => Some(format!(
                "Snyggt TJOHOOO! Du tog den på {points} poäng. Rätt svar är givetvis {answer}."
            )),
            Some(TrackOutcome::Wrong { guess }) => {
                Some(format!("Tyvärr! {guess} var fel. Rätt svar är {answer}."))
            }
            None if self.locked.is_some() => Some("Häng kvar och se om du hade rätt!".to_string()),
            None => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriviaQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_option: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriviaQuizConfig {
    pub questions: Vec<TriviaQuestion>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerStatus {
    Pending,
    Correct,
    Incorrect,
}

#[derive(Clone, Debug)]
pub struct TriviaQuiz {
    config: TriviaQuizConfig,
    current: usize,
    selected: Option<usize>,
    statuses: Vec<AnswerStatus>,
    score: usize,
    show_feedback: bool,
    finished: bool,
}

impl TriviaQuiz {
    pub fn new(config: TriviaQuizConfig) -> Self {
        let statuses = vec![AnswerStatus::Pending; config.questions.len()];
        Self {
            config,
            current: 0,
            selected: None,
            statuses,
            score: 0,
            show_feedback: false,
            finished: false,
        }
    }

    pub fn current_question(&self) -> Option<&TriviaQuestion> {
        self.config.questions.get(self.current)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.config.questions.len()
    }

    pub fn progress_label(&self) -> String {
        format!("{}/{}", self.current + 1, self.total())
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn statuses(&self) -> &[AnswerStatus] {
        &self.statuses
    }

    pub fn showing_feedback(&self) -> bool {
        self.show_feedback
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn select(&mut self, option: usize) {
        let valid = self
            .current_question()
            .is_some_and(|question| option < question.options.len());
        if valid && !self.show_feedback && !self.finished {
            self.selected = Some(option);
        }
    }

    /// Locks in the selected option. Returns whether it was right.
    pub fn submit(&mut self) -> Option<bool> {
        if self.show_feedback || self.finished {
            return None;
        }
        let selected = self.selected?;
        let correct = self.current_question()?.correct_option == selected;
        self.statuses[self.current] = if correct {
            AnswerStatus::Correct
        } else {
            AnswerStatus::Incorrect
        };
        if correct {
            self.score += 1;
        }
        self.show_feedback = true;
        Some(correct)
    }

    pub fn next(&mut self) {
        if !self.show_feedback || self.finished {
            return;
        }
        if self.current + 1 >= self.total() {
            self.finished = true;
            return;
        }
        self.current += 1;
        self.selected = None;
        self.show_feedback = false;
    }

    pub fn restart(&mut self) {
        *self = Self::new(self.config.clone());
    }
}

pub const MAX_MISTAKES: usize = 4;
pub const GROUP_SIZE: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionsGroup {
    pub id: String,
    pub title: String,
    pub description: String,
    pub words: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionsConfig {
    pub groups: Vec<ConnectionsGroup>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionsVerdict {
    Solved { group_id: String },
    AllSolved,
    OneAway,
    Wrong,
    OutOfMistakes,
    NeedFourWords,
    Ignored,
}

impl ConnectionsVerdict {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Wrong | Self::NeedFourWords)
    }
}

/// Find the groups of four.
#[derive(Clone, Debug)]
pub struct ConnectionsGame {
    config: ConnectionsConfig,
    available: Vec<String>,
    selected: Vec<String>,
    solved: Vec<usize>,
    mistakes_left: usize,
    message: Option<String>,
    last_verdict: Option<ConnectionsVerdict>,
}

impl ConnectionsGame {
    pub fn new(config: ConnectionsConfig) -> Self {
        Self::with_rng(config, &mut rand::rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(config: ConnectionsConfig, rng: &mut R) -> Self {
        let mut available: Vec<String> = config
            .groups
            .iter()
            .flat_map(|group| group.words.iter().cloned())
            .collect();
        available.shuffle(rng);
        Self {
            config,
            available,
            selected: Vec::new(),
            solved: Vec::new(),
            mistakes_left: MAX_MISTAKES,
            message: None,
            last_verdict: None,
        }
    }

    pub fn available_words(&self) -> &[String] {
        &self.available
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, word: &str) -> bool {
        self.selected.iter().any(|selected| selected == word)
    }

    pub fn solved_groups(&self) -> impl Iterator<Item = &ConnectionsGroup> {
        self.solved.iter().filter_map(|index| self.config.groups.get(*index))
    }

    pub fn mistakes_left(&self) -> usize {
        self.mistakes_left
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn last_verdict(&self) -> Option<&ConnectionsVerdict> {
        self.last_verdict.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.solved.len() == self.config.groups.len()
    }

    pub fn toggle_word(&mut self, word: &str) {
        if self.is_over() || !self.available.iter().any(|w| w == word) {
            return;
        }
        self.message = None;
        if let Some(index) = self.selected.iter().position(|selected| selected == word) {
            self.selected.remove(index);
        } else if self.selected.len() < GROUP_SIZE {
            self.selected.push(word.to_string());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn shuffle(&mut self) {
        self.available.shuffle(&mut rand::rng());
    }

    pub fn submit(&mut self) -> ConnectionsVerdict {
        let verdict = self.judge();
        self.message = self.verdict_message(&verdict);
        self.last_verdict = Some(verdict.clone());
        verdict
    }

    fn judge(&mut self) -> ConnectionsVerdict {
        if self.is_over() {
            return ConnectionsVerdict::Ignored;
        }
        if self.selected.len() != GROUP_SIZE {
            return ConnectionsVerdict::NeedFourWords;
        }

        let selected: HashSet<&str> = self.selected.iter().map(String::as_str).collect();
        let counts: Vec<(usize, usize)> = self
            .config
            .groups
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.solved.contains(index))
            .map(|(index, group)| {
                let hits = group
                    .words
                    .iter()
                    .filter(|word| selected.contains(word.as_str()))
                    .count();
                (index, hits)
            })
            .collect();

        if let Some(&(index, _)) = counts.iter().find(|(_, hits)| *hits == GROUP_SIZE) {
            self.solve(index);
            if self.is_over() {
                return ConnectionsVerdict::AllSolved;
            }
            return ConnectionsVerdict::Solved {
                group_id: self.config.groups[index].id.clone(),
            };
        }

        let one_away = counts.iter().any(|(_, hits)| *hits == GROUP_SIZE - 1);
        self.mistakes_left = self.mistakes_left.saturating_sub(1);
        if self.mistakes_left == 0 {
            self.reveal_remaining();
            return ConnectionsVerdict::OutOfMistakes;
        }
        if one_away {
            ConnectionsVerdict::OneAway
        } else {
            ConnectionsVerdict::Wrong
        }
    }

    fn solve(&mut self, index: usize) {
        let words = &self.config.groups[index].words;
        self.available.retain(|word| !words.contains(word));
        self.selected.clear();
        self.solved.push(index);
    }

    fn reveal_remaining(&mut self) {
        for index in 0..self.config.groups.len() {
            if !self.solved.contains(&index) {
                self.solved.push(index);
            }
        }
        self.available.clear();
        self.selected.clear();
    }

    fn verdict_message(&self, verdict: &ConnectionsVerdict) -> Option<String> {
        match verdict {
            ConnectionsVerdict::Solved { group_id } => self
                .config
                .groups
                .iter()
                .find(|group| &group.id == group_id)
                .map(|group| format!("Rätt! Grupp: {}", group.title)),
            ConnectionsVerdict::AllSolved => Some("Du löste alla grupper! 🎉".to_string()),
            ConnectionsVerdict::OneAway => Some("One away... du är nära".to_string()),
            ConnectionsVerdict::Wrong => Some("Fel grupp!".to_string()),
            ConnectionsVerdict::OutOfMistakes => {
                Some("Inga gissningar kvar! Här är lösningarna.".to_string())
            }
            ConnectionsVerdict::NeedFourWords => Some("Välj fyra ord innan du gissar.".to_string()),
            ConnectionsVerdict::Ignored => None,
        }
    }
}
