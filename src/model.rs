use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crossword::CrosswordConfig;
use crate::guess::{
    ConnectionsConfig, GuessConfig, HeardleConfig, OnTheTrackConfig, RebusConfig,
    TriviaQuizConfig,
};
use crate::wordle::WordleConfig;

/// Accepted by every door, for trying out the calendar before December.
pub const TESTING_PASSWORD: &str = "testing";

/// The door whose page hosts the Spotify connect panel.
pub const SPOTIFY_DOOR_ID: u32 = 10;

/// What is behind a door. Each game carries the configuration it needs, so a door can never
/// claim a game type it has no data for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "kebab-case")]
pub enum GameConfig {
    Content,
    Wordle(WordleConfig),
    Crossword(CrosswordConfig),
    Pixel(GuessConfig),
    PixelMovie(GuessConfig),
    Flag(GuessConfig),
    Rebus(RebusConfig),
    Heardle(HeardleConfig),
    OnTheTrack(OnTheTrackConfig),
    TriviaQuiz(TriviaQuizConfig),
    Connections(ConnectionsConfig),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameType {
    Content,
    Wordle,
    Crossword,
    Pixel,
    PixelMovie,
    Flag,
    Rebus,
    Heardle,
    OnTheTrack,
    TriviaQuiz,
    Connections,
}

impl GameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Content => "content",
            GameType::Wordle => "wordle",
            GameType::Crossword => "crossword",
            GameType::Pixel => "pixel",
            GameType::PixelMovie => "pixel-movie",
            GameType::Flag => "flag",
            GameType::Rebus => "rebus",
            GameType::Heardle => "heardle",
            GameType::OnTheTrack => "on-the-track",
            GameType::TriviaQuiz => "trivia-quiz",
            GameType::Connections => "connections",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GameConfig {
    pub fn game_type(&self) -> GameType {
        match self {
            GameConfig::Content => GameType::Content,
            GameConfig::Wordle(_) => GameType::Wordle,
            GameConfig::Crossword(_) => GameType::Crossword,
            GameConfig::Pixel(_) => GameType::Pixel,
            GameConfig::PixelMovie(_) => GameType::PixelMovie,
            GameConfig::Flag(_) => GameType::Flag,
            GameConfig::Rebus(_) => GameType::Rebus,
            GameConfig::Heardle(_) => GameType::Heardle,
            GameConfig::OnTheTrack(_) => GameType::OnTheTrack,
            GameConfig::TriviaQuiz(_) => GameType::TriviaQuiz,
            GameConfig::Connections(_) => GameType::Connections,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub password: String,
    pub game_slug: String,
    pub game: GameConfig,
}

impl Door {
    pub fn game_type(&self) -> GameType {
        self.game.game_type()
    }

    /// Case-insensitive, ignoring surrounding whitespace. This only gates navigation in the
    /// browser; it is not access control.
    pub fn check_password(&self, input: &str) -> bool {
        let input = input.trim().to_lowercase();
        input == self.password.to_lowercase() || input == TESTING_PASSWORD
    }

    pub fn game_path(&self) -> String {
        format!("/door/{}/{}", self.id, self.game_slug)
    }

    pub fn variant(&self) -> DoorVariant {
        DoorVariant::for_door(self.id)
    }
}

/// How a door is drawn on the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorVariant {
    Trunk,
    Green,
}

impl DoorVariant {
    pub fn for_door(id: u32) -> Self {
        if id <= 3 {
            DoorVariant::Trunk
        } else {
            DoorVariant::Green
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            DoorVariant::Trunk => "door door-trunk",
            DoorVariant::Green => "door door-green",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorLayoutRow {
    pub door_ids: Vec<u32>,
}

/// A door as the tree needs it, without answers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorSummary {
    pub id: u32,
    pub title: String,
    pub variant: DoorVariant,
}

impl From<&Door> for DoorSummary {
    fn from(door: &Door) -> Self {
        Self {
            id: door.id,
            title: door.title.clone(),
            variant: door.variant(),
        }
    }
}

/// What the page knows about the visitor's Spotify session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyStatus {
    pub connected: bool,
    /// Set for a minute after a failed login.
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn door(game: GameConfig) -> Door {
        Door {
            id: 7,
            title: "LUCKA 7: Rebus".to_string(),
            description: String::new(),
            password: "Tomte".to_string(),
            game_slug: "rebus".to_string(),
            game,
        }
    }

    #[test]
    fn test_check_password() {
        let door = door(GameConfig::Content);
        assert!(door.check_password("tomte"));
        assert!(door.check_password("  TOMTE \n"));
        assert!(door.check_password("Testing"));
        assert!(!door.check_password("tomten"));
        assert!(!door.check_password(""));
    }

    #[test]
    fn test_game_type_follows_payload() {
        let door = door(GameConfig::Rebus(RebusConfig {
            prompt: "1️⃣ + 🕯️".to_string(),
            solution: "Första advent".to_string(),
            accepted_answers: vec![],
            hint: None,
        }));
        assert_eq!(door.game_type(), GameType::Rebus);
        assert_eq!(door.game_type().to_string(), "rebus");
        assert_eq!(door.game_path(), "/door/7/rebus");
    }

    #[test]
    fn test_game_config_serializes_tagged() {
        let json = serde_json::to_value(GameConfig::Content).expect("serialize");
        assert_eq!(json, serde_json::json!({ "type": "content" }));
        let door = door(GameConfig::Content);
        let json = serde_json::to_string(&door).expect("serialize");
        let back: Door = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, door);
    }

    #[test]
    fn test_door_variant() {
        assert_eq!(DoorVariant::for_door(1), DoorVariant::Trunk);
        assert_eq!(DoorVariant::for_door(3), DoorVariant::Trunk);
        assert_eq!(DoorVariant::for_door(4), DoorVariant::Green);
        assert_eq!(DoorVariant::for_door(24).css_class(), "door door-green");
    }
}
