//! The 24 doors of the calendar and their layout on the tree.

use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;

use crate::crossword::{CrosswordConfig, CrosswordEntry, CrosswordError, Direction};
use crate::guess::{
    ConnectionsConfig, ConnectionsGroup, GuessConfig, HeardleConfig, OnTheTrackConfig,
    OnTheTrackLevel, RebusConfig, TriviaQuestion, TriviaQuizConfig, GROUP_SIZE,
};
use crate::model::{Door, DoorLayoutRow, DoorVariant, GameConfig};
use crate::normalize::normalize_loose;
use crate::wordle::WordleConfig;

pub const DOOR_COUNT: u32 = 24;

const PASSWORD: &str = "test";

static CATALOG: LazyLock<Vec<Door>> = LazyLock::new(build_catalog);

pub fn doors() -> &'static [Door] {
    &CATALOG
}

pub fn door_by_id(id: u32) -> Option<&'static Door> {
    doors().iter().find(|door| door.id == id)
}

/// The door only resolves when the slug belongs to it.
pub fn door_by_slug(id: u32, slug: &str) -> Option<&'static Door> {
    door_by_id(id).filter(|door| door.game_slug.eq_ignore_ascii_case(slug.trim()))
}

pub fn door_variant(id: u32) -> DoorVariant {
    DoorVariant::for_door(id)
}

/// Rows of the tree from the top (a single door) down to the trunk.
pub fn layout() -> Vec<DoorLayoutRow> {
    [
        vec![24],
        vec![22, 23],
        vec![19, 20, 21],
        vec![15, 16, 17, 18],
        vec![10, 11, 12, 13, 14],
        vec![4, 5, 6, 7, 8, 9],
        vec![1, 2, 3],
    ]
    .into_iter()
    .map(|door_ids| DoorLayoutRow { door_ids })
    .collect()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("door id {0} is outside 1..=24")]
    IdOutOfRange(u32),
    #[error("door {0} appears more than once")]
    DuplicateId(u32),
    #[error("door {0} is missing")]
    MissingDoor(u32),
    #[error("door {door} reuses the slug {slug}")]
    DuplicateSlug { door: u32, slug: String },
    #[error("door {0} has an empty title or slug")]
    MissingText(u32),
    #[error("door {0} has no solution")]
    EmptySolution(u32),
    #[error("door {door}: {source}")]
    Crossword { door: u32, source: CrosswordError },
    #[error("door {door}: {reason}")]
    InvalidGame { door: u32, reason: String },
    #[error("the tree layout does not place door {0} exactly once")]
    Layout(u32),
}

/// Checks the built-in catalog.
pub fn validate_catalog() -> Result<(), CatalogError> {
    validate_doors(doors(), &layout())
}

pub fn validate_doors(doors: &[Door], layout: &[DoorLayoutRow]) -> Result<(), CatalogError> {
    let mut ids = HashSet::new();
    let mut slugs = HashSet::new();
    for door in doors {
        if !(1..=DOOR_COUNT).contains(&door.id) {
            return Err(CatalogError::IdOutOfRange(door.id));
        }
        if !ids.insert(door.id) {
            return Err(CatalogError::DuplicateId(door.id));
        }
        if !slugs.insert(door.game_slug.to_ascii_lowercase()) {
            return Err(CatalogError::DuplicateSlug {
                door: door.id,
                slug: door.game_slug.clone(),
            });
        }
        validate_door(door)?;
    }
    if let Some(missing) = (1..=DOOR_COUNT).find(|id| !ids.contains(id)) {
        return Err(CatalogError::MissingDoor(missing));
    }

    let placed: Vec<u32> = layout.iter().flat_map(|row| row.door_ids.iter().copied()).collect();
    for id in 1..=DOOR_COUNT {
        if placed.iter().filter(|placed| **placed == id).count() != 1 {
            return Err(CatalogError::Layout(id));
        }
    }
    if let Some(stray) = placed.iter().find(|id| !ids.contains(*id)) {
        return Err(CatalogError::Layout(*stray));
    }
    Ok(())
}

fn validate_door(door: &Door) -> Result<(), CatalogError> {
    let id = door.id;
    if door.title.trim().is_empty() || door.game_slug.trim().is_empty() {
        return Err(CatalogError::MissingText(id));
    }
    let invalid = |reason: &str| CatalogError::InvalidGame {
        door: id,
        reason: reason.to_string(),
    };
    let require_solution = |solution: &str| {
        if normalize_loose(solution).is_empty() {
            Err(CatalogError::EmptySolution(id))
        } else {
            Ok(())
        }
    };

    match &door.game {
        GameConfig::Content => Ok(()),
        GameConfig::Wordle(config) => {
            if crate::normalize::word_letters(&config.solution).is_empty() {
                return Err(CatalogError::EmptySolution(id));
            }
            if config.max_guesses == Some(0) {
                return Err(invalid("wordle needs at least one guess"));
            }
            Ok(())
        }
        GameConfig::Crossword(config) => config
            .validate()
            .map_err(|source| CatalogError::Crossword { door: id, source }),
        GameConfig::Pixel(config) | GameConfig::PixelMovie(config) | GameConfig::Flag(config) => {
            require_solution(&config.solution)?;
            if config.image.is_empty() {
                return Err(invalid("image is missing"));
            }
            Ok(())
        }
        GameConfig::Rebus(config) => {
            require_solution(&config.solution)?;
            if config.prompt.trim().is_empty() {
                return Err(invalid("rebus prompt is empty"));
            }
            Ok(())
        }
        GameConfig::Heardle(config) => {
            require_solution(&config.solution)?;
            if config.reveal_durations.is_empty() || config.reveal_durations.contains(&0) {
                return Err(invalid("heardle clip durations must be positive"));
            }
            Ok(())
        }
        GameConfig::OnTheTrack(config) => {
            require_solution(&config.answer)?;
            if config.levels.is_empty() {
                return Err(invalid("på spåret needs at least one level"));
            }
            if config.levels.windows(2).any(|pair| pair[0].points <= pair[1].points) {
                return Err(invalid("på spåret points must decrease"));
            }
            Ok(())
        }
        GameConfig::TriviaQuiz(config) => {
            if config.questions.is_empty() {
                return Err(invalid("quiz has no questions"));
            }
            match config
                .questions
                .iter()
                .find(|question| question.correct_option >= question.options.len())
            {
                Some(question) => Err(invalid(&format!(
                    "question \"{}\" points at a missing option",
                    question.question
                ))),
                None => Ok(()),
            }
        }
        GameConfig::Connections(config) => {
            if config.groups.is_empty() {
                return Err(invalid("connections has no groups"));
            }
            if let Some(group) = config.groups.iter().find(|g| g.words.len() != GROUP_SIZE) {
                return Err(invalid(&format!("group {} does not have four words", group.id)));
            }
            let mut words = HashSet::new();
            for word in config.groups.iter().flat_map(|group| &group.words) {
                if !words.insert(word.as_str()) {
                    return Err(invalid(&format!("word {word} is in more than one group")));
                }
            }
            Ok(())
        }
    }
}

fn door(id: u32, title: &str, description: &str, slug: &str, game: GameConfig) -> Door {
    Door {
        id,
        title: title.to_string(),
        description: description.to_string(),
        password: PASSWORD.to_string(),
        game_slug: slug.to_string(),
        game,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn across(id: &str, number: u32, clue: &str, answer: &str, row: usize, col: usize) -> CrosswordEntry {
    CrosswordEntry {
        id: id.to_string(),
        number,
        clue: clue.to_string(),
        answer: answer.to_string(),
        row,
        col,
        direction: Direction::Across,
    }
}

fn group(id: &str, title: &str, description: &str, words: &[&str]) -> ConnectionsGroup {
    ConnectionsGroup {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        words: strings(words),
    }
}

fn heardle(audio_src: &str, solution: &str, artist: &str, accepted: &[&str], video: &str) -> HeardleConfig {
    HeardleConfig {
        audio_src: audio_src.to_string(),
        reveal_durations: vec![2, 1, 2, 3, 4, 5],
        solution: solution.to_string(),
        artist: artist.to_string(),
        accepted_answers: strings(accepted),
        video_url: Some(video.to_string()),
    }
}

fn levels(levels: &[(u32, &str, &str)]) -> Vec<OnTheTrackLevel> {
    levels
        .iter()
        .map(|(points, image, clue)| OnTheTrackLevel {
            points: *points,
            image: image.to_string(),
            clue: clue.to_string(),
        })
        .collect()
}

fn question(question: &str, options: &[&str], correct_option: usize) -> TriviaQuestion {
    TriviaQuestion {
        question: question.to_string(),
        options: strings(options),
        correct_option,
    }
}

fn content(id: u32, title: &str, description: &str) -> Door {
    door(id, title, description, &format!("game{id}"), GameConfig::Content)
}

fn build_catalog() -> Vec<Door> {
    vec![
        door(
            1,
            "WORDLE",
            "Välkommen till julkalendern, tänk att jag löste en i år igen!",
            "wordle",
            GameConfig::Wordle(WordleConfig {
                solution: "glögg".to_string(),
                max_guesses: Some(6),
                instructions: Some("Gissa ordet, ni kan reglerna så KÖR".to_string()),
                hint: None,
            }),
        ),
        door(
            2,
            "Lucka 2: Minikorsord",
            "Tips: Klicka på en ledtråd för att hoppa till ordet. En miniruta kommer poppa upp när du fyllt i allt och säga om du har rätt eller fel",
            "crossword",
            GameConfig::Crossword(CrosswordConfig {
                rows: 7,
                cols: 9,
                instructions: None,
                entries: vec![
                    across("1A", 1, "Kort ord för högtiden i december", "JUL", 0, 4),
                    across("2A", 2, "Det lyser i fönstren denna tid", "LJUS", 1, 2),
                    across("3A", 3, "Första delen i ordet för saffransbulle", "LUSSE", 2, 4),
                    across("4A", 4, "Kryddig dryck som värmer i december", "GLÖGG", 3, 0),
                    across("5A", 5, "Basen i gröten på julafton", "RIS", 4, 4),
                    across("6A", 6, "Den pyntade vännen i vardagsrummet", "GRAN", 5, 2),
                    across("7A", 7, "När tomten smyger över taken", "NATT", 6, 4),
                    CrosswordEntry {
                        direction: Direction::Down,
                        ..across("8D", 8, "Hög och klädd i glitter", "JULGRAN", 0, 4)
                    },
                ],
            }),
        ),
        door(
            3,
            "Pixelstjärnan",
            "Den pixliga siluetten hör hemma på scen. Avslöja vem det är innan gissningarna tar slut!",
            "pixel",
            GameConfig::Pixel(GuessConfig {
                image: "/images/zara.jpg".to_string(),
                solution: "Zara Larsson".to_string(),
                accepted_answers: strings(&["Zara"]),
                reveal_message: Some("It’s Zara Larsson ✨".to_string()),
            }),
        ),
        door(
            4,
            "LUCKA 4: Connections",
            "Hitta fyra grupper med fyra ord vardera. Du har fyra gissningar – men om du är nära får du höra det!",
            "connections",
            GameConfig::Connections(ConnectionsConfig {
                groups: vec![
                    group(
                        "umea",
                        "Kändisar från Umeå",
                        "William Spetz · Tove Styrke · Mikael Lustig · Hanna Ljungberg",
                        &["William Spetz", "Tove Styrke", "Mikael Lustig", "Hanna Ljungberg"],
                    ),
                    group(
                        "tandettljus",
                        "Textrader från ”Tänd ett ljus”",
                        "Dom dom dom · Låt aldrig hoppet försvinna · Fred på jorden · Samma himmel",
                        &["Dom dom dom", "Låt aldrig hoppet försvinna", "Fred på jorden", "Samma himmel"],
                    ),
                    group(
                        "hatlag",
                        "Lag Julia hatar!!!",
                        "Guif · Djurgården · Modo · Skellefteå",
                        &["Guif", "Djurgården", "Modo", "Skellefteå"],
                    ),
                    group(
                        "favoritlag",
                        "Lag Julia gillar <3",
                        "Björklöven · Liverpool · Sandvik · Holmsund City",
                        &["Björklöven", "Liverpool", "Sandvik", "Holmsund City"],
                    ),
                ],
            }),
        ),
        door(
            5,
            "LUCKA 5: MUSIKFREDAG",
            "Lyssna på några sekunder i taget och gissa låten. Skippa för att höra mer – men du får bara sex försök!",
            "heardle",
            GameConfig::Heardle(heardle(
                "/audio/pokerface.mp4",
                "Poker Face",
                "Lady Gaga",
                &["Poker Face", "Pokerface"],
                "https://www.youtube-nocookie.com/embed/bESGLojNYSo?autoplay=1&start=0",
            )),
        ),
        door(
            6,
            "LUCKA 6: På spåret",
            "Hoppa på tåget! Läs ledtrådarna, dra i nödbromsen när du vet svaret och se hur många poäng du tar den på.",
            "pa-sparet",
            GameConfig::OnTheTrack(OnTheTrackConfig {
                answer: "Orlando".to_string(),
                accepted_answers: strings(&["Orlando"]),
                video_url: None,
                levels: levels(&[
                    (10, "/images/orl10p.png", "Vi lämnar befäst stad i söder vars initialer initierar även region vars femte stad vi tar sikte på. På vår resa norrut passerar vi strand på strand innan vi når vår kustlösa stad med stor attraktionskraft."),
                    (8, "/images/orl8p.png", "Kunskaper om USA:s 35:e president är meriterande då denna spacade information leder er till grannstaden 8 mil öster om vår orangea stad med stort golfintresse."),
                    (6, "/images/orl6p.png", "Jurassic Park, E.T. och King Kong är universala filmreferenser av helt annan karaktär än alven från Mörkmården men samtliga leder till staden där både Rwanda och Rumänien är centrala begrepp."),
                    (4, "/images/orl4p.png", "Begagnade golfbollar och puch-modell för tankarna till vår stat i sydöst och byter du flankerande a:n mot o:n i blågul flygplats har du landat rätt."),
                    (2, "/images/orl2p.png", "Disney World, SeaWorld och Universal Studios lockar alla turister till denna Floridastad på O."),
                ]),
            }),
        ),
        door(
            7,
            "LUCKA 7: Rebus",
            "",
            "rebus",
            GameConfig::Rebus(RebusConfig {
                prompt: "1️⃣ + 🕯️ + ✝️ + 🕯️ + 🌅".to_string(),
                solution: "Första advent".to_string(),
                accepted_answers: strings(&["Första advent", "Forsta advent", "1:a advent", "Först advent"]),
                hint: None,
            }),
        ),
        door(
            8,
            "LUCKA 8: Gissa flaggan",
            "Kan du se vilket land det är på bara en glimt av flaggan? Varje gissning avslöjar lite mer!",
            "gissa-flaggan",
            GameConfig::Flag(GuessConfig {
                image: "/images/fiji.svg".to_string(),
                solution: "Fiji".to_string(),
                accepted_answers: strings(&["Fiji", "Republic of Fiji", "Fiji Islands"]),
                reveal_message: None,
            }),
        ),
        door(
            9,
            "LUCKA 9: På spåret – ARTIST",
            "Följ ledtrådarna och lista ut vilken superstjärna vi är på väg mot!",
            "pa-sparet-rihanna",
            GameConfig::OnTheTrack(OnTheTrackConfig {
                answer: "Rihanna".to_string(),
                accepted_answers: strings(&["Rihanna", "Robyn Rihanna Fenty", "Robyn Fenty"]),
                video_url: Some("https://www.youtube-nocookie.com/embed/CvBfHwUxHIk?autoplay=1&start=0".to_string()),
                levels: levels(&[
                    (10, "/images/barbados10p.jpg", "Vi söker en person vars första hem ligger öster om Karibien och vars barndomsadress senare blev pilgrimsplats för fans. Personen sjöng tidigt i skolans kör men drömde sig ut mot större scener och när andra byggde sandslott byggde denna ett globalt varumärke."),
                    (8, "/images/superbowl8p.jpg", "Nio nummer-ett-hits på Billboard hittills, och uppträdde på Super Bowl – medan hen visade upp något mer än bara sin röst."),
                    (6, "/images/fenty6p.jpg", "När personen var femton fick hen chansen att sjunga för en amerikansk producent och världen fick snart höra en paraplysång som aldrig tog slut. ☂️ Idag finns även ett skönhetsmärke som revolutionerade branschen."),
                    (4, "/images/diamonds4p.jpg", "Personen sjunger om diamonds, work och att bitch better have my money. Från popprinsessa till modeikon och miljardär, men släpper hellre smink än nya låtar."),
                    (2, "/images/umbrella2p.jpg", "Denna kvinna kommer från Barbados, heter Robyn Fenty, och är världens mest lysande stjärna under paraplyet. ☂️ Vem är vi på väg mot?"),
                ]),
            }),
        ),
        door(
            10,
            "LUCKA 10: Quizdag",
            "Idag är det quiiiizzz!!! Vem vinner???",
            "quizkvall",
            GameConfig::TriviaQuiz(TriviaQuizConfig {
                questions: vec![
                    question("Vilket år invigdes Globen (nu Avicii Arena) i Stockholm?", &["1989", "1992", "1986", "1995"], 0),
                    question("Vad heter Sveriges största sjö?", &["Vänern", "Vättern", "Mälaren", "Hjälmaren"], 0),
                    question("Vilket land har flest invånare?", &["Kina", "USA", "Indonesien", "Indien"], 3),
                    question("Vad heter den ikoniska nattklubben i Berlin?", &["Tresor", "KitKatClub", "Watergate", "Berghain"], 3),
                    question("Vilka är Nya Zeelands urinvånare?", &["Aboriginer", "Māori", "Inuiter", "Zulu"], 1),
                    question("Vilken krydda ger glöggen sin karakteristiska doft tillsammans med kanel?", &["Nejlika", "Rosmarin", "Timjan", "Vanilj"], 0),
                    question(
                        "Vilken är den mest streamade svenskspråkiga låten på Spotify?",
                        &["Säg mig- Carola och Zara Larsson", "Svag- Victor Leksell", "Jag Kommer- Veronica Maggio", "Boten Anna- Basshunter"],
                        1,
                    ),
                    question("Vilken svensk stad kallas ofta för “Lilla London”?", &["Malmö", "Göteborg", "Uppsala", "Örebro"], 1),
                    question("Vad heter Japans högsta berg?", &["Mount Everest", "Mount Fuji", "Mount Takao", "Mount Koya"], 1),
                    question("Vilken planet ligger närmast solen?", &["Mars", "Venus", "Jorden", "Merkurius"], 3),
                ],
            }),
        ),
        door(
            11,
            "LUCKA 11: Pixlad filmkväll",
            "Linslus i pixlar! Gissa vilken klassisk film som döljer sig bakom rutor som sakta skärps.",
            "pixlad-film",
            GameConfig::PixelMovie(GuessConfig {
                image: "/images/ensamhemma.jpg".to_string(),
                solution: "Ensam hemma".to_string(),
                accepted_answers: strings(&["Home Alone"]),
                reveal_message: None,
            }),
        ),
        door(
            12,
            "LUCKA 12: Musikfredag",
            "Det är fredag! Lyssna på några sekunder i taget och gissa låten. Skippa för att höra mer – men du får bara sex försök!",
            "musikafton",
            GameConfig::Heardle(heardle(
                "/audio/dirtydiana.mp4",
                "Dirty Diana",
                "Michael Jackson",
                &["Dirty Diana"],
                "https://www.youtube-nocookie.com/embed/yUi_S6YWjZw?autoplay=1&start=0",
            )),
        ),
        content(13, "Julens djur", "Renen hjälper tomten att flyga. De har mycket att göra denna natt."),
        content(14, "Tredje ljuset", "Det tredje ljuset tänds. Snart är det jul!"),
        door(
            15,
            "LUCKA 15: Musikconnections",
            "Hitta grupper av fyra, idag är det musiktema!",
            "musikconnections",
            GameConfig::Connections(ConnectionsConfig {
                groups: vec![
                    group(
                        "filmSongs",
                        "Låtar som varit med i filmer",
                        "Love Me Like You Do (Fifty Shades of Grey) · (I've Had) The Time of My Life (Dirty Dancing) · Never Say Never (Karate Kid) · From Russia with Love (James Bond)",
                        &["Love Me Like You Do", "(I've Had) The Time of My Life", "Never Say Never", "From Russia with Love"],
                    ),
                    group(
                        "animalTitles",
                        "Låtar med djur i titeln",
                        "Eye of the Tiger (Survivor) · Black Dog (Led Zeppelin) · Buffalo Soldier (Bob Marley & The Wailers) · I Am the Walrus (The Beatles)",
                        &["Eye of the Tiger", "Black Dog", "Buffalo Soldier", "I Am the Walrus"],
                    ),
                    group(
                        "debutSingles",
                        "Debutsinglar av stora artister",
                        "...Baby One More Time (Britney Spears) · Ocean Eyes (Billie Eilish) · One Time (Justin Bieber) · Blinded by the Light (Bruce Springsteen)",
                        &["...Baby One More Time", "Ocean Eyes", "One Time", "Blinded by the Light"],
                    ),
                    group(
                        "eurovisionWinners",
                        "Eurovisionvinnare",
                        "Arcade (Nederländerna 2019) · Wild Dances (Ukraina 2004) · Ne partez pas sans moi (Schweiz 1988) · What's Another Year (Irland 1980)",
                        &["Arcade", "Wild Dances", "Ne partez pas sans moi", "What's Another Year"],
                    ),
                ],
            }),
        ),
        content(16, "Julmarknad", "Vi går till julmarknaden och köper glögg och pepparkakor."),
        content(17, "Granpynt", "Idag pyntar vi granen med alla våra favoritprylar."),
        content(18, "Fjärde ljuset", "Det fjärde och sista ljuset tänds. Nu är det snart jul!"),
        door(
            19,
            "LUCKA 19: Musikfredag",
            "Fredagsfeeling igen! Klarar du att gissa låten?",
            "musikfredag",
            GameConfig::Heardle(heardle(
                "/audio/layallyourloveonme.mp4",
                "Lay All Your Love on Me",
                "ABBA",
                &["Lay All Your Love on Me", "Lay All Your Love On Me"],
                "https://www.youtube-nocookie.com/embed/ulZQTrV8QlQ?autoplay=1&start=0",
            )),
        ),
        content(20, "Julbord", "Idag dukar vi julbordet med allt det goda vi har."),
        content(21, "Årets längsta natt", "Det är årets längsta natt. Imorgon blir dagarna längre igen."),
        content(22, "Julklappar under granen", "Julklapparna ligger under granen. Snart får vi öppna dem!"),
        content(23, "Julafton", "Det är julafton! Tomten kommer i natt med alla julklappar."),
        content(24, "Juldagen", "God jul! Idag firade vi jul tillsammans. Det är den bästa dagen på året!"),
    ]
}
