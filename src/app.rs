use leptos::ev::{KeyboardEvent, SubmitEvent};
use leptos::logging::log;
use leptos::prelude::*;
use leptos::server_fn::error::NoCustomError;
use leptos::task::spawn_local;
use leptos_meta::{provide_meta_context, MetaTags, Stylesheet, Title};
use leptos_router::{
    components::{Route, Router, Routes},
    hooks::{use_navigate, use_params_map},
    path, NavigateOptions,
};
#[cfg(feature = "hydrate")]
use wasm_bindgen::JsCast;

use crate::catalog::{door_by_id, door_by_slug, layout};
use crate::crossword::{CellPos, CrosswordConfig, CrosswordFeedback, CrosswordGame, Direction};
use crate::guess::{
    flag_clip, AnswerStatus, ConnectionsConfig, ConnectionsGame, GuessConfig,
    GuessGame, GuessOutcome, HeardleConfig, OnTheTrackConfig, OnTheTrackGame, RebusConfig,
    TriviaQuiz, TriviaQuizConfig,
};
use crate::model::{Door, DoorSummary, GameConfig, SpotifyStatus, SPOTIFY_DOOR_ID};
#[cfg(feature = "hydrate")]
use crate::timer::{ScopedInterval, ScopedTimeout};
use crate::wordle::{GameStatus, LetterStatus, WordleConfig, WordleGame};

// Reports whether the visitor has a Spotify session, and the last login error if any.
#[server(GetSpotifyStatus)]
pub async fn spotify_status() -> Result<SpotifyStatus, ServerFnError<NoCustomError>> {
    use axum::http::HeaderMap;
    use leptos_axum::extract;

    let headers: HeaderMap = extract()
        .await
        .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
    Ok(crate::spotify::session_status(&headers))
}

const NOT_FOUND: &str = "Luckan hittades inte.";

const KEYBOARD_ROWS: [&str; 3] = ["QWERTYUIOPÅ", "ASDFGHJKLÖÄ", "ZXCVBNM"];

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="sv">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <AutoReload options=options.clone() />
                <HydrationScripts options />
                <MetaTags />
            </head>
            <body>
                <App />
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        // id=leptos means cargo-leptos will hot-reload this stylesheet
        <Stylesheet id="leptos" href="/pkg/julkalender.css" />
        <Title text="Julkalender" />

        <Router>
            <main>
                <Routes fallback=|| NOT_FOUND.into_view()>
                    <Route path=path!("/") view=AdventTree />
                    <Route path=path!("/door/:id") view=DoorUnlock />
                    <Route path=path!("/door/:id/:slug") view=DoorPage />
                </Routes>
            </main>
        </Router>
    }
}

/// Looks a door up from raw route parameters. A slug, when given, has to belong to the door.
fn resolve_door(id: Option<String>, slug: Option<String>) -> Option<&'static Door> {
    let id = id?.parse::<u32>().ok()?;
    match slug {
        Some(slug) => door_by_slug(id, &slug),
        None => door_by_id(id),
    }
}

#[component]
fn DoorNotFound() -> impl IntoView {
    view! {
        <div class="not-found">
            <p>{NOT_FOUND}</p>
            <a href="/">"Tillbaka till kalendern"</a>
        </div>
    }
}

#[component]
fn AdventTree() -> impl IntoView {
    view! {
        <div class="advent">
            <h1>"Julkalender"</h1>
            <div class="tree">
                {layout()
                    .into_iter()
                    .map(|row| {
                        view! {
                            <div class="tree-row">
                                {row
                                    .door_ids
                                    .into_iter()
                                    .filter_map(door_by_id)
                                    .map(|door| {
                                        let summary = DoorSummary::from(door);
                                        view! {
                                            <a
                                                class=summary.variant.css_class()
                                                href=format!("/door/{}", summary.id)
                                                title=summary.title
                                            >
                                                <span class="door-number">{summary.id}</span>
                                            </a>
                                        }
                                    })
                                    .collect_view()}
                            </div>
                        }
                    })
                    .collect_view()}
                <div class="tree-trunk"></div>
            </div>
        </div>
    }
}

#[component]
fn DoorUnlock() -> impl IntoView {
    let params = use_params_map();
    let door = Memo::new(move |_| params.with(|p| resolve_door(p.get("id"), None)));

    move || match door.get() {
        Some(door) => view! { <UnlockForm door=door /> }.into_any(),
        None => view! { <DoorNotFound /> }.into_any(),
    }
}

#[component]
fn UnlockForm(door: &'static Door) -> impl IntoView {
    let password = RwSignal::new(String::new());
    let error = RwSignal::new(String::new());
    let navigate = use_navigate();

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if door.check_password(&password.get()) {
            error.set(String::new());
            navigate(&door.game_path(), NavigateOptions::default());
        } else {
            error.set("Fel lösenord, försök igen!".to_string());
        }
    };

    view! {
        <div class="door-unlock">
            <a class="back-link" href="/">"← Till kalendern"</a>
            <h1>{format!("Lucka {}", door.id)}</h1>
            <form on:submit=submit>
                <label>
                    "Lösenord: "
                    <input
                        type="password"
                        autocomplete="off"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                </label>
                <button type="submit" class="btn-primary">
                    "Öppna"
                </button>
            </form>
            {move || (!error.get().is_empty()).then(|| view! { <p class="error">{error.get()}</p> })}
            {(door.id == SPOTIFY_DOOR_ID).then(|| view! { <SpotifyConnect /> })}
        </div>
    }
}

#[component]
fn DoorPage() -> impl IntoView {
    let params = use_params_map();
    let door = Memo::new(move |_| params.with(|p| resolve_door(p.get("id"), p.get("slug"))));

    move || match door.get() {
        Some(door) => {
            let intro = match door.game {
                GameConfig::Content => None,
                _ => Some(door.description.clone()).filter(|text| !text.is_empty()),
            };
            view! {
                <div class="door-page">
                    <a class="back-link" href="/">"← Till kalendern"</a>
                    <h1>{door.title.clone()}</h1>
                    {intro.map(|text| view! { <p class="door-description">{text}</p> })}
                    <DoorGame door=door />
                </div>
            }
                .into_any()
        }
        None => view! { <DoorNotFound /> }.into_any(),
    }
}

#[component]
fn DoorGame(door: &'static Door) -> impl IntoView {
    match &door.game {
        GameConfig::Content => view! { <ContentView text=door.description.clone() /> }.into_any(),
        GameConfig::Wordle(config) => view! { <WordleView config=config.clone() /> }.into_any(),
        GameConfig::Crossword(config) => {
            view! { <CrosswordView config=config.clone() /> }.into_any()
        }
        GameConfig::Pixel(config) | GameConfig::PixelMovie(config) => {
            view! { <ImageGuessView config=config.clone() reveal=ImageReveal::Pixelated /> }
                .into_any()
        }
        GameConfig::Flag(config) => {
            view! { <ImageGuessView config=config.clone() reveal=ImageReveal::Flag /> }.into_any()
        }
        GameConfig::Rebus(config) => view! { <RebusView config=config.clone() /> }.into_any(),
        GameConfig::Heardle(config) => view! { <HeardleView config=config.clone() /> }.into_any(),
        GameConfig::OnTheTrack(config) => {
            view! { <OnTheTrackView config=config.clone() /> }.into_any()
        }
        GameConfig::TriviaQuiz(config) => {
            view! { <TriviaQuizView config=config.clone() /> }.into_any()
        }
        GameConfig::Connections(config) => {
            view! { <ConnectionsView config=config.clone() /> }.into_any()
        }
    }
}

#[component]
fn ContentView(text: String) -> impl IntoView {
    view! {
        <article class="door-content">
            {text
                .split("\n\n")
                .map(|paragraph| view! { <p>{paragraph.to_string()}</p> })
                .collect_view()}
        </article>
    }
}

#[component]
fn WordleView(config: WordleConfig) -> impl IntoView {
    let game = RwSignal::new(WordleGame::new(&config));

    let type_letter = move |letter: char| game.update(|g| g.push_letter(letter));
    let backspace = move || game.update(|g| g.pop_letter());
    let enter = move || {
        game.update(|g| {
            if let Err(e) = g.submit_current_guess() {
                log!("Wordle guess rejected: {}", e);
            }
        })
    };

    let handle = window_event_listener(leptos::ev::keydown, move |ev| {
        if ev.ctrl_key() || ev.meta_key() || ev.alt_key() {
            return;
        }
        let key = ev.key();
        match key.as_str() {
            "Enter" => enter(),
            "Backspace" => backspace(),
            _ => {
                let mut chars = key.chars();
                if let (Some(letter), None) = (chars.next(), chars.next()) {
                    if letter.is_alphabetic() {
                        type_letter(letter);
                    }
                }
            }
        }
    });
    on_cleanup(move || handle.remove());

    let grid = move || {
        game.with(|g| {
            let length = g.solution_length();
            (0..g.max_guesses())
                .map(|i| {
                    let cells: Vec<(char, &'static str)> = if let Some(result) = g.guesses().get(i)
                    {
                        result
                            .letters
                            .iter()
                            .map(|l| (l.letter, l.status.css_class()))
                            .collect()
                    } else if i == g.guesses().len() && g.status() == GameStatus::Playing {
                        let typed: Vec<char> = g.current_guess().chars().collect();
                        (0..length)
                            .map(|j| (typed.get(j).copied().unwrap_or(' '), ""))
                            .collect()
                    } else {
                        vec![(' ', ""); length]
                    };
                    view! {
                        <div class="row">
                            {cells
                                .into_iter()
                                .map(|(letter, class)| view! { <div class=class>{letter}</div> })
                                .collect_view()}
                        </div>
                    }
                })
                .collect_view()
        })
    };

    let message = move || {
        game.with(|g| match g.status() {
            GameStatus::Won => "Grattis, du klarade det! 🎉".to_string(),
            GameStatus::Lost => format!("Slut på försök! Ordet var {}.", g.solution()),
            GameStatus::Playing => g.error().map(ToString::to_string).unwrap_or_default(),
        })
    };

    let keyboard = KEYBOARD_ROWS
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let last_row = index == KEYBOARD_ROWS.len() - 1;
            view! {
                <div class="keyboard-row">
                    {last_row
                        .then(|| {
                            view! {
                                <button class="special" on:click=move |_| enter()>
                                    "Enter"
                                </button>
                            }
                        })}
                    {row
                        .chars()
                        .map(|k| {
                            let class = move || {
                                game.with(|g| {
                                    g.keyboard_statuses()
                                        .get(&k)
                                        .copied()
                                        .unwrap_or(LetterStatus::Unused)
                                        .css_class()
                                })
                            };
                            view! {
                                <button class=class on:click=move |_| type_letter(k)>
                                    {k}
                                </button>
                            }
                        })
                        .collect_view()}
                    {last_row
                        .then(|| {
                            view! {
                                <button class="special" on:click=move |_| backspace()>
                                    "⌫"
                                </button>
                            }
                        })}
                </div>
            }
        })
        .collect_view();

    view! {
        <div class="wordle">
            {config.instructions.map(|text| view! { <p class="instructions">{text}</p> })}
            <div class="grid">{grid}</div>
            <p class="message">{message}</p>
            {move || {
                (game.with(|g| g.status()) != GameStatus::Playing)
                    .then(|| {
                        view! {
                            <button class="btn-secondary" on:click=move |_| game.update(|g| g.reset())>
                                "Spela igen"
                            </button>
                        }
                    })
            }}
            <div class="keyboard">{keyboard}</div>
        </div>
    }
}

fn cell_dom_id(pos: CellPos) -> String {
    format!("cell-{}-{}", pos.row, pos.col)
}

/// Moves keyboard focus to a crossword cell and selects its letter.
fn focus_cell_input(pos: CellPos) {
    #[cfg(feature = "hydrate")]
    {
        let input = leptos::leptos_dom::helpers::document()
            .get_element_by_id(&cell_dom_id(pos))
            .and_then(|element| element.dyn_into::<web_sys::HtmlInputElement>().ok());
        if let Some(input) = input {
            let _ = input.focus();
            input.select();
        }
    }
    #[cfg(not(feature = "hydrate"))]
    let _ = pos;
}

/// Puts the stored letter back into the input, undoing keystrokes the grid ignored.
fn sync_cell_input(ev: &leptos::ev::Event, value: Option<char>) {
    #[cfg(feature = "hydrate")]
    {
        let input = ev
            .target()
            .and_then(|target| target.dyn_into::<web_sys::HtmlInputElement>().ok());
        if let Some(input) = input {
            input.set_value(&value.map(String::from).unwrap_or_default());
        }
    }
    #[cfg(not(feature = "hydrate"))]
    let _ = (ev, value);
}

fn format_elapsed(elapsed: chrono::Duration) -> String {
    let seconds = elapsed.num_seconds().max(0);
    if seconds < 60 {
        return format!("{seconds} s");
    }
    format!("{} min {} s", seconds / 60, seconds % 60)
}

fn handle_cell_key(game: RwSignal<CrosswordGame>, pos: CellPos, ev: KeyboardEvent) {
    let (row, col) = (pos.row, pos.col);
    let target = match ev.key().as_str() {
        "ArrowUp" => game.with_untracked(|g| g.step_in_grid(row, col, -1, 0)),
        "ArrowDown" => game.with_untracked(|g| g.step_in_grid(row, col, 1, 0)),
        "ArrowLeft" => game.with_untracked(|g| g.step_in_grid(row, col, 0, -1)),
        "ArrowRight" => game.with_untracked(|g| g.step_in_grid(row, col, 0, 1)),
        "Backspace" => game.try_update(|g| g.erase_backwards(row, col)).flatten(),
        " " => {
            game.update(|g| g.toggle_entry_at_cell(row, col));
            None
        }
        _ => return,
    };
    ev.prevent_default();
    if let Some(next) = target {
        focus_cell_input(next);
    }
}

#[component]
fn CrosswordView(config: CrosswordConfig) -> impl IntoView {
    let instructions = config.instructions.clone();
    let columns = config.cols;
    let game = RwSignal::new(CrosswordGame::new(config));
    // The block layout never changes; only letters and highlights are reactive.
    let board = game.with_untracked(|g| g.board());

    let cells = board
        .into_iter()
        .flatten()
        .map(|cell| {
            if cell.is_block {
                return view! { <div class="cell block"></div> }.into_any();
            }
            let pos = CellPos::new(cell.row, cell.col);
            let class = move || {
                game.with(|g| {
                    let mut class = String::from("cell");
                    if g.active_entry().is_some_and(|entry| entry.cells().contains(&pos)) {
                        class.push_str(" active");
                    }
                    if g.has_completed() {
                        class.push_str(" solved");
                    }
                    class
                })
            };
            view! {
                <div class=class>
                    {cell.number.map(|n| view! { <span class="cell-number">{n}</span> })}
                    <input
                        id=cell_dom_id(pos)
                        class="cell-input"
                        type="text"
                        autocomplete="off"
                        prop:value=move || {
                            game.with(|g| g.value_at(pos.row, pos.col).map(String::from).unwrap_or_default())
                        }
                        prop:disabled=move || game.with(|g| g.is_revealed())
                        on:focus=move |_| game.update(|g| g.focus_cell(pos.row, pos.col))
                        on:dblclick=move |_| game.update(|g| g.double_click_cell(pos.row, pos.col))
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            let next = game
                                .try_update(|g| g.input_letter(pos.row, pos.col, &value))
                                .and_then(|(_, next)| next);
                            sync_cell_input(&ev, game.with_untracked(|g| g.value_at(pos.row, pos.col)));
                            if let Some(next) = next {
                                focus_cell_input(next);
                            }
                        }
                        on:keydown=move |ev: KeyboardEvent| handle_cell_key(game, pos, ev)
                    />
                </div>
            }
                .into_any()
        })
        .collect_view();

    let clue_list = move |direction: Direction| {
        move || {
            game.with(|g| match direction {
                Direction::Across => g.across_clues(),
                Direction::Down => g.down_clues(),
            })
                .into_iter()
                .map(|clue| {
                    let id = clue.id.clone();
                    view! {
                        <li
                            class:active=clue.is_active
                            class:complete=clue.is_complete
                            on:click=move |_| {
                                game.update(|g| g.select_entry(&id));
                                if let Some(pos) = game.with_untracked(|g| g.first_empty_in_active_entry()) {
                                    focus_cell_input(pos);
                                }
                            }
                        >
                            <strong>{format!("{}. ", clue.number)}</strong>
                            {clue.clue}
                            {format!(" ({})", clue.answer_length)}
                        </li>
                    }
                })
                .collect_view()
        }
    };

    let feedback = move || {
        game.with(|g| g.feedback()).map(|feedback| {
            let text = match feedback {
                CrosswordFeedback::Success { elapsed } => {
                    format!("Grattis! Du löste korsordet på {}. 🎉", format_elapsed(elapsed))
                }
                CrosswordFeedback::NotCorrect => {
                    "Nästan! Något stämmer inte riktigt, fortsätt leta.".to_string()
                }
            };
            view! {
                <div class="crossword-feedback" role="dialog">
                    <p>{text}</p>
                    <button class="btn-secondary" on:click=move |_| game.update(|g| g.dismiss_feedback())>
                        "Stäng"
                    </button>
                </div>
            }
        })
    };

    let reveal = move |_| {
        if leptos::leptos_dom::helpers::window()
            .confirm_with_message("Vill du se facit?")
            .unwrap_or(false)
        {
            game.update(|g| g.reveal_solution());
        }
    };

    view! {
        <div class="crossword">
            {instructions.map(|text| view! { <p class="instructions">{text}</p> })}
            <div class="crossword-grid" style=format!("grid-template-columns: repeat({columns}, 1fr)")>
                {cells}
            </div>
            <div class="clues">
                <section>
                    <h3>"Vågrätt"</h3>
                    <ol>{clue_list(Direction::Across)}</ol>
                </section>
                <section>
                    <h3>"Lodrätt"</h3>
                    <ol>{clue_list(Direction::Down)}</ol>
                </section>
            </div>
            {feedback}
            <button
                class="btn-secondary"
                prop:disabled=move || game.with(|g| g.is_revealed())
                on:click=reveal
            >
                "Visa facit"
            </button>
        </div>
    }
}

fn outcome_message(outcome: GuessOutcome, solution: &str, reveal_message: Option<&str>) -> Option<String> {
    match outcome {
        GuessOutcome::Correct => Some(format!("Rätt! Det var {solution} 🎉")),
        GuessOutcome::Wrong { remaining: 1 } => Some("Fel svar, sista försöket!".to_string()),
        GuessOutcome::Wrong { remaining } => Some(format!("Fel svar, {remaining} försök kvar.")),
        GuessOutcome::Revealed => Some(
            reveal_message
                .map(str::to_string)
                .unwrap_or_else(|| format!("Slut på försök! Rätt svar var {solution}.")),
        ),
        GuessOutcome::Ignored => None,
    }
}

/// Answer field, attempt counter and guess history for the bounded-attempt games.
#[component]
fn GuessForm(
    game: RwSignal<GuessGame>,
    solution: String,
    reveal_message: Option<String>,
) -> impl IntoView {
    let guess = RwSignal::new(String::new());
    let message = RwSignal::new(None::<String>);
    let answer = StoredValue::new((solution, reveal_message));

    let report = move |outcome: GuessOutcome| {
        let text = answer.with_value(|(solution, reveal)| {
            outcome_message(outcome, solution, reveal.as_deref())
        });
        if text.is_some() {
            message.set(text);
        }
    };

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let input = guess.get();
        if let Some(outcome) = game.try_update(|g| g.submit(&input)) {
            if outcome != GuessOutcome::Ignored {
                guess.set(String::new());
            }
            report(outcome);
        }
    };

    let skip = move |_| {
        if let Some(outcome) = game.try_update(|g| g.skip()) {
            report(outcome);
        }
    };

    view! {
        <div class="guess-form">
            <Show when=move || !game.with(|g| g.is_over())>
                <form on:submit=submit>
                    <input
                        type="text"
                        placeholder="Ditt svar"
                        prop:value=move || guess.get()
                        on:input=move |ev| guess.set(event_target_value(&ev))
                    />
                    <button type="submit" class="btn-primary">
                        "Gissa"
                    </button>
                    <button type="button" class="btn-secondary" on:click=skip>
                        "Pass"
                    </button>
                </form>
                <p class="attempts">
                    {move || game.with(|g| format!("Försök {}/{}", g.attempts(), g.max_attempts()))}
                </p>
            </Show>
            {move || message.get().map(|text| view! { <p class="message">{text}</p> })}
            <ul class="history">
                {move || {
                    game.with(|g| {
                        g.history()
                            .iter()
                            .map(|record| {
                                view! {
                                    <li class:correct=record.correct class:wrong={!record.correct}>
                                        {record.guess.clone()}
                                    </li>
                                }
                            })
                            .collect_view()
                    })
                }}
            </ul>
        </div>
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ImageReveal {
    Pixelated,
    Flag,
}

#[cfg(feature = "hydrate")]
fn draw_pixelated(
    canvas: &web_sys::HtmlCanvasElement,
    image: &web_sys::HtmlImageElement,
    pixel: u32,
) -> Result<(), wasm_bindgen::JsValue> {
    let context = canvas
        .get_context("2d")?
        .ok_or_else(|| wasm_bindgen::JsValue::from_str("no 2d context"))?
        .dyn_into::<web_sys::CanvasRenderingContext2d>()?;
    let (width, height) = (image.natural_width(), image.natural_height());
    let pixel = pixel.max(1);
    let (small_width, small_height) = ((width / pixel).max(1), (height / pixel).max(1));

    canvas.set_width(width);
    canvas.set_height(height);
    context.set_image_smoothing_enabled(false);
    context.draw_image_with_html_image_element_and_dw_and_dh(
        image,
        0.0,
        0.0,
        small_width.into(),
        small_height.into(),
    )?;
    context.draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
        canvas,
        0.0,
        0.0,
        small_width.into(),
        small_height.into(),
        0.0,
        0.0,
        width.into(),
        height.into(),
    )?;
    Ok(())
}

#[component]
fn ImageGuessView(config: GuessConfig, reveal: ImageReveal) -> impl IntoView {
    let game = RwSignal::new(config.new_game());
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let image_ref = NodeRef::<leptos::html::Img>::new();
    let loaded = RwSignal::new(false);

    #[cfg(feature = "hydrate")]
    if reveal == ImageReveal::Pixelated {
        Effect::new(move || {
            let size = game.with(crate::guess::pixel_size);
            loaded.track();
            let (Some(canvas), Some(image)) = (canvas_ref.get(), image_ref.get()) else {
                return;
            };
            if !image.complete() || image.natural_width() == 0 {
                return;
            }
            if let Err(e) = draw_pixelated(&canvas, &image, size) {
                leptos::logging::warn!("could not draw pixelated image: {:?}", e);
            }
        });
    }

    let picture = match reveal {
        ImageReveal::Pixelated => view! {
            <div class="pixel-frame">
                <img
                    node_ref=image_ref
                    class="pixel-source"
                    src=config.image.clone()
                    alt=""
                    on:load=move |_| loaded.set(true)
                />
                <canvas node_ref=canvas_ref class="pixel-canvas"></canvas>
            </div>
        }
            .into_any(),
        ImageReveal::Flag => view! {
            <img class="flag" src=config.image.clone() alt="" style=move || game.with(|g| flag_clip(g).css()) />
        }
            .into_any(),
    };

    view! {
        <div class="image-guess">
            {picture}
            <GuessForm
                game=game
                solution=config.solution.clone()
                reveal_message=config.reveal_message.clone()
            />
        </div>
    }
}

#[component]
fn RebusView(config: RebusConfig) -> impl IntoView {
    let game = RwSignal::new(config.new_game());
    let show_hint = RwSignal::new(false);
    let hint = config.hint.clone();

    view! {
        <div class="rebus">
            <p class="rebus-prompt">{config.prompt.clone()}</p>
            {hint
                .map(|hint| {
                    view! {
                        <Show
                            when=move || show_hint.get()
                            fallback=move || {
                                view! {
                                    <button class="btn-secondary" on:click=move |_| show_hint.set(true)>
                                        "Visa tips"
                                    </button>
                                }
                            }
                        >
                            <p class="hint">{hint.clone()}</p>
                        </Show>
                    }
                })}
            <GuessForm game=game solution=config.solution.clone() reveal_message=None />
        </div>
    }
}

#[component]
fn HeardleView(config: HeardleConfig) -> impl IntoView {
    let stages = config.cumulative_durations();
    let audio_src = config.audio_src.clone();
    let game = RwSignal::new(config.new_game());
    let guess = RwSignal::new(String::new());
    let message = RwSignal::new(None::<String>);
    let playing = RwSignal::new(false);
    let audio_ref = NodeRef::<leptos::html::Audio>::new();
    #[cfg(feature = "hydrate")]
    let clip = ScopedTimeout::new();

    #[cfg(feature = "hydrate")]
    on_cleanup(move || {
        if let Some(audio) = audio_ref.try_get_untracked().flatten() {
            if let Err(e) = audio.pause() {
                leptos::logging::warn!("could not pause clip: {:?}", e);
            }
        }
    });

    // Plays the clip for the current stage from the start, then pauses it.
    let play = move || {
        let seconds = game.with_untracked(|g| g.clip_seconds());
        #[cfg(feature = "hydrate")]
        {
            let Some(audio) = audio_ref.get_untracked() else {
                return;
            };
            clip.cancel();
            audio.set_current_time(0.0);
            if let Err(e) = audio.play() {
                leptos::logging::warn!("could not play clip: {:?}", e);
                return;
            }
            playing.set(true);
            clip.start(seconds * 1000, move || {
                if let Some(audio) = audio_ref.try_get_untracked().flatten() {
                    if let Err(e) = audio.pause() {
                        leptos::logging::warn!("could not pause clip: {:?}", e);
                    }
                }
                playing.try_set(false);
            });
        }
        #[cfg(not(feature = "hydrate"))]
        log!("clip of {} s requested before hydration", seconds);
    };

    let report = move |outcome: GuessOutcome| {
        let text = game.with_untracked(|g| g.message(outcome));
        if text.is_some() {
            message.set(text);
        }
    };

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let input = guess.get();
        if let Some(outcome) = game.try_update(|g| g.submit(&input)) {
            if outcome != GuessOutcome::Ignored {
                guess.set(String::new());
            }
            report(outcome);
        }
    };

    let skip = move |_| {
        if let Some(outcome) = game.try_update(|g| g.skip()) {
            report(outcome);
            if matches!(outcome, GuessOutcome::Wrong { .. }) {
                play();
            }
        }
    };

    let stage_boxes = move || {
        let current = game.with(|g| g.stage());
        stages
            .iter()
            .enumerate()
            .map(|(index, seconds)| {
                view! {
                    <span class="stage" class:unlocked={index <= current}>
                        {format!("{seconds} s")}
                    </span>
                }
            })
            .collect_view()
    };

    view! {
        <div class="heardle">
            <audio node_ref=audio_ref src=audio_src preload="auto"></audio>
            <div class="stages">{stage_boxes}</div>
            <Show
                when=move || !game.with(|g| g.game().is_over())
                fallback=move || {
                    game.with(|g| g.config().video_url.clone())
                        .map(|url| {
                            view! {
                                <iframe
                                    class="reveal-video"
                                    src=url
                                    allow="autoplay; encrypted-media"
                                    allowfullscreen=true
                                ></iframe>
                            }
                        })
                }
            >
                <button class="btn-primary" on:click=move |_| play() prop:disabled=move || playing.get()>
                    {move || format!("▶ Spela {} s", game.with(|g| g.clip_seconds()))}
                </button>
                <form on:submit=submit>
                    <input
                        type="text"
                        placeholder="Låt eller artist"
                        prop:value=move || guess.get()
                        on:input=move |ev| guess.set(event_target_value(&ev))
                    />
                    <button type="submit" class="btn-primary">
                        "Gissa"
                    </button>
                    <button type="button" class="btn-secondary" on:click=skip>
                        "Skippa"
                    </button>
                </form>
            </Show>
            {move || message.get().map(|text| view! { <p class="message">{text}</p> })}
        </div>
    }
}

#[component]
fn OnTheTrackView(config: OnTheTrackConfig) -> impl IntoView {
    let game = RwSignal::new(OnTheTrackGame::new(config));
    let guess = RwSignal::new(String::new());
    #[cfg(feature = "hydrate")]
    let clock = ScopedInterval::new();

    #[cfg(feature = "hydrate")]
    Effect::new(move || {
        if game.with(|g| g.is_finished()) {
            clock.stop();
        }
    });

    let start = move |_| {
        game.update(|g| g.start());
        guess.set(String::new());
        #[cfg(feature = "hydrate")]
        clock.start(1000, move || {
            game.try_update(|g| g.tick());
        });
    };

    let lock_in = move |ev: SubmitEvent| {
        ev.prevent_default();
        let input = guess.get();
        if let Some(correct) = game.try_update(|g| g.submit_guess(&input)).flatten() {
            log!("På spåret guess locked, correct: {}", correct);
        }
    };

    let level = move || {
        game.with(|g| {
            g.current_level().cloned().map(|level| {
                let countdown = g.countdown();
                let locked = g.locked_guess().map(|locked| locked.guess.clone());
                let braking = g.is_braking();
                view! {
                    <div class="track-level">
                        <h2>{format!("{} poäng", level.points)}</h2>
                        <img class="track-image" src=level.image alt="" />
                        <p class="clue">{level.clue}</p>
                        <div class="countdown">
                            <div
                                class="countdown-bar"
                                style=format!("width: {:.0}%", countdown.fraction_left() * 100.0)
                            ></div>
                            <span>{format!("{} s", countdown.remaining())}</span>
                        </div>
                        {match (locked, braking) {
                            (Some(locked), _) => {
                                view! { <p class="locked">{format!("Ditt svar: {locked}")}</p> }
                                    .into_any()
                            }
                            (None, true) => {
                                view! {
                                    <form on:submit=lock_in>
                                        <input
                                            type="text"
                                            placeholder="Vart är vi på väg?"
                                            prop:value=move || guess.get()
                                            on:input=move |ev| guess.set(event_target_value(&ev))
                                        />
                                        <button type="submit" class="btn-primary">
                                            "Lås svaret"
                                        </button>
                                        <button
                                            type="button"
                                            class="btn-secondary"
                                            on:click=move |_| game.update(|g| g.release_brake())
                                        >
                                            "Åk vidare"
                                        </button>
                                    </form>
                                }
                                    .into_any()
                            }
                            (None, false) => {
                                view! {
                                    <button class="btn-danger" on:click=move |_| game.update(|g| g.pull_brake())>
                                        "Nödbroms!"
                                    </button>
                                }
                                    .into_any()
                            }
                        }}
                        <button class="btn-secondary" on:click=move |_| game.update(|g| g.advance_level())>
                            "Nästa ledtråd"
                        </button>
                    </div>
                }
            })
        })
    };

    view! {
        <div class="on-the-track">
            <Show when=move || !game.with(|g| g.has_started())>
                <button class="btn-primary" on:click=start>
                    "Starta resan"
                </button>
            </Show>
            {level}
            {move || game.with(|g| g.message()).map(|text| view! { <p class="message">{text}</p> })}
            <Show when=move || game.with(|g| g.is_finished())>
                {move || {
                    game.with(|g| g.config().video_url.clone())
                        .map(|url| {
                            view! {
                                <iframe class="reveal-video" src=url allowfullscreen=true></iframe>
                            }
                        })
                }}
                <button class="btn-secondary" on:click=start>
                    "Åk igen"
                </button>
            </Show>
        </div>
    }
}

#[component]
fn TriviaQuizView(config: TriviaQuizConfig) -> impl IntoView {
    let quiz = RwSignal::new(TriviaQuiz::new(config));

    let question = move || {
        quiz.with(|q| {
            let showing = q.showing_feedback();
            let selected = q.selected();
            q.current_question().cloned().map(|question| {
                let correct = question.correct_option;
                view! {
                    <h2>{question.question}</h2>
                    <div class="options">
                        {question
                            .options
                            .into_iter()
                            .enumerate()
                            .map(|(index, option)| {
                                view! {
                                    <button
                                        class="option"
                                        class:selected={selected == Some(index)}
                                        class:correct={showing && index == correct}
                                        class:incorrect={showing && selected == Some(index) && index != correct}
                                        on:click=move |_| quiz.update(|q| q.select(index))
                                    >
                                        {option}
                                    </button>
                                }
                            })
                            .collect_view()}
                    </div>
                }
            })
        })
    };

    let progress = move || {
        quiz.with(|q| {
            q.statuses()
                .iter()
                .map(|status| {
                    let class = match status {
                        AnswerStatus::Pending => "dot",
                        AnswerStatus::Correct => "dot correct",
                        AnswerStatus::Incorrect => "dot incorrect",
                    };
                    view! { <span class=class></span> }
                })
                .collect_view()
        })
    };

    view! {
        <div class="trivia">
            <div class="progress">{progress}</div>
            <Show
                when=move || !quiz.with(|q| q.is_finished())
                fallback=move || {
                    view! {
                        <p class="score">
                            {move || quiz.with(|q| format!("Du fick {} av {} rätt!", q.score(), q.total()))}
                        </p>
                        <button class="btn-primary" on:click=move |_| quiz.update(|q| q.restart())>
                            "Spela igen"
                        </button>
                    }
                }
            >
                <p class="question-number">{move || quiz.with(|q| q.progress_label())}</p>
                {question}
                <Show
                    when=move || quiz.with(|q| q.showing_feedback())
                    fallback=move || {
                        view! {
                            <button
                                class="btn-primary"
                                prop:disabled=move || quiz.with(|q| q.selected().is_none())
                                on:click=move |_| {
                                    quiz.update(|q| {
                                        q.submit();
                                    })
                                }
                            >
                                "Svara"
                            </button>
                        }
                    }
                >
                    <button class="btn-primary" on:click=move |_| quiz.update(|q| q.next())>
                        "Nästa"
                    </button>
                </Show>
            </Show>
        </div>
    }
}

#[component]
fn ConnectionsView(config: ConnectionsConfig) -> impl IntoView {
    let game = RwSignal::new(ConnectionsGame::new(config));

    let solved = move || {
        game.with(|g| {
            g.solved_groups()
                .cloned()
                .map(|group| {
                    view! {
                        <div class="solved-group">
                            <h3>{group.title}</h3>
                            <p>{group.description}</p>
                            <p class="words">{group.words.join(", ")}</p>
                        </div>
                    }
                })
                .collect_view()
        })
    };

    let words = move || {
        game.with(|g| {
            g.available_words()
                .iter()
                .map(|word| {
                    let selected = g.is_selected(word);
                    let label = word.clone();
                    let word = word.clone();
                    view! {
                        <button
                            class="word"
                            class:selected=selected
                            on:click=move |_| game.update(|g| g.toggle_word(&word))
                        >
                            {label}
                        </button>
                    }
                })
                .collect_view()
        })
    };

    let message = move || {
        game.with(|g| {
            let is_error = g.last_verdict().is_some_and(|verdict| verdict.is_error());
            g.message().map(|text| {
                view! {
                    <p class="message" class:error=is_error>
                        {text.to_string()}
                    </p>
                }
            })
        })
    };

    view! {
        <div class="connections">
            <div class="solved">{solved}</div>
            <div class="word-grid">{words}</div>
            {message}
            <p class="mistakes">
                {move || game.with(|g| format!("Misstag kvar: {}", "● ".repeat(g.mistakes_left())))}
            </p>
            <div class="actions">
                <button
                    class="btn-secondary"
                    prop:disabled=move || game.with(|g| g.is_over())
                    on:click=move |_| game.update(|g| g.shuffle())
                >
                    "Blanda"
                </button>
                <button
                    class="btn-secondary"
                    prop:disabled=move || game.with(|g| g.is_over())
                    on:click=move |_| game.update(|g| g.clear_selection())
                >
                    "Avmarkera"
                </button>
                <button
                    class="btn-primary"
                    prop:disabled=move || game.with(|g| g.is_over())
                    on:click=move |_| {
                        game.update(|g| {
                            g.submit();
                        })
                    }
                >
                    "Skicka"
                </button>
            </div>
        </div>
    }
}

#[cfg(feature = "hydrate")]
async fn post_spotify_logout() -> Result<(), wasm_bindgen::JsValue> {
    let init = web_sys::RequestInit::new();
    init.set_method("POST");
    let request = web_sys::Request::new_with_str_and_init("/api/auth/spotify/logout", &init)?;
    let window = web_sys::window().ok_or_else(|| wasm_bindgen::JsValue::from_str("no window"))?;
    wasm_bindgen_futures::JsFuture::from(window.fetch_with_request(&request)).await?;
    Ok(())
}

#[component]
fn SpotifyConnect() -> impl IntoView {
    let status = Resource::new(|| (), |_| spotify_status());

    let logout = move |_| {
        spawn_local(async move {
            #[cfg(feature = "hydrate")]
            {
                if let Err(e) = post_spotify_logout().await {
                    log!("Spotify logout failed: {:?}", e);
                }
            }
            status.refetch();
        });
    };

    view! {
        <section class="spotify-connect">
            <h3>"Spotify"</h3>
            <Suspense fallback=|| {
                view! { "Laddar..." }
            }>
                {move || {
                    status
                        .with(|result| match result {
                            Some(Ok(status)) if status.connected => {
                                view! {
                                    <p>"Ansluten till Spotify 🎶"</p>
                                    <button class="btn-secondary" on:click=logout>
                                        "Logga ut"
                                    </button>
                                }
                                    .into_any()
                            }
                            Some(Ok(status)) => {
                                view! {
                                    {status
                                        .error
                                        .clone()
                                        .map(|code| {
                                            view! {
                                                <p class="error">"Inloggningen misslyckades: " {code}</p>
                                            }
                                        })}
                                    <a class="btn-primary" href="/api/auth/spotify/login" rel="external">
                                        "Logga in med Spotify"
                                    </a>
                                }
                                    .into_any()
                            }
                            Some(Err(e)) => view! { <p class="error">{e.to_string()}</p> }.into_any(),
                            None => view! { "Laddar..." }.into_any(),
                        })
                }}
            </Suspense>
        </section>
    }
}
