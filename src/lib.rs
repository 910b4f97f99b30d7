pub mod app;
pub mod catalog;
pub mod crossword;
pub mod guess;
pub mod model;
pub mod normalize;
#[cfg(feature = "ssr")]
pub mod spotify;
pub mod timer;
pub mod wordle;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
