//! Break suggestions: the generator seam, the Gemini-backed generator, the
//! lifecycle controller and the auto-brew driver.

mod auto;
mod controller;
mod gemini;
mod generator;

pub use auto::{AutoBrewDriver, AutoBrewHandle};
pub use controller::{ManualTicket, PrefetchTicket, SuggestionController};
pub use gemini::{GeminiClient, GeminiSettings};
pub use generator::{StaticGenerator, SuggestionGenerator, SuggestionRequest};
