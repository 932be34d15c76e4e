//! Headless match runner for decision-logic testing and CI verification.
//!
//! This crate wires the simulation core to the outside world:
//!
//! - **Handlers**: built-in decision logic selectable by name
//! - **Renderers**: observers called once per pass, from silent to a JSON
//!   summary on stdout
//! - **Match loop**: victory check, decision-fault forfeits and exit codes
//!
//! # Example
//!
//! ```bash
//! # Example logic against an idle opponent
//! cargo run -p skirmish_headless -- --map maps/arena.ron --red idle
//!
//! # Reproducible run with a tick limit
//! cargo run -p skirmish_headless -- --map maps/arena.ron --seed 42 --max-ticks 5000
//! ```

pub mod handlers;
pub mod match_runner;
pub mod renderer;

pub use handlers::{controllers, ExampleLogic, FaultyLogic, HandlerKind};
pub use match_runner::{
    victory_check, Match, MatchConfig, MatchEnd, MatchReport, Outcome, SetupError,
    SETUP_FAILURE_EXIT_CODE,
};
pub use renderer::{DummyRenderer, MatchSummary, Renderer, RendererKind, SummaryRenderer};
