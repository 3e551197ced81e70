//! Frontend-facing state. Window and event-loop integration lives outside
//! the crate; a frontend translates its events into [`InputState`] calls.

pub mod input;

pub use input::{InputState, MouseButton};
