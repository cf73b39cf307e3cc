//! Player port definitions.
//!
//! The application layer depends only on these traits; platform adapters in
//! `infrastructure` implement them for the browser and the terminal.

pub mod outbound;
