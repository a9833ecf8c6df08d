//! Cross-cutting helpers for the process binaries.

pub mod utils;
