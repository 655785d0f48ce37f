//! Pipeline stages for a lecture digest run.
//!
//! Each submodule implements exactly one step, so every step can be tested
//! on its own and external services can be swapped without touching the
//! others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ transform(summary) ──▶ language ──▶ speech ×2
//!             │                                                │
//!             └───────────▶ transform(quiz) ◀──────────────────┘
//! ```
//!
//! 1. [`input`]     — load the user-supplied path or URL into a `Document`
//! 2. [`extract`]   — PDF bytes → flat text via pdfium (`spawn_blocking`)
//! 3. [`chunk`]     — fixed-size character windows shared by every stage
//! 4. [`transform`] — per-chunk summarization / quiz calls with failure
//!    isolation and inline error markers
//! 5. [`language`]  — split the summary into Arabic and Other buckets
//! 6. [`speech`]    — chunked synthesis of one bucket into one audio file

pub mod chunk;
pub mod extract;
pub mod input;
pub mod language;
pub mod speech;
pub mod transform;
