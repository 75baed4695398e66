//! # Docent
//!
//! A document-grounded research assistant.
//!
//! Docent answers questions using only the documents you give it. Files
//! (plain text, Markdown, PDF) from disk, from an HTTP upload, or from
//! Google Drive are extracted, split into paragraph fragments, and kept in
//! memory. Each question is matched against the fragments by keyword
//! overlap; the best matches are sent to a hosted model (Gemini) inside an
//! instruction template that demands inline `[Source: <name>]` citations.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────┐   ┌─────────┐   ┌───────────────┐
//! │ Local / HTTP │──▶│ Extract  │──▶│  Chunk  │──▶│ FragmentStore │
//! │ Drive        │   │ txt/md/  │   │ \n\s*\n │   │ (in memory)   │
//! └──────────────┘   │ pdf      │   └─────────┘   └──────┬────────┘
//!                    └──────────┘                        │
//!        question ──▶ Retrieve (top-k keyword overlap) ◀─┘
//!                        │
//!                        ▼
//!                 Prompt ──▶ Synthesizer ──▶ ConversationLog
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export GEMINI_API_KEY=...
//! docent ask "What are dogs?" --file notes.txt
//! docent search "deployment" --dir ./docs     # retrieval only, no model call
//! docent serve                                # JSON API on 127.0.0.1:7340
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`extract`] | Text extraction (txt, md, pdf) |
//! | [`sources`] | Local files and directory scans |
//! | [`drive`] | Google Drive downloads |
//! | [`chunk`] | Paragraph chunking |
//! | [`store`] | Append-only fragment store |
//! | [`retrieve`] | Keyword-overlap retrieval |
//! | [`prompt`] | Context and prompt construction |
//! | [`synthesizer`] | Hosted model abstraction |
//! | [`conversation`] | Conversation log |
//! | [`state`] | Immutable application snapshots |
//! | [`session`] | Busy-gated ingestion and question answering |
//! | [`server`] | JSON HTTP API |
//! | [`cli`] | One-shot `ask` / `search` / `chunk` commands |

pub mod chunk;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod drive;
pub mod extract;
pub mod models;
pub mod prompt;
pub mod retrieve;
pub mod server;
pub mod session;
pub mod sources;
pub mod state;
pub mod store;
pub mod synthesizer;
