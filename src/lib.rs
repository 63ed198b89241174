//! # tagxref
//!
//! Hyperlinked LaTeX cross-references from GNU Global tag databases.
//!
//! tagxref reads the three sqlite stores written by `gtags --sqlite3`
//! (`GPATH`, `GTAGS`, `GRTAGS`), decodes their compressed records into an
//! in-memory index, and annotates every source file so that each usage of a
//! symbol links to its definition and each definition links back to its
//! usages. The result is one LaTeX document typeset with `minted`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────┐   ┌──────────┐
//! │ Tag stores  │──▶│  Decoders   │──▶│    Index     │──▶│ Annotate │
//! │ GPATH/GTAGS │   │ lines+payld │   │ defs + refs  │   │ per file │
//! └─────────────┘   └─────────────┘   └──────────────┘   └────┬─────┘
//!                                                             ▼
//!                                                       ┌──────────┐
//!                                                       │  Render  │
//!                                                       │  (.tex)  │
//!                                                       └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | File ids, records, link targets |
//! | [`error`] | Fatal decode and consistency errors |
//! | [`db`] | Read-only sqlite connections |
//! | [`store`] | Tag store abstraction (sqlite, in-memory) |
//! | [`lines`] | Line-list decoder |
//! | [`payload`] | Compressed record decoder |
//! | [`index`] | Symbol and file index |
//! | [`barrier`] | Sentinel span detection |
//! | [`annotate`] | Link insertion |
//! | [`highlight`] | Source wrapping for `minted` |
//! | [`render`] | Document assembly |
//! | [`pipeline`] | The `render` command |
//! | [`lookup`] | The `lookup` command |
//! | [`stats`] | The `stats` command |
//! | [`progress`] | Progress reporting on stderr |

pub mod annotate;
pub mod barrier;
pub mod config;
pub mod db;
pub mod error;
pub mod highlight;
pub mod index;
pub mod lines;
pub mod lookup;
pub mod models;
pub mod payload;
pub mod pipeline;
pub mod progress;
pub mod render;
pub mod stats;
pub mod store;
