//! Card decoration engine for the two-sided postcard editor.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! interactive decoration canvas for each card face: translating pointer and
//! keyboard input into decoration edits, keeping undo history, hit-testing,
//! and painting stickers, text and freehand drawings with as little redraw
//! work as each frame allows. The host layer wires DOM events to the engine,
//! acts on the returned [`engine::Action`]s, and persists cards through a
//! [`persist::CardStore`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Decoration types and the historied [`doc::DecorationStore`] |
//! | [`history`] | Bounded undo/redo snapshots |
//! | [`clipboard`] | Copy, paste and duplicate |
//! | [`coords`] | Screen, pixel and card coordinate spaces |
//! | [`input`] | Tools, input event types and the gesture state machine |
//! | [`hit`] | Hit-testing decorations and the delete affordance |
//! | [`geometry`] | Per-type bounds shared by chrome, hit tests and dirty regions |
//! | [`text`] | Font strings, text measurement and multi-line layout |
//! | [`stroke`] | Live ink capture and smoothing |
//! | [`render`] | Redraw classification and painting |
//! | [`surface`] | The drawing-surface trait the renderer paints through |
//! | [`scheduler`] | Coalesces repaint requests into one per frame |
//! | [`images`] | URL-keyed sticker image cache |
//! | [`stickers`] | Built-in sticker catalog |
//! | [`codec`] | Storage encoding for nested stroke arrays |
//! | [`persist`] | Card save/load seam and an in-memory store |
//! | [`config`] | Engine tunables and tool style settings |
//! | [`web`] | Browser canvas backend and image loading |
//! | [`consts`] | Shared numeric constants (card size, paddings, limits) |

pub mod clipboard;
pub mod clock;
pub mod codec;
pub mod config;
pub mod consts;
pub mod coords;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod history;
pub mod hit;
pub mod images;
pub mod input;
pub mod persist;
pub mod render;
pub mod scheduler;
pub mod stickers;
pub mod stroke;
pub mod surface;
pub mod text;
pub mod web;
