//! Skeletal pointer: debounce a body tracker's per-frame hand postures into
//! stable gestures and turn them into pointer motion and button presses.

pub mod action;
pub mod body;
pub mod config;
pub mod engine;
pub mod gesture;
pub mod history;
pub mod ipc;
pub mod proximity;
pub mod replay;
pub mod sink;
