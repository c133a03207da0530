//! Player Core - fullscreen playback shell for Android
//!
//! A thin application shell that hands all media work to the GStreamer
//! runtime: the pipeline shim forwards surface lifecycle transitions into
//! pipeline state changes, and the chrome controller keeps the system UI
//! bars hidden while video plays.

#[cfg(target_os = "android")]
mod app;
pub mod chrome;
pub mod config;
pub mod pipeline;
