//! Development server with live reload for oqsite.
//!
//! Builds the site, serves the output tree, and rebuilds whenever a watched
//! file changes, telling connected browsers to reload over a WebSocket.

pub mod server;
pub mod watcher;
pub mod websocket;

pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
pub use websocket::{ReloadHub, ReloadMessage};
