#![forbid(unsafe_code)]

//! tilepage public facade crate.
//!
//! Re-exports the widget layout engine from the internal crates and offers a
//! prelude plus a couple of I/O helpers for hosts.
//!
//! # Example
//!
//! ```
//! use tilepage::prelude::*;
//!
//! let mut page = StartPage::in_memory(StartPageConfig::default());
//! page.enable("notes");
//! page.handle_event(&LayoutEvent::Resize { width: 375 });
//! assert_eq!(page.viewport_class(), ViewportClass::Narrow);
//! assert_eq!(page.current_page().len(), 2);
//! ```

use std::fmt;
use std::path::Path;

// --- Core re-exports -------------------------------------------------------

pub use tilepage_core::{
    DragEvent, LayoutEvent, SizeClass, SizeMap, WidgetCatalog, WidgetDescriptor, WidgetId,
};

// --- Layout re-exports -----------------------------------------------------

pub use tilepage_layout::{
    Breakpoints, CapacityTable, GridCapacity, Page, PageNavigator, PageStep, Pagination,
    Paginator, PlacedWidget, ViewportClass, WheelPager,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "file-storage")]
pub use tilepage_runtime::FileStorage;
pub use tilepage_runtime::{
    ConfigStore, DragReorderController, DragTransition, EventOutcome, LayoutSettings,
    MemoryStorage, MigrationOutcome, PageStatus, StartPage, StartPageConfig, StorageBackend,
    StorageError, Subscription, WidgetLayoutSnapshot, WidgetOrderModel,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for tilepage hosts.
#[derive(Debug)]
pub enum Error {
    /// I/O failure reading host files.
    Io(std::io::Error),
    /// Storage backend cannot be used.
    Storage(StorageError),
    /// Invalid configuration content.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Config(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

/// Standard result type for tilepage helpers.
pub type Result<T> = std::result::Result<T, Error>;

// --- Helpers --------------------------------------------------------------

/// Read [`LayoutSettings`] from a JSON file. Missing fields take defaults.
pub fn load_layout_settings(path: impl AsRef<Path>) -> Result<LayoutSettings> {
    let text = std::fs::read_to_string(path.as_ref())?;
    LayoutSettings::from_json(&text).map_err(|e| Error::Config(e.to_string()))
}

/// Open a start page backed by `$XDG_STATE_HOME/tilepage/{app_name}/state.json`.
///
/// Fails only when the state directory cannot be written; every later
/// storage problem is logged and absorbed.
#[cfg(feature = "file-storage")]
pub fn open_default(app_name: &str, config: StartPageConfig) -> Result<StartPage> {
    let storage = FileStorage::default_for_app(app_name);
    open_file(storage, config)
}

/// Open a start page backed by the JSON file at `path`.
#[cfg(feature = "file-storage")]
pub fn open_at(path: impl AsRef<Path>, config: StartPageConfig) -> Result<StartPage> {
    open_file(FileStorage::new(path), config)
}

#[cfg(feature = "file-storage")]
fn open_file(storage: FileStorage, config: StartPageConfig) -> Result<StartPage> {
    if !storage.is_available() {
        return Err(Error::Storage(StorageError::Unavailable(format!(
            "cannot write to {}",
            storage.path().display()
        ))));
    }
    tracing::debug!(path = %storage.path().display(), "opening file-backed start page");
    Ok(StartPage::open(config, Box::new(storage)))
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, LayoutEvent, Result, StartPage, StartPageConfig, ViewportClass, WidgetCatalog,
        WidgetId,
    };

    pub use crate::{core, layout, runtime};
}

pub use tilepage_core as core;
pub use tilepage_layout as layout;
pub use tilepage_runtime as runtime;
