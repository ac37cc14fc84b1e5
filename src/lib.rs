pub mod app;
pub mod cli;
pub mod config;
pub mod device;
pub mod highlight;
pub mod search;
pub mod store;
pub mod ui;
pub mod validation;
pub mod view;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
pub use store::{Clock, Note, NoteId, NoteStore, SystemClock};
pub use validation::{validate, Limits, ValidationError};
pub use view::{project, NotesView, Renderer, ViewOptions};
