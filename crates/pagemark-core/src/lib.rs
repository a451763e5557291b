//! Core library for pagemark, a collaborative PDF annotation tool.
//!
//! Everything here is platform-agnostic document and session state:
//! the annotation model, the document controller with undo/redo and page
//! operations, coordinate transforms, tool gestures, collaboration
//! presence and persistence. Rendering and the PDF byte format live in
//! their own crates behind the seams this crate defines (`PageBackend`,
//! draw command lists, the `Storage` trait).

pub mod collab;
pub mod command;
pub mod document;
pub mod history;
pub mod interaction;
pub mod model;
pub mod storage;
pub mod sync;
pub mod tools;
pub mod viewport;

pub use collab::{
    ActivityKind, ActivityLog, ConnectionState, CursorInterpolator, CursorPos, CursorThrottle,
    PresenceState, RemoteUser,
};
pub use command::Command;
pub use document::{DocumentController, PageBackend, PageInfo, PageOpError, SavePayload};
pub use history::{History, Snapshot, MAX_HISTORY};
pub use interaction::{apply_resize, hit_test, DragState, ResizeHandle, MIN_RESIZE_DIMENSION};
pub use model::{
    Annotation, AnnotationId, AnnotationKind, AnnotationThread, Color, Comment, FormField,
    FormFieldKind, RedactionArea, DEFAULT_HIT_EXTENT,
};
pub use storage::{AutoSaveManager, FileStorage, MemoryStorage, Storage, StorageError};
pub use sync::{ClientMessage, NativeSocket, ServerMessage, SyncEvent};
pub use tools::{GestureOutcome, ToolGesture, ToolKind, ToolStyle};
pub use viewport::Viewport;

// Geometry comes from kurbo; re-export the types that appear in this
// crate's public API.
pub use kurbo::{Point, Rect};
