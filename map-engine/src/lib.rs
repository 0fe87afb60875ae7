//! Geofenced region engine
//!
//! The map-administration core for the photo location game: operators
//! draw polygons over a floor-plan image to define a playing-area
//! boundary and floor-tagged regions; submission-time callers resolve
//! map points to "is this allowed here" and "which floors are legal".
//!
//! The crate is a library consumed by a UI shell. It owns:
//! - the store adapter contract and an in-memory reference store
//!   ([`store`])
//! - the subscription-fed authoritative state cache ([`cache`])
//! - the draw/drag interaction state machine ([`draw`])
//! - two-step delete confirmation ([`confirm`])
//! - point queries and overlap resolution ([`query`], [`submission`])
//! - the controller tying it together for the panel UI ([`controller`])
//!
//! Rendering, transport, and the real document store live outside.

pub mod cache;
pub mod confirm;
pub mod controller;
pub mod draw;
pub mod query;
pub mod store;
pub mod submission;

pub use cache::MapCache;
pub use confirm::{ConfirmGate, ConfirmOutcome};
pub use controller::{MapController, Notice, NoticeLevel};
pub use draw::{CLOSE_THRESHOLD, ClickOutcome, DrawEngine, DrawMode, DrawState};
pub use query::{FirstMatchByCreationOrder, OverlapPolicy, OverlapResolution};
pub use store::{MapStore, MemoryMapStore, StoreError, StoreEvent, StoreResult};
pub use submission::{SubmissionDecision, SubmissionPolicy};
