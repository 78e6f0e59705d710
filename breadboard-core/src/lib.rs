//! Plate composition and geometry engine for a breadboard editor.
//!
//! - [`grid`]/[`cell`] map integer cells to pixel geometry;
//! - [`kind`] is the closed catalog of plate types and the alias registry;
//! - [`plate`] is one placed plate, [`geometry`] its pure footprint math;
//! - [`layer`] owns the composition: CRUD, reconciliation, collisions,
//!   random generation and the edit-mode state machine;
//! - [`compare`] grades a composition against a reference.
//!
//! Drawing, input delivery and the context-menu widget are reached through
//! the [`surface::DrawSurface`], [`input::EventSource`] and
//! [`menu::ContextMenuHost`] traits.

pub mod cell;
pub mod compare;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod input;
pub mod kind;
pub mod layer;
pub mod menu;
pub mod plate;
pub mod serialized;
pub mod surface;

pub use cell::Cell;
pub use compare::{MatchReport, compare_plates, match_compositions};
pub use error::{DrawError, GridError, LayerError, LayerResult, RegistryError};
pub use geometry::{CellIdx, Orientation, Point, Position};
pub use grid::{Grid, GridSpec};
pub use input::{Channel, EventSource, InputEvent, KeyBindings, MouseButton, Shortcut};
pub use kind::{PlateKind, Properties};
pub use layer::{ChangeAction, LayerChange, PlateLayer, PlateSpec, RandomConfig};
pub use menu::{ContextMenuHost, MenuAction, MenuItem};
pub use plate::{Plate, PlateId, PlateState};
pub use serialized::{Composition, PlatePrototype, SerializedPlate};
pub use surface::{DrawSurface, PlateSnapshot};
