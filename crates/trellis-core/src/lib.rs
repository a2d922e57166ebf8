//! Core contracts for the Trellis list-binding layer.
//!
//! This crate defines the data types and collaborator traits that the
//! recycler binding builds on:
//! - [`Component`] - opaque descriptor of what to render
//! - [`RenderSlot`] - the component bound to one list position plus custom attributes
//! - [`RetainedState`] - component-local state that survives tree destruction
//! - [`LayoutTree`] / [`LayoutTreeFactory`] - the layout engine boundary
//! - [`LayoutExecutor`] - the scheduling primitive for background layout
//!
//! The layout engine and the view-mounting system live behind these traits;
//! this crate carries no layout algorithm of its own.

mod component;
mod error;
mod executor;
mod layout_tree;
mod render_slot;
mod retained_state;
mod size;

pub use component::*;
pub use error::*;
pub use executor::*;
pub use layout_tree::*;
pub use render_slot::*;
pub use retained_state::*;
pub use size::*;
