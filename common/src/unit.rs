//! Marker types distinguishing kinds of [`DateTimeOf`].
//!
//! [`DateTimeOf`]: crate::DateTimeOf

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing a modification of an entity's attributes.
#[derive(Clone, Copy, Debug)]
pub struct Modification;

/// Marker type describing an entity being sold.
#[derive(Clone, Copy, Debug)]
pub struct Sale;
