//! # Pattern Module
//!
//! Shape templates and the registry that holds them.
//!
//! A pattern is a list of integer offsets relative to a local origin. The zero
//! offset is always part of it: it is the cell a block is anchored on. Patterns
//! are registered once and never change afterwards, so the default library is
//! shared process-wide behind an `Arc`.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use cgmath::Vector3;
use lazy_static::lazy_static;
use log::warn;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{FillerError, FillerResult};

/// Identifies a shape template.
///
/// The `FromPrimitive` derive is used to enumerate the variants in
/// declaration order.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive, Serialize, Deserialize,
)]
pub enum PatternType {
    /// An L of seven cells.
    PatternA,
    /// A column of five cells.
    PatternB,
}

impl PatternType {
    /// Every pattern type, in declaration order.
    pub fn all() -> impl Iterator<Item = PatternType> {
        (0u8..).map_while(PatternType::from_u8)
    }
}

/// An immutable shape template.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    id: PatternType,
    offsets: Vec<Vector3<i32>>,
}

impl Pattern {
    /// The identifier this pattern is registered under.
    pub fn id(&self) -> PatternType {
        self.id
    }

    /// Local offsets of the pattern's cells, zero offset included.
    pub fn offsets(&self) -> &[Vector3<i32>] {
        &self.offsets
    }

    /// Number of cells the pattern covers.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Always `false` for a registered pattern.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Registry of patterns, at most one per [`PatternType`].
#[derive(Clone, Debug, Default)]
pub struct PatternLibrary {
    patterns: BTreeMap<PatternType, Pattern>,
}

lazy_static! {
    /// The process-wide library holding the built-in patterns.
    pub static ref PATTERN_LIBRARY: Arc<PatternLibrary> =
        Arc::new(PatternLibrary::with_default_patterns());
}

impl PatternLibrary {
    /// Creates an empty library.
    pub fn new() -> Self {
        PatternLibrary::default()
    }

    /// Creates a library holding `PatternA` and `PatternB`.
    pub fn with_default_patterns() -> Self {
        let mut library = PatternLibrary::new();

        let pattern_a = (0..=3)
            .map(|x| Vector3::new(x, 0, 0))
            .chain((1..=3).map(|y| Vector3::new(0, y, 0)))
            .collect();
        let pattern_b = (0..=4).map(|y| Vector3::new(0, y, 0)).collect();

        library.register(pattern_a, PatternType::PatternA);
        library.register(pattern_b, PatternType::PatternB);
        library
    }

    /// Registers a pattern, refusing invalid templates.
    ///
    /// # Returns
    /// `false`, leaving the library unchanged, when `offsets` is empty, lacks
    /// the zero offset, repeats an offset or `id` is already registered.
    pub fn register(&mut self, offsets: Vec<Vector3<i32>>, id: PatternType) -> bool {
        match self.try_register(offsets, id) {
            Ok(()) => true,
            Err(err) => {
                warn!("Rejected pattern registration: {err}");
                false
            }
        }
    }

    /// Registers a pattern, returning why it was refused.
    ///
    /// # Errors
    /// [`FillerError::InvalidPattern`] for the same cases in which
    /// [`register`](Self::register) returns `false`.
    pub fn try_register(&mut self, offsets: Vec<Vector3<i32>>, id: PatternType) -> FillerResult<()> {
        let invalid = |details: &str| -> FillerResult<()> {
            Err(FillerError::InvalidPattern(id, details.to_string()))
        };

        if offsets.is_empty() {
            return invalid("no offsets");
        }
        if !offsets.contains(&Vector3::new(0, 0, 0)) {
            return invalid("the zero offset is missing");
        }
        let mut seen = HashSet::with_capacity(offsets.len());
        if !offsets.iter().all(|offset| seen.insert((offset.x, offset.y, offset.z))) {
            return invalid("an offset is repeated");
        }
        if self.patterns.contains_key(&id) {
            return invalid("already registered");
        }

        self.patterns.insert(id, Pattern { id, offsets });
        Ok(())
    }

    /// Looks up a registered pattern.
    ///
    /// # Errors
    /// [`FillerError::PatternNotFound`] if `id` was never registered.
    pub fn get(&self, id: PatternType) -> FillerResult<&Pattern> {
        self.patterns.get(&id).ok_or(FillerError::PatternNotFound(id))
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: PatternType) -> bool {
        self.patterns.contains_key(&id)
    }

    /// Registered pattern types in declaration order.
    pub fn types(&self) -> Vec<PatternType> {
        self.patterns.keys().copied().collect()
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether no pattern is registered.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// A handle to the process-wide default library.
pub fn default_library() -> Arc<PatternLibrary> {
    Arc::clone(&PATTERN_LIBRARY)
}
