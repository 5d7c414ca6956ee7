//! Sparse partial updates.
//!
//! A `Changes<F>` maps a closed set of updatable fields to their new values.
//! Handlers validate each field as they insert it, and the store applies the
//! whole set in a single statement.

use std::collections::BTreeMap;
use std::fmt::Debug;

/// A column that a partial update is allowed to touch.
pub trait Field: Copy + Ord + Debug + Send + Sync + 'static {
    fn column(self) -> &'static str;

    /// Changing this field counts as an edit and stamps `edited_at`.
    fn is_body(self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TopicField {
    Title,
    Description,
}

impl Field for TopicField {
    fn column(self) -> &'static str {
        match self {
            TopicField::Title => "title",
            TopicField::Description => "description",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PostField {
    Title,
    Body,
}

impl Field for PostField {
    fn column(self) -> &'static str {
        match self {
            PostField::Title => "title",
            PostField::Body => "body",
        }
    }

    fn is_body(self) -> bool {
        self == PostField::Body
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CommentField {
    Body,
}

impl Field for CommentField {
    fn column(self) -> &'static str {
        match self {
            CommentField::Body => "body",
        }
    }

    fn is_body(self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changes<F: Field> {
    values: BTreeMap<F, String>,
}

impl<F: Field> Default for Changes<F> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

impl<F: Field> Changes<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: F, value: impl Into<String>) -> &mut Self {
        self.values.insert(field, value.into());
        self
    }

    pub fn get(&self, field: F) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether applying this set rewrites a body.
    pub fn touches_body(&self) -> bool {
        self.values.keys().any(|field| field.is_body())
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &str)> + '_ {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }
}
