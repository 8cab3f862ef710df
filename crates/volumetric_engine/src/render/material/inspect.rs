//! Live parameter inspection
//!
//! Materials expose their tunable fields to an external menu renderer through
//! the [`Inspector`] trait. Widgets edit the material's own storage in place, so
//! what the menu shows is exactly what the next uniform upload reads. Numeric
//! fields are clamped to their [`DragRange`] right after the widget returns.

use crate::foundation::math::{utils, Vec4};

/// Drag-slider behaviour of a numeric field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragRange {
    /// Value change per pixel dragged
    pub speed: f32,
    /// Smallest valid value
    pub min: f32,
}

impl DragRange {
    /// Range bounded from below
    pub const fn new(speed: f32, min: f32) -> Self {
        Self { speed, min }
    }

    /// Clamp a value into the range
    pub fn clamp(&self, value: f32) -> f32 {
        utils::clamp_to_range(value, self.min, None)
    }
}

/// Menu renderer consuming material fields
///
/// Each method returns `true` when the user changed the value this frame.
pub trait Inspector {
    /// RGB color picker (alpha is left untouched)
    fn color_edit(&mut self, label: &str, color: &mut Vec4) -> bool;

    /// Bounded drag slider
    fn drag_float(&mut self, label: &str, value: &mut f32, range: DragRange) -> bool;

    /// Boolean toggle
    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool;

    /// Discrete selector over `items`
    fn combo(&mut self, label: &str, current: &mut usize, items: &[&str]) -> bool;
}

/// Read-only inspector that writes every field to the log
#[derive(Debug, Default)]
pub struct LogInspector {
    prefix: String,
    fields: usize,
}

impl LogInspector {
    /// Create an inspector tagging its output with `prefix`
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            fields: 0,
        }
    }

    /// Number of fields visited so far
    pub fn fields(&self) -> usize {
        self.fields
    }
}

impl Inspector for LogInspector {
    fn color_edit(&mut self, label: &str, color: &mut Vec4) -> bool {
        self.fields += 1;
        log::info!(
            "[{}] {}: ({:.3}, {:.3}, {:.3})",
            self.prefix,
            label,
            color.x,
            color.y,
            color.z
        );
        false
    }

    fn drag_float(&mut self, label: &str, value: &mut f32, range: DragRange) -> bool {
        self.fields += 1;
        log::info!(
            "[{}] {}: {} (min {}, step {})",
            self.prefix,
            label,
            value,
            range.min,
            range.speed
        );
        false
    }

    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool {
        self.fields += 1;
        log::info!("[{}] {}: {}", self.prefix, label, value);
        false
    }

    fn combo(&mut self, label: &str, current: &mut usize, items: &[&str]) -> bool {
        self.fields += 1;
        log::info!(
            "[{}] {}: {}",
            self.prefix,
            label,
            items.get(*current).copied().unwrap_or("<out of range>")
        );
        false
    }
}

/// Value seen or written by [`RecordingInspector`]
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum FieldValue {
    Color(Vec4),
    Float(f32),
    Bool(bool),
    Choice(usize),
}

/// Inspector double that records the fields it is shown and applies scripted edits
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingInspector {
    pub(crate) seen: Vec<(String, FieldValue)>,
    pub(crate) ranges: Vec<(String, DragRange)>,
    pub(crate) edits: std::collections::HashMap<String, FieldValue>,
}

#[cfg(test)]
impl RecordingInspector {
    pub(crate) fn with_edit(mut self, label: &str, value: FieldValue) -> Self {
        self.edits.insert(label.to_string(), value);
        self
    }

    pub(crate) fn value(&self, label: &str) -> Option<FieldValue> {
        self.seen
            .iter()
            .rev()
            .find(|(seen, _)| seen == label)
            .map(|(_, value)| *value)
    }

    pub(crate) fn labels(&self) -> Vec<&str> {
        self.seen.iter().map(|(label, _)| label.as_str()).collect()
    }
}

#[cfg(test)]
impl Inspector for RecordingInspector {
    fn color_edit(&mut self, label: &str, color: &mut Vec4) -> bool {
        let edited = match self.edits.get(label) {
            Some(FieldValue::Color(value)) => {
                *color = *value;
                true
            }
            _ => false,
        };
        self.seen.push((label.to_string(), FieldValue::Color(*color)));
        edited
    }

    fn drag_float(&mut self, label: &str, value: &mut f32, range: DragRange) -> bool {
        let edited = match self.edits.get(label) {
            Some(FieldValue::Float(new_value)) => {
                *value = *new_value;
                true
            }
            _ => false,
        };
        self.seen.push((label.to_string(), FieldValue::Float(*value)));
        self.ranges.push((label.to_string(), range));
        edited
    }

    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool {
        let edited = match self.edits.get(label) {
            Some(FieldValue::Bool(new_value)) => {
                *value = *new_value;
                true
            }
            _ => false,
        };
        self.seen.push((label.to_string(), FieldValue::Bool(*value)));
        edited
    }

    fn combo(&mut self, label: &str, current: &mut usize, items: &[&str]) -> bool {
        let edited = match self.edits.get(label) {
            Some(FieldValue::Choice(choice)) if *choice < items.len() => {
                *current = *choice;
                true
            }
            _ => false,
        };
        self.seen.push((label.to_string(), FieldValue::Choice(*current)));
        edited
    }
}
