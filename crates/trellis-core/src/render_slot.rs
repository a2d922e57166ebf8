//! Render slot: the component bound to one list position.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::Component;

/// Custom attribute key controlling whether a tree clips its children to
/// its bounds. Absent means `true`.
pub const CLIP_CHILDREN: &str = "clip_children";

/// Value of a custom render attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttributeValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

/// Describes what to render for one list position: the component plus
/// custom key/value attributes consumed at tree construction.
///
/// A slot is immutable once bound to a holder; replacing it on the holder
/// invalidates any existing tree.
#[derive(Clone)]
pub struct RenderSlot {
    component: Arc<dyn Component>,
    custom_attributes: FxHashMap<String, AttributeValue>,
}

impl RenderSlot {
    pub fn new(component: Arc<dyn Component>) -> Self {
        Self {
            component,
            custom_attributes: FxHashMap::default(),
        }
    }

    /// Attaches a custom attribute, builder style.
    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.custom_attributes.insert(key.into(), value);
        self
    }

    pub fn component(&self) -> &Arc<dyn Component> {
        &self.component
    }

    pub fn custom_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.custom_attributes.get(key)
    }

    /// Whether trees built for this slot should clip children to their
    /// bounds. Defaults to `true` when the attribute is absent.
    pub fn clip_children(&self) -> bool {
        self.custom_attribute(CLIP_CHILDREN)
            .and_then(AttributeValue::as_bool)
            .unwrap_or(true)
    }
}

impl fmt::Debug for RenderSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderSlot")
            .field("component", &self.component.name())
            .field("custom_attributes", &self.custom_attributes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    struct Probe;

    impl Component for Probe {
        fn name(&self) -> &str {
            "probe"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_clip_children_defaults_to_true() {
        let slot = RenderSlot::new(Arc::new(Probe));
        assert!(slot.clip_children());
    }

    #[test]
    fn test_clip_children_attribute_overrides() {
        let slot = RenderSlot::new(Arc::new(Probe))
            .with_attribute(CLIP_CHILDREN, AttributeValue::Bool(false));
        assert!(!slot.clip_children());
    }

    #[test]
    fn test_custom_attribute_lookup() {
        let slot = RenderSlot::new(Arc::new(Probe))
            .with_attribute("badge_count", AttributeValue::Int(4));
        assert_eq!(
            slot.custom_attribute("badge_count").and_then(AttributeValue::as_int),
            Some(4)
        );
        assert!(slot.custom_attribute("missing").is_none());
    }
}
