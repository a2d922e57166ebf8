//! Minimal component implementation for holder tests.

use std::any::Any;

use trellis_core::{Component, Size};

/// Component with a declared intrinsic size.
///
/// [`TestLayoutTree`](crate::TestLayoutTree) resolves measurement
/// constraints against this size, so tests can predict measured results
/// exactly.
#[derive(Clone, Debug)]
pub struct TestComponent {
    name: String,
    intrinsic: Size,
}

impl TestComponent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            intrinsic: Size::new(100.0, 100.0),
        }
    }

    /// Overrides the intrinsic size, builder style.
    pub fn with_intrinsic_size(mut self, width: f32, height: f32) -> Self {
        self.intrinsic = Size::new(width, height);
        self
    }

    pub fn intrinsic_size(&self) -> Size {
        self.intrinsic
    }
}

impl Component for TestComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
