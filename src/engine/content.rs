//! ContentModel: the authoritative markup string.

use std::fmt;

/// Change subscriber. Receives the full markup after every write.
pub type ChangeListener = Box<dyn FnMut(&str)>;

/// The document's single source of truth.
///
/// `write` always notifies every listener, then forwards the value to the
/// host form callback, whether or not the value actually changed.
#[derive(Default)]
pub struct ContentModel {
    value: String,
    listeners: Vec<ChangeListener>,
    form_callback: Option<ChangeListener>,
}

impl fmt::Debug for ContentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentModel")
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .field("form_callback", &self.form_callback.is_some())
            .finish()
    }
}

impl ContentModel {
    /// Create a model holding `initial`. No notification is sent.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            value: initial.into(),
            ..Self::default()
        }
    }

    pub fn read(&self) -> &str {
        &self.value
    }

    /// Replace the document and notify.
    pub fn write(&mut self, value: impl Into<String>) {
        self.value = value.into();
        for listener in &mut self.listeners {
            listener(&self.value);
        }
        if let Some(callback) = &mut self.form_callback {
            callback(&self.value);
        }
    }

    /// Subscribe to changes.
    pub fn on_change(&mut self, listener: impl FnMut(&str) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Set the callback every write is forwarded to.
    pub fn forward_to(&mut self, callback: impl FnMut(&str) + 'static) {
        self.form_callback = Some(Box::new(callback));
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}
