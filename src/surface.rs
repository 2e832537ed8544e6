//! Page-side collaborators of the loader: where tiles go, the button that
//! triggers loading, and where faults are reported. In-memory implementations
//! stand in for the DOM.

use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::BoxFuture;

use crate::render::RenderedElement;

/// Handler run when the control is activated; returns the work to drive.
pub type ActivateHandler = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Append-only insertion point for rendered tiles.
pub trait Container: Send + Sync {
    fn insert(&self, element: RenderedElement);
}

/// The single interactive element driving the loader.
pub trait Control: Send + Sync {
    fn on_activate(&self, handler: ActivateHandler);
    fn label(&self) -> String;
    fn set_label(&self, text: &str);
    fn set_disabled(&self, disabled: bool);
    fn set_hidden(&self, hidden: bool);
}

/// Fire-and-forget error reporting.
pub trait DiagnosticSink: Send + Sync {
    fn log_error(&self, context: &str, error: &anyhow::Error);
}

/// Routes faults into `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn log_error(&self, context: &str, error: &anyhow::Error) {
        tracing::error!(context, error = %format!("{error:#}"), "gallery fault");
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory gallery grid.
#[derive(Debug, Default)]
pub struct Grid {
    elements: Mutex<Vec<RenderedElement>>,
}

impl Grid {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { lock(&self.elements).len() }
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Item ids in insertion order.
    pub fn item_ids(&self) -> Vec<u64> {
        lock(&self.elements).iter().map(|e| e.item_id).collect()
    }

    pub fn visible_count(&self) -> usize {
        lock(&self.elements).iter().filter(|e| e.is_visible()).count()
    }

    pub fn to_html(&self) -> String {
        let elements = lock(&self.elements);
        let mut out = String::from("<div class=\"grid grid-cols-2 md:grid-cols-4 gap-4\">\n");
        for e in elements.iter() {
            out.push_str("  ");
            out.push_str(&e.to_html());
            out.push('\n');
        }
        out.push_str("</div>");
        out
    }
}

impl Container for Grid {
    fn insert(&self, element: RenderedElement) {
        lock(&self.elements).push(element);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    pub label: String,
    pub disabled: bool,
    pub hidden: bool,
}

/// In-memory "load more" button. Presses are ignored while it is disabled or
/// hidden, like a real button would.
pub struct Button {
    state: Mutex<ButtonState>,
    handler: Mutex<Option<ActivateHandler>>,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(ButtonState { label: label.into(), disabled: false, hidden: false }),
            handler: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ButtonState { lock(&self.state).clone() }

    /// Simulate a click. Returns the handler's work, or `None` when the press
    /// was swallowed.
    pub fn press(&self) -> Option<BoxFuture<'static, ()>> {
        {
            let s = lock(&self.state);
            if s.disabled || s.hidden { return None; }
        }
        let handler = lock(&self.handler).clone()?;
        Some(handler())
    }

    pub fn to_html(&self) -> String {
        let s = self.state();
        let mut classes = String::from("inline-flex items-center gap-2 px-6 py-3 rounded-full border");
        if s.disabled { classes.push_str(" opacity-50 cursor-not-allowed"); }
        format!(
            "<button id=\"load-more-gallery\" class=\"{classes}\"{disabled}{hidden}><span>{label}</span></button>",
            disabled = if s.disabled { " disabled" } else { "" },
            hidden = if s.hidden { " style=\"display: none\"" } else { "" },
            label = s.label,
        )
    }
}

impl Control for Button {
    fn on_activate(&self, handler: ActivateHandler) {
        *lock(&self.handler) = Some(handler);
    }
    fn label(&self) -> String { lock(&self.state).label.clone() }
    fn set_label(&self, text: &str) { lock(&self.state).label = text.to_string(); }
    fn set_disabled(&self, disabled: bool) { lock(&self.state).disabled = disabled; }
    fn set_hidden(&self, hidden: bool) { lock(&self.state).hidden = hidden; }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::FutureExt;

    use super::*;
    use crate::render::render;
    use crate::types::GalleryItem;

    #[test]
    fn grid_keeps_insertion_order() {
        let grid = Grid::new();
        for id in [3, 1, 2] {
            grid.insert(render(&GalleryItem::image(id)).unwrap());
        }
        assert_eq!(grid.item_ids(), vec![3, 1, 2]);
        assert_eq!(grid.visible_count(), 0);
        assert_eq!(grid.to_html().matches("data-id=").count(), 3);
    }

    #[tokio::test]
    async fn button_swallows_presses_while_disabled_or_hidden() {
        let hits = Arc::new(AtomicUsize::new(0));
        let button = Button::new("See More");
        let counter = hits.clone();
        button.on_activate(Arc::new(move || {
            let counter = counter.clone();
            async move { counter.fetch_add(1, Ordering::SeqCst); }.boxed()
        }));

        button.press().unwrap().await;
        button.set_disabled(true);
        assert!(button.press().is_none());
        assert!(button.to_html().contains("cursor-not-allowed"));
        button.set_disabled(false);
        button.set_hidden(true);
        assert!(button.press().is_none());
        assert!(button.to_html().contains("display: none"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn button_without_handler_does_nothing() {
        assert!(Button::new("See More").press().is_none());
    }
}
