//! View handles the flows render into.
//!
//! Flows never look up global UI state; they are handed a view that implements
//! [`SearchView`] and/or [`UploadView`]. [`Page`] is an in-memory page model with a message
//! area, an image container, a query input, an upload status area and a file selection.
//! [`TerminalView`] renders the same calls to a terminal.

use parking_lot::Mutex;
use std::io::Write;
use std::path::PathBuf;

/// CSS class applied to every rendered result image.
pub const IMAGE_CLASS: &str = "banner-img";

/// One rendered result image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageElement {
    pub src: String,
    pub class: String,
    pub alt: String,
}

impl ImageElement {
    /// Image for a storage key, served from `storage_base`.
    pub fn for_key(storage_base: &str, key: &str) -> Self {
        Self {
            src: image_url(storage_base, key),
            class: IMAGE_CLASS.to_string(),
            alt: key.to_string(),
        }
    }
}

/// `<storage_base>/<key>` with exactly one slash between the two.
pub fn image_url(storage_base: &str, key: &str) -> String {
    format!("{}/{}", storage_base.trim_end_matches('/'), key)
}

/// Surfaces the search flow renders into.
pub trait SearchView: Send + Sync {
    /// Set and reveal the message area
    fn show_message(&self, text: &str);
    /// Remove every image from the result container
    fn clear_images(&self);
    fn append_image(&self, image: ImageElement);
    /// Reset the query input
    fn clear_query(&self);
}

/// Surfaces the upload flow renders into.
pub trait UploadView: Send + Sync {
    /// Set and reveal the upload status area
    fn show_status(&self, text: &str);
    /// Reset the file selector
    fn clear_file_selection(&self);
}

/// A text element that starts hidden and is revealed when written to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextArea {
    pub text: String,
    pub visible: bool,
}

impl TextArea {
    fn show(&mut self, text: &str) {
        self.text = text.to_string();
        self.visible = true;
    }
}

/// Snapshot of everything a [`Page`] displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    pub message: TextArea,
    pub images: Vec<ImageElement>,
    pub query: String,
    pub upload_status: TextArea,
    pub file_selection: Option<PathBuf>,
}

/// In-memory page model shared between flows.
#[derive(Debug, Default)]
pub struct Page {
    state: Mutex<PageState>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Type into the query input.
    pub fn set_query(&self, text: impl Into<String>) {
        self.state.lock().query = text.into();
    }

    /// Pick a file in the file selector.
    pub fn select_file(&self, path: impl Into<PathBuf>) {
        self.state.lock().file_selection = Some(path.into());
    }

    pub fn query(&self) -> String {
        self.state.lock().query.clone()
    }

    pub fn file_selection(&self) -> Option<PathBuf> {
        self.state.lock().file_selection.clone()
    }

    pub fn snapshot(&self) -> PageState {
        self.state.lock().clone()
    }
}

impl SearchView for Page {
    fn show_message(&self, text: &str) {
        self.state.lock().message.show(text);
    }

    fn clear_images(&self) {
        self.state.lock().images.clear();
    }

    fn append_image(&self, image: ImageElement) {
        self.state.lock().images.push(image);
    }

    fn clear_query(&self) {
        self.state.lock().query.clear();
    }
}

impl UploadView for Page {
    fn show_status(&self, text: &str) {
        self.state.lock().upload_status.show(text);
    }

    fn clear_file_selection(&self) {
        self.state.lock().file_selection = None;
    }
}

/// Renders flow output as lines of text: messages to stderr, image URLs to stdout.
#[derive(Debug, Default)]
pub struct TerminalView;

impl TerminalView {
    pub fn new() -> Self {
        Self
    }

    fn note(&self, text: &str) {
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "{text}");
    }
}

impl SearchView for TerminalView {
    fn show_message(&self, text: &str) {
        self.note(text);
    }

    fn clear_images(&self) {}

    fn append_image(&self, image: ImageElement) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", image.src);
    }

    fn clear_query(&self) {}
}

impl UploadView for TerminalView {
    fn show_status(&self, text: &str) {
        self.note(text);
    }

    fn clear_file_selection(&self) {}
}
