//! Navigation state for the fullscreen viewer.
//!
//! The viewer only pages through still images: opening it copies the gallery's
//! items with videos removed, then moves through that copy with wrap-around.
//! Drawing, pan/zoom and DOM wiring stay with the host.

use crate::types::GalleryItem;

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKey {
    Left,
    Right,
    Escape,
}

/// What the host should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    /// The current item changed; redraw.
    Show,
    /// Close the viewer.
    Close,
    /// Nothing to do (single image, nowhere to go).
    Ignore,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSession {
    items: Vec<GalleryItem>,
    current: usize,
}

impl ViewerSession {
    /// Open on `items[start]`.
    ///
    /// Starts at the first image sharing the clicked item's source, or at the
    /// first image when the clicked item was a video or `start` is out of
    /// range. `None` when the gallery has no images at all.
    pub fn open(items: &[GalleryItem], start: usize) -> Option<Self> {
        let images: Vec<GalleryItem> = items.iter().filter(|i| !i.is_video).cloned().collect();
        if images.is_empty() {
            return None;
        }
        let current = items
            .get(start)
            .and_then(|clicked| images.iter().position(|i| i.source == clicked.source))
            .unwrap_or(0);
        Some(Self {
            items: images,
            current,
        })
    }

    pub fn current(&self) -> &GalleryItem {
        &self.items[self.current]
    }

    pub fn position(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether previous/next controls make sense.
    pub fn can_navigate(&self) -> bool {
        self.items.len() > 1
    }

    /// Move by `step` (negative goes back), wrapping at both ends.
    /// Returns `false` when there is only one image.
    pub fn navigate(&mut self, step: isize) -> bool {
        if !self.can_navigate() {
            return false;
        }
        let len = self.items.len() as isize;
        self.current = (self.current as isize + step).rem_euclid(len) as usize;
        true
    }

    pub fn handle_key(&mut self, key: ViewerKey) -> ViewerAction {
        let moved = match key {
            ViewerKey::Escape => return ViewerAction::Close,
            ViewerKey::Left => self.navigate(-1),
            ViewerKey::Right => self.navigate(1),
        };
        if moved {
            ViewerAction::Show
        } else {
            ViewerAction::Ignore
        }
    }

    /// Mutable access for tag edits made from inside the viewer.
    pub fn current_mut(&mut self) -> &mut GalleryItem {
        &mut self.items[self.current]
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }
}
