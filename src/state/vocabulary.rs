//! Tag vocabulary
//!
//! Every tag name the session has seen, either decoded from a file's keywords
//! or typed in by the user. Names keep their insertion order, which also
//! decides each tag's display color.

/// An RGB display color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Label colors, assigned to tags by vocabulary position
pub const PALETTE: [Rgb; 22] = [
    Rgb(230, 25, 75),
    Rgb(60, 180, 75),
    Rgb(255, 225, 25),
    Rgb(0, 130, 200),
    Rgb(245, 130, 48),
    Rgb(145, 30, 180),
    Rgb(70, 240, 240),
    Rgb(240, 50, 230),
    Rgb(210, 245, 60),
    Rgb(250, 190, 212),
    Rgb(0, 128, 128),
    Rgb(220, 190, 255),
    Rgb(170, 110, 40),
    Rgb(255, 250, 200),
    Rgb(128, 0, 0),
    Rgb(170, 255, 195),
    Rgb(128, 128, 0),
    Rgb(255, 215, 180),
    Rgb(0, 0, 128),
    Rgb(128, 128, 128),
    Rgb(255, 255, 255),
    Rgb(0, 0, 0),
];

/// Color for the tag at `index` in the vocabulary
pub fn color_at(index: usize) -> Rgb {
    PALETTE[index % PALETTE.len()]
}

/// Ordered set of known tag names. Only grows.
#[derive(Debug, Clone, Default)]
pub struct TagVocabulary {
    names: Vec<String>,
}

impl TagVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name` unless it is empty or already known.
    /// Returns true if the vocabulary grew.
    pub fn add(&mut self, name: &str) -> bool {
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|known| known == name)
    }

    /// All names in insertion order
    pub fn all(&self) -> &[String] {
        &self.names
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Display color of a known tag
    #[cfg(test)]
    pub fn color_of(&self, name: &str) -> Option<Rgb> {
        self.names
            .iter()
            .position(|known| known == name)
            .map(color_at)
    }
}
