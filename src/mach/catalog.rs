use std::convert::TryFrom;

/// A named resource the host knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub name: &'static str,
    pub style: &'static str,
}

/// Fixed, ordered font and cursor tables. An entry's index is its position,
/// and drawing commands carry indices only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    fonts: Vec<Entry>,
    cursors: Vec<Entry>,
}

const FAMILIES: [&str; 8] = [
    "Arial",
    "Arial Black",
    "Comic Sans MS",
    "Courier New",
    "Georgia",
    "Impact",
    "Times New Roman",
    "Verdana",
];

const STYLES: [&str; 4] = ["", "bold", "italic", "bold italic"];

const CURSORS: [&str; 16] = [
    "none",
    "default",
    "pointer",
    "crosshair",
    "text",
    "move",
    "wait",
    "help",
    "progress",
    "not-allowed",
    "grab",
    "n-resize",
    "e-resize",
    "ne-resize",
    "nw-resize",
    "zoom-in",
];

impl Catalog {
    /// Fonts are every family in each style, plain styles first.
    pub fn standard() -> Catalog {
        let fonts = STYLES
            .iter()
            .flat_map(|style| FAMILIES.iter().map(move |name| Entry { name: *name, style: *style }))
            .collect();
        let cursors = CURSORS
            .iter()
            .map(|name| Entry { name: *name, style: "" })
            .collect();
        Catalog { fonts, cursors }
    }

    pub fn font(&self, index: i32) -> Option<&Entry> {
        usize::try_from(index).ok().and_then(|i| self.fonts.get(i))
    }

    pub fn cursor(&self, index: i32) -> Option<&Entry> {
        usize::try_from(index).ok().and_then(|i| self.cursors.get(i))
    }

    pub fn fonts(&self) -> &[Entry] {
        &self.fonts
    }

    pub fn cursors(&self) -> &[Entry] {
        &self.cursors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_tables() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.fonts().len(), 32);
        assert_eq!(catalog.font(0).map(|e| e.name), Some("Arial"));
        assert_eq!(catalog.font(8).map(|e| (e.name, e.style)), Some(("Arial", "bold")));
        assert_eq!(catalog.font(32), None);
        assert_eq!(catalog.cursor(-1), None);
        assert_eq!(catalog.cursor(3).map(|e| e.name), Some("crosshair"));
    }
}
