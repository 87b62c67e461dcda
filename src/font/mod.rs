//! Big-digit glyph catalog.
//!
//! A [`Glyph`] is a fixed-height, variable-width grid of filled/empty cells.
//! A [`FontVariant`] maps characters to glyphs with a guaranteed `?` fallback
//! so lookups are total. The [`FontCatalog`] holds the ordered set of variants
//! the renderer cycles through.
//!
//! The glyph shapes themselves live in compact text sheets under
//! `assets/fonts/`, embedded at compile time and parsed by [`sheet`].

pub mod sheet;

use std::collections::HashMap;

pub use sheet::SheetError;

/// One renderable character shape: a grid of filled/empty cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    width: usize,
    rows: Vec<Vec<bool>>,
}

impl Glyph {
    pub(crate) fn new(width: usize, rows: Vec<Vec<bool>>) -> Self {
        Glyph { width, rows }
    }

    /// Column count. The renderer advances the write cursor by this much
    /// after blitting, so differently shaped glyphs compose cleanly.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Row count for this glyph. May be smaller than the variant height for
    /// narrow glyphs like `i`.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Whether the cell at (row, col) is filled. Out-of-range cells are empty.
    pub fn filled(&self, row: usize, col: usize) -> bool {
        self.rows
            .get(row)
            .map(|r| r.get(col).copied().unwrap_or(false))
            .unwrap_or(false)
    }
}

/// One complete character-to-glyph mapping.
#[derive(Debug)]
pub struct FontVariant {
    name: String,
    height: usize,
    glyphs: HashMap<char, Glyph>,
    fallback: Glyph,
}

impl FontVariant {
    fn measure_height(glyphs: &HashMap<char, Glyph>, fallback: &Glyph) -> usize {
        glyphs
            .values()
            .map(Glyph::height)
            .chain(std::iter::once(fallback.height()))
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn assemble(name: String, glyphs: HashMap<char, Glyph>, fallback: Glyph) -> Self {
        let height = Self::measure_height(&glyphs, &fallback);
        FontVariant {
            name,
            height,
            glyphs,
            fallback,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Height of the tallest glyph. Layout and clearing use this so that a
    /// short glyph never leaves stale rows behind it.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total lookup: unknown characters resolve to the `?` glyph.
    pub fn glyph(&self, ch: char) -> &Glyph {
        self.glyphs.get(&ch).unwrap_or(&self.fallback)
    }
}

/// Ordered, immutable set of font variants, built once at startup.
pub struct FontCatalog {
    variants: Vec<FontVariant>,
}

/// Embedded glyph sheets, in cycling order.
const SHEETS: [(&str, &str); 4] = [
    ("slim", include_str!("../../assets/fonts/slim.font")),
    ("bold", include_str!("../../assets/fonts/bold.font")),
    ("tall", include_str!("../../assets/fonts/tall.font")),
    ("block", include_str!("../../assets/fonts/block.font")),
];

impl FontCatalog {
    /// Parse the embedded sheets into the process-wide catalog.
    pub fn builtin() -> Result<Self, SheetError> {
        let mut variants = Vec::with_capacity(SHEETS.len());
        for (name, text) in SHEETS {
            variants.push(sheet::parse(name, text)?);
        }
        Ok(FontCatalog { variants })
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn variant(&self, index: usize) -> &FontVariant {
        &self.variants[index % self.variants.len()]
    }
}
