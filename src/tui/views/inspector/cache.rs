use std::collections::HashMap;
use std::rc::Rc;

use ratatui::text::Text;

use super::mode::ResponseKind;
use crate::tui::highlight::plain_text;

/// Content ready to draw, plus the plain text it shows for copying.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub plain: String,
    pub styled: Text<'static>,
}

impl Rendered {
    /// Styled content; the plain text is whatever the spans spell out.
    pub fn from_styled(styled: Text<'static>) -> Self {
        Self {
            plain: plain_text(&styled),
            styled,
        }
    }

    /// Unstyled content.
    pub fn plain(text: impl Into<String>) -> Self {
        let plain = text.into();
        let styled = Text::from(plain.clone());
        Self { plain, styled }
    }
}

/// Memo of response renditions keyed by (response index, kind).
///
/// An entry is computed on first request and never recomputed. Failed
/// computations are not stored.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: HashMap<(usize, ResponseKind), Rc<Rendered>>,
    computed: usize,
}

impl ResponseCache {
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: (usize, ResponseKind),
        compute: impl FnOnce() -> Result<Rendered, E>,
    ) -> Result<Rc<Rendered>, E> {
        if let Some(hit) = self.entries.get(&key) {
            return Ok(Rc::clone(hit));
        }
        let rendered = Rc::new(compute()?);
        self.computed += 1;
        self.entries.insert(key, Rc::clone(&rendered));
        Ok(rendered)
    }

    /// How many renditions have been computed so far.
    pub fn computed(&self) -> usize {
        self.computed
    }
}
