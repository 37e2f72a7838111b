/// Text read from one card at filter time. A card without a title or
/// description element carries `None` there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardText {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl CardText {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
        }
    }

    fn haystack(&self) -> String {
        let title = self.title.as_deref().unwrap_or_default().to_lowercase();
        let description = self.description.as_deref().unwrap_or_default().to_lowercase();
        format!("{title} {description}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSnapshot {
    /// One decision per card, in card order.
    pub visible: Vec<bool>,
    pub visible_count: usize,
    pub show_no_results: bool,
}

pub fn normalize_term(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Recomputes every card's visibility for `raw_term`.
pub fn filter_cards(raw_term: &str, cards: &[CardText]) -> FilterSnapshot {
    let term = normalize_term(raw_term);
    let visible: Vec<bool> = cards
        .iter()
        .map(|card| card.haystack().contains(&term))
        .collect();
    let visible_count = visible.iter().filter(|v| **v).count();

    FilterSnapshot {
        show_no_results: visible_count == 0 && !term.is_empty(),
        visible,
        visible_count,
    }
}
