//! Portfolio items as seen by the canvas.

use std::sync::Arc;

/// One life/culture portfolio entry.
///
/// The canvas never mutates items; they are owned by whatever fetched them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "camelCase", default)
)]
pub struct PortfolioItem {
    /// Stable identifier from the backing store.
    pub id: String,
    /// Image URLs; the first one drives the card's aspect ratio.
    pub images: Vec<String>,
    /// Display title.
    pub title: String,
    /// Author credit.
    pub created_by: String,
    /// Year label as entered by staff.
    pub year: String,
    /// Category tags.
    pub categories: Vec<String>,
    /// Free-form description.
    pub description: String,
}

impl PortfolioItem {
    /// Creates an item with only an id and images, the fields layout reads.
    pub fn new(id: impl Into<String>, images: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            id: id.into(),
            images: images.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// URL of the cover image, if the item has any images.
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// The ordered, shared list of items tiled across the canvas.
///
/// Cloning is cheap; cells hand out `Arc`s to individual items.
#[derive(Debug, Clone, Default)]
pub struct Portfolio {
    items: Arc<[Arc<PortfolioItem>]>,
}

impl Portfolio {
    /// Builds a portfolio from any item iterator.
    pub fn new(items: impl IntoIterator<Item = PortfolioItem>) -> Self {
        Self {
            items: items.into_iter().map(Arc::new).collect(),
        }
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there is nothing to lay out.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at `index`, wrapping in both directions.
    ///
    /// Returns `None` only for an empty portfolio.
    ///
    /// ```
    /// use mosaic_canvas::{Portfolio, PortfolioItem};
    ///
    /// let portfolio = Portfolio::new([
    ///     PortfolioItem::new("a", ["/uploads/a.jpg"]),
    ///     PortfolioItem::new("b", ["/uploads/b.jpg"]),
    /// ]);
    /// assert_eq!(portfolio.wrapped(3).map(|item| item.id.as_str()), Some("b"));
    /// assert_eq!(portfolio.wrapped(-1).map(|item| item.id.as_str()), Some("b"));
    /// ```
    pub fn wrapped(&self, index: i64) -> Option<&Arc<PortfolioItem>> {
        if self.items.is_empty() {
            return None;
        }
        let len = self.items.len() as i64;
        self.items.get(index.rem_euclid(len) as usize)
    }

    /// Iterates over the distinct items.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<PortfolioItem>> {
        self.items.iter()
    }
}

impl FromIterator<PortfolioItem> for Portfolio {
    fn from_iter<T: IntoIterator<Item = PortfolioItem>>(iter: T) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_portfolio_wraps_to_none() {
        let portfolio = Portfolio::default();
        assert!(portfolio.is_empty());
        assert!(portfolio.wrapped(0).is_none());
        assert!(portfolio.wrapped(-7).is_none());
    }

    #[test]
    fn wrapping_handles_large_negative_indices() {
        let portfolio: Portfolio = (0..3)
            .map(|i| PortfolioItem::new(format!("item-{i}"), Vec::<String>::new()))
            .collect();
        let id = portfolio
            .wrapped(-3_000_000_001)
            .map(|item| item.id.clone());
        assert_eq!(id.as_deref(), Some("item-2"));
    }

    #[test]
    fn cover_image_is_first_image() {
        let item = PortfolioItem::new("x", ["/uploads/1.png", "/uploads/2.png"]);
        assert_eq!(item.cover_image(), Some("/uploads/1.png"));
        assert_eq!(PortfolioItem::default().cover_image(), None);
    }
}
