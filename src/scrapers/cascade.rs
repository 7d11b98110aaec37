use crate::error::ScrapeError;
use scraper::{ElementRef, Selector};
use tracing::trace;

/// Ordered lookup strategies for one field.
///
/// Selectors go from the most specific (generated class names) to the most
/// generic; the first one yielding non-empty text wins, otherwise the sentinel
/// is used.
#[derive(Debug)]
pub struct FieldCascade {
    field: &'static str,
    strategies: Vec<Selector>,
    sentinel: &'static str,
}

impl FieldCascade {
    pub fn new(
        field: &'static str,
        selectors: &[&str],
        sentinel: &'static str,
    ) -> Result<Self, ScrapeError> {
        Ok(Self {
            field,
            strategies: compile_all(selectors)?,
            sentinel,
        })
    }

    /// Trimmed text of the first strategy that finds a non-empty node
    pub fn find_text(&self, scope: ElementRef<'_>) -> Option<String> {
        self.strategies.iter().find_map(|selector| {
            scope
                .select(selector)
                .map(element_text)
                .find(|text| !text.is_empty())
        })
    }

    pub fn text_or_sentinel(&self, scope: ElementRef<'_>) -> String {
        self.find_text(scope).unwrap_or_else(|| {
            trace!("No {} found, using {:?}", self.field, self.sentinel);
            self.sentinel.to_string()
        })
    }

    /// First non-empty value of `attr` on a node matched by any strategy, in order
    pub fn find_attr(&self, scope: ElementRef<'_>, attr: &str) -> Option<String> {
        self.strategies.iter().find_map(|selector| {
            scope
                .select(selector)
                .filter_map(|el| el.value().attr(attr))
                .map(str::trim)
                .find(|value| !value.is_empty())
                .map(str::to_string)
        })
    }
}

/// Every node matched by any of the selectors, once each, in document order
#[derive(Debug)]
pub struct NodeSet {
    selector: Selector,
}

impl NodeSet {
    pub fn new(selectors: &[&str]) -> Result<Self, ScrapeError> {
        Ok(Self {
            selector: compile(&selectors.join(", "))?,
        })
    }

    pub fn select<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        scope.select(&self.selector).collect()
    }

    pub fn contains(&self, el: ElementRef<'_>) -> bool {
        self.selector.matches(&el)
    }
}

pub fn compile(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

fn compile_all(selectors: &[&str]) -> Result<Vec<Selector>, ScrapeError> {
    selectors.iter().map(|css| compile(css)).collect()
}

/// All descendant text joined, trimmed
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const ROW: &str = r#"
        <div id="row">
            <span class="generic-name">Generic</span>
            <span class="specific-name">   </span>
            <a class="link" href="/a">A</a>
            <a class="link" href="/football/b">B</a>
        </div>"#;

    fn with_row<F: FnOnce(ElementRef<'_>)>(f: F) {
        let doc = Html::parse_fragment(ROW);
        let selector = Selector::parse("#row").unwrap();
        let row = doc.select(&selector).next().unwrap();
        f(row)
    }

    #[test]
    fn test_first_non_empty_strategy_wins() {
        let cascade = FieldCascade::new(
            "name",
            &["span.specific-name", "span.generic-name"],
            "Unknown",
        )
        .unwrap();

        with_row(|row| assert_eq!(cascade.text_or_sentinel(row), "Generic"));
    }

    #[test]
    fn test_sentinel_when_nothing_matches() {
        let cascade = FieldCascade::new("name", &["p.missing"], "Unknown").unwrap();
        with_row(|row| {
            assert_eq!(cascade.find_text(row), None);
            assert_eq!(cascade.text_or_sentinel(row), "Unknown");
        });
    }

    #[test]
    fn test_attr_lookup() {
        let cascade = FieldCascade::new("link", &["a[href*='/football/']"], "N/A").unwrap();
        with_row(|row| assert_eq!(cascade.find_attr(row, "href").as_deref(), Some("/football/b")));
    }

    #[test]
    fn test_node_set_document_order() {
        let nodes = NodeSet::new(&["a.link", "span.generic-name"]).unwrap();
        with_row(|row| {
            let texts: Vec<String> = nodes.select(row).into_iter().map(element_text).collect();
            assert_eq!(texts, vec!["Generic", "A", "B"]);
        });
    }

    #[test]
    fn test_node_set_contains() {
        let nodes = NodeSet::new(&["a.link", "span.generic-name"]).unwrap();
        with_row(|row| {
            assert!(!nodes.contains(row));
            assert!(nodes.select(row).into_iter().all(|el| nodes.contains(el)));
        });
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let err = FieldCascade::new("bad", &["div[[["], "N/A").unwrap_err();
        assert!(matches!(err, ScrapeError::Selector { .. }));
    }
}
