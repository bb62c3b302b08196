//! Free-text search over the rendered preview.
//!
//! Matches are wrapped in marker elements, the result goes back through
//! the sanitizer, and the markers that survive become the match list.
//! Matches never span element boundaries: each text node is searched on
//! its own.

use preview_echo_html::{Attribute, HtmlError, NodeId, Tree, parse, to_html};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::{
    error::SearchError,
    host::{PreviewViewport, Sanitizer},
};

/// Elements whose text is never searched.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Markup used for search markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchStyle {
    /// Element holding the pieces of a text node that had matches.
    pub wrapper_tag: String,
    pub marker_tag: String,
    pub match_class: String,
    /// Added next to `match_class` on the current match.
    pub current_class: String,
}

impl Default for SearchStyle {
    fn default() -> Self {
        Self {
            wrapper_tag: "span".to_string(),
            marker_tag: "mark".to_string(),
            match_class: "search-highlight".to_string(),
            current_class: "search-highlight-current".to_string(),
        }
    }
}

/// Opaque reference to a marker element in the rendered preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MatchHandle(NodeId);

impl MatchHandle {
    pub fn node(self) -> NodeId {
        self.0
    }
}

/// Marker elements in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchList(Vec<MatchHandle>);

impl MatchList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<MatchHandle> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = MatchHandle> + '_ {
        self.0.iter().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    pub html: String,
    pub matches: MatchList,
}

pub struct SearchHighlighter {
    style: SearchStyle,
    sanitizer: Box<dyn Sanitizer>,
    rendered: Option<Tree>,
    matches: MatchList,
    current: Option<usize>,
}

impl SearchHighlighter {
    /// Fails if the sanitizer would strip the markers.
    pub fn new(style: SearchStyle, sanitizer: impl Sanitizer + 'static) -> Result<Self, SearchError> {
        if !sanitizer.keeps_class(&style.marker_tag, &style.match_class) {
            return Err(SearchError::MarkerNotAllowed {
                tag: style.marker_tag,
                class: style.match_class,
            });
        }
        Ok(Self {
            style,
            sanitizer: Box::new(sanitizer),
            rendered: None,
            matches: MatchList::default(),
            current: None,
        })
    }

    pub fn style(&self) -> &SearchStyle {
        &self.style
    }

    pub fn matches(&self) -> &MatchList {
        &self.matches
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<MatchHandle> {
        self.current.and_then(|i| self.matches.get(i))
    }

    /// The rendered preview, current-match styling included.
    pub fn rendered(&self) -> Option<&Tree> {
        self.rendered.as_ref()
    }

    pub fn rendered_html(&self) -> Option<String> {
        self.rendered.as_ref().map(to_html)
    }

    /// `"2/5"` style position of the current match.
    pub fn counter(&self) -> Option<String> {
        self.current
            .map(|i| format!("{}/{}", i + 1, self.matches.len()))
    }

    /// Mark every occurrence of `term` in `html` and rebuild the match list.
    pub fn highlight(&mut self, html: &str, term: &str) -> SearchOutcome {
        self.matches = MatchList::default();
        self.current = None;
        self.rendered = None;

        if term.trim().is_empty() {
            return self.unchanged(html);
        }
        let pattern = match RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
        {
            Ok(pattern) => pattern,
            Err(err) => {
                log::debug!("search: cannot build pattern for {term:?}: {err}");
                return self.unchanged(html);
            }
        };
        let marked = match self.mark(html, &pattern) {
            Ok(marked) => marked,
            Err(err) => {
                log::debug!("search: preview markup not parseable ({err}), leaving it unmarked");
                return self.unchanged(html);
            }
        };

        let clean = self.sanitizer.sanitize(&marked);
        self.render(&clean);
        SearchOutcome {
            html: self.rendered_html().unwrap_or(clean),
            matches: self.matches.clone(),
        }
    }

    /// Advance to the next match, wrapping around. No-op with fewer than two
    /// matches.
    pub fn next<V>(&mut self, viewport: &mut V) -> Option<usize>
    where
        V: PreviewViewport + ?Sized,
    {
        let count = self.matches.len();
        if count > 1 {
            let index = self.current.map_or(0, |i| (i + 1) % count);
            self.select(index, viewport);
        }
        self.current
    }

    /// Step back to the previous match, wrapping around. No-op with fewer
    /// than two matches.
    pub fn previous<V>(&mut self, viewport: &mut V) -> Option<usize>
    where
        V: PreviewViewport + ?Sized,
    {
        let count = self.matches.len();
        if count > 1 {
            let index = self.current.map_or(0, |i| (i + count - 1) % count);
            self.select(index, viewport);
        }
        self.current
    }

    /// Scroll the current match into view.
    pub fn reveal_current<V>(&self, viewport: &mut V)
    where
        V: PreviewViewport + ?Sized,
    {
        if let Some(handle) = self.current()
            && let Err(err) = viewport.scroll_into_view(handle)
        {
            log::warn!("search: could not scroll to match: {err}");
        }
    }

    fn select<V>(&mut self, index: usize, viewport: &mut V)
    where
        V: PreviewViewport + ?Sized,
    {
        self.current = Some(index);
        self.restyle();
        self.reveal_current(viewport);
    }

    fn unchanged(&mut self, html: &str) -> SearchOutcome {
        self.rendered = parse(html).ok();
        SearchOutcome {
            html: html.to_string(),
            matches: MatchList::default(),
        }
    }

    /// Wrap every match in `html` in a marker element.
    fn mark(&self, html: &str, pattern: &Regex) -> Result<String, HtmlError> {
        let mut tree = parse(html)?;
        let root = tree.root();

        for node in tree.text_nodes(root) {
            let skip = tree.ancestors(node).any(|a| {
                tree.tag(a).is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag))
                    || self.is_marker(&tree, a)
            });
            if skip {
                continue;
            }
            let Some(text) = tree.text(node).map(str::to_string) else {
                continue;
            };
            if !pattern.is_match(&text) {
                continue;
            }

            let wrapper = tree.create_element(self.style.wrapper_tag.as_str(), Vec::new());
            let mut last = 0;
            for found in pattern.find_iter(&text) {
                if found.start() > last {
                    let before = tree.create_text(&text[last..found.start()]);
                    tree.append_child(wrapper, before);
                }
                let marker = tree.create_element(
                    self.style.marker_tag.as_str(),
                    vec![Attribute::new("class", self.style.match_class.as_str())],
                );
                let inner = tree.create_text(found.as_str());
                tree.append_child(marker, inner);
                tree.append_child(wrapper, marker);
                last = found.end();
            }
            if last < text.len() {
                let after = tree.create_text(&text[last..]);
                tree.append_child(wrapper, after);
            }
            tree.replace(node, wrapper);
        }

        Ok(to_html(&tree))
    }

    fn is_marker(&self, tree: &Tree, node: NodeId) -> bool {
        tree.tag(node) == Some(self.style.marker_tag.as_str())
            && tree.has_class(node, &self.style.match_class)
    }

    fn render(&mut self, clean: &str) {
        let tree = match parse(clean) {
            Ok(tree) => tree,
            Err(err) => {
                log::debug!("search: sanitized markup not parseable ({err})");
                return;
            }
        };
        let markers = tree
            .elements_by_tag(tree.root(), &self.style.marker_tag)
            .into_iter()
            .filter(|&n| tree.has_class(n, &self.style.match_class))
            .map(MatchHandle)
            .collect();
        self.matches = MatchList(markers);
        self.current = (!self.matches.is_empty()).then_some(0);
        self.rendered = Some(tree);
        self.restyle();
    }

    /// Exactly one marker carries the current class.
    fn restyle(&mut self) {
        let Some(tree) = self.rendered.as_mut() else {
            return;
        };
        for (i, handle) in self.matches.iter().enumerate() {
            let class = if Some(i) == self.current {
                format!("{} {}", self.style.match_class, self.style.current_class)
            } else {
                self.style.match_class.clone()
            };
            tree.set_attr(handle.node(), "class", class);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingViewport;
    use insta::assert_snapshot;
    use preview_echo_html::SanitizePolicy;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn highlighter() -> SearchHighlighter {
        SearchHighlighter::new(SearchStyle::default(), SanitizePolicy::default()).unwrap()
    }

    fn current_markers(h: &SearchHighlighter) -> Vec<usize> {
        let tree = h.rendered().unwrap();
        h.matches()
            .iter()
            .enumerate()
            .filter(|(_, m)| tree.has_class(m.node(), "search-highlight-current"))
            .map(|(i, _)| i)
            .collect()
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\u{a0}\t")]
    fn blank_term_leaves_markup_alone(#[case] term: &str) {
        let mut h = highlighter();
        let html = "<p>Some <em>text</em></p>";
        let outcome = h.highlight(html, term);
        assert_eq!(outcome.html, html);
        assert!(outcome.matches.is_empty());
        assert_eq!(h.current_index(), None);
    }

    #[test]
    fn marks_case_insensitive_matches() {
        let mut h = highlighter();
        let outcome = h.highlight("<p>Hello hello HELLO</p>", "hello");
        assert_eq!(outcome.matches.len(), 3);
        assert_eq!(h.current_index(), Some(0));
        assert_snapshot!(outcome.html, @r#"<p><span><mark class="search-highlight search-highlight-current">Hello</mark> <mark class="search-highlight">hello</mark> <mark class="search-highlight">HELLO</mark></span></p>"#);
    }

    #[test]
    fn term_is_matched_literally() {
        let mut h = highlighter();
        assert_eq!(h.highlight("<p>a.b axb a+b</p>", "a.b").matches.len(), 1);
        assert_eq!(h.highlight("<p>a.b axb a+b</p>", "a+b").matches.len(), 1);
        assert_eq!(h.highlight("<p>(x) [y]</p>", "(x)").matches.len(), 1);
    }

    #[test]
    fn entities_are_searched_decoded_and_written_encoded() {
        let mut h = highlighter();
        let outcome = h.highlight("<p>Tom &amp; Jerry</p>", "& j");
        assert_eq!(outcome.matches.len(), 1);
        assert_snapshot!(outcome.html, @r#"<p><span>Tom <mark class="search-highlight search-highlight-current">&amp; J</mark>erry</span></p>"#);
    }

    #[test]
    fn matches_are_in_document_order_across_elements() {
        let mut h = highlighter();
        let outcome = h.highlight("<h1>cat</h1><ul><li>a cat</li><li>cats</li></ul>", "cat");
        let tree = h.rendered().unwrap();
        let parents: Vec<_> = outcome
            .matches
            .iter()
            .map(|m| {
                tree.ancestors(m.node())
                    .find_map(|a| tree.tag(a).filter(|t| *t != "span"))
                    .unwrap()
                    .to_string()
            })
            .collect();
        assert_eq!(parents, vec!["h1", "li", "li"]);
    }

    #[test]
    fn raw_text_is_not_searched() {
        let h = highlighter();
        let pattern = RegexBuilder::new("find").case_insensitive(true).build().unwrap();
        let marked = h
            .mark("<style>.find{}</style><p>find</p>", &pattern)
            .unwrap();
        assert_eq!(marked.matches("<mark").count(), 1);
    }

    #[test]
    fn already_marked_text_is_not_marked_again() {
        let mut h = highlighter();
        let first = h.highlight("<p>Budget and budget</p>", "budget");
        assert_eq!(first.matches.len(), 2);

        let again = h.highlight(&first.html, "budget");
        assert_eq!(again.matches.len(), 2);
        assert_eq!(again.html.matches("<mark").count(), 2);
        assert_eq!(current_markers(&h), vec![0]);
    }

    #[test]
    fn matches_do_not_span_elements() {
        let mut h = highlighter();
        assert!(h.highlight("<p>hel<b>lo</b></p>", "hello").matches.is_empty());
    }

    #[test]
    fn unparseable_markup_comes_back_unchanged() {
        let mut h = highlighter();
        let html = "<p>find me</p><a href=\"x";
        let outcome = h.highlight(html, "find");
        assert_eq!(outcome.html, html);
        assert!(outcome.matches.is_empty());
        assert_eq!(h.current_index(), None);
    }

    #[test]
    fn output_is_sanitized() {
        let mut h = highlighter();
        let outcome = h.highlight("<p onclick=\"x()\">find</p><script>find()</script>", "find");
        assert_eq!(outcome.matches.len(), 1);
        assert!(!outcome.html.contains("onclick"));
        assert!(!outcome.html.contains("script"));
    }

    #[test]
    fn no_match_means_no_current() {
        let mut h = highlighter();
        let outcome = h.highlight("<p>nothing here</p>", "zebra");
        assert!(outcome.matches.is_empty());
        assert_eq!(h.current_index(), None);
        assert_eq!(h.counter(), None);
    }

    #[test]
    fn cycling_wraps_both_ways() {
        let mut h = highlighter();
        let mut viewport = RecordingViewport::new();
        h.highlight("<p>x x x</p>", "x");

        assert_eq!(h.next(&mut viewport), Some(1));
        assert_eq!(h.next(&mut viewport), Some(2));
        assert_eq!(h.next(&mut viewport), Some(0));
        assert_eq!(h.previous(&mut viewport), Some(2));
        assert_eq!(h.previous(&mut viewport), Some(1));
        assert_eq!(h.counter().as_deref(), Some("2/3"));

        assert_eq!(viewport.scrolled.len(), 5);
        assert_eq!(viewport.last(), h.current());
        assert_eq!(current_markers(&h), vec![1]);
    }

    #[test]
    fn next_n_times_is_identity() {
        let mut h = highlighter();
        let mut viewport = RecordingViewport::new();
        h.highlight("<p>ab ab</p><p>ab</p><p>AB</p>", "ab");
        let n = h.matches().len();
        assert_eq!(n, 4);
        for _ in 0..n {
            h.next(&mut viewport);
        }
        assert_eq!(h.current_index(), Some(0));
        h.next(&mut viewport);
        h.previous(&mut viewport);
        assert_eq!(h.current_index(), Some(0));
    }

    #[test]
    fn single_match_does_not_move() {
        let mut h = highlighter();
        let mut viewport = RecordingViewport::new();
        h.highlight("<p>only one</p>", "one");
        assert_eq!(h.next(&mut viewport), Some(0));
        assert_eq!(h.previous(&mut viewport), Some(0));
        assert!(viewport.scrolled.is_empty());
    }

    #[test]
    fn rebuilding_resets_to_first_match() {
        let mut h = highlighter();
        let mut viewport = RecordingViewport::new();
        h.highlight("<p>x x</p>", "x");
        h.next(&mut viewport);
        h.highlight("<p>x x</p>", "x");
        assert_eq!(h.current_index(), Some(0));
        assert_eq!(current_markers(&h), vec![0]);
    }

    #[test]
    fn marker_must_survive_the_policy() {
        let no_mark = SanitizePolicy::empty().allow_tags(["p", "span"]);
        assert_eq!(
            SearchHighlighter::new(SearchStyle::default(), no_mark).err(),
            Some(SearchError::MarkerNotAllowed {
                tag: "mark".to_string(),
                class: "search-highlight".to_string()
            })
        );

        let other_classes = SanitizePolicy::default().allow_classes(["note"]);
        assert!(SearchHighlighter::new(SearchStyle::default(), other_classes).is_err());
    }
}
