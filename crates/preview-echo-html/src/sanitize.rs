//! Allow-list sanitizer for preview markup.
//!
//! Everything not explicitly allowed is removed:
//!
//! - elements whose tag is not allowed are unwrapped (their children stay)
//! - `script`, `style` and other active-content elements go with their content
//! - attributes are kept only if allowed for the tag or globally (`"*"`)
//! - `on*` handlers never survive, whatever the policy says
//! - `href`/`src` values must be relative or use an allowed scheme
//! - class tokens are filtered against the class allow-list when it is set
//! - comments are dropped
//!
//! Markup that cannot be parsed comes back entity-escaped as plain text.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    parser::parse,
    serialize::to_html,
    tree::{NodeId, NodeKind, Tree},
};

/// Elements removed together with everything inside them.
const DROP_WITH_CONTENT: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "template", "noscript", "textarea",
];

/// Attributes whose value is a URL.
const URL_ATTRS: &[&str] = &["href", "src", "cite"];

/// Key in [`SanitizePolicy::allowed_attrs`] for attributes allowed on every tag.
pub const ANY_TAG: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizePolicy {
    pub allowed_tags: BTreeSet<String>,
    /// Tag name (or [`ANY_TAG`]) to allowed attribute names.
    pub allowed_attrs: BTreeMap<String, BTreeSet<String>>,
    /// When non-empty, only these class tokens survive.
    pub allowed_classes: BTreeSet<String>,
    pub url_schemes: BTreeSet<String>,
}

impl Default for SanitizePolicy {
    /// The allow-list used for the rendered preview.
    fn default() -> Self {
        Self::empty()
            .allow_tags([
                "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "blockquote", "pre",
                "code", "strong", "em", "b", "i", "u", "s", "del", "sub", "sup", "br", "hr",
                "a", "span", "mark", "img", "table", "thead", "tbody", "tr", "th", "td",
            ])
            .allow_attrs("a", ["href", "title"])
            .allow_attrs("img", ["src", "alt", "title"])
            .allow_attrs("span", ["class"])
            .allow_attrs("mark", ["class"])
            .allow_schemes(["http", "https", "mailto"])
    }
}

impl SanitizePolicy {
    /// A policy that allows nothing.
    pub fn empty() -> Self {
        Self {
            allowed_tags: BTreeSet::new(),
            allowed_attrs: BTreeMap::new(),
            allowed_classes: BTreeSet::new(),
            url_schemes: BTreeSet::new(),
        }
    }

    pub fn allow_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn allow_attrs<I, S>(mut self, tag: &str, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_attrs
            .entry(tag.to_string())
            .or_default()
            .extend(attrs.into_iter().map(Into::into));
        self
    }

    pub fn allow_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_classes
            .extend(classes.into_iter().map(Into::into));
        self
    }

    pub fn allow_schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.url_schemes.extend(schemes.into_iter().map(Into::into));
        self
    }

    pub fn allows_tag(&self, tag: &str) -> bool {
        self.allowed_tags.contains(tag)
    }

    pub fn allows_attr(&self, tag: &str, attr: &str) -> bool {
        if attr.starts_with("on") {
            return false;
        }
        [tag, ANY_TAG].iter().any(|key| {
            self.allowed_attrs
                .get(*key)
                .is_some_and(|set| set.contains(attr))
        })
    }

    pub fn allows_class(&self, class: &str) -> bool {
        self.allowed_classes.is_empty() || self.allowed_classes.contains(class)
    }

    fn allows_url(&self, url: &str) -> bool {
        let trimmed: String = url.chars().filter(|c| !c.is_whitespace() && !c.is_control()).collect();
        match trimmed.split_once(':') {
            // a colon after a path/query/fragment delimiter is not a scheme
            Some((scheme, _)) if !scheme.contains(['/', '?', '#']) => {
                self.url_schemes.contains(&scheme.to_ascii_lowercase())
            }
            _ => true,
        }
    }
}

/// Sanitize `html` against `policy`.
pub fn sanitize(html: &str, policy: &SanitizePolicy) -> String {
    match parse(html) {
        Ok(mut tree) => {
            let root = tree.root();
            clean_children(&mut tree, root, policy);
            to_html(&tree)
        }
        Err(err) => {
            log::debug!("sanitize: markup not parseable ({err}), escaping as text");
            html_escape::encode_text(html).into_owned()
        }
    }
}

/// Sanitize an already-parsed tree in place.
pub fn sanitize_tree(tree: &mut Tree, policy: &SanitizePolicy) {
    let root = tree.root();
    clean_children(tree, root, policy);
}

fn clean_children(tree: &mut Tree, parent: NodeId, policy: &SanitizePolicy) {
    for child in tree.children(parent).to_vec() {
        if matches!(tree.kind(child), NodeKind::Comment(_)) {
            tree.detach(child);
            continue;
        }
        let Some(tag) = tree.tag(child).map(str::to_string) else {
            continue;
        };
        if DROP_WITH_CONTENT.contains(&tag.as_str()) {
            tree.detach(child);
            continue;
        }
        clean_children(tree, child, policy);
        if policy.allows_tag(&tag) {
            clean_attrs(tree, child, policy);
        } else {
            tree.unwrap_node(child);
        }
    }
}

fn clean_attrs(tree: &mut Tree, id: NodeId, policy: &SanitizePolicy) {
    tree.retain_attrs(id, |tag, attr| {
        if !policy.allows_attr(tag, &attr.name) {
            return false;
        }
        if URL_ATTRS.contains(&attr.name.as_str()) && !policy.allows_url(&attr.value) {
            return false;
        }
        if attr.name == "class" {
            let kept: Vec<&str> = attr
                .value
                .split_ascii_whitespace()
                .filter(|c| policy.allows_class(c))
                .collect();
            if kept.is_empty() {
                return false;
            }
            attr.value = kept.join(" ");
        }
        true
    });
}
