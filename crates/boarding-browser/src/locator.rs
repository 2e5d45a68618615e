//! Element locators evaluated inside the page.
//!
//! A [`Locator`] is serialized to JSON and handed to a small resolver script
//! that walks the live DOM, so every lookup sees the page as it is at the
//! moment of the call. Locators select by CSS or by ARIA role plus
//! accessible name, optionally filtered by text and scoped under another
//! locator.

use crate::{Error, Result};
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// ARIA roles the flow looks up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Button,
    Textbox,
}

/// How an element's text or accessible name is matched.
///
/// `Contains` is case-insensitive; `Exact` compares whitespace-normalized
/// text; `Pattern` is a regular expression tested against normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum TextMatch {
    Contains(String),
    Exact(String),
    Pattern(String),
}

impl TextMatch {
    /// Regex filter; the syntax is checked before it reaches the page
    pub fn pattern(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map_err(|e| Error::Script(format!("Invalid pattern '{}': {}", pattern, e)))?;
        Ok(TextMatch::Pattern(pattern.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
enum Target {
    Css(String),
    Role(Role),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locator {
    target: Target,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<TextMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<Box<Locator>>,
    nth: usize,
}

impl Locator {
    pub fn css(selector: &str) -> Self {
        Self {
            target: Target::Css(selector.to_string()),
            text: None,
            scope: None,
            nth: 0,
        }
    }

    /// Element with `role` whose accessible name contains `name`
    pub fn role(role: Role, name: &str) -> Self {
        Self::role_matching(role, TextMatch::Contains(name.to_string()))
    }

    pub fn role_exact(role: Role, name: &str) -> Self {
        Self::role_matching(role, TextMatch::Exact(name.to_string()))
    }

    pub fn role_matching(role: Role, name: TextMatch) -> Self {
        Self {
            target: Target::Role(role),
            text: Some(name),
            scope: None,
            nth: 0,
        }
    }

    /// Any element with `role`
    pub fn any_role(role: Role) -> Self {
        Self {
            target: Target::Role(role),
            text: None,
            scope: None,
            nth: 0,
        }
    }

    pub fn with_text(mut self, text: TextMatch) -> Self {
        self.text = Some(text);
        self
    }

    pub fn nth(mut self, index: usize) -> Self {
        self.nth = index;
        self
    }

    /// Resolve `self` only inside the element `parent` resolves to
    pub fn within(mut self, parent: Locator) -> Self {
        self.scope = Some(Box::new(parent));
        self
    }

    /// Script that evaluates to `{found, value}` after running `body` on the
    /// resolved element bound to `el`.
    pub(crate) fn element_script(&self, body: &str) -> String {
        format!(
            "(() => {{ const el = ({resolver})({spec}, 'one'); \
             if (!el) return {{ found: false }}; \
             return {{ found: true, value: (() => {{ {body} }})() }}; }})()",
            resolver = RESOLVER,
            spec = self.spec_json(),
            body = body,
        )
    }

    /// Script that evaluates to the number of matching elements.
    pub(crate) fn count_script(&self) -> String {
        format!(
            "({resolver})({spec}, 'all').length",
            resolver = RESOLVER,
            spec = self.spec_json()
        )
    }

    fn spec_json(&self) -> String {
        // Serializing plain strings and integers cannot fail
        serde_json::to_string(self).unwrap_or_else(|_| "null".to_string())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scope) = &self.scope {
            write!(f, "{} >> ", scope)?;
        }
        match &self.target {
            Target::Css(selector) => write!(f, "{}", selector)?,
            Target::Role(role) => write!(f, "role={:?}", role)?,
        }
        match &self.text {
            Some(TextMatch::Contains(t)) => write!(f, " [text~='{}']", t)?,
            Some(TextMatch::Exact(t)) => write!(f, " [text='{}']", t)?,
            Some(TextMatch::Pattern(p)) => write!(f, " [text=/{}/]", p)?,
            None => {}
        }
        if self.nth != 0 {
            write!(f, " nth={}", self.nth)?;
        }
        Ok(())
    }
}

const RESOLVER: &str = r#"function resolve(spec, mode) {
  const ROLES = {
    button: 'button, [role="button"], input[type="button"], input[type="submit"]',
    textbox: 'input:not([type]), input[type="text"], input[type="search"], input[type="email"], input[type="tel"], textarea, [role="textbox"]',
  };
  const norm = (s) => (s || '').replace(/\s+/g, ' ').trim();
  const textOf = (el) => norm(el.innerText !== undefined ? el.innerText : el.textContent);
  const nameOf = (el) => {
    const aria = el.getAttribute('aria-label');
    if (aria) return norm(aria);
    const labelledBy = el.getAttribute('aria-labelledby');
    if (labelledBy) {
      const parts = labelledBy.split(/\s+/).map((id) => document.getElementById(id)).filter(Boolean);
      if (parts.length) return norm(parts.map(textOf).join(' '));
    }
    if (el.labels && el.labels.length) return norm(Array.from(el.labels).map(textOf).join(' '));
    if (el.placeholder) return norm(el.placeholder);
    return textOf(el) || norm(el.value) || norm(el.title);
  };
  const matches = (m, text) => {
    if (!m) return true;
    if (m.kind === 'contains') return text.toLowerCase().includes(m.value.toLowerCase());
    if (m.kind === 'exact') return text === norm(m.value);
    return new RegExp(m.value).test(text);
  };
  const pick = (all, nth) => all[nth] || null;
  const collect = (s) => {
    let roots = [document];
    if (s.scope) {
      const parent = pick(collect(s.scope), s.scope.nth);
      roots = parent ? [parent] : [];
    }
    const selector = s.target.kind === 'css' ? s.target.value : ROLES[s.target.value];
    const out = [];
    for (const root of roots) {
      for (const el of root.querySelectorAll(selector)) {
        const text = s.target.kind === 'role' ? nameOf(el) : textOf(el);
        if (matches(s.text, text)) out.push(el);
      }
    }
    return out;
  };
  const all = collect(spec);
  return mode === 'all' ? all : pick(all, spec.nth);
}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_css_locator_spec() {
        let locator = Locator::css("div.calendar-body__cell").nth(4);
        let spec: serde_json::Value = serde_json::from_str(&locator.spec_json()).unwrap();

        assert_eq!(
            spec,
            json!({
                "target": { "kind": "css", "value": "div.calendar-body__cell" },
                "nth": 4
            })
        );
    }

    #[test]
    fn test_scoped_role_locator_spec() {
        let locator = Locator::any_role(Role::Button).within(
            Locator::css("pax-passenger")
                .with_text(TextMatch::Contains("Passenger 1".to_string())),
        );
        let spec: serde_json::Value = serde_json::from_str(&locator.spec_json()).unwrap();

        assert_eq!(spec["target"], json!({ "kind": "role", "value": "button" }));
        assert_eq!(
            spec["scope"]["text"],
            json!({ "kind": "contains", "value": "Passenger 1" })
        );
        assert!(spec.get("text").is_none());
    }

    #[test]
    fn test_pattern_is_validated() {
        assert!(TextMatch::pattern(r"^Depart.*").is_ok());
        assert!(TextMatch::pattern(r"(unclosed").is_err());
    }

    #[test]
    fn test_selector_text_is_json_escaped() {
        let locator = Locator::css(r#"input[name="form.passengers.ADT-0.name"]"#);
        let script = locator.count_script();

        assert!(script.contains(r#"input[name=\"form.passengers.ADT-0.name\"]"#));
        assert!(script.ends_with(".length"));
    }

    #[test]
    fn test_element_script_wraps_body() {
        let script = Locator::role(Role::Button, "Search").element_script("el.click(); return true;");

        assert!(script.contains("found: false"));
        assert!(script.contains("el.click(); return true;"));
        assert!(script.contains(r#""kind":"contains","value":"Search""#));
    }

    #[test]
    fn test_display() {
        let locator = Locator::role_exact(Role::Button, "Mr").within(Locator::css("form").nth(1));
        assert_eq!(locator.to_string(), "form nth=1 >> role=Button [text='Mr']");
    }
}
