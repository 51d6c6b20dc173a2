//! Route template compilation.

use regex::Regex;

use crate::context::REQUEST_KEY;
use crate::error::{Result, RouterError};

/// Capture used for every `{name}` placeholder: a lazy, non-empty run.
const VARIABLE_CAPTURE: &str = "(.+?)";

/// A compiled route template.
///
/// Template syntax is literal text plus `{name}` placeholders:
/// - `/users` - Literal path
/// - `/users/{id}` - Path with one variable
/// - `/posts/{post}/comments/{comment}` - Several variables
///
/// Placeholders carry no type constraints. The compiled expression is
/// anchored at both ends, so a pattern only matches a whole path.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    /// The template this pattern was compiled from.
    template: String,
    /// Anchored matching expression.
    regex: Regex,
    /// Variable names, in template order.
    variables: Vec<String>,
}

impl RoutePattern {
    /// Compiles a route template.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_dispatch::RoutePattern;
    ///
    /// let pattern = RoutePattern::compile("/posts/{id}/comments/{comment_id}").unwrap();
    /// assert_eq!(pattern.variables(), ["id", "comment_id"]);
    /// assert_eq!(pattern.captures("/posts/123/comments/456"), Some(vec!["123", "456"]));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] for unbalanced braces, a
    /// placeholder that is not an identifier, or a name used twice, and
    /// [`RouterError::ReservedName`] for a variable named `request`.
    pub fn compile(template: &str) -> Result<Self> {
        let mut variables: Vec<String> = Vec::new();
        let mut source = String::from("^");
        let mut rest = template;

        while let Some(brace) = rest.find(['{', '}']) {
            let (literal, tail) = rest.split_at(brace);
            if tail.starts_with('}') {
                return Err(invalid(template, "unmatched '}'"));
            }
            let close = tail
                .find('}')
                .ok_or_else(|| invalid(template, "unclosed '{'"))?;
            let name = &tail[1..close];

            if !is_identifier(name) {
                return Err(invalid(
                    template,
                    format!("placeholder {{{name}}} is not an identifier"),
                ));
            }
            if name == REQUEST_KEY {
                return Err(RouterError::ReservedName(name.to_string()));
            }
            if variables.iter().any(|v| v == name) {
                return Err(invalid(template, format!("variable {name:?} used twice")));
            }

            source.push_str(&regex::escape(literal));
            source.push_str(VARIABLE_CAPTURE);
            variables.push(name.to_string());
            rest = &tail[close + 1..];
        }

        source.push_str(&regex::escape(rest));
        source.push('$');

        let regex = Regex::new(&source).map_err(|e| invalid(template, e.to_string()))?;

        Ok(Self {
            template: template.to_string(),
            regex,
            variables,
        })
    }

    /// Matches `path` and returns the captured values in template order.
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<&'p str>> {
        let caps = self.regex.captures(path)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map_or("", |m| m.as_str()))
                .collect(),
        )
    }

    /// Returns true if `path` matches this pattern.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Returns the original template string.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the compiled matching expression.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns the variable names.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

fn invalid(template: &str, reason: impl Into<String>) -> RouterError {
    RouterError::InvalidPattern {
        template: template.to_string(),
        reason: reason.into(),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
