//! Value rewrite rules
//!
//! A replacement list is an ordered set of first-match rewrites applied to
//! extracted field values. Each rule matches either an exact substring or
//! a regular expression; the first rule that matches rewrites the value and
//! stops the search. A value no rule matches passes through unchanged.

use std::borrow::Cow;

use httplog_config::ReplacementSpec;
use regex::Regex;

use crate::error::SpecError;

/// How a replacement decides whether it applies
#[derive(Debug)]
enum Matcher {
    /// Matches when the substring occurs anywhere in the value
    Substring(String),
    /// Matches when the pattern matches anywhere in the value
    Pattern(Regex),
}

/// One compiled rewrite rule
#[derive(Debug)]
pub struct Replacement {
    matcher: Matcher,
    template: String,
}

impl Replacement {
    /// Compile a replacement specification
    ///
    /// Exactly one matcher must be present. Regular expressions use the
    /// linear-time engine; backreferences and lookaround do not compile
    /// and are rejected here.
    pub fn compile(spec: &ReplacementSpec) -> Result<Self, SpecError> {
        let matcher = match (&spec.string, &spec.regexp) {
            (Some(_), Some(_)) => return Err(SpecError::AmbiguousReplacement),
            (None, None) => return Err(SpecError::MissingMatcher),
            (Some(substring), None) => Matcher::Substring(substring.clone()),
            (None, Some(pattern)) => {
                let regex = Regex::new(pattern).map_err(|source| SpecError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;

                Matcher::Pattern(regex)
            }
        };

        Ok(Self {
            matcher,
            template: spec.replacement.clone(),
        })
    }

    /// Compile a list of replacement specifications, preserving order
    pub fn compile_all(specs: &[ReplacementSpec]) -> Result<Vec<Self>, SpecError> {
        specs.iter().map(Self::compile).collect()
    }

    /// Apply this rule if it matches
    ///
    /// Substring rules replace every occurrence; regex rules replace every
    /// non-overlapping match and expand `$n` / `$name` capture references
    /// in the template.
    fn apply<'a>(&self, value: &'a str) -> Option<Cow<'a, str>> {
        match &self.matcher {
            Matcher::Substring(substring) => {
                if value.contains(substring.as_str()) {
                    Some(Cow::Owned(value.replace(substring.as_str(), &self.template)))
                } else {
                    None
                }
            }
            Matcher::Pattern(regex) => {
                if regex.is_match(value) {
                    Some(regex.replace_all(value, self.template.as_str()))
                } else {
                    None
                }
            }
        }
    }
}

/// Apply the first matching replacement from an ordered list
///
/// Returns the rewritten value, or the input unchanged when no rule
/// matches. An empty list is a no-op.
pub fn apply_first<'a>(replacements: &[Replacement], value: &'a str) -> Cow<'a, str> {
    for replacement in replacements {
        if let Some(rewritten) = replacement.apply(value) {
            return rewritten;
        }
    }

    Cow::Borrowed(value)
}

#[cfg(test)]
#[path = "replace_test.rs"]
mod replace_test;
