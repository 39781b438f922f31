//! Route template compilation.
//!
//! Turns templates like `/users/:id/:tab?` into case-insensitive anchored regexes
//! plus the ordered list of parameter keys. Compilation happens once per mount;
//! nothing in here runs per request except [`CompiledPattern::captures`].

use http::Method;
use regex::Regex;
use std::fmt;
use std::rc::Rc;

use super::entity::RouteEntity;
use crate::context::{Params, WILDCARD_KEY};
use crate::dispatcher::HandlerList;
use crate::error::RouteError;

/// Regex plus ordered capture keys for one route template.
#[derive(Clone)]
pub struct CompiledPattern {
    regex: Regex,
    keys: Rc<[Rc<str>]>,
}

enum Segment<'a> {
    Literal(&'a str),
    Param { name: &'a str, optional: bool },
    Wildcard,
}

impl<'a> Segment<'a> {
    fn parse(raw: &'a str, template: &str) -> Result<Self, RouteError> {
        if raw == "*" {
            return Ok(Segment::Wildcard);
        }
        let Some(param) = raw.strip_prefix(':') else {
            return Ok(Segment::Literal(raw));
        };
        let (name, optional) = match param.strip_suffix('?') {
            Some(name) => (name, true),
            None => (param, false),
        };
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(RouteError::InvalidParamName {
                template: template.to_string(),
                segment: raw.to_string(),
            });
        }
        Ok(Segment::Param { name, optional })
    }
}

impl CompiledPattern {
    /// Compile a full route template
    ///
    /// Grammar, segment by segment:
    ///
    /// | segment   | pattern          | key     |
    /// |-----------|------------------|---------|
    /// | `literal` | `/literal`       |         |
    /// | `:name`   | `/([^/]+?)`      | `name`  |
    /// | `:name?`  | `(?:/([^/]+?))?` | `name`  |
    /// | `*`       | `/(.*)`          | `wild`  |
    ///
    /// Empty segments are skipped, so `""`, `"/"` and `"//"` all match the root.
    /// The whole pattern is anchored, case-insensitive and accepts one trailing
    /// slash.
    ///
    /// # Errors
    ///
    /// See [`RouteError`] for the rejected templates.
    pub fn parse(template: &str) -> Result<Self, RouteError> {
        let mut pattern = String::with_capacity(template.len() + 16);
        pattern.push_str("(?i)^");
        let mut keys: Vec<Rc<str>> = Vec::new();
        let mut seen_wildcard = false;

        for raw in template.split('/').filter(|s| !s.is_empty()) {
            let segment = Segment::parse(raw, template)?;

            if seen_wildcard {
                return Err(RouteError::MisplacedWildcard {
                    template: template.to_string(),
                });
            }

            match segment {
                Segment::Literal(lit) => {
                    pattern.push('/');
                    pattern.push_str(&regex::escape(lit));
                }
                Segment::Param {
                    name,
                    optional: false,
                } => {
                    pattern.push_str("/([^/]+?)");
                    keys.push(Rc::from(name));
                }
                Segment::Param {
                    name,
                    optional: true,
                } => {
                    pattern.push_str("(?:/([^/]+?))?");
                    keys.push(Rc::from(name));
                }
                Segment::Wildcard => {
                    pattern.push_str("/(.*)");
                    keys.push(Rc::from(WILDCARD_KEY));
                    seen_wildcard = true;
                }
            }
        }

        pattern.push_str("/?$");
        let regex = Regex::new(&pattern).map_err(|e| RouteError::InvalidPattern {
            template: template.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            regex,
            keys: keys.into(),
        })
    }

    /// Parameter keys in template order
    #[must_use]
    pub fn keys(&self) -> &[Rc<str>] {
        &self.keys
    }

    #[must_use]
    pub fn has_params(&self) -> bool {
        !self.keys.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match `path` and zip the keys with the captured groups
    ///
    /// A group that did not participate (an absent optional segment) yields
    /// `None` for its key.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<Params> {
        let caps = self.regex.captures(path)?;
        let mut params = Params::new();
        for (i, key) in self.keys.iter().enumerate() {
            let value = caps.get(i + 1).map(|m| m.as_str().to_string());
            params.push(Rc::clone(key), value);
        }
        Some(params)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("regex", &self.regex.as_str())
            .field("keys", &self.keys)
            .finish()
    }
}

/// A route entity bound to its full template and compiled matcher.
#[derive(Clone)]
pub struct CompiledRoute {
    pub method: Method,
    /// Mount prefix + router namespace + entity namespace + path
    pub template: String,
    pub handlers: HandlerList,
    pub pattern: CompiledPattern,
}

impl CompiledRoute {
    /// A route with exactly one handler is dispatched without a cursor
    #[must_use]
    pub fn single(&self) -> bool {
        self.handlers.len() == 1
    }
}

impl fmt::Debug for CompiledRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("method", &self.method)
            .field("template", &self.template)
            .field("handlers", &self.handlers.len())
            .field("pattern", &self.pattern)
            .finish()
    }
}

/// Compile `entity` under `namespace`
///
/// The full template is `namespace + entity.namespace + entity.path`.
///
/// # Errors
///
/// Fails when the entity has no handlers or its full template is rejected by
/// [`CompiledPattern::parse`].
pub fn compile(entity: &RouteEntity, namespace: &str) -> Result<CompiledRoute, RouteError> {
    let mut template =
        String::with_capacity(namespace.len() + entity.namespace.len() + entity.path.len());
    template.push_str(namespace);
    template.push_str(&entity.namespace);
    template.push_str(&entity.path);

    if entity.handlers.is_empty() {
        return Err(RouteError::NoHandlers {
            method: entity.method.clone(),
            template,
        });
    }

    let pattern = CompiledPattern::parse(&template)?;
    Ok(CompiledRoute {
        method: entity.method.clone(),
        template,
        handlers: Rc::clone(&entity.handlers),
        pattern,
    })
}
