//! Template types for typed variable injection.
//!
//! A `Template<T>` only renders with variable sets implementing
//! `TemplateVars<T>`, so the page shell can't be fed the script's variables.

use std::marker::PhantomData;

/// Variable set for the template marked by `T`
pub trait TemplateVars<T> {
    fn apply(&self, content: &str) -> String;
}

/// Template with typed variable injection
#[derive(Debug, Clone, Copy)]
pub struct Template<T> {
    content: &'static str,
    _marker: PhantomData<T>,
}

impl<T> Template<T> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }

    #[cfg(test)]
    pub const fn content(&self) -> &'static str {
        self.content
    }

    pub fn render(&self, vars: &impl TemplateVars<T>) -> String {
        vars.apply(self.content)
    }
}

/// Replace every `(token, value)` pair in one left-to-right pass.
///
/// Substituted values are never searched again, so a value containing a
/// token is emitted as is.
pub fn substitute(content: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some((at, token, value)) = vars
        .iter()
        .filter_map(|&(token, value)| rest.find(token).map(|at| (at, token, value)))
        .min_by_key(|&(at, ..)| at)
    {
        out.push_str(&rest[..at]);
        out.push_str(value);
        rest = &rest[at + token.len()..];
    }
    out.push_str(rest);
    out
}
