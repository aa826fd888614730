//! Module: script
//! Responsibility: statement scripts and the template-dialect helpers used
//! to write them.
//!
//! Helpers emit the dynamic-tag dialect understood by the template
//! compiler (`<where>`, `<if test>`, `<foreach>`, ...). Each returns an
//! owned fragment so scripts compose them with `format!`.

mod wrapper;

#[cfg(test)]
mod tests;

pub use wrapper::{ScriptContext, ScriptWrapper, ScriptWrappers};

use crate::model::EntityTable;
use std::fmt::Write as _;

///
/// SqlScript
/// Renders the template for one statement from its resolved table.
///

pub trait SqlScript: Send + Sync {
    fn sql(&self, table: &EntityTable) -> String;
}

impl<F> SqlScript for F
where
    F: Fn(&EntityTable) -> String + Send + Sync,
{
    fn sql(&self, table: &EntityTable) -> String {
        self(table)
    }
}

/// Wrap a rendered body in the `<script>` envelope.
#[must_use]
pub fn wrap_script(body: &str) -> String {
    format!("<script>\n{body}\n</script>")
}

#[must_use]
pub fn where_(content: &str) -> String {
    format!("\n<where>\n{content}\n</where> ")
}

#[must_use]
pub fn choose(content: &str) -> String {
    format!("\n<choose>\n{content}\n</choose> ")
}

#[must_use]
pub fn otherwise(content: &str) -> String {
    format!("\n<otherwise>\n{content}\n</otherwise> ")
}

#[must_use]
pub fn set(content: &str) -> String {
    format!("\n<set>\n{content}\n</set> ")
}

#[must_use]
pub fn if_test(test: &str, content: &str) -> String {
    format!("<if test=\"{test}\">\n{content}\n</if> ")
}

#[must_use]
pub fn if_parameter_not_null(content: &str) -> String {
    format!("\n<if test=\"_parameter != null\">\n{content}\n</if> ")
}

#[must_use]
pub fn when_test(test: &str, content: &str) -> String {
    format!("\n<when test=\"{test}\">\n{content}\n</when> ")
}

#[must_use]
pub fn trim(
    prefix: &str,
    suffix: &str,
    prefix_overrides: &str,
    suffix_overrides: &str,
    content: &str,
) -> String {
    format!(
        "\n<trim prefix=\"{prefix}\" prefixOverrides=\"{prefix_overrides}\" suffixOverrides=\"{suffix_overrides}\" suffix=\"{suffix}\">\n{content}\n</trim> "
    )
}

#[must_use]
pub fn trim_prefix_overrides(prefix: &str, suffix: &str, prefix_overrides: &str, content: &str) -> String {
    format!(
        "\n<trim prefix=\"{prefix}\" prefixOverrides=\"{prefix_overrides}\" suffix=\"{suffix}\">\n{content}\n</trim> "
    )
}

#[must_use]
pub fn trim_suffix_overrides(prefix: &str, suffix: &str, suffix_overrides: &str, content: &str) -> String {
    format!(
        "\n<trim prefix=\"{prefix}\" suffixOverrides=\"{suffix_overrides}\" suffix=\"{suffix}\">\n{content}\n</trim> "
    )
}

#[must_use]
pub fn bind(name: &str, value: &str) -> String {
    format!("\n<bind name=\"{name}\" value=\"{value}\"/>")
}

/// Plain `<foreach>` over `collection`.
#[must_use]
pub fn foreach(collection: &str, item: &str, content: &str) -> String {
    Foreach::new(collection, item).render(content)
}

///
/// Foreach
/// `<foreach>` tag builder; unset attributes are omitted.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Foreach {
    collection: String,
    item: String,
    index: Option<String>,
    open: Option<String>,
    close: Option<String>,
    separator: Option<String>,
}

impl Foreach {
    #[must_use]
    pub fn new(collection: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            item: item.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    #[must_use]
    pub fn open(mut self, open: impl Into<String>) -> Self {
        self.open = Some(open.into());
        self
    }

    #[must_use]
    pub fn close(mut self, close: impl Into<String>) -> Self {
        self.close = Some(close.into());
        self
    }

    #[must_use]
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    #[must_use]
    pub fn render(&self, content: &str) -> String {
        let mut tag = format!(
            "\n<foreach collection=\"{}\" item=\"{}\"",
            self.collection, self.item
        );
        let attrs = [
            ("index", &self.index),
            ("open", &self.open),
            ("close", &self.close),
            ("separator", &self.separator),
        ];
        for (name, value) in attrs {
            if let Some(value) = value {
                let _ = write!(tag, " {name}=\"{value}\"");
            }
        }
        let _ = write!(tag, ">\n{content}\n</foreach> ");

        tag
    }
}
