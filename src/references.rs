//! Renaming of namespace, library-table and cache references to the emitted names
//!
//! Substitutions run in a fixed order. The local bindings for the shape cache and
//! the texture lookup are dropped first, which also reveals the alias each one
//! was bound to; only then are member accesses through those aliases renamed.
//! Every rename touches code only, never string literals or comments.

use log::debug;
use regex::Regex;
use std::borrow::Cow;

use crate::error::MigrateError;
use crate::scan;

/// Namespace members renamed to the runtime namespace, in application order.
const PRIMITIVES: [(&str, &str); 5] = [
    ("animate.MovieClip", "animate.MovieClip"),
    ("Container", "animate.Container"),
    ("Sprite", "animate.Sprite"),
    ("Text", "animate.Text"),
    ("Graphics", "animate.Graphics"),
];

const SHAPES_FIELD: &str = "data.shapes";
const LIBRARY_FIELD: &str = "data.lib";
const TEXTURE_ACCESSOR: &str = "data.getTexture";

/// Identifier boundary that also excludes member access (`a.lib` is not `lib`).
const BOUNDARY: &str = r"(^|[^\w$.])";

/// One ordered substitution over code text.
struct Substitution {
    label: String,
    pattern: Regex,
    replacement: String,
}

impl Substitution {
    fn new(label: impl Into<String>, pattern: &str, replacement: impl Into<String>) -> Result<Self, MigrateError> {
        Ok(Self { label: label.into(), pattern: Regex::new(pattern)?, replacement: replacement.into() })
    }

    fn apply<'a>(&self, code: &'a str) -> Cow<'a, str> {
        self.pattern.replace_all(code, self.replacement.as_str())
    }
}

/// Renames references inside a setup body.
pub struct ReferenceRewriter {
    namespace_alias: String,
    library_alias: String,
}

impl ReferenceRewriter {
    pub fn new(namespace_alias: impl Into<String>, library_alias: impl Into<String>) -> Self {
        Self { namespace_alias: namespace_alias.into(), library_alias: library_alias.into() }
    }

    pub fn rewrite(&self, body: &str) -> Result<String, MigrateError> {
        let ns = regex::escape(&self.namespace_alias);

        let (text, shapes_alias) = self.drop_binding(body, &format!(r"{ns}\.animate\.ShapesCache"), "shapes")?;
        let (text, texture_alias) = self.drop_binding(&text, &format!(r"{ns}\.Texture\.fromFrame"), "fromFrame")?;

        let substitutions = self.substitutions(&shapes_alias, &texture_alias)?;
        let mut counts = vec![0usize; substitutions.len()];

        let text = scan::map_code(&text, |code| {
            let mut current = code.to_string();
            for (substitution, count) in substitutions.iter().zip(counts.iter_mut()) {
                *count += substitution.pattern.find_iter(&current).count();
                current = substitution.apply(&current).into_owned();
            }
            current
        });

        for (substitution, count) in substitutions.iter().zip(&counts) {
            if *count > 0 {
                debug!("renamed {} reference(s): {}", count, substitution.label);
            }
        }

        Ok(text)
    }

    /// Remove `var <alias> = <target>;` on its own line, returning the alias it bound.
    fn drop_binding(&self, text: &str, target: &str, default_alias: &str) -> Result<(String, String), MigrateError> {
        let pattern = format!(r"(?m)^[ \t]*(?:var|let|const)\s+([A-Za-z_$][\w$]*)\s*=\s*{target}\s*;[ \t]*(?:\r?\n)?");
        let finder = Regex::new(&pattern)?;

        match finder.captures(text) {
            Some(caps) => {
                let alias = caps[1].to_string();
                debug!("dropped local binding '{}' for {}", alias, target.replace('\\', ""));
                Ok((finder.replace(text, "").into_owned(), alias))
            }
            None => Ok((text.to_string(), default_alias.to_string())),
        }
    }

    fn substitutions(&self, shapes_alias: &str, texture_alias: &str) -> Result<Vec<Substitution>, MigrateError> {
        let ns = regex::escape(&self.namespace_alias);
        let mut list = Vec::new();

        for (member, canonical) in PRIMITIVES {
            list.push(Substitution::new(
                format!("{}.{} -> {}", self.namespace_alias, member, canonical),
                &format!(r"{BOUNDARY}{ns}\.{}\b", regex::escape(member)),
                format!("${{1}}{canonical}"),
            )?);
        }

        list.push(Substitution::new(
            format!("{} -> {}", self.library_alias, LIBRARY_FIELD),
            &format!(r"{BOUNDARY}{}\.", regex::escape(&self.library_alias)),
            format!("${{1}}{LIBRARY_FIELD}."),
        )?);
        list.push(Substitution::new(
            format!("{} -> {}", shapes_alias, SHAPES_FIELD),
            &format!(r"{BOUNDARY}{}\.", regex::escape(shapes_alias)),
            format!("${{1}}{SHAPES_FIELD}."),
        )?);
        list.push(Substitution::new(
            format!("{}() -> {}()", texture_alias, TEXTURE_ACCESSOR),
            &format!(r"{BOUNDARY}{}\s*\(", regex::escape(texture_alias)),
            format!("${{1}}{TEXTURE_ACCESSOR}("),
        )?);
        list.push(Substitution::new("var -> const", &format!(r"{BOUNDARY}var(\s)"), "${1}const${2}")?);

        Ok(list)
    }
}
