//! Conversion of `Base.extend(function (...) { ... })` definitions into classes
//!
//! Definitions are recovered as a tree: each header is anchored with a pattern,
//! its initializer body is delimited by bracket matching, and the body is scanned
//! again for nested definitions. Rewriting then walks the tree once, so a closing
//! brace can never be attributed to the wrong definition.

use log::debug;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use crate::error::MigrateError;
use crate::models::{BaseKind, Binding, ClassDefinition, Warning};
use crate::scan::{self, Segment, SegmentKind};

static ANIMATED_SUPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bMovieClip\.call\(\s*this\s*(?:,\s*)?").expect("animated super pattern")
});

static GROUPING_SUPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bContainer\.call\(\s*this\s*(?:,\s*)?").expect("grouping super pattern")
});

fn super_call(base: BaseKind) -> &'static Regex {
    match base {
        BaseKind::Animated => &ANIMATED_SUPER,
        BaseKind::Grouping => &GROUPING_SUPER,
    }
}

/// Result of rewriting every definition in a body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RewrittenClasses {
    pub text: String,
    /// Every converted class in document order.
    pub classes: Vec<String>,
    /// Converted classes bound on the library table.
    pub exports: Vec<String>,
    pub warnings: Vec<Warning>,
}

/// Finds and converts extension definitions bound on one library table.
pub struct ClassRewriter {
    header: Regex,
}

impl ClassRewriter {
    pub fn new(library_alias: &str) -> Result<Self, MigrateError> {
        let symbols = BaseKind::ALL.map(BaseKind::symbol).join("|");
        let pattern = format!(
            r"(?m)^([ \t]*)((?:({lib})\.|(?:var|let|const)\s+)([A-Za-z_$][\w$]*)\s*=\s*)({symbols})\.extend\(\s*function\s*\(([^)]*)\)\s*\{{",
            lib = regex::escape(library_alias),
        );
        Ok(Self { header: Regex::new(&pattern)? })
    }

    /// Recover the definition tree of `src`.
    ///
    /// Headers inside comments or string literals are not definitions.
    pub fn scan(&self, src: &str) -> Result<Vec<ClassDefinition>, MigrateError> {
        let regions = scan::segments(src);
        self.scan_range(src, &regions, 0..src.len())
    }

    fn scan_range(
        &self,
        src: &str,
        regions: &[Segment],
        range: Range<usize>,
    ) -> Result<Vec<ClassDefinition>, MigrateError> {
        let mut found = Vec::new();
        let mut cursor = range.start;

        while let Some(caps) = self.header.captures_at(src, cursor) {
            let Some(whole) = caps.get(0) else {
                break;
            };
            if whole.start() >= range.end {
                break;
            }

            if !scan::is_code(regions, caps.get(2).map_or(whole.start(), |target| target.start())) {
                cursor = whole.end();
                continue;
            }

            let name = caps[4].to_string();
            let Some(base) = BaseKind::from_symbol(&caps[5]) else {
                cursor = whole.end();
                continue;
            };
            let open = whole.end() - 1;
            let unclosed = || MigrateError::UnclosedDefinition {
                name: name.clone(),
                line: scan::line_of(src, whole.start()),
            };

            let close = scan::find_closing(src, open).filter(|&close| close < range.end).ok_or_else(unclosed)?;
            let footer_end = footer_end(src, close, range.end).ok_or_else(unclosed)?;

            let binding = if caps.get(3).is_some() { Binding::Library(name) } else { Binding::Local(name) };
            let children = self.scan_range(src, regions, open + 1..close)?;

            found.push(ClassDefinition {
                binding,
                target: caps[2].to_string(),
                base,
                params: caps[6].to_string(),
                indent: caps[1].to_string(),
                header: whole.range(),
                body: open + 1..close,
                footer: close..footer_end,
                children,
            });
            cursor = footer_end;
        }

        Ok(found)
    }

    /// Convert every definition in `src`, leaving all other text untouched.
    pub fn rewrite(&self, src: &str) -> Result<RewrittenClasses, MigrateError> {
        let definitions = self.scan(src)?;
        let mut result = RewrittenClasses { text: String::with_capacity(src.len()), ..Default::default() };

        let mut cursor = 0;
        for definition in &definitions {
            result.text.push_str(&src[cursor..definition.header.start]);
            render(src, definition, &mut result);
            cursor = definition.footer.end;
        }
        result.text.push_str(&src[cursor..]);

        Ok(result)
    }
}

/// Position just past `)` and an optional `;` following the initializer's `}`.
fn footer_end(src: &str, close: usize, limit: usize) -> Option<usize> {
    let rest = &src[close + 1..limit];
    let after_ws = rest.trim_start();
    if !after_ws.starts_with(')') {
        return None;
    }
    let mut end = close + 1 + (rest.len() - after_ws.len()) + 1;

    let tail = &src[end..limit];
    let after_spaces = tail.trim_start_matches([' ', '\t']);
    if after_spaces.starts_with(';') {
        end += tail.len() - after_spaces.len() + 1;
    }
    Some(end)
}

fn render(src: &str, definition: &ClassDefinition, out: &mut RewrittenClasses) {
    let name = definition.binding.name().to_string();
    let base = definition.base.symbol();
    debug!("converting {} to a class extending {}", name, base);

    out.classes.push(name.clone());
    if definition.binding.is_exported() && !out.exports.contains(&name) {
        out.exports.push(name.clone());
    }

    let indent = &definition.indent;
    out.text.push_str(&format!(
        "{indent}{target}class extends {base} {{\n{indent}    constructor({params}) {{",
        target = definition.target,
        params = definition.params,
    ));

    let mut super_rewritten = false;
    let mut cursor = definition.body.start;
    for child in &definition.children {
        push_own_text(&src[cursor..child.header.start], definition.base, &mut super_rewritten, &mut out.text);
        render(src, child, out);
        cursor = child.footer.end;
    }
    push_own_text(&src[cursor..definition.body.end], definition.base, &mut super_rewritten, &mut out.text);

    if !super_rewritten {
        out.warnings.push(Warning::new(format!(
            "class '{}' never calls {}.call(this, ...); add a super() call to its constructor",
            name, base
        )));
    }

    let terminator = if definition.terminated(src) { ";" } else { "" };
    out.text.push_str(&format!("}}\n{indent}}}{terminator}"));
}

/// Copy a stretch of the definition's own body, turning the first base
/// constructor call in code into `super(`.
fn push_own_text(text: &str, base: BaseKind, done: &mut bool, out: &mut String) {
    if *done {
        out.push_str(text);
        return;
    }
    let found = scan::segments(text).into_iter().filter(|segment| segment.kind == SegmentKind::Code).find_map(|segment| {
        super_call(base)
            .find(&text[segment.range.clone()])
            .map(|call| segment.range.start + call.start()..segment.range.start + call.end())
    });
    match found {
        Some(call) => {
            out.push_str(&text[..call.start]);
            out.push_str("super(");
            out.push_str(&text[call.end..]);
            *done = true;
        }
        None => out.push_str(text),
    }
}
