//! S-expression add-on index format read by the game client.
//!
//! The layout is positional and must stay byte-compatible: fixed field
//! order, two-space nesting, dependencies nested four columns deeper under a
//! `dependency` header. String values are quoted with `\\`, `"`, newline,
//! tab and carriage return escaped the way the client's reader expects.
//! Identifier-like fields must be a single line; only the free-text fields
//! (release title, release note, repository description) may span lines.
//! Any other control character makes the descriptor unrenderable.

use std::borrow::Cow;
use std::fmt::Write;

use crate::addon::descriptor::AddonDescriptor;
use crate::error::{CoreError, CoreResult};

/// Header of a top-level index entry.
pub const ADDON_HEADER: &str = "supertux-addoninfo";

/// Header of an entry nested in a `dependencies` block.
pub const DEPENDENCY_HEADER: &str = "dependency";

/// Header wrapping a whole index page.
pub const INDEX_HEADER: &str = "supertux-addons";

/// Extra indentation applied to each nesting level of dependencies.
const DEPENDENCY_INDENT: usize = 4;

/// Render a descriptor and its dependencies as one index entry.
///
/// The result has no trailing newline.
pub fn render(descriptor: &AddonDescriptor, header: &str, indent: usize) -> CoreResult<String> {
    validate_tree(descriptor)?;
    let mut out = String::new();
    write_entry(&mut out, descriptor, header, indent);
    Ok(out)
}

/// Combine rendered entries into an index page with pagination fields.
pub fn render_index(
    entries: &[String],
    previous_page: Option<&str>,
    next_page: Option<&str>,
    total_pages: u32,
) -> CoreResult<String> {
    if let Some(url) = previous_page {
        check_line("previous-page", url)?;
    }
    if let Some(url) = next_page {
        check_line("next-page", url)?;
    }

    let mut index = format!("({INDEX_HEADER}\n");
    for entry in entries {
        index.push_str(entry);
        index.push('\n');
    }
    if let Some(url) = previous_page {
        let _ = writeln!(index, "  (previous-page \"{}\")", escape(url));
    }
    if let Some(url) = next_page {
        let _ = writeln!(index, "  (next-page \"{}\")", escape(url));
    }
    let _ = writeln!(index, "  (total-pages {total_pages})");
    index.push(')');
    Ok(index)
}

/// Check the fields of one descriptor, not its dependencies.
pub fn validate_fields(d: &AddonDescriptor) -> CoreResult<()> {
    check_line("id", &d.id)?;
    check_line("version.commit", &d.version.commit)?;
    check_text("version.title", &d.version.title)?;
    check_text("version.description", &d.version.description)?;
    check_line("type", d.addon_type.as_str())?;
    check_line("title", &d.title)?;
    check_text("description", &d.description)?;
    check_line("author", &d.author)?;
    check_line("license", &d.license)?;
    check_line("origin-url", &d.origin_url)?;
    check_line("url", &d.url)?;
    check_line("upstream-url", &d.upstream_url)?;
    check_line("md5", &d.md5)?;
    if !d.screenshots.files.is_empty() {
        check_line("screenshots.base-url", &d.screenshots.base_url)?;
        for file in &d.screenshots.files {
            check_line("screenshots.file", file)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Validation and escaping
// ---------------------------------------------------------------------------

fn validate_tree(d: &AddonDescriptor) -> CoreResult<()> {
    validate_fields(d)?;
    d.dependencies.iter().try_for_each(validate_tree)
}

fn invalid(field: &'static str, value: &str) -> CoreError {
    CoreError::InvalidFieldValue {
        field,
        value: value.to_string(),
    }
}

fn check_line(field: &'static str, value: &str) -> CoreResult<()> {
    if value.chars().any(char::is_control) {
        return Err(invalid(field, value));
    }
    Ok(())
}

fn check_text(field: &'static str, value: &str) -> CoreResult<()> {
    if value
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\n' | '\t' | '\r'))
    {
        return Err(invalid(field, value));
    }
    Ok(())
}

/// Escape a checked value for placement between double quotes.
fn escape(value: &str) -> Cow<'_, str> {
    if !value.contains(['"', '\\', '\n', '\t', '\r']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn write_entry(out: &mut String, d: &AddonDescriptor, header: &str, indent: usize) {
    let pad = " ".repeat(indent);

    let _ = writeln!(out, "{pad}({header}");
    let _ = writeln!(out, "{pad}  (id \"{}\")", escape(&d.id));
    let _ = writeln!(out, "{pad}  (version");
    let _ = writeln!(out, "{pad}    (commit \"{}\")", escape(&d.version.commit));
    let _ = writeln!(out, "{pad}    (title \"{}\")", escape(&d.version.title));
    let _ = writeln!(
        out,
        "{pad}    (description \"{}\")",
        escape(&d.version.description)
    );
    let _ = writeln!(out, "{pad}    (created-at {})", d.version.created_at.timestamp());
    let _ = writeln!(out, "{pad}  )");
    let _ = writeln!(out, "{pad}  (type \"{}\")", d.addon_type);
    let _ = writeln!(out, "{pad}  (title \"{}\")", escape(&d.title));
    let _ = writeln!(out, "{pad}  (description \"{}\")", escape(&d.description));
    let _ = writeln!(out, "{pad}  (author \"{}\")", escape(&d.author));
    let _ = writeln!(out, "{pad}  (license \"{}\")", escape(&d.license));
    let _ = writeln!(out, "{pad}  (origin-url \"{}\")", escape(&d.origin_url));
    let _ = writeln!(out, "{pad}  (url \"{}\")", escape(&d.url));
    let _ = writeln!(out, "{pad}  (upstream-url \"{}\")", escape(&d.upstream_url));
    let _ = writeln!(out, "{pad}  (md5 \"{}\")", escape(&d.md5));

    if !d.screenshots.files.is_empty() {
        let _ = writeln!(out, "{pad}  (screenshots");
        let _ = writeln!(out, "{pad}    (base-url \"{}\")", escape(&d.screenshots.base_url));
        let _ = writeln!(out, "{pad}    (files");
        for file in &d.screenshots.files {
            let _ = writeln!(out, "{pad}      (file \"{}\")", escape(file));
        }
        let _ = writeln!(out, "{pad}    )");
        let _ = writeln!(out, "{pad}  )");
    }

    if !d.dependencies.is_empty() {
        let _ = writeln!(out, "{pad}  (dependencies");
        for dep in &d.dependencies {
            write_entry(out, dep, DEPENDENCY_HEADER, indent + DEPENDENCY_INDENT);
            out.push('\n');
        }
        let _ = writeln!(out, "{pad}  )");
    }

    let _ = write!(out, "{pad})");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
