//! Front-matter extraction
//!
//! A page may start with a `---` delimited YAML block. Every key/value
//! pair in the block is kept as-is; nothing is filtered or whitelisted.

use std::collections::HashMap;

/// Front-matter fields keyed by name
pub type Metadata = HashMap<String, serde_yaml::Value>;

/// Split a document into its front-matter fields and markdown body.
///
/// Returns `(metadata, body)`. A document without a front-matter block
/// yields an empty map and the full text as body. An opening `---` that
/// is never closed is a markdown thematic break, not front matter. A
/// closed block that is not a YAML mapping is an error.
pub fn split(content: &str) -> Result<(Metadata, &str), serde_yaml::Error> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let rest = match content.strip_prefix("---") {
        Some(rest) => rest,
        None => return Ok((Metadata::new(), content)),
    };

    // The opening fence must sit on its own line
    let rest = match rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) {
        Some(rest) => rest,
        None => return Ok((Metadata::new(), content)),
    };

    // Closing fence: either immediately after the opener (empty block)
    // or at a later line start
    let close = if rest.starts_with("---") {
        Some((0, 3))
    } else {
        rest.find("\n---").map(|pos| (pos, pos + 4))
    };

    let (block_end, close_end) = match close {
        Some(bounds) => bounds,
        None => return Ok((Metadata::new(), content)),
    };

    let yaml_block = &rest[..block_end];
    let remaining = rest[close_end..].trim_start_matches(['\n', '\r']);

    if yaml_block.trim().is_empty() {
        return Ok((Metadata::new(), remaining));
    }

    let fields: Metadata = serde_yaml::from_str(yaml_block)?;
    Ok((fields, remaining))
}
