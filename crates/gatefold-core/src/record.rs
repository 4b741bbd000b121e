//! Record maps: the opaque content payload fetched from the upstream
//! workspace.
//!
//! A record map is a JSON tree of blocks keyed by block id, with the
//! requested page's root block first. This system never interprets block
//! content beyond three narrow transforms: extracting the root title,
//! stripping the root title before detail rendering (the page header
//! renders it separately), and rewriting private-attachment image sources
//! to signed URLs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// URL scheme marking a private attachment that needs a signed URL.
pub const ATTACHMENT_SCHEME: &str = "attachment:";

/// Opaque content payload keyed by block id.
///
/// Treated as an immutable value; the title-stripping transform produces a
/// patched copy and leaves the source untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordMap(Value);

impl RecordMap {
    /// Wrap a raw payload.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the raw payload.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Unwrap the raw payload.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Id of the root block — the first entry of the block map, which the
    /// upstream places first for the requested page.
    #[must_use]
    pub fn root_block_id(&self) -> Option<&str> {
        self.0
            .get("block")?
            .as_object()?
            .keys()
            .next()
            .map(String::as_str)
    }

    /// Extract the root block's title as a plain string.
    ///
    /// Title properties arrive as nested text runs; the text fragments are
    /// concatenated and formatting annotations are dropped. Returns `None`
    /// when the root block has no title (or no text in it).
    #[must_use]
    pub fn title(&self) -> Option<String> {
        let root_id = self.root_block_id()?;
        let title = self
            .0
            .get("block")?
            .get(root_id)?
            .get("value")?
            .get("properties")?
            .get("title")?;

        let mut out = String::new();
        collect_text(title, 3, &mut out);
        if out.is_empty() { None } else { Some(out) }
    }

    /// Produce a copy with the root block's title removed.
    ///
    /// Detail pages render the title in their own header; leaving it in the
    /// payload would display it twice. Only the root block is patched.
    #[must_use]
    pub fn strip_root_title(&self) -> Self {
        let mut patched = self.0.clone();

        if let Some(root_id) = self.root_block_id().map(str::to_owned) {
            if let Some(properties) = patched
                .get_mut("block")
                .and_then(|blocks| blocks.get_mut(&root_id))
                .and_then(|block| block.get_mut("value"))
                .and_then(|value| value.get_mut("properties"))
                .and_then(Value::as_object_mut)
            {
                properties.remove("title");
            }
        }

        Self(patched)
    }

    /// Enumerate image blocks whose source is a private attachment.
    ///
    /// Returns `(block id, attachment url)` pairs for every image block
    /// with a source starting with [`ATTACHMENT_SCHEME`].
    #[must_use]
    pub fn attachment_images(&self) -> Vec<(String, String)> {
        let Some(blocks) = self.0.get("block").and_then(Value::as_object) else {
            return Vec::new();
        };

        blocks
            .iter()
            .filter_map(|(block_id, entry)| {
                let value = entry.get("value")?;
                if value.get("type")?.as_str()? != "image" {
                    return None;
                }
                let source = image_source(value)?;
                source
                    .starts_with(ATTACHMENT_SCHEME)
                    .then(|| (block_id.clone(), source.to_owned()))
            })
            .collect()
    }

    /// Rewrite an image block's source in place.
    ///
    /// Missing blocks and non-image shapes are ignored — a signed URL for a
    /// block that disappeared from the payload is simply dropped.
    pub fn set_image_source(&mut self, block_id: &str, url: &str) {
        if let Some(slot) = self
            .0
            .get_mut("block")
            .and_then(|blocks| blocks.get_mut(block_id))
            .and_then(|block| block.get_mut("value"))
            .and_then(|value| value.get_mut("properties"))
            .and_then(|properties| properties.get_mut("source"))
            .and_then(|source| source.get_mut(0))
            .and_then(|run| run.get_mut(0))
        {
            *slot = Value::String(url.to_owned());
        }
    }
}

/// `properties.source[0][0]` of an image block.
fn image_source(value: &Value) -> Option<&str> {
    value
        .get("properties")?
        .get("source")?
        .get(0)?
        .get(0)?
        .as_str()
}

/// Concatenate string fragments nested up to `depth` arrays deep.
///
/// Matches the upstream title shape: text runs at shallow depth, formatting
/// annotations nested deeper (and therefore dropped).
fn collect_text(value: &Value, depth: u8, out: &mut String) {
    match value {
        Value::String(s) => out.push_str(s),
        Value::Array(items) if depth > 0 => {
            for item in items {
                collect_text(item, depth - 1, out);
            }
        }
        _ => {}
    }
}
