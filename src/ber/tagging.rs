//! Shared tag-resolution logic for the primitive read/write functions
//! (§4.2): `DEFAULT_TAG` selects a type's natural tag, `NO_TAG` skips tag
//! processing entirely (the caller has already consumed or will itself write
//! the tag octet — used when a field is wrapped in its own implicit/explicit
//! context tag one level up), and any other value is a context-specific
//! `[n] IMPLICIT` tag.

use crate::tag::{Tag, DEFAULT_TAG, NO_TAG};

/// What a `write_T_tag`/`read_T_tag` call should do with the tag octet,
/// given the caller's `tag` argument and the type's natural universal tag.
pub enum TagPlan {
    /// Write/expect this tag.
    Use(Tag),
    /// Skip tag processing: the content starts at the length field.
    Skip,
}

pub fn plan(tag: i32, natural: Tag) -> TagPlan {
    if tag == NO_TAG {
        TagPlan::Skip
    } else if tag == DEFAULT_TAG {
        TagPlan::Use(natural)
    } else {
        TagPlan::Use(Tag::context(tag as u32, natural.constructed))
    }
}
