//! The ASN.1 BER/DER primitive codec (§4.2): reads and writes the wire
//! representation of each primitive type plus the constructed headers
//! (SEQUENCE, SET, explicit/implicit tags) they nest inside.
//!
//! Every function here takes a `tag: i32` argument (§4.2): `DEFAULT_TAG`
//! selects the type's natural universal tag, `NO_TAG` skips tag processing
//! (the content begins at the length field), and any other value is a
//! context-specific `[n] IMPLICIT` tag.

pub mod bitstring;
pub mod header;
pub mod integer;
pub mod length;
pub mod oid;
pub mod octet;
pub mod strings;
mod tagging;
pub mod time;

pub use bitstring::BitString;
pub use header::{
    peek_is_eoc, read_constructed, read_eoc, read_header, read_sequence, read_set, sizeof_object,
    write_constructed_header, write_header, write_sequence_header, write_set_header, ItemHeader,
};
pub use integer::{
    read_boolean, read_enumerated, read_integer, read_integer_bytes, read_null, read_short_integer,
    write_boolean, write_enumerated, write_integer, write_integer_bytes, write_null,
    write_short_integer,
};
pub use length::{read_length, write_length, Length};
pub use octet::{read_octet_string, write_octet_string};
pub use oid::{read_oid, write_oid, ObjectIdentifier};
pub use strings::{read_character_string, write_character_string};
pub use time::{read_generalized_time, read_utc_time, write_generalized_time, write_utc_time};
