//! Tunable bounds on untrusted-input decoding (maximum integer length,
//! nesting depth, OID length). Exposed as a struct so an embedder parsing
//! untrusted input over a network connection can tighten them without
//! forking the crate (§3.8).

/// Bounds consulted by the primitive codec and the encoding validator.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Limits {
    /// Upper bound on a decoded definite length read by the default
    /// short-length reader (§3.3). 16 MiB by default.
    pub max_int_length: usize,
    /// Nesting depth at which the encoding validator refuses further
    /// recursion (§4.3, §5).
    pub max_nesting: usize,
    /// Upper bound on an OBJECT IDENTIFIER's encoded length (§4.2).
    pub max_oid_len: usize,
    /// Sanity floor below which a clock's `now()` is treated as broken
    /// (§4.5 step 3).
    pub min_time_value: i64,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_int_length: 16 * 1024 * 1024,
            max_nesting: 50,
            max_oid_len: 32,
            min_time_value: 0,
        }
    }
}
