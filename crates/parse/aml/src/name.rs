//! AML name segments and textual path conversion.
//!
//! ACPI names are sequences of 4-byte segments. A textual path such as
//! `\_SB.PCI0` is converted into a [`NamePath`]: the leading root/parent
//! markers are kept verbatim and the dotted segments are padded with `_` and
//! concatenated into the namestring form the namespace store compares against.

use alloc::vec::Vec;

/// Root scope marker (`\`).
pub const ROOT_CHAR: u8 = b'\\';
/// Parent scope marker (`^`).
pub const PARENT_PREFIX_CHAR: u8 = b'^';
/// Segment separator in textual paths.
const SEPARATOR: u8 = b'.';
/// Padding used to fill short segments.
const PAD: u8 = b'_';

/// A 4-byte AML name segment (e.g., `_SB_`, `PCI0`, `_HID`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NameSeg(pub [u8; 4]);

impl NameSeg {
    /// The name of the namespace root.
    pub const ROOT: Self = Self(*b"\\___");

    /// Create a `NameSeg` from a 4-byte slice.
    ///
    /// Returns `None` if the slice is shorter than 4 bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let seg: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
        Some(Self(seg))
    }

    /// Returns the name as a UTF-8 string (ACPI names are always ASCII).
    #[must_use]
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.0).unwrap_or("")
    }
}

impl core::fmt::Debug for NameSeg {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NameSeg(\"{}\")", self.as_str())
    }
}

impl core::fmt::Display for NameSeg {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A converted namespace path: scope markers plus the encoded namestring.
///
/// Produced by [`NamePath::convert`] and consumed within a single resolution
/// call; it is never stored in the namespace.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NamePath {
    /// Leading `\` and `^` markers, in the order they appeared.
    pub prefix: Vec<u8>,
    /// Concatenated, `_`-padded 4-byte segments without separators.
    pub value: Vec<u8>,
}

impl NamePath {
    /// Prefix marker meaning "relative to the starting scope, no search".
    ///
    /// An empty prefix tells the store the caller did not anchor the path at
    /// all, in which case single-segment names follow the search rules.
    pub const RELATIVE_MARKER: u8 = b'x';

    /// Converts a textual ACPI path into namestring form.
    ///
    /// Malformed input is not rejected: it produces a structurally valid
    /// encoding that simply will not match anything sensible.
    #[must_use]
    pub fn convert(path: &str) -> Self {
        let bytes = path.as_bytes();
        let split = bytes
            .iter()
            .position(|&b| b != ROOT_CHAR && b != PARENT_PREFIX_CHAR)
            .unwrap_or(bytes.len());
        let (prefix, rest) = bytes.split_at(split);

        let mut value = Vec::with_capacity(rest.len() + 4);
        for &b in rest {
            if b == SEPARATOR {
                pad_segment(&mut value);
            } else {
                value.push(b);
            }
        }
        pad_segment(&mut value);

        Self {
            prefix: prefix.to_vec(),
            value,
        }
    }

    /// Returns the encoded value split into name segments.
    pub fn segments(&self) -> impl Iterator<Item = NameSeg> + '_ {
        self.value.chunks_exact(4).filter_map(NameSeg::from_bytes)
    }

    /// Returns `true` if the path carries no root, parent or anchor marker.
    #[must_use]
    pub fn is_unanchored(&self) -> bool {
        self.prefix.is_empty()
    }
}

/// Pads the trailing segment of `value` with `_` up to a 4-byte boundary.
fn pad_segment(value: &mut Vec<u8>) {
    while value.len() % 4 != 0 {
        value.push(PAD);
    }
}
