use std::fmt;

/// One-byte type tag that prefixes every scalar and container boundary in
/// the tag stream.
///
/// Byte values are part of the persisted format and must never change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagType {
    /// Reserved; never written.
    Invalid = 0,
    /// 8-byte little-endian signed length, then that many UTF-8 bytes.
    String = 1,
    /// One byte, 0 or 1.
    Bool = 2,
    /// 8 bytes, IEEE-754 little-endian.
    Float64 = 3,
    ListStart = 4,
    ListEnd = 5,
    DocumentStart = 6,
    DocumentEnd = 7,
    /// No payload.
    Nil = 8,
}

impl TagType {
    /// The byte written to the stream for this tag.
    pub fn type_byte(self) -> u8 {
        self as u8
    }

    /// Parse a tag byte. The reserved `Invalid` value and unknown bytes
    /// yield `None`.
    pub fn from_type_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::String),
            2 => Some(Self::Bool),
            3 => Some(Self::Float64),
            4 => Some(Self::ListStart),
            5 => Some(Self::ListEnd),
            6 => Some(Self::DocumentStart),
            7 => Some(Self::DocumentEnd),
            8 => Some(Self::Nil),
            _ => None,
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Invalid => "Invalid",
            Self::String => "String",
            Self::Bool => "Bool",
            Self::Float64 => "Float64",
            Self::ListStart => "ListStart",
            Self::ListEnd => "ListEnd",
            Self::DocumentStart => "DocumentStart",
            Self::DocumentEnd => "DocumentEnd",
            Self::Nil => "Nil",
        };
        f.write_str(name)
    }
}
