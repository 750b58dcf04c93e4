use crate::{LogError, Result};
use std::fmt;
use std::str::FromStr;

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum ElementKind {
    Int,
    UInt,
    Float,
    Complex,
    Bool,
}

impl ElementKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
            Self::Complex => "complex",
            Self::Bool => "bool",
        }
    }
}

/// The numeric kind and bit width of one array element.
///
/// On the wire this is a string such as `"int64"` or `"float32"`.
/// Parsing goes by kind prefix and width rather than by a closed table,
/// so a reader can still derive the byte width of a type it has no typed decoding for
/// (e.g. `"float16"`), and validate the array's length against its shape.
///
/// Numpy-style type strings (`"<i8"`, `">f4"`, `"|u1"`) are also accepted.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct ElementType {
    kind: ElementKind,
    bits: u16,
}

impl ElementType {
    pub const fn new(kind: ElementKind, bits: u16) -> Self {
        Self { kind, bits }
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn bits(&self) -> u16 {
        self.bits
    }

    pub fn byte_width(&self) -> usize {
        (self.bits / 8) as usize
    }

    /// Parses either a name (`"int64"`) or a numpy type string (`"<i8"`).
    /// The latter may embed a byte order, which is returned as a hint.
    pub fn parse(s: &str) -> Result<(Self, Option<ByteOrder>)> {
        let unsupported = || LogError::UnsupportedElementType(s.to_string());

        let mut chars = s.chars();
        let order_hint = match chars.next() {
            Some('<') => Some(Some(ByteOrder::Little)),
            Some('>') => Some(Some(ByteOrder::Big)),
            Some('=') => Some(Some(ByteOrder::native())),
            Some('|') => Some(None),
            _ => None,
        };
        if let Some(order_hint) = order_hint {
            let code = chars.next().ok_or_else(unsupported)?;
            let kind = match code {
                'i' => ElementKind::Int,
                'u' => ElementKind::UInt,
                'f' => ElementKind::Float,
                'c' => ElementKind::Complex,
                'b' => ElementKind::Bool,
                _ => return Err(unsupported()),
            };
            let bytes = chars.as_str().parse::<u16>().map_err(|_| unsupported())?;
            let bits = bytes.checked_mul(8).ok_or_else(unsupported)?;
            let elem_type = Self::validated(kind, bits).ok_or_else(unsupported)?;
            return Ok((elem_type, order_hint));
        }

        let elem_type = s.parse::<Self>()?;
        Ok((elem_type, None))
    }

    fn validated(kind: ElementKind, bits: u16) -> Option<Self> {
        let ok = match kind {
            ElementKind::Bool => bits == 8,
            ElementKind::Complex => bits >= 16 && bits % 16 == 0,
            _ => bits >= 8 && bits % 8 == 0,
        };
        ok.then_some(Self { kind, bits })
    }
}

impl FromStr for ElementType {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self> {
        let unsupported = || LogError::UnsupportedElementType(s.to_string());

        if s == "bool" {
            return Ok(Self::new(ElementKind::Bool, 8));
        }
        // "uint" before "int", since the former ends with the latter.
        let kinds = [
            ElementKind::UInt,
            ElementKind::Int,
            ElementKind::Float,
            ElementKind::Complex,
            ElementKind::Bool,
        ];
        for kind in kinds {
            if let Some(bits) = s.strip_prefix(kind.name()) {
                let bits = bits.parse::<u16>().map_err(|_| unsupported())?;
                return Self::validated(kind, bits).ok_or_else(unsupported);
            }
        }
        Err(unsupported())
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ElementKind::Bool => write!(f, "bool"),
            kind => write!(f, "{}{}", kind.name(), self.bits),
        }
    }
}

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Little => "little",
            Self::Big => "big",
        }
    }

    /// Byte order is meaningless for 1-byte elements;
    /// for those, `"|"` and `"not applicable"` are accepted and read as little-endian.
    pub fn parse_for_width(s: &str, byte_width: usize) -> Result<Self> {
        match s {
            "little" | "<" => Ok(Self::Little),
            "big" | ">" => Ok(Self::Big),
            "|" | "not applicable" if byte_width == 1 => Ok(Self::Little),
            _ => Err(LogError::UnsupportedByteOrder(s.to_string())),
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
