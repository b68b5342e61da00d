// SPDX-License-Identifier: Apache-2.0

/// The kind of a document node.
///
/// `Array`, `Boolean`, `Null`, `Number`, `Object`, and `String` are the bare
/// JSON value kinds. `Pair` is a key/value entry suitable for inserting into
/// an `Object`. `Root` is the top-level container of a parsed stream and
/// behaves like an array for indexing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Array,
    Boolean,
    Null,
    Number,
    Object,
    Pair,
    Root,
    String,
}

impl Kind {
    /// The single-kind bitmask for this kind, usable in a [`KindSet`].
    pub const fn mask(self) -> KindSet {
        KindSet(match self {
            Kind::Array => 0x01,
            Kind::Boolean => 0x02,
            Kind::Null => 0x04,
            Kind::Number => 0x08,
            Kind::Object => 0x10,
            Kind::String => 0x20,
            Kind::Pair => 0x40,
            Kind::Root => 0x80,
        })
    }

    /// Short human-readable name, used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Array => "Array",
            Kind::Boolean => "Boolean",
            Kind::Null => "Null",
            Kind::Number => "Number",
            Kind::Object => "Object",
            Kind::Pair => "Pair",
            Kind::Root => "Root",
            Kind::String => "String",
        }
    }
}

impl core::fmt::Display for Kind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// A bitmask of node kinds, used to restrict which value kinds a root parse
/// accepts at the top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSet(u8);

impl KindSet {
    /// No kinds at all.
    pub const EMPTY: KindSet = KindSet(0);

    /// The kinds standard JSON permits as a bare top-level item:
    /// arrays and objects.
    pub const STANDARD: KindSet = KindSet(0x01 | 0x10);

    /// All six bare value kinds, permitting any JSON value at the top level.
    pub const EXTENDED: KindSet = KindSet(0x3F);

    /// Whether the set contains the given kind.
    pub const fn contains(self, kind: Kind) -> bool {
        self.0 & kind.mask().0 != 0
    }
}

impl core::ops::BitOr for KindSet {
    type Output = KindSet;

    fn bitor(self, rhs: KindSet) -> KindSet {
        KindSet(self.0 | rhs.0)
    }
}

impl From<Kind> for KindSet {
    fn from(kind: Kind) -> KindSet {
        kind.mask()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_values_are_distinct() {
        let kinds = [
            Kind::Array,
            Kind::Boolean,
            Kind::Null,
            Kind::Number,
            Kind::Object,
            Kind::Pair,
            Kind::Root,
            Kind::String,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert!(!a.mask().contains(*b), "{a} mask overlaps {b}");
            }
        }
    }

    #[test]
    fn test_standard_set() {
        assert!(KindSet::STANDARD.contains(Kind::Array));
        assert!(KindSet::STANDARD.contains(Kind::Object));
        assert!(!KindSet::STANDARD.contains(Kind::Number));
        assert!(!KindSet::STANDARD.contains(Kind::Root));
    }

    #[test]
    fn test_extended_set() {
        for kind in [
            Kind::Array,
            Kind::Boolean,
            Kind::Null,
            Kind::Number,
            Kind::Object,
            Kind::String,
        ] {
            assert!(KindSet::EXTENDED.contains(kind));
        }
        assert!(!KindSet::EXTENDED.contains(Kind::Pair));
        assert!(!KindSet::EXTENDED.contains(Kind::Root));
    }

    #[test]
    fn test_bitor() {
        let set = Kind::Number.mask() | Kind::String.mask();
        assert!(set.contains(Kind::Number));
        assert!(set.contains(Kind::String));
        assert!(!set.contains(Kind::Array));
    }
}
