#![deny(unsafe_code)]

//! Data model for TL schema compilation.
//!
//! This crate defines the types every other crate in the workspace speaks:
//! definitions as parsed from schema text, the wire-type grammar, the
//! resolved form the binding emitter consumes, and the lookup tables built
//! for runtime dispatch. It performs no I/O and no generation.
//!
//! # Design Philosophy
//!
//! The wire-type grammar is parsed exactly once, at the schema boundary
//! (`tl-parse`), into [`TypeExpr`]. Everything downstream operates on the
//! validated form and never re-slices raw token strings. The verbatim token
//! is still carried alongside ([`RawParam::raw_type`]) because the runtime
//! descriptors reproduce it character for character.
//!
//! Field order is load-bearing throughout: the wire encoding is positional,
//! so every ordered collection here preserves schema encounter order, and
//! the two lookup tables ([`GroupTable`], [`Registry`]) iterate in insertion
//! order. Compiling the same schema twice yields identical artifacts.

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;

/// 32-bit identifier stamped on every constructor and function.
///
/// The canonical textual form is the big-endian byte representation rendered
/// as uppercase hexadecimal with a `0x` prefix, zero-padded to 4 bytes
/// (`0x7B197DC8`). This matches the wire format's tag encoding and is
/// identical on every host, regardless of native integer endianness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Tag(pub u32);

impl Tag {
    /// Create a new tag.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw u32 value.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether this tag is on the builtin denylist ([`SKIP_TAGS`]).
    pub fn is_skipped(self) -> bool {
        SKIP_TAGS.contains(&self)
    }
}

impl From<u32> for Tag {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<Tag> for u32 {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Tags skipped entirely during generation.
///
/// These identify the builtin vector/bool constructors whose encoding every
/// peer hard-wires. The list is preserved verbatim from the reference
/// schema; membership is data, not a rule.
pub const SKIP_TAGS: [Tag; 3] = [Tag(0x1CB5C415), Tag(0xBC799737), Tag(0x997275B5)];

/// A schema name, possibly namespace-qualified (`ns.member`).
///
/// The source schemas use at most one level of namespacing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub namespace: Option<String>,
    pub member: String,
}

impl QualifiedName {
    /// Split a raw dotted name.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('.') {
            Some((ns, member)) => Self {
                namespace: Some(ns.to_string()),
                member: member.to_string(),
            },
            None => Self {
                namespace: None,
                member: raw.to_string(),
            },
        }
    }

    /// The dotted schema-side rendering (`ns.member`).
    pub fn canonical(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}.{}", self.member),
            None => self.member.clone(),
        }
    }

    /// The flat binding-side rendering: `ns.member` becomes `ns_member`,
    /// and the reserved literal `true` escapes to `true_`.
    ///
    /// Every alias a target emits is derived from this rendering; nothing
    /// re-derives it independently.
    pub fn flat(&self) -> String {
        let member = escape_reserved(&self.member);
        match &self.namespace {
            Some(ns) => format!("{ns}_{member}"),
            None => member.into_owned(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns}.{}", self.member),
            None => write!(f, "{}", self.member),
        }
    }
}

fn escape_reserved(member: &str) -> Cow<'_, str> {
    if member == "true" {
        Cow::Owned("true_".to_string())
    } else {
        Cow::Borrowed(member)
    }
}

/// The scalar keywords of the wire-type grammar.
///
/// `Long`, `Int128` and `Int256` must land on 64-bit-capable (or wider)
/// representations in every target; a double-precision float is never an
/// acceptable carrier for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// 32-bit integer (`int`), also the wire carrier of bitmask fields.
    Int,
    /// 64-bit integer (`long`).
    Long,
    /// Boxed boolean (`Bool`).
    Bool,
    /// Double-precision float (`double`).
    Double,
    /// The fixed literal `true`: a flag whose presence is the value.
    True,
    /// UTF-8 string (`string`).
    String,
    /// Opaque byte buffer (`bytes`).
    Bytes,
    /// 128-bit integer (`int128`).
    Int128,
    /// 256-bit integer (`int256`).
    Int256,
}

impl ScalarKind {
    /// Case-insensitive lookup of the nine scalar keywords.
    pub fn from_keyword(token: &str) -> Option<Self> {
        let token = token.to_ascii_lowercase();
        Some(match token.as_str() {
            "int" => Self::Int,
            "long" => Self::Long,
            "bool" => Self::Bool,
            "double" => Self::Double,
            "true" => Self::True,
            "string" => Self::String,
            "bytes" => Self::Bytes,
            "int128" => Self::Int128,
            "int256" => Self::Int256,
            _ => return None,
        })
    }
}

/// A wire-type token, parsed once at the schema boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// The synthetic `#` bitmask declaration (`flags:#`).
    BitmaskMarker,
    /// `flags.N?T`: presence gated by bit `bit` of bitmask field `field`.
    Flagged {
        field: String,
        bit: u32,
        inner: Box<TypeExpr>,
    },
    /// `vector<T>` / `Vector<T>`. The grammar permits a single level.
    Vector(Box<TypeExpr>),
    /// One of the nine scalar keywords.
    Scalar(ScalarKind),
    /// `!X`: the type bound at the generic function's call site.
    GenericArg,
    /// Bare `X`: a generic function's declared result.
    GenericResult,
    /// A named type. `bare` marks the `%`-prefixed pinned-shape form.
    Named {
        namespace: Option<String>,
        name: String,
        bare: bool,
    },
}

impl TypeExpr {
    /// Whether this is the synthetic bitmask declaration.
    pub fn is_bitmask_marker(&self) -> bool {
        matches!(self, Self::BitmaskMarker)
    }
}

/// What a definition line declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    /// Builds a value of the declared result type.
    Constructor,
    /// A callable request carrying a declared (possibly generic) result.
    Function,
}

/// One parameter of a raw definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParam {
    pub name: String,
    /// Verbatim schema token, reproduced in descriptors.
    pub raw_type: String,
    /// The validated grammar form all downstream passes consume.
    pub ty: TypeExpr,
}

/// One line of the schema: a tagged constructor or function definition.
///
/// Immutable once parsed. Uniquely identified by tag, except for the
/// [`SKIP_TAGS`] denylist which is excluded before shapes are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDefinition {
    pub kind: DefinitionKind,
    pub tag: Tag,
    pub name: QualifiedName,
    pub params: Vec<RawParam>,
    /// Declared result type, verbatim.
    pub result_type: String,
    /// Whether the line carried a `{X:Type}` generic binder.
    pub generic_binder: bool,
}

impl RawDefinition {
    /// A definition is generic if it binds a type parameter or takes one.
    pub fn is_generic(&self) -> bool {
        self.generic_binder || self.params.iter().any(|p| matches!(p.ty, TypeExpr::GenericArg))
    }
}

/// How a named-type reference reads in the generated bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefStyle {
    /// Reference the sum type over every constructor of the result type.
    Abstract,
    /// Reference one pinned constructor shape.
    Concrete,
}

/// A fully resolved type, ready for rendering by a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Scalar(ScalarKind),
    /// `!X`: rendered as the binding's type parameter.
    TypeParam,
    /// Bare `X`: rendered as the type parameter's bound result slot.
    TypeParamResult,
    Named {
        name: QualifiedName,
        reference: RefStyle,
    },
    Vector(Box<ResolvedType>),
}

impl ResolvedType {
    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Vector(_))
    }
}

/// Whether a field is always present or gated by a bitmask bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    Required,
    /// Present iff bit `bit` of the named bitmask field is set.
    Flagged { field: String, bit: u32 },
}

impl Presence {
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Flagged { .. })
    }
}

/// A resolved, emitted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub name: String,
    pub ty: ResolvedType,
    pub presence: Presence,
}

/// One row of the declared-shape descriptor.
///
/// Bitmask fields appear here (resolved as the 32-bit integer they occupy
/// on the wire) even though they are dropped from [`Shape::fields`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorEntry {
    pub name: String,
    pub ty: ResolvedType,
    /// The schema token, verbatim.
    pub raw: String,
}

/// The per-definition artifact every emitter pass consumes.
///
/// Field order is schema order, exactly: the wire encoding is positional
/// and order-significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub tag: Tag,
    pub kind: DefinitionKind,
    pub name: QualifiedName,
    /// Declared result type, verbatim; the group key.
    pub result_type: String,
    pub is_generic: bool,
    /// Every emitted field is optional (vacuously true for zero fields).
    /// Switches the generated constructor procedure's aggregate parameter
    /// from required to optional; the wire layout is unaffected.
    pub all_optional: bool,
    /// Emitted fields, bitmask declarations dropped.
    pub fields: Vec<ResolvedField>,
    /// Declared-shape descriptor over all params, bitmask entries included.
    pub descriptor: Vec<DescriptorEntry>,
    /// Resolved return type; `None` for constructors.
    pub return_type: Option<ResolvedType>,
}

/// Constructors sharing one declared result type, in encounter order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// The declared result type, verbatim.
    pub name: String,
    /// Canonical member names, insertion order preserved.
    pub members: Vec<String>,
}

/// Result-type → group, insertion-ordered.
///
/// Membership is determined solely by declared result-type string equality
/// (namespace-qualified comparison); it is never inferred from field
/// structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupTable {
    groups: IndexMap<String, Group>,
}

impl GroupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member to the result type's group, creating it on first
    /// sight.
    pub fn add_member(&mut self, result_type: &str, member: &str) {
        self.groups
            .entry(result_type.to_string())
            .or_insert_with(|| Group {
                name: result_type.to_string(),
                members: Vec::new(),
            })
            .members
            .push(member.to_string());
    }

    pub fn get(&self, result_type: &str) -> Option<&Group> {
        self.groups.get(result_type)
    }

    /// The single member of a one-constructor group.
    ///
    /// Function return types collapse through this to the concrete shape;
    /// multi-member groups stay abstract.
    pub fn sole_member(&self, result_type: &str) -> Option<&str> {
        match self.groups.get(result_type) {
            Some(group) if group.members.len() == 1 => Some(&group.members[0]),
            _ => None,
        }
    }

    /// Groups in encounter order.
    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Runtime dispatch tables.
///
/// `tag → shape` covers constructors only (decode dispatch); `name → shape`
/// covers constructors and functions (programmatic lookup). Values index
/// into the compilation's shape list. Both tables iterate in insertion
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    by_tag: IndexMap<u32, usize>,
    by_name: IndexMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false (and leaves the table unchanged) on a duplicate tag.
    pub fn insert_tag(&mut self, tag: Tag, index: usize) -> bool {
        if self.by_tag.contains_key(&tag.raw()) {
            return false;
        }
        self.by_tag.insert(tag.raw(), index);
        true
    }

    /// Returns false (and leaves the table unchanged) on a duplicate name.
    pub fn insert_name(&mut self, name: String, index: usize) -> bool {
        if self.by_name.contains_key(&name) {
            return false;
        }
        self.by_name.insert(name, index);
        true
    }

    pub fn index_by_tag(&self, tag: Tag) -> Option<usize> {
        self.by_tag.get(&tag.raw()).copied()
    }

    pub fn index_by_name(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Constructor tags in insertion order.
    pub fn tags(&self) -> impl Iterator<Item = (Tag, usize)> + '_ {
        self.by_tag.iter().map(|(raw, index)| (Tag(*raw), *index))
    }

    /// Canonical names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = (&str, usize)> {
        self.by_name.iter().map(|(name, index)| (name.as_str(), *index))
    }

    pub fn tag_count(&self) -> usize {
        self.by_tag.len()
    }

    pub fn name_count(&self) -> usize {
        self.by_name.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod tags {
        use super::*;

        #[test]
        fn canonical_form_is_uppercase_padded_hex() {
            assert_eq!(Tag(0x7B197DC8).to_string(), "0x7B197DC8");
            assert_eq!(Tag(0xABCDEF01).to_string(), "0xABCDEF01");
        }

        #[test]
        fn canonical_form_pads_to_four_bytes() {
            assert_eq!(Tag(0x1).to_string(), "0x00000001");
            assert_eq!(Tag(0xBEEF).to_string(), "0x0000BEEF");
        }

        #[test]
        fn denylist_is_exactly_the_three_builtins() {
            assert!(Tag(0x1CB5C415).is_skipped());
            assert!(Tag(0xBC799737).is_skipped());
            assert!(Tag(0x997275B5).is_skipped());
            assert!(!Tag(0x7B197DC8).is_skipped());
        }
    }

    mod names {
        use super::*;

        #[test]
        fn unqualified() {
            let name = QualifiedName::parse("msg");
            assert_eq!(name.namespace, None);
            assert_eq!(name.canonical(), "msg");
            assert_eq!(name.flat(), "msg");
        }

        #[test]
        fn namespace_qualified() {
            let name = QualifiedName::parse("messages.sendMessage");
            assert_eq!(name.namespace.as_deref(), Some("messages"));
            assert_eq!(name.member, "sendMessage");
            assert_eq!(name.canonical(), "messages.sendMessage");
            assert_eq!(name.flat(), "messages_sendMessage");
        }

        #[test]
        fn reserved_literal_escapes_in_flat_form_only() {
            let name = QualifiedName::parse("true");
            assert_eq!(name.canonical(), "true");
            assert_eq!(name.flat(), "true_");
        }
    }

    mod scalars {
        use super::*;

        #[test]
        fn keyword_lookup_is_case_insensitive() {
            assert_eq!(ScalarKind::from_keyword("int"), Some(ScalarKind::Int));
            assert_eq!(ScalarKind::from_keyword("Bool"), Some(ScalarKind::Bool));
            assert_eq!(ScalarKind::from_keyword("INT128"), Some(ScalarKind::Int128));
        }

        #[test]
        fn named_types_are_not_keywords() {
            assert_eq!(ScalarKind::from_keyword("Message"), None);
            assert_eq!(ScalarKind::from_keyword("X"), None);
        }
    }

    mod groups {
        use super::*;

        #[test]
        fn members_keep_encounter_order() {
            let mut table = GroupTable::new();
            table.add_member("Message", "messageEmpty");
            table.add_member("Peer", "peerUser");
            table.add_member("Message", "message");

            let groups: Vec<_> = table.iter().collect();
            assert_eq!(groups.len(), 2);
            assert_eq!(groups[0].name, "Message");
            assert_eq!(groups[0].members, vec!["messageEmpty", "message"]);
            assert_eq!(groups[1].name, "Peer");
        }

        #[test]
        fn sole_member_only_for_singleton_groups() {
            let mut table = GroupTable::new();
            table.add_member("Config", "config");
            table.add_member("Peer", "peerUser");
            table.add_member("Peer", "peerChat");

            assert_eq!(table.sole_member("Config"), Some("config"));
            assert_eq!(table.sole_member("Peer"), None);
            assert_eq!(table.sole_member("Missing"), None);
        }
    }

    mod registry {
        use super::*;

        #[test]
        fn duplicate_tags_are_rejected() {
            let mut registry = Registry::new();
            assert!(registry.insert_tag(Tag(0xABCDEF01), 0));
            assert!(!registry.insert_tag(Tag(0xABCDEF01), 1));
            assert_eq!(registry.index_by_tag(Tag(0xABCDEF01)), Some(0));
        }

        #[test]
        fn duplicate_names_are_rejected() {
            let mut registry = Registry::new();
            assert!(registry.insert_name("msg".into(), 0));
            assert!(!registry.insert_name("msg".into(), 1));
            assert_eq!(registry.index_by_name("msg"), Some(0));
        }

        #[test]
        fn iteration_is_insertion_ordered() {
            let mut registry = Registry::new();
            registry.insert_tag(Tag(3), 0);
            registry.insert_tag(Tag(1), 1);
            registry.insert_tag(Tag(2), 2);
            let tags: Vec<u32> = registry.tags().map(|(t, _)| t.raw()).collect();
            assert_eq!(tags, vec![3, 1, 2]);
        }
    }
}
