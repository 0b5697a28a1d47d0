use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use crate::error::{ConfigurationError, ConstructError};
use crate::info::{DeclaredType, RecordInfo};
use crate::record::FieldValues;
use crate::value::Primitive;

/// Lazily resolves a [`DeclaredType`].
///
/// Shapes refer to their element types through these, so describing a
/// container never forces its elements to be described.
pub type TypeFn = fn() -> &'static DeclaredType;

/// The structure of a declared type, as far as conversion cares.
///
/// Every shape except [`Shape::Scalar`] carries monomorphized accessors that
/// take the value apart as `&dyn Any` and put it back together from
/// `Box<dyn Any>`. Converters use them to recurse without knowing the
/// concrete type.
#[derive(Debug)]
pub enum Shape {
    /// A leaf value, converted as a whole by a registered converter.
    Scalar,
    Optional(OptionalShape),
    /// An ordered, variable-length collection.
    Sequence(SequenceShape),
    /// An unordered collection without duplicates.
    Set(SequenceShape),
    /// A fixed-arity heterogeneous sequence.
    Tuple(TupleShape),
    Map(MapShape),
    Record(RecordShape),
    Enum(EnumShape),
}

impl Shape {
    /// A short name for diagnostics.
    pub const fn name(&self) -> &'static str {
        match self {
            Shape::Scalar => "scalar",
            Shape::Optional(_) => "optional",
            Shape::Sequence(_) => "sequence",
            Shape::Set(_) => "set",
            Shape::Tuple(_) => "tuple",
            Shape::Map(_) => "map",
            Shape::Record(_) => "record",
            Shape::Enum(_) => "enum",
        }
    }
}

// -----------------------------------------------------------------------------
// Optional

/// `Option<T>`-like types.
pub struct OptionalShape {
    inner: TypeFn,
    unwrap: fn(&dyn Any) -> Option<Option<&dyn Any>>,
    wrap: fn(Option<Box<dyn Any>>) -> Option<Box<dyn Any>>,
}

impl OptionalShape {
    /// `unwrap` returns `None` when the value has the wrong type and
    /// `Some(None)` for an absent value. `wrap` returns `None` when the
    /// boxed inner value has the wrong type.
    pub const fn new(
        inner: TypeFn,
        unwrap: fn(&dyn Any) -> Option<Option<&dyn Any>>,
        wrap: fn(Option<Box<dyn Any>>) -> Option<Box<dyn Any>>,
    ) -> Self {
        Self {
            inner,
            unwrap,
            wrap,
        }
    }

    #[inline]
    pub fn inner(&self) -> &'static DeclaredType {
        (self.inner)()
    }

    #[inline]
    pub fn unwrap<'a>(&self, value: &'a dyn Any) -> Option<Option<&'a dyn Any>> {
        (self.unwrap)(value)
    }

    #[inline]
    pub fn wrap(&self, inner: Option<Box<dyn Any>>) -> Option<Box<dyn Any>> {
        (self.wrap)(inner)
    }
}

impl fmt::Debug for OptionalShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionalShape")
            .field("inner", &self.inner().type_path())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Sequence & Set

/// Homogeneous collections, ordered or not.
pub struct SequenceShape {
    item: TypeFn,
    items: fn(&dyn Any) -> Option<Vec<&dyn Any>>,
    collect: fn(Vec<Box<dyn Any>>) -> Option<Box<dyn Any>>,
}

impl SequenceShape {
    pub const fn new(
        item: TypeFn,
        items: fn(&dyn Any) -> Option<Vec<&dyn Any>>,
        collect: fn(Vec<Box<dyn Any>>) -> Option<Box<dyn Any>>,
    ) -> Self {
        Self {
            item,
            items,
            collect,
        }
    }

    #[inline]
    pub fn item(&self) -> &'static DeclaredType {
        (self.item)()
    }

    /// Borrows every element, or `None` if `value` is not this collection.
    #[inline]
    pub fn items<'a>(&self, value: &'a dyn Any) -> Option<Vec<&'a dyn Any>> {
        (self.items)(value)
    }

    /// Builds the collection, or `None` if an element has the wrong type.
    #[inline]
    pub fn collect(&self, items: Vec<Box<dyn Any>>) -> Option<Box<dyn Any>> {
        (self.collect)(items)
    }
}

impl fmt::Debug for SequenceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceShape")
            .field("item", &self.item().type_path())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tuple

pub struct TupleShape {
    elements: Box<[TypeFn]>,
    split: fn(&dyn Any) -> Option<Vec<&dyn Any>>,
    assemble: fn(Vec<Box<dyn Any>>) -> Option<Box<dyn Any>>,
}

impl TupleShape {
    pub fn new(
        elements: impl Into<Box<[TypeFn]>>,
        split: fn(&dyn Any) -> Option<Vec<&dyn Any>>,
        assemble: fn(Vec<Box<dyn Any>>) -> Option<Box<dyn Any>>,
    ) -> Self {
        Self {
            elements: elements.into(),
            split,
            assemble,
        }
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn element(&self, index: usize) -> Option<&'static DeclaredType> {
        self.elements.get(index).map(|ty| ty())
    }

    #[inline]
    pub fn split<'a>(&self, value: &'a dyn Any) -> Option<Vec<&'a dyn Any>> {
        (self.split)(value)
    }

    /// Builds the tuple from exactly [`TupleShape::arity`] elements.
    #[inline]
    pub fn assemble(&self, elements: Vec<Box<dyn Any>>) -> Option<Box<dyn Any>> {
        if elements.len() != self.arity() {
            return None;
        }
        (self.assemble)(elements)
    }
}

impl fmt::Debug for TupleShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.elements.iter().map(|ty| ty().type_path()))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Map

pub struct MapShape {
    key: TypeFn,
    value: TypeFn,
    entries: fn(&dyn Any) -> Option<Vec<(&dyn Any, &dyn Any)>>,
    collect: fn(Vec<(Box<dyn Any>, Box<dyn Any>)>) -> Option<Box<dyn Any>>,
}

impl MapShape {
    pub const fn new(
        key: TypeFn,
        value: TypeFn,
        entries: fn(&dyn Any) -> Option<Vec<(&dyn Any, &dyn Any)>>,
        collect: fn(Vec<(Box<dyn Any>, Box<dyn Any>)>) -> Option<Box<dyn Any>>,
    ) -> Self {
        Self {
            key,
            value,
            entries,
            collect,
        }
    }

    #[inline]
    pub fn key(&self) -> &'static DeclaredType {
        (self.key)()
    }

    #[inline]
    pub fn value(&self) -> &'static DeclaredType {
        (self.value)()
    }

    #[inline]
    pub fn entries<'a>(&self, value: &'a dyn Any) -> Option<Vec<(&'a dyn Any, &'a dyn Any)>> {
        (self.entries)(value)
    }

    #[inline]
    pub fn collect(&self, entries: Vec<(Box<dyn Any>, Box<dyn Any>)>) -> Option<Box<dyn Any>> {
        (self.collect)(entries)
    }
}

impl fmt::Debug for MapShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapShape")
            .field("key", &self.key().type_path())
            .field("value", &self.value().type_path())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Record

/// Types implementing [`Record`](crate::record::Record).
///
/// The walker recurses into these itself, they never reach the registry.
pub struct RecordShape {
    info: fn() -> Result<&'static RecordInfo, ConfigurationError>,
    field: for<'a> fn(&'a dyn Any, &str) -> Option<&'a dyn Any>,
    construct: fn(FieldValues) -> Result<Box<dyn Any>, ConstructError>,
}

impl RecordShape {
    pub const fn new(
        info: fn() -> Result<&'static RecordInfo, ConfigurationError>,
        field: for<'a> fn(&'a dyn Any, &str) -> Option<&'a dyn Any>,
        construct: fn(FieldValues) -> Result<Box<dyn Any>, ConstructError>,
    ) -> Self {
        Self {
            info,
            field,
            construct,
        }
    }

    #[inline]
    pub fn info(&self) -> Result<&'static RecordInfo, ConfigurationError> {
        (self.info)()
    }

    #[inline]
    pub fn field<'a>(&self, record: &'a dyn Any, name: &str) -> Option<&'a dyn Any> {
        (self.field)(record, name)
    }

    #[inline]
    pub fn construct(&self, values: FieldValues) -> Result<Box<dyn Any>, ConstructError> {
        (self.construct)(values)
    }
}

impl fmt::Debug for RecordShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordShape").finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Enum

/// One member of an enumeration and the primitive it is stored as.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    name: &'static str,
    value: Primitive,
}

impl EnumMember {
    #[inline]
    pub fn new(name: &'static str, value: impl Into<Primitive>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn value(&self) -> &Primitive {
        &self.value
    }
}

/// Types implementing [`Enumeration`](crate::record::Enumeration).
pub struct EnumShape {
    members: Box<[EnumMember]>,
    conflict: Option<ConfigurationError>,
    index_of: fn(&dyn Any) -> Option<usize>,
    member_at: fn(usize) -> Option<Box<dyn Any>>,
}

impl EnumShape {
    /// Two members stored as equal primitives make the shape unusable,
    /// see [`EnumShape::check`].
    pub fn new(
        members: impl Into<Box<[EnumMember]>>,
        index_of: fn(&dyn Any) -> Option<usize>,
        member_at: fn(usize) -> Option<Box<dyn Any>>,
    ) -> Self {
        let members = members.into();
        let conflict = find_conflict(&members);
        Self {
            members,
            conflict,
            index_of,
            member_at,
        }
    }

    #[inline]
    pub fn members(&self) -> &[EnumMember] {
        &self.members
    }

    /// Fails if two members share a stored value, since the primitive
    /// could not tell them apart.
    pub fn check(&self) -> Result<(), ConfigurationError> {
        match &self.conflict {
            Some(conflict) => Err(conflict.clone()),
            None => Ok(()),
        }
    }

    /// The member `value` is, or `None` if `value` is not this enumeration.
    pub fn member_of(&self, value: &dyn Any) -> Option<&EnumMember> {
        self.members.get((self.index_of)(value)?)
    }

    /// Finds the member stored as `primitive` and instantiates it.
    pub fn instantiate(&self, primitive: &Primitive) -> Option<Box<dyn Any>> {
        let index = self.members.iter().position(|m| m.value == *primitive)?;
        (self.member_at)(index)
    }
}

fn find_conflict(members: &[EnumMember]) -> Option<ConfigurationError> {
    members.iter().enumerate().find_map(|(index, member)| {
        members[..index]
            .iter()
            .find(|other| other.value == member.value)
            .map(|other| ConfigurationError::DuplicateMember {
                member: member.name,
                other: other.name,
                value: member.value.to_string(),
            })
    })
}

impl fmt::Debug for EnumShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.members.iter().map(EnumMember::name))
            .finish()
    }
}
