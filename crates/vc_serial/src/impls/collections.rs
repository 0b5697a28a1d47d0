use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use core::any::Any;
use core::hash::{BuildHasher, Hash};
use std::collections::{HashMap, HashSet};

use crate::impls::GenericDeclaredTypeCell;
use crate::info::{DeclaredType, MapShape, OptionalShape, SequenceShape, Shape, Typed};

// -----------------------------------------------------------------------------
// Accessors

fn option_unwrap<T: Typed>(value: &dyn Any) -> Option<Option<&dyn Any>> {
    let option = value.downcast_ref::<Option<T>>()?;
    Some(option.as_ref().map(|inner| inner as &dyn Any))
}

fn option_wrap<T: Typed>(inner: Option<Box<dyn Any>>) -> Option<Box<dyn Any>> {
    let option = match inner {
        Some(inner) => Some(*inner.downcast::<T>().ok()?),
        None => None,
    };
    Some(Box::new(option))
}

fn iter_items<C, T>(value: &dyn Any) -> Option<Vec<&dyn Any>>
where
    C: Any,
    T: Any,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    let collection = value.downcast_ref::<C>()?;
    Some(collection.into_iter().map(|item| item as &dyn Any).collect())
}

fn collect_items<C, T>(items: Vec<Box<dyn Any>>) -> Option<Box<dyn Any>>
where
    C: FromIterator<T> + Any,
    T: Any,
{
    let mut values = Vec::with_capacity(items.len());
    for item in items {
        values.push(*item.downcast::<T>().ok()?);
    }
    Some(Box::new(values.into_iter().collect::<C>()))
}

fn map_entries<C, K, V>(value: &dyn Any) -> Option<Vec<(&dyn Any, &dyn Any)>>
where
    C: Any,
    K: Any,
    V: Any,
    for<'a> &'a C: IntoIterator<Item = (&'a K, &'a V)>,
{
    let map = value.downcast_ref::<C>()?;
    Some(
        map.into_iter()
            .map(|(key, value)| (key as &dyn Any, value as &dyn Any))
            .collect(),
    )
}

fn collect_entries<C, K, V>(entries: Vec<(Box<dyn Any>, Box<dyn Any>)>) -> Option<Box<dyn Any>>
where
    C: FromIterator<(K, V)> + Any,
    K: Any,
    V: Any,
{
    let mut pairs = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        pairs.push((*key.downcast::<K>().ok()?, *value.downcast::<V>().ok()?));
    }
    Some(Box::new(pairs.into_iter().collect::<C>()))
}

// -----------------------------------------------------------------------------
// Option

impl<T: Typed> Typed for Option<T> {
    fn declared_type() -> &'static DeclaredType {
        static CELL: GenericDeclaredTypeCell = GenericDeclaredTypeCell::new();
        CELL.get_or_insert::<Self>(|| {
            DeclaredType::new::<Self>(Shape::Optional(OptionalShape::new(
                T::declared_type,
                option_unwrap::<T>,
                option_wrap::<T>,
            )))
        })
    }
}

// -----------------------------------------------------------------------------
// Sequences and sets

macro_rules! impl_typed_sequence {
    ($shape:ident, $ty:ty, <$($param:ident),*> $(where $($bound:tt)*)?) => {
        impl<$($param),*> Typed for $ty
        where
            T: Typed,
            $($($bound)*)?
        {
            fn declared_type() -> &'static DeclaredType {
                static CELL: GenericDeclaredTypeCell = GenericDeclaredTypeCell::new();
                CELL.get_or_insert::<Self>(|| {
                    DeclaredType::new::<Self>(Shape::$shape(SequenceShape::new(
                        T::declared_type,
                        iter_items::<Self, T>,
                        collect_items::<Self, T>,
                    )))
                })
            }
        }
    };
}

impl_typed_sequence!(Sequence, Vec<T>, <T>);
impl_typed_sequence!(Sequence, VecDeque<T>, <T>);
impl_typed_sequence!(Set, BTreeSet<T>, <T> where T: Ord,);
impl_typed_sequence!(Set, HashSet<T, S>, <T, S> where T: Eq + Hash, S: BuildHasher + Default + 'static,);

// -----------------------------------------------------------------------------
// Maps

macro_rules! impl_typed_map {
    ($ty:ty, <$($param:ident),*> where $($bound:tt)*) => {
        impl<$($param),*> Typed for $ty
        where
            K: Typed,
            V: Typed,
            $($bound)*
        {
            fn declared_type() -> &'static DeclaredType {
                static CELL: GenericDeclaredTypeCell = GenericDeclaredTypeCell::new();
                CELL.get_or_insert::<Self>(|| {
                    DeclaredType::new::<Self>(Shape::Map(MapShape::new(
                        K::declared_type,
                        V::declared_type,
                        map_entries::<Self, K, V>,
                        collect_entries::<Self, K, V>,
                    )))
                })
            }
        }
    };
}

impl_typed_map!(BTreeMap<K, V>, <K, V> where K: Ord,);
impl_typed_map!(HashMap<K, V, S>, <K, V, S> where K: Eq + Hash, S: BuildHasher + Default + 'static,);

#[cfg(test)]
mod tests {
    use core::any::Any;
    use std::collections::{BTreeMap, HashSet};

    use crate::info::{Shape, Typed};

    fn boxed<T: Any>(value: T) -> Box<dyn Any> {
        Box::new(value)
    }

    #[test]
    fn sequence_accessors() {
        let ty = <Vec<u16>>::declared_type();
        let Shape::Sequence(shape) = ty.shape() else {
            panic!("expected a sequence shape");
        };
        assert!(shape.item().is::<u16>());

        let value = vec![1u16, 2, 3];
        let items = shape.items(&value).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].downcast_ref::<u16>(), Some(&3));

        let rebuilt = shape
            .collect(vec![boxed(7u16), boxed(8u16)])
            .unwrap();
        assert_eq!(rebuilt.downcast_ref::<Vec<u16>>(), Some(&vec![7, 8]));

        assert!(shape.items(&"not a vec").is_none());
        assert!(shape.collect(vec![boxed("wrong")]).is_none());
    }

    #[test]
    fn set_collect_deduplicates() {
        let Shape::Set(shape) = <HashSet<i32>>::declared_type().shape() else {
            panic!("expected a set shape");
        };
        let rebuilt = shape
            .collect(vec![boxed(1), boxed(1), boxed(2)])
            .unwrap();
        assert_eq!(rebuilt.downcast_ref::<HashSet<i32>>().map(HashSet::len), Some(2));
    }

    #[test]
    fn map_and_option_accessors() {
        let Shape::Map(shape) = <BTreeMap<String, bool>>::declared_type().shape() else {
            panic!("expected a map shape");
        };
        let map = BTreeMap::from([("a".to_owned(), true)]);
        let entries = shape.entries(&map).unwrap();
        assert_eq!(entries[0].0.downcast_ref::<String>().map(String::as_str), Some("a"));

        let Shape::Optional(shape) = <Option<u8>>::declared_type().shape() else {
            panic!("expected an optional shape");
        };
        assert_eq!(shape.unwrap(&None::<u8>).map(|inner| inner.is_none()), Some(true));
        let wrapped = shape.wrap(Some(boxed(4u8))).unwrap();
        assert_eq!(wrapped.downcast_ref::<Option<u8>>(), Some(&Some(4)));
    }
}
