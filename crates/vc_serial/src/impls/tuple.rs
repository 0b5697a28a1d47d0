use alloc::boxed::Box;
use core::any::Any;

use crate::impls::GenericDeclaredTypeCell;
use crate::info::{DeclaredType, Shape, TupleShape, TypeFn, Typed};

macro_rules! impl_typed_tuple {
    ($($name:ident : $index:tt),+) => {
        impl<$($name: Typed),+> Typed for ($($name,)+) {
            fn declared_type() -> &'static DeclaredType {
                fn split<$($name: Typed),+>(value: &dyn Any) -> Option<Vec<&dyn Any>> {
                    let tuple = value.downcast_ref::<($($name,)+)>()?;
                    Some(vec![$(&tuple.$index as &dyn Any),+])
                }

                fn assemble<$($name: Typed),+>(elements: Vec<Box<dyn Any>>) -> Option<Box<dyn Any>> {
                    let mut elements = elements.into_iter();
                    let tuple: ($($name,)+) = ($(*elements.next()?.downcast::<$name>().ok()?,)+);
                    Some(Box::new(tuple))
                }

                static CELL: GenericDeclaredTypeCell = GenericDeclaredTypeCell::new();
                CELL.get_or_insert::<Self>(|| {
                    DeclaredType::new::<Self>(Shape::Tuple(TupleShape::new(
                        [$($name::declared_type as TypeFn),+],
                        split::<$($name),+>,
                        assemble::<$($name),+>,
                    )))
                })
            }
        }
    };
}

impl_typed_tuple!(A: 0);
impl_typed_tuple!(A: 0, B: 1);
impl_typed_tuple!(A: 0, B: 1, C: 2);
impl_typed_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_typed_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_typed_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_typed_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_typed_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);

#[cfg(test)]
mod tests {
    use core::any::Any;

    use crate::info::{Shape, Typed};

    #[test]
    fn split_and_assemble() {
        let Shape::Tuple(shape) = <(u8, String, bool)>::declared_type().shape() else {
            panic!("expected a tuple shape");
        };
        assert_eq!(shape.arity(), 3);
        assert!(shape.element(1).is_some_and(|ty| ty.is::<String>()));
        assert!(shape.element(3).is_none());

        let value = (1u8, "two".to_owned(), true);
        let parts = shape.split(&value).unwrap();
        assert_eq!(parts[1].downcast_ref::<String>().map(String::as_str), Some("two"));

        let elements: Vec<Box<dyn Any>> = vec![Box::new(9u8), Box::new(String::new()), Box::new(false)];
        let rebuilt = shape.assemble(elements).unwrap();
        assert_eq!(
            rebuilt.downcast_ref::<(u8, String, bool)>(),
            Some(&(9, String::new(), false))
        );

        let short: Vec<Box<dyn Any>> = vec![Box::new(9u8)];
        assert!(shape.assemble(short).is_none());
    }
}
