//! [`Typed`] implementations for standard types, and the cells used to
//! implement it.
//!
//! - [`NonGenericDeclaredTypeCell`]: for non-generic types.
//! - [`GenericDeclaredTypeCell`]: for generic types.
//! - [`NonGenericRecordInfoCell`], [`GenericRecordInfoCell`]: for record field tables.
//! - [`impl_typed_scalar`]: describes leaf types.
//!
//! ## Implemented Menu
//!
//! - scalars: `()`, `bool`, `char`, `i8`-`i64`, `isize`, `u8`-`u64`, `usize`,
//!   `f32`, `f64`, `String`, `PathBuf`, `Duration`
//! - `Option<T>`
//! - sequences: `Vec<T>`, `VecDeque<T>`
//! - sets: `HashSet<T, S>`, `BTreeSet<T>`
//! - maps: `HashMap<K, V, S>`, `BTreeMap<K, V>`
//! - tuples with up to 8 elements
//! - "chrono" feature: `SystemTime`, `DateTime<Utc>`, `DateTime<FixedOffset>`,
//!   `NaiveDate`, `NaiveTime`, `NaiveDateTime`
//!
//! [`Typed`]: crate::info::Typed
//! [`impl_typed_scalar`]: crate::impl_typed_scalar

// -----------------------------------------------------------------------------
// Modules

mod cell;
mod collections;
mod scalar;
mod tuple;

// -----------------------------------------------------------------------------
// Exports

pub use cell::{GenericDeclaredTypeCell, GenericRecordInfoCell, GenericTypeCell};
pub use cell::{NonGenericDeclaredTypeCell, NonGenericRecordInfoCell, NonGenericTypeCell};
