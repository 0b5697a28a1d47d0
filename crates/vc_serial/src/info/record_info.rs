use alloc::boxed::Box;
use core::any::Any;

use foldhash::fast::FixedState;
use hashbrown::HashMap;

use crate::error::ConfigurationError;
use crate::info::FieldInfo;

/// The ordered field table of a record type.
///
/// Built once per type and shared for the life of the process.
#[derive(Debug, Clone)]
pub struct RecordInfo {
    type_path: &'static str,
    fields: Box<[FieldInfo]>,
    by_name: HashMap<&'static str, usize, FixedState>,
    by_key: HashMap<String, usize, FixedState>,
}

impl RecordInfo {
    /// Builds the table for `R`, keeping declaration order.
    ///
    /// Fails on an empty table, a repeated field name or a serialized key
    /// shared by two fields.
    ///
    /// # Example
    ///
    /// ```
    /// use vc_serial::error::ConfigurationError;
    /// use vc_serial::info::{describe_field, RecordInfo};
    ///
    /// struct Point { x: i32, y: i32 }
    ///
    /// let clash = RecordInfo::new::<Point>([
    ///     describe_field::<i32>("x").build().unwrap(),
    ///     describe_field::<i32>("y").key("x").build().unwrap(),
    /// ]);
    /// assert!(matches!(clash, Err(ConfigurationError::DuplicateKey { field: "y", .. })));
    /// ```
    pub fn new<R: Any>(fields: impl IntoIterator<Item = FieldInfo>) -> Result<Self, ConfigurationError> {
        let fields: Box<[FieldInfo]> = fields.into_iter().collect();
        if fields.is_empty() {
            return Err(ConfigurationError::NoFields);
        }

        let mut by_name = HashMap::with_capacity_and_hasher(fields.len(), FixedState::default());
        let mut by_key = HashMap::with_capacity_and_hasher(fields.len(), FixedState::default());
        for (index, field) in fields.iter().enumerate() {
            if by_name.insert(field.name(), index).is_some() {
                return Err(ConfigurationError::DuplicateField(field.name()));
            }
            if let Some(earlier) = by_key.insert(field.key().to_owned(), index) {
                return Err(ConfigurationError::DuplicateKey {
                    field: field.name(),
                    key: field.key().to_owned(),
                    other: fields[earlier].name(),
                });
            }
        }

        Ok(Self {
            type_path: core::any::type_name::<R>(),
            fields,
            by_name,
            by_key,
        })
    }

    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.type_path
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// All fields in declaration order, excluded ones included.
    #[inline]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// The fields taking part in conversion, in declaration order.
    pub fn included(&self) -> impl Iterator<Item = &FieldInfo> + '_ {
        self.fields.iter().filter(|field| field.is_included())
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.by_name.get(name).map(|&index| &self.fields[index])
    }

    pub fn field_by_key(&self, key: &str) -> Option<&FieldInfo> {
        self.by_key.get(key).map(|&index| &self.fields[index])
    }
}

#[cfg(test)]
mod tests {
    use super::RecordInfo;
    use crate::error::ConfigurationError;
    use crate::info::describe_field;

    struct Sample;

    #[test]
    fn keeps_declaration_order() {
        let info = RecordInfo::new::<Sample>([
            describe_field::<String>("name").build().unwrap(),
            describe_field::<u32>("id").key("ID").build().unwrap(),
            describe_field::<bool>("cached").exclude().build().unwrap(),
        ])
        .unwrap();

        let names: Vec<_> = info.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["name", "id", "cached"]);

        let included: Vec<_> = info.included().map(|f| f.key()).collect();
        assert_eq!(included, ["name", "ID"]);

        assert_eq!(info.field_by_key("ID").map(|f| f.name()), Some("id"));
        assert!(info.field_by_key("id").is_none());
        assert!(info.field("cached").is_some_and(|f| !f.is_included()));
        assert!(info.type_path().ends_with("Sample"));
    }

    #[test]
    fn rejects_bad_tables() {
        let empty = RecordInfo::new::<Sample>([]);
        assert_eq!(empty.unwrap_err(), ConfigurationError::NoFields);

        let twice = RecordInfo::new::<Sample>([
            describe_field::<u8>("a").build().unwrap(),
            describe_field::<u16>("a").key("b").build().unwrap(),
        ]);
        assert_eq!(twice.unwrap_err(), ConfigurationError::DuplicateField("a"));
    }
}
