use crate::field::FieldDefinition;

///
/// ChildList
///
/// A named one-to-many sub-table owned by a parent entry type. Child
/// rows carry their own field set; `read_only` children reject direct
/// writes at the engine boundary.
///

#[derive(Clone, Debug)]
pub struct ChildList {
    pub name: String,
    pub label: String,
    pub fields: Vec<FieldDefinition>,
    pub table_name: String,
    pub read_only: bool,
}

impl ChildList {
    #[must_use]
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        let name = name.into();
        let table_name = name.clone();

        Self {
            name,
            label: label.into(),
            fields: Vec::new(),
            table_name,
            read_only: false,
        }
    }

    #[must_use]
    pub fn fields(mut self, fields: Vec<FieldDefinition>) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}
