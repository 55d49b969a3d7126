//! Class type entry.
//!
//! Covers ordinary classes and instances of class templates (`List<int>`).
//! Member functions are registered separately and referenced here by hash;
//! the registry files them into `constructors`, `casts` or `methods`.

use bitflags::bitflags;

use crate::{DataType, TemplateArgument, TypeHash};

use super::qualify;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClassFlags: u8 {
        const FINAL = 0b0001;
        const ABSTRACT = 0b0010;
        /// No copy constructor, implicit or declared.
        const NON_COPYABLE = 0b0100;
    }
}

/// A non-static data member.
#[derive(Debug, Clone, PartialEq)]
pub struct DataMember {
    pub name: String,
    pub data_type: DataType,
}

/// A static data member.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticMember {
    pub name: String,
    pub data_type: DataType,
}

/// Registry entry for a class type.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry {
    pub name: String,
    pub namespace: String,
    pub qualified_name: String,
    pub type_hash: TypeHash,

    // === Inheritance ===
    /// Single inheritance only.
    pub base_class: Option<TypeHash>,

    // === Members ===
    pub constructors: Vec<TypeHash>,
    pub destructor: Option<TypeHash>,
    /// Conversion operators.
    pub casts: Vec<TypeHash>,
    /// Methods and member operators.
    pub methods: Vec<TypeHash>,
    pub data_members: Vec<DataMember>,
    pub static_members: Vec<StaticMember>,
    /// Member types (classes, enums) declared inside this class.
    pub nested_types: Vec<TypeHash>,
    /// Member function templates.
    pub member_templates: Vec<TypeHash>,

    // === Template Info ===
    /// Class template this was instantiated from.
    pub template: Option<TypeHash>,
    pub template_args: Vec<TemplateArgument>,

    pub flags: ClassFlags,
}

impl ClassEntry {
    /// New class named `name` inside `namespace` (`""` for the root).
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let namespace = namespace.into();
        let qualified_name = qualify(&namespace, &name);
        let type_hash = TypeHash::from_name(&qualified_name);
        Self::with_identity(name, namespace, qualified_name, type_hash)
    }

    /// New class with an explicit identity, as template instances have.
    pub fn with_identity(
        name: impl Into<String>,
        namespace: impl Into<String>,
        qualified_name: impl Into<String>,
        type_hash: TypeHash,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            qualified_name: qualified_name.into(),
            type_hash,
            base_class: None,
            constructors: Vec::new(),
            destructor: None,
            casts: Vec::new(),
            methods: Vec::new(),
            data_members: Vec::new(),
            static_members: Vec::new(),
            nested_types: Vec::new(),
            member_templates: Vec::new(),
            template: None,
            template_args: Vec::new(),
            flags: ClassFlags::empty(),
        }
    }

    // === Builder Methods ===

    pub fn with_base(mut self, base: TypeHash) -> Self {
        self.base_class = Some(base);
        self
    }

    pub fn with_data_member(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.data_members.push(DataMember {
            name: name.into(),
            data_type,
        });
        self
    }

    pub fn with_static_member(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.static_members.push(StaticMember {
            name: name.into(),
            data_type,
        });
        self
    }

    pub fn with_nested_type(mut self, nested: TypeHash) -> Self {
        self.nested_types.push(nested);
        self
    }

    pub fn with_template_instance(mut self, template: TypeHash, args: Vec<TemplateArgument>) -> Self {
        self.template = Some(template);
        self.template_args = args;
        self
    }

    pub fn non_copyable(mut self) -> Self {
        self.flags |= ClassFlags::NON_COPYABLE;
        self
    }

    pub fn as_final(mut self) -> Self {
        self.flags |= ClassFlags::FINAL;
        self
    }

    // === Queries ===

    pub fn data_type(&self) -> DataType {
        DataType::simple(self.type_hash)
    }

    pub fn is_template_instance(&self) -> bool {
        self.template.is_some()
    }

    pub fn is_instance_of(&self, template: TypeHash) -> bool {
        self.template == Some(template)
    }

    pub fn find_data_member(&self, name: &str) -> Option<(usize, &DataMember)> {
        self.data_members.iter().enumerate().find(|(_, m)| m.name == name)
    }

    pub fn find_static_member(&self, name: &str) -> Option<&StaticMember> {
        self.static_members.iter().find(|m| m.name == name)
    }
}
