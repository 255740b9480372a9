// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

mod access_flags;
pub mod attributes;
mod class_file;
#[macro_use]
mod constant_pool;
pub mod descriptor;
mod error;
pub mod local_variable_table;
mod parser;
pub mod reader;

use std::fmt;

pub use self::class_file::{ClassFile, FieldInfo, MethodInfo};
pub use access_flags::AccessFlags;
pub use constant_pool::{ConstantPool, CpInfo};
pub use descriptor::{decode_field_descriptor, FieldType, MethodDescriptor};
pub use error::ClassFileError;
pub use local_variable_table::{DecodeOptions, LengthCheck, LocalVariable, LocalVariableTable};
pub use parser::Parser;
pub use reader::Reader;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;

pub struct Attribute {
    pub attribute_name_index: u16,
    /// Offset of `info` from the start of the class file.
    pub offset: u64,
    pub info: Vec<u8>,
}
impl Attribute {
    pub fn name<'a>(&self, constant_pool: &'a ConstantPool) -> Option<&'a str> {
        constant_pool.utf8(self.attribute_name_index)
    }
}
impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("attribute_name_index", &self.attribute_name_index)
            .field("offset", &self.offset)
            .field("info", &format!("({} bytes)", self.info.len()))
            .finish()
    }
}
