use crate::{
    local_variable_table::{DecodeOptions, LocalVariableTable},
    reader::Reader,
    Attribute, Result,
};

use super::{parser::Parser, ConstantPool};

#[derive(Debug, Default)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn find_by_name<'a>(
        &'a self,
        name: &'a str,
        constant_pool: &'a ConstantPool,
    ) -> impl Iterator<Item = &'a Attribute> + 'a {
        self.0
            .iter()
            .filter(move |a| a.name(constant_pool) == Some(name))
    }

    /// Parses the `Code` attribute, if there is one.
    pub fn code_attribute(&self, constant_pool: &ConstantPool) -> Result<Option<CodeAttribute>> {
        let Some(attribute) = self.find_by_name("Code", constant_pool).next() else {
            return Ok(None);
        };

        Parser::with_base(&attribute.info, attribute.offset)
            .parse_code_attribute()
            .map(Some)
            .map_err(|e| e.in_attribute("Code", attribute.offset))
    }
}

#[derive(Debug)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

#[derive(Debug)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}
impl CodeAttribute {
    /// Decodes every `LocalVariableTable` nested in this attribute, in order.
    /// A method may split its variables over several tables.
    pub fn local_variable_tables<'a, 'cp: 'a>(
        &'a self,
        constant_pool: &'cp ConstantPool,
        options: &'a DecodeOptions,
    ) -> impl Iterator<Item = Result<LocalVariableTable<'cp>>> + 'a {
        self.attributes
            .find_by_name(LocalVariableTable::NAME, constant_pool)
            .map(move |attribute| {
                LocalVariableTable::decode(
                    &mut Reader::with_base(&attribute.info, attribute.offset),
                    LocalVariableTable::NAME,
                    attribute.info.len() as u32,
                    constant_pool,
                    options,
                )
            })
    }

    /// Decodes the first `LocalVariableTable`, if there is one.
    pub fn local_variable_table<'cp>(
        &self,
        constant_pool: &'cp ConstantPool,
        options: &DecodeOptions,
    ) -> Result<Option<LocalVariableTable<'cp>>> {
        self.local_variable_tables(constant_pool, options)
            .next()
            .transpose()
    }
}
