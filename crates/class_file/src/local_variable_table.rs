// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7.13

use std::ops::RangeInclusive;

use crate::{
    descriptor::{decode_field_descriptor, FieldType},
    reader::Reader,
    ClassFileError, ConstantPool, Result,
};

/// start_pc, length, name_index, descriptor_index and index, all u2.
const RECORD_SIZE: u64 = 10;

/// What to do when the record count disagrees with the attribute length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthCheck {
    /// Any disagreement fails the attribute with `LengthMismatch`.
    #[default]
    Strict,
    /// The disagreement is logged and only the records that fit in the
    /// declared length are decoded. Running out of bytes is still an error.
    Permissive,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    pub length_check: LengthCheck,
}

/// A decoded `LocalVariableTable` attribute.
///
/// Entries borrow their name and descriptor from the constant pool they were
/// resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariableTable<'cp> {
    name: String,
    declared_length: u32,
    // `None` when the table declares no records.
    entries: Option<Vec<LocalVariable<'cp>>>,
}
impl<'cp> LocalVariableTable<'cp> {
    pub const NAME: &'static str = "LocalVariableTable";

    /// Decodes the attribute body at the reader's position.
    ///
    /// `declared_length` is the `attribute_length` from the attribute header.
    /// Nothing past it is read, and the reader always ends up
    /// `declared_length` bytes further on (or at the end of input).
    /// Stream-level failures are reported wrapped in `InAttribute`, carrying
    /// `name` and the offset of the body.
    pub fn decode(
        r: &mut Reader<'_>,
        name: &str,
        declared_length: u32,
        constant_pool: &'cp ConstantPool,
        options: &DecodeOptions,
    ) -> Result<Self> {
        let offset = r.position();
        let mut body = r.sub_reader(declared_length as usize);

        let entries = Self::decode_entries(&mut body, declared_length, constant_pool, options)
            .map_err(|e| e.in_attribute(name, offset))?;

        Ok(Self {
            name: name.to_owned(),
            declared_length,
            entries,
        })
    }

    fn decode_entries(
        r: &mut Reader<'_>,
        declared_length: u32,
        constant_pool: &'cp ConstantPool,
        options: &DecodeOptions,
    ) -> Result<Option<Vec<LocalVariable<'cp>>>> {
        let mut local_variable_table_length = r.read_u16()?;

        let required = 2 + local_variable_table_length as u64 * RECORD_SIZE;
        if required != declared_length as u64 {
            match options.length_check {
                LengthCheck::Strict => {
                    return Err(ClassFileError::LengthMismatch {
                        declared: declared_length,
                        required,
                    })
                }
                LengthCheck::Permissive => {
                    let fitting = (declared_length as u64).saturating_sub(2) / RECORD_SIZE;
                    log::warn!(
                        "{} declares {} bytes but {} records need {}, decoding {}",
                        Self::NAME,
                        declared_length,
                        local_variable_table_length,
                        required,
                        fitting.min(local_variable_table_length as u64)
                    );
                    if fitting < local_variable_table_length as u64 {
                        local_variable_table_length = fitting as u16;
                    }
                }
            }
        }

        if local_variable_table_length == 0 {
            return Ok(None);
        }

        let entries = (0..local_variable_table_length)
            .map(|_| LocalVariable::decode(r, constant_pool))
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(entries))
    }

    /// Name the attribute was decoded under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `attribute_length` from the attribute header.
    pub fn declared_length(&self) -> u32 {
        self.declared_length
    }

    /// The entries in the order they appear in the class file.
    pub fn entries(&self) -> &[LocalVariable<'cp>] {
        self.entries.as_deref().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Renders every entry that can be rendered, in table order.
    ///
    /// Returns `None` when there is no debug information to show: the table is
    /// empty or none of its entries render.
    pub fn declarations(&self) -> Option<Vec<String>> {
        let declarations = self
            .entries()
            .iter()
            .filter_map(LocalVariable::render)
            .collect::<Vec<_>>();

        if declarations.is_empty() {
            None
        } else {
            Some(declarations)
        }
    }
}
impl<'a, 'cp> IntoIterator for &'a LocalVariableTable<'cp> {
    type Item = &'a LocalVariable<'cp>;
    type IntoIter = std::slice::Iter<'a, LocalVariable<'cp>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries().iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable<'cp> {
    pub start_pc: u16,
    pub length: u16,
    /// `None` if `name_index` was zero or did not point at a Utf8 entry.
    pub name: Option<&'cp str>,
    /// `None` if `descriptor_index` was zero or did not point at a Utf8 entry.
    pub descriptor: Option<&'cp str>,
    /// Frame slot. Longs and doubles also occupy `index + 1`.
    pub index: u16,
}
impl<'cp> LocalVariable<'cp> {
    fn decode(r: &mut Reader<'_>, constant_pool: &'cp ConstantPool) -> Result<Self> {
        let start_pc = r.read_u16()?;
        let length = r.read_u16()?;
        let name_index = r.read_u16()?;
        let descriptor_index = r.read_u16()?;
        let index = r.read_u16()?;

        log::trace!(
            "local variable: start_pc={} length={} name_index={} descriptor_index={} index={}",
            start_pc,
            length,
            name_index,
            descriptor_index,
            index
        );

        Ok(LocalVariable {
            start_pc,
            length,
            name: resolve_utf8(constant_pool, name_index),
            descriptor: resolve_utf8(constant_pool, descriptor_index),
            index,
        })
    }

    /// Renders the entry as `<type> <name>; // index = <slot>`.
    ///
    /// `Ok(None)` when the name or descriptor is missing, which is normal for
    /// code compiled without debug information.
    pub fn declaration(&self) -> Result<Option<String>> {
        let (Some(name), Some(descriptor)) = (self.name, self.descriptor) else {
            return Ok(None);
        };

        let type_name = decode_field_descriptor(descriptor)?;

        Ok(Some(format!(
            "{} {}; // index = {}",
            type_name, name, self.index
        )))
    }

    /// Like [`declaration`](Self::declaration), with a malformed descriptor
    /// also rendering as `None`.
    pub fn render(&self) -> Option<String> {
        self.declaration().unwrap_or_else(|e| {
            log::debug!("Skipping local variable in slot {}: {}", self.index, e);
            None
        })
    }

    pub fn field_type(&self) -> Option<FieldType> {
        FieldType::parse(self.descriptor?).ok()
    }

    /// Code offsets over which the variable has a value, both ends included.
    pub fn live_range(&self) -> RangeInclusive<u32> {
        let start = self.start_pc as u32;
        start..=start + self.length as u32
    }

    /// Frame slots the variable occupies.
    pub fn slots(&self) -> RangeInclusive<u32> {
        let index = self.index as u32;
        match self.field_type() {
            Some(field_type) if field_type.is_wide() => index..=index + 1,
            _ => index..=index,
        }
    }
}

fn resolve_utf8(constant_pool: &ConstantPool, index: u16) -> Option<&str> {
    if index == 0 {
        return None;
    }

    let utf8 = constant_pool.utf8(index);
    if utf8.is_none() {
        log::debug!("Constant pool index {} is not a Utf8 entry", index);
    }
    utf8
}
