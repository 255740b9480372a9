use crate::{
    attributes::{Attributes, CodeAttribute, ExceptionTableEntry},
    class_file::{FieldInfo, MethodInfo},
    reader::Reader,
};

use super::{constant_pool::CpInfo, *};

pub struct Parser<'a> {
    r: Reader<'a>,
}
impl<'a> Parser<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            r: Reader::new(buf),
        }
    }

    /// A parser over an attribute body that starts `base` bytes into the
    /// class file.
    pub(crate) fn with_base(buf: &'a [u8], base: u64) -> Self {
        Self {
            r: Reader::with_base(buf, base),
        }
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        let _ = self.parse_magic_identifier()?;
        let version = self.parse_version()?;

        let constant_pool = self.parse_constant_pool()?;
        let access_flags = AccessFlags::from_bits_truncate(self.r.read_u16()?);
        let this_class = self.r.read_u16()?;
        let super_class = self.r.read_u16()?;
        let interfaces_count = self.r.read_u16()?;
        let interfaces = self.r.read_u16_vec(interfaces_count as usize)?;

        let fields_count = self.r.read_u16()?;
        let fields = (0..fields_count)
            .map(|_| self.parse_field_info())
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.r.read_u16()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_method_info())
            .collect::<Result<Vec<_>>>()?;

        let attributes_count = self.r.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;

        log::debug!(
            "Parsed class file version {}.{}: {} constants, {} fields, {} methods",
            version.0,
            version.1,
            constant_pool.len(),
            fields.len(),
            methods.len()
        );

        Ok(ClassFile {
            version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn parse_field_info(&mut self) -> Result<FieldInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.r.read_u16()?);
        let name_index = self.r.read_u16()?;
        let descriptor_index = self.r.read_u16()?;
        let attributes_count = self.r.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;

        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_method_info(&mut self) -> Result<MethodInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.r.read_u16()?);
        let name_index = self.r.read_u16()?;
        let descriptor_index = self.r.read_u16()?;
        let attributes_count = self.r.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.r.read_u32()? {
            0xCAFEBABE => Ok(()),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.r.read_u16()?;
        let major = self.r.read_u16()?;
        Ok((major, minor))
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.r.read_u16()?;

        let mut count = (constant_pool_count as usize).saturating_sub(1);
        let mut res = Vec::with_capacity(count);
        while count > 0 {
            let (cp_info, slot_size) = self.parse_cp_info()?;
            res.push(cp_info);
            (0..slot_size - 1).for_each(|_| res.push(CpInfo::Unusable));

            count = count.saturating_sub(slot_size);
        }
        Ok(ConstantPool::new(res))
    }

    fn parse_cp_info(&mut self) -> Result<(CpInfo, usize)> {
        let tag = self.r.read_u8()?;
        let (cp_info, slot_size) = match tag {
            1 => (self.parse_utf8()?, 1),
            3 => (CpInfo::Integer(self.r.read_i32()?), 1),
            4 => (CpInfo::Float(f32::from_bits(self.r.read_u32()?)), 1),
            5 => (CpInfo::Long(self.r.read_i64()?), 2),
            6 => (CpInfo::Double(f64::from_bits(self.r.read_i64()? as u64)), 2),
            7 => (self.parse_class_info()?, 1),
            8 => (self.parse_string()?, 1),
            9 => (CpInfo::FieldRef(self.parse_ref_info()?), 1),
            10 => (CpInfo::MethodRef(self.parse_ref_info()?), 1),
            11 => (CpInfo::InterfaceMethodRef(self.parse_ref_info()?), 1),
            12 => (self.parse_name_and_type_info()?, 1),
            15 => (self.parse_method_handle()?, 1),
            16 => (self.parse_method_type_info()?, 1),
            17 => (CpInfo::Dynamic(self.parse_invoke_dynamic_info()?), 1),
            18 => (CpInfo::InvokeDynamic(self.parse_invoke_dynamic_info()?), 1),
            19 => (
                CpInfo::Module {
                    name_index: self.r.read_u16()?,
                },
                1,
            ),
            20 => (
                CpInfo::Package {
                    name_index: self.r.read_u16()?,
                },
                1,
            ),
            _ => return Err(ClassFileError::InvalidCpInfoTag(tag)),
        };

        Ok((cp_info, slot_size))
    }

    // Modified UTF-8 is decoded lossily; only supplementary characters and
    // embedded NULs differ from standard UTF-8.
    fn parse_utf8(&mut self) -> Result<CpInfo> {
        let length = self.r.read_u16()?;
        let bytes = self.r.read_bytes(length as usize)?;

        Ok(CpInfo::Utf8(String::from_utf8_lossy(&bytes).into()))
    }

    fn parse_class_info(&mut self) -> Result<CpInfo> {
        let name_index = self.r.read_u16()?;

        Ok(CpInfo::Class(constant_pool::ClassInfo { name_index }))
    }

    fn parse_string(&mut self) -> Result<CpInfo> {
        let string_index = self.r.read_u16()?;

        Ok(CpInfo::String { string_index })
    }

    fn parse_name_and_type_info(&mut self) -> Result<CpInfo> {
        let name_index = self.r.read_u16()?;
        let descriptor_index = self.r.read_u16()?;

        Ok(CpInfo::NameAndType(constant_pool::NameAndTypeInfo {
            name_index,
            descriptor_index,
        }))
    }

    fn parse_method_handle(&mut self) -> Result<CpInfo> {
        let reference_kind = self.r.read_u8()?;
        let reference_index = self.r.read_u16()?;

        Ok(CpInfo::MethodHandle(constant_pool::MethodHandleInfo {
            reference_kind,
            reference_index,
        }))
    }

    fn parse_method_type_info(&mut self) -> Result<CpInfo> {
        let descriptor_index = self.r.read_u16()?;

        Ok(CpInfo::MethodType(constant_pool::MethodTypeInfo {
            descriptor_index,
        }))
    }

    fn parse_invoke_dynamic_info(&mut self) -> Result<constant_pool::InvokeDynamicInfo> {
        let bootstrap_method_attr_index = self.r.read_u16()?;
        let name_and_type_index = self.r.read_u16()?;

        Ok(constant_pool::InvokeDynamicInfo {
            bootstrap_method_attr_index,
            name_and_type_index,
        })
    }

    fn parse_ref_info(&mut self) -> Result<constant_pool::RefInfo> {
        let class_index = self.r.read_u16()?;
        let name_and_type_index = self.r.read_u16()?;

        Ok(constant_pool::RefInfo {
            class_index,
            name_and_type_index,
        })
    }

    fn parse_attribute(&mut self) -> Result<Attribute> {
        let attribute_name_index = self.r.read_u16()?;
        let attribute_length = self.r.read_u32()?;
        let offset = self.r.position();
        let info = self.r.read_bytes(attribute_length as usize)?;

        Ok(Attribute {
            attribute_name_index,
            offset,
            info,
        })
    }

    pub(crate) fn parse_code_attribute(&mut self) -> Result<CodeAttribute> {
        let max_stack = self.r.read_u16()?;
        let max_locals = self.r.read_u16()?;
        let code_length = self.r.read_u32()?;
        let code = self.r.read_bytes(code_length as usize)?;
        let exception_table_length = self.r.read_u16()?;
        let exception_table = (0..exception_table_length)
            .map(|_| self.parse_exception_table_entry())
            .collect::<Result<Vec<_>>>()?;
        let attributes_count = self.r.read_u16()?;
        let attributes = self.parse_attributes(attributes_count)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    fn parse_exception_table_entry(&mut self) -> Result<ExceptionTableEntry> {
        let start_pc = self.r.read_u16()?;
        let end_pc = self.r.read_u16()?;
        let handler_pc = self.r.read_u16()?;
        let catch_type = self.r.read_u16()?;

        Ok(ExceptionTableEntry {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        })
    }

    fn parse_attributes(&mut self, attributes_count: u16) -> Result<Attributes> {
        (0..attributes_count)
            .map(|_| self.parse_attribute())
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }
}


#[cfg(test)]
mod parse_cp_info_tests {
    use super::*;

    #[test]
    fn it_should_parse_a_utf8_entry() {
        assert_eq!(
            Parser::new(&[0x01, 0x00, 0x01, b'I']).parse_cp_info().unwrap(),
            (CpInfo::Utf8("I".into()), 1)
        );
    }

    #[test]
    fn it_should_give_longs_and_doubles_two_slots() {
        let (long, long_slots) = Parser::new(&[0x05, 0, 0, 0, 1, 0, 0, 0, 2])
            .parse_cp_info()
            .unwrap();
        let (double, double_slots) = Parser::new(&[0x06, 0x3f, 0xf0, 0, 0, 0, 0, 0, 0])
            .parse_cp_info()
            .unwrap();

        assert_eq!((long, long_slots), (CpInfo::Long(0x1_0000_0002), 2));
        assert_eq!((double, double_slots), (CpInfo::Double(1.0), 2));
    }

    #[test]
    fn it_should_parse_a_float_from_its_bits() {
        assert_eq!(
            Parser::new(&[0x04, 0x7f, 0x80, 0x00, 0x00])
                .parse_cp_info()
                .unwrap(),
            (CpInfo::Float(f32::INFINITY), 1)
        );
    }

    #[test]
    fn it_should_fail_on_an_unknown_tag() {
        assert!(matches!(
            Parser::new(&[0x02]).parse_cp_info(),
            Err(ClassFileError::InvalidCpInfoTag(2))
        ));
    }

    #[test]
    fn it_should_leave_an_unusable_slot_after_a_long() {
        let pool = Parser::new(&[
            0x00, 0x04, // constant_pool_count
            0x05, 0, 0, 0, 0, 0, 0, 0, 7, // #1 Long, #2 unusable
            0x01, 0x00, 0x01, b'J', // #3 Utf8
        ])
        .parse_constant_pool()
        .unwrap();

        assert_eq!(pool.get(1), Some(&CpInfo::Long(7)));
        assert_eq!(pool.get(2), Some(&CpInfo::Unusable));
        assert_eq!(pool.utf8(3), Some("J"));
    }
}
