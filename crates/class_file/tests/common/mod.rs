#![allow(dead_code)]

use byteorder::{BigEndian, WriteBytesExt};

/// Routes the library's `log` output to stderr, filtered by `RUST_LOG`.
pub fn init_logging() {
    let _ = pretty_env_logger::try_init();
}

/// Assembles class files in memory.
#[derive(Default)]
pub struct ClassBuilder {
    constant_pool: Vec<u8>,
    constant_pool_count: u16,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
}
impl ClassBuilder {
    pub fn new() -> Self {
        Self {
            constant_pool_count: 1,
            ..Default::default()
        }
    }

    pub fn utf8(&mut self, s: &str) -> u16 {
        self.constant_pool.write_u8(1).unwrap();
        self.constant_pool.write_u16::<BigEndian>(s.len() as u16).unwrap();
        self.constant_pool.extend_from_slice(s.as_bytes());
        self.next_index(1)
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        self.constant_pool.write_u8(3).unwrap();
        self.constant_pool.write_i32::<BigEndian>(value).unwrap();
        self.next_index(1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        self.constant_pool.write_u8(5).unwrap();
        self.constant_pool.write_i64::<BigEndian>(value).unwrap();
        self.next_index(2)
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.constant_pool.write_u8(7).unwrap();
        self.constant_pool.write_u16::<BigEndian>(name_index).unwrap();
        self.next_index(1)
    }

    pub fn field(&mut self, access_flags: u16, name: &str, descriptor: &str) {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);

        let mut field = Vec::new();
        field.write_u16::<BigEndian>(access_flags).unwrap();
        field.write_u16::<BigEndian>(name_index).unwrap();
        field.write_u16::<BigEndian>(descriptor_index).unwrap();
        field.write_u16::<BigEndian>(0).unwrap();
        self.fields.push(field);
    }

    /// Adds a method, with a `Code` attribute when `code` is given.
    pub fn method(&mut self, access_flags: u16, name: &str, descriptor: &str, code: Option<Vec<u8>>) {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);

        let mut method = Vec::new();
        method.write_u16::<BigEndian>(access_flags).unwrap();
        method.write_u16::<BigEndian>(name_index).unwrap();
        method.write_u16::<BigEndian>(descriptor_index).unwrap();
        match code {
            Some(code) => {
                let code_name_index = self.utf8("Code");
                method.write_u16::<BigEndian>(1).unwrap();
                write_attribute(&mut method, code_name_index, &code);
            }
            None => method.write_u16::<BigEndian>(0).unwrap(),
        }
        self.methods.push(method);
    }

    pub fn build(mut self, this_class: &str, super_class: Option<&str>) -> Vec<u8> {
        let this_class = self.class(this_class);
        let super_class = super_class.map_or(0, |name| self.class(name));

        let mut bytes = Vec::new();
        bytes.write_u32::<BigEndian>(0xCAFEBABE).unwrap();
        bytes.write_u16::<BigEndian>(0).unwrap();
        bytes.write_u16::<BigEndian>(61).unwrap();
        bytes.write_u16::<BigEndian>(self.constant_pool_count).unwrap();
        bytes.extend_from_slice(&self.constant_pool);
        bytes.write_u16::<BigEndian>(0x0021).unwrap();
        bytes.write_u16::<BigEndian>(this_class).unwrap();
        bytes.write_u16::<BigEndian>(super_class).unwrap();
        bytes.write_u16::<BigEndian>(0).unwrap();
        bytes.write_u16::<BigEndian>(self.fields.len() as u16).unwrap();
        self.fields.iter().for_each(|f| bytes.extend_from_slice(f));
        bytes.write_u16::<BigEndian>(self.methods.len() as u16).unwrap();
        self.methods.iter().for_each(|m| bytes.extend_from_slice(m));
        bytes.write_u16::<BigEndian>(0).unwrap();
        bytes
    }

    fn next_index(&mut self, slot_size: u16) -> u16 {
        let index = self.constant_pool_count;
        self.constant_pool_count += slot_size;
        index
    }
}

pub fn write_attribute(bytes: &mut Vec<u8>, name_index: u16, info: &[u8]) {
    bytes.write_u16::<BigEndian>(name_index).unwrap();
    bytes.write_u32::<BigEndian>(info.len() as u32).unwrap();
    bytes.extend_from_slice(info);
}

/// A `Code` attribute body with a single `return` and the given nested
/// attributes.
pub fn code(max_locals: u16, attributes: &[(u16, Vec<u8>)]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.write_u16::<BigEndian>(1).unwrap();
    bytes.write_u16::<BigEndian>(max_locals).unwrap();
    bytes.write_u32::<BigEndian>(1).unwrap();
    bytes.write_u8(0xb1).unwrap();
    bytes.write_u16::<BigEndian>(0).unwrap();
    bytes.write_u16::<BigEndian>(attributes.len() as u16).unwrap();
    for (name_index, info) in attributes {
        write_attribute(&mut bytes, *name_index, info);
    }
    bytes
}

/// A `LocalVariableTable` body. Each record is
/// `[start_pc, length, name_index, descriptor_index, index]`.
pub fn local_variable_table(records: &[[u16; 5]]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.write_u16::<BigEndian>(records.len() as u16).unwrap();
    for field in records.iter().flatten() {
        bytes.write_u16::<BigEndian>(*field).unwrap();
    }
    bytes
}
