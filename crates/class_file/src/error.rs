use thiserror::Error;

use crate::constant_pool;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Truncated input at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput {
        offset: u64,
        needed: usize,
        remaining: usize,
    },
    #[error("Attribute length mismatch: declared {declared} bytes, records require {required}")]
    LengthMismatch { declared: u32, required: u64 },
    #[error("Malformed descriptor {descriptor:?} at offset {offset}")]
    MalformedDescriptor { descriptor: String, offset: usize },
    #[error("In attribute {attribute} at offset {offset}: {source}")]
    InAttribute {
        attribute: String,
        offset: u64,
        #[source]
        source: Box<ClassFileError>,
    },
    #[error("Invalid constant pool index: {0}")]
    InvalidConstantPoolIndex(u16),
    #[error("Expected {0}, found {1:?}")]
    UnexpectedConstantPoolEntry(&'static str, constant_pool::CpInfo),
    #[error("Invalid cp info tag: {0}")]
    InvalidCpInfoTag(u8),
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
}

impl ClassFileError {
    /// Wraps a stream-level failure with the attribute it occurred in.
    pub(crate) fn in_attribute(self, attribute: &str, offset: u64) -> Self {
        ClassFileError::InAttribute {
            attribute: attribute.to_owned(),
            offset,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, looking through attribute context.
    pub fn root_cause(&self) -> &ClassFileError {
        match self {
            ClassFileError::InAttribute { source, .. } => source.root_cause(),
            e => e,
        }
    }
}
