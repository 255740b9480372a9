// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.3

use std::fmt;

use crate::{ClassFileError, Result};

/// A field type as encoded in a field descriptor.
///
/// ```txt
/// field_type  := base_type | object_type | array_type ;
/// base_type   := "B" | "C" | "D" | "F" | "I" | "J" | "S" | "Z" ;
/// object_type := "L" <class_name> ";" ;
/// array_type  := "[" <field_type> ;
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum FieldType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    /// Class name in internal form, e.g. `java/lang/String`.
    Object(String),
    /// Number of dimensions and the (non-array) element type.
    Array(usize, Box<FieldType>),
}
impl FieldType {
    pub fn parse(descriptor: &str) -> Result<FieldType> {
        let mut parser = DescriptorParser::new(descriptor);
        let field_type = parser.parse_field_type()?;
        parser.expect_end()?;
        Ok(field_type)
    }

    /// Whether a value of this type takes up two local variable slots.
    pub fn is_wide(&self) -> bool {
        matches!(self, FieldType::Long | FieldType::Double)
    }
}
impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Byte => f.write_str("byte"),
            FieldType::Char => f.write_str("char"),
            FieldType::Double => f.write_str("double"),
            FieldType::Float => f.write_str("float"),
            FieldType::Int => f.write_str("int"),
            FieldType::Long => f.write_str("long"),
            FieldType::Short => f.write_str("short"),
            FieldType::Boolean => f.write_str("boolean"),
            FieldType::Object(class_name) => f.write_str(&class_name.replace('/', ".")),
            FieldType::Array(dimensions, element) => {
                write!(f, "{}", element)?;
                for _ in 0..*dimensions {
                    f.write_str("[]")?;
                }
                Ok(())
            }
        }
    }
}

/// Decodes a field descriptor into a source-style type name, e.g. `[[I` into
/// `int[][]`.
pub fn decode_field_descriptor(descriptor: &str) -> Result<String> {
    FieldType::parse(descriptor).map(|field_type| field_type.to_string())
}

/// ```txt
/// method_descriptor := "(" <field_type>* ")" <return_type> ;
/// return_type       := <field_type> | "V" ;
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    /// `None` for `void`.
    pub return_type: Option<FieldType>,
}
impl MethodDescriptor {
    pub fn parse(descriptor: &str) -> Result<MethodDescriptor> {
        let mut parser = DescriptorParser::new(descriptor);
        parser.expect(b'(')?;

        let mut parameters = Vec::new();
        while parser.peek() != Some(b')') {
            parameters.push(parser.parse_field_type()?);
        }
        parser.expect(b')')?;

        let return_type = if parser.peek() == Some(b'V') {
            parser.pos += 1;
            None
        } else {
            Some(parser.parse_field_type()?)
        };
        parser.expect_end()?;

        Ok(MethodDescriptor {
            parameters,
            return_type,
        })
    }

    pub fn return_type_name(&self) -> String {
        self.return_type
            .as_ref()
            .map_or_else(|| "void".to_owned(), ToString::to_string)
    }
}

struct DescriptorParser<'a> {
    descriptor: &'a str,
    pos: usize,
}
impl<'a> DescriptorParser<'a> {
    fn new(descriptor: &'a str) -> Self {
        Self { descriptor, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.descriptor.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn parse_field_type(&mut self) -> Result<FieldType> {
        let mut dimensions = 0;
        while self.peek() == Some(b'[') {
            dimensions += 1;
            self.pos += 1;
        }

        let element = self.parse_element_type()?;
        if dimensions == 0 {
            Ok(element)
        } else {
            Ok(FieldType::Array(dimensions, Box::new(element)))
        }
    }

    fn parse_element_type(&mut self) -> Result<FieldType> {
        let start = self.pos;
        let field_type = match self.bump() {
            Some(b'B') => FieldType::Byte,
            Some(b'C') => FieldType::Char,
            Some(b'D') => FieldType::Double,
            Some(b'F') => FieldType::Float,
            Some(b'I') => FieldType::Int,
            Some(b'J') => FieldType::Long,
            Some(b'S') => FieldType::Short,
            Some(b'Z') => FieldType::Boolean,
            Some(b'L') => return self.parse_object_type(),
            _ => return Err(self.malformed(start)),
        };

        Ok(field_type)
    }

    fn parse_object_type(&mut self) -> Result<FieldType> {
        let rest = &self.descriptor[self.pos..];
        let Some(end) = rest.find(';') else {
            return Err(self.malformed(self.descriptor.len()));
        };
        if end == 0 {
            return Err(self.malformed(self.pos));
        }

        let class_name = &rest[..end];
        self.pos += end + 1;

        Ok(FieldType::Object(class_name.to_owned()))
    }

    fn expect(&mut self, expected: u8) -> Result<()> {
        match self.peek() {
            Some(b) if b == expected => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.malformed(self.pos)),
        }
    }

    fn expect_end(&self) -> Result<()> {
        if self.pos == self.descriptor.len() {
            Ok(())
        } else {
            Err(self.malformed(self.pos))
        }
    }

    fn malformed(&self, offset: usize) -> ClassFileError {
        ClassFileError::MalformedDescriptor {
            descriptor: self.descriptor.to_owned(),
            offset,
        }
    }
}

#[cfg(test)]
mod decode_field_descriptor_tests {
    use super::*;

    #[test]
    fn it_should_decode_every_base_type() {
        let decoded = ["B", "C", "D", "F", "I", "J", "S", "Z"]
            .iter()
            .map(|d| decode_field_descriptor(d).unwrap())
            .collect::<Vec<_>>();

        assert_eq!(
            decoded,
            ["byte", "char", "double", "float", "int", "long", "short", "boolean"]
        );
    }

    #[test]
    fn it_should_decode_an_object_type_with_dotted_package() {
        assert_eq!(
            decode_field_descriptor("Ljava/lang/String;").unwrap(),
            "java.lang.String"
        );
    }

    #[test]
    fn it_should_decode_arrays_with_one_suffix_per_dimension() {
        assert_eq!(decode_field_descriptor("[[I").unwrap(), "int[][]");
        assert_eq!(
            decode_field_descriptor("[Ljava/lang/Object;").unwrap(),
            "java.lang.Object[]"
        );
        assert_eq!(
            decode_field_descriptor("[[[Ljava/util/Map$Entry;").unwrap(),
            "java.util.Map$Entry[][][]"
        );
    }

    #[test]
    fn it_should_be_deterministic() {
        assert_eq!(
            decode_field_descriptor("[Ljava/lang/Object;").unwrap(),
            decode_field_descriptor("[Ljava/lang/Object;").unwrap()
        );
    }

    #[test]
    fn it_should_fail_on_empty_input() {
        assert!(matches!(
            decode_field_descriptor(""),
            Err(ClassFileError::MalformedDescriptor { offset: 0, .. })
        ));
    }

    #[test]
    fn it_should_fail_on_an_unknown_leading_character() {
        assert!(matches!(
            decode_field_descriptor("Q"),
            Err(ClassFileError::MalformedDescriptor { offset: 0, .. })
        ));
        assert!(decode_field_descriptor("V").is_err());
    }

    #[test]
    fn it_should_fail_on_an_unterminated_object_type() {
        assert!(matches!(
            decode_field_descriptor("Ljava/lang/String"),
            Err(ClassFileError::MalformedDescriptor { offset: 17, .. })
        ));
    }

    #[test]
    fn it_should_fail_on_an_empty_class_name() {
        assert!(decode_field_descriptor("L;").is_err());
    }

    #[test]
    fn it_should_fail_on_an_array_without_element_type() {
        assert!(matches!(
            decode_field_descriptor("[["),
            Err(ClassFileError::MalformedDescriptor { offset: 2, .. })
        ));
    }

    #[test]
    fn it_should_fail_on_trailing_characters() {
        assert!(matches!(
            decode_field_descriptor("II"),
            Err(ClassFileError::MalformedDescriptor { offset: 1, .. })
        ));
    }

    #[test]
    fn it_should_know_which_types_are_wide() {
        assert!(FieldType::parse("J").unwrap().is_wide());
        assert!(FieldType::parse("D").unwrap().is_wide());
        assert!(!FieldType::parse("[J").unwrap().is_wide());
        assert!(!FieldType::parse("I").unwrap().is_wide());
    }
}
