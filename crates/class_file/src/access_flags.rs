use bitflags::bitflags;

bitflags! {
    /// Union of the class, field and method access flags. Some bits mean
    /// different things depending on where they appear.
    pub struct AccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        // ACC_SUPER on classes
        const SYNCHRONIZED = 0x0020;
        // ACC_BRIDGE on methods
        const VOLATILE = 0x0040;
        // ACC_VARARGS on methods
        const TRANSIENT = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
    }
}

impl AccessFlags {
    /// Source modifiers of a method, in declaration order.
    pub fn method_modifiers(&self) -> Vec<&'static str> {
        [
            (AccessFlags::PUBLIC, "public"),
            (AccessFlags::PRIVATE, "private"),
            (AccessFlags::PROTECTED, "protected"),
            (AccessFlags::ABSTRACT, "abstract"),
            (AccessFlags::STATIC, "static"),
            (AccessFlags::FINAL, "final"),
            (AccessFlags::SYNCHRONIZED, "synchronized"),
            (AccessFlags::NATIVE, "native"),
            (AccessFlags::STRICT, "strictfp"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, modifier)| modifier)
        .collect()
    }
}

#[cfg(test)]
mod method_modifiers_tests {
    use super::*;

    #[test]
    fn it_should_list_modifiers_in_source_order() {
        let flags = AccessFlags::STATIC | AccessFlags::PUBLIC | AccessFlags::FINAL;

        assert_eq!(flags.method_modifiers(), vec!["public", "static", "final"]);
    }

    #[test]
    fn it_should_ignore_flags_without_a_method_modifier() {
        let flags = AccessFlags::PRIVATE | AccessFlags::SYNTHETIC | AccessFlags::TRANSIENT;

        assert_eq!(flags.method_modifiers(), vec!["private"]);
    }
}
