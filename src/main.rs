use std::{env, fs::File, path::Path, process};

use javad_class_file::{
    attributes::CodeAttribute, ClassFile, DecodeOptions, LengthCheck, MethodInfo, Result,
};
use memmap::Mmap;

#[derive(Debug, Default)]
struct Config {
    decode: DecodeOptions,
    warn_descriptors: bool,
}

fn main() {
    pretty_env_logger::init();

    let mut config = Config::default();
    let mut paths = Vec::new();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--permissive" => config.decode.length_check = LengthCheck::Permissive,
            "--warn-descriptors" => config.warn_descriptors = true,
            _ => paths.push(arg),
        }
    }

    if paths.is_empty() {
        eprintln!("usage: javad [--permissive] [--warn-descriptors] <file.class>...");
        process::exit(1);
    }

    let mut failed = false;
    for path in &paths {
        match dump(Path::new(path), &config) {
            Ok(0) => {}
            Ok(unreadable) => {
                log::error!("{}: {} unreadable attribute(s)", path, unreadable);
                failed = true;
            }
            Err(e) => {
                log::error!("{}: {}", path, e);
                failed = true;
            }
        }
    }

    if failed {
        process::exit(1);
    }
}

/// Prints the local variable declarations of every method in the class file.
/// Returns the number of attributes that could not be decoded.
fn dump(path: &Path, config: &Config) -> Result<usize> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    let class_file = ClassFile::parse(&mmap)?;

    let class_name = class_file.class_name()?.replace('/', ".");
    println!("class {} {{", class_name);

    let mut unreadable = 0;
    for method in &class_file.methods {
        println!();
        let header = method_header(&class_file, &class_name, method).unwrap_or_else(|e| {
            log::error!("{}: {}", path.display(), e);
            unreadable += 1;
            fallback_header(&class_file, method)
        });
        println!("    {}", header);

        match class_file.method_code(method) {
            Ok(Some(code)) => unreadable += print_locals(&class_file, &code, config),
            Ok(None) => println!("        // no code"),
            Err(e) => {
                log::error!("{}: {}", path.display(), e);
                unreadable += 1;
            }
        }
    }

    println!("}}");
    Ok(unreadable)
}

fn method_header(class_file: &ClassFile, class_name: &str, method: &MethodInfo) -> Result<String> {
    let name = class_file.method_name(method)?;
    if name == "<clinit>" {
        return Ok("static {}".to_owned());
    }

    let descriptor = class_file.parsed_method_descriptor(method)?;
    let parameters = descriptor
        .parameters
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    let mut header = method.access_flags.method_modifiers().join(" ");
    if !header.is_empty() {
        header.push(' ');
    }
    if name == "<init>" {
        let simple_name = class_name.rsplit('.').next().unwrap_or(class_name);
        header.push_str(&format!("{}({})", simple_name, parameters));
    } else {
        header.push_str(&format!(
            "{} {}({})",
            descriptor.return_type_name(),
            name,
            parameters
        ));
    }

    Ok(header)
}

/// Header for a method whose name or descriptor could not be decoded.
fn fallback_header(class_file: &ClassFile, method: &MethodInfo) -> String {
    let name = class_file.method_name(method).unwrap_or("<unknown>");
    match class_file.method_descriptor(method) {
        Ok(descriptor) => format!("{} /* {} */", name, descriptor),
        Err(_) => name.to_owned(),
    }
}

fn print_locals(class_file: &ClassFile, code: &CodeAttribute, config: &Config) -> usize {
    let mut unreadable = 0;
    let mut printed = false;

    for table in code.local_variable_tables(&class_file.constant_pool, &config.decode) {
        let table = match table {
            Ok(table) => table,
            Err(e) => {
                log::error!("{}", e);
                unreadable += 1;
                continue;
            }
        };

        if config.warn_descriptors {
            for entry in &table {
                if let Err(e) = entry.declaration() {
                    log::warn!("Local variable in slot {}: {}", entry.index, e);
                }
            }
        }

        for declaration in table.declarations().into_iter().flatten() {
            println!("        {}", declaration);
            printed = true;
        }
    }

    if !printed {
        println!("        // no local variable information");
    }

    unreadable
}
