//! Type resolver: classify a declared field type into a [`ParseType`] and a
//! [`CollectionKind`].
//!
//! Declared types use Rust spellings:
//!
//! - `bool`, `i32`, `i64`, `f32`, `f64`: non-nullable scalars
//! - `String`
//! - `Option<T>`: the nullable form of `T`
//! - `Vec<T>`, `VecDeque<T>`, `HashSet<T>`, `HashMap<String, T>` and the
//!   aliases `List`, `Queue`, `Set`, `BTreeSet`, `IndexSet`, `Map`,
//!   `BTreeMap`, `IndexMap`
//! - any other name is looked up through the caller's named-type function
//!   (objects, interfaces, enums) and resolves to `Unsupported` when unknown
//!
//! Containers of containers and maps with non-`String` keys are rejected.

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::types::{CollectionKind, ParseType};

/// Resolve `declared`, looking up non-builtin names with `named`.
pub fn resolve<F>(declared: &str, named: F) -> ConfigResult<(ParseType, CollectionKind)>
where
    F: Fn(&str) -> Option<ParseType>,
{
    let (head, args) = split_generic(declared)?;
    // Containers are already nullable.
    if let ("Option", [inner]) = (head, args.as_slice()) {
        if is_container(inner)? {
            return resolve(inner, named);
        }
    }
    let kind = match head {
        "Vec" | "List" | "LinkedList" => CollectionKind::List,
        "VecDeque" | "Queue" => CollectionKind::Queue,
        "HashSet" | "BTreeSet" | "IndexSet" | "Set" => CollectionKind::Set,
        "HashMap" | "BTreeMap" | "IndexMap" | "Map" => CollectionKind::Map,
        _ => return Ok((resolve_element(declared, &named)?, CollectionKind::None)),
    };

    let element = match (kind, args.as_slice()) {
        (CollectionKind::Map, [key, value]) => {
            if *key != "String" {
                return Err(ConfigError::NonStringMapKey {
                    declared: declared.to_string(),
                });
            }
            value
        }
        (CollectionKind::Map, _) => return Err(malformed(declared)),
        (_, [element]) => element,
        _ => return Err(malformed(declared)),
    };

    if is_container(element)? {
        return Err(ConfigError::NestedContainer {
            declared: declared.to_string(),
        });
    }
    Ok((resolve_element(element, &named)?.boxed(), kind))
}

/// Resolve a non-container type.
fn resolve_element<F>(declared: &str, named: &F) -> ConfigResult<ParseType>
where
    F: Fn(&str) -> Option<ParseType>,
{
    let (head, args) = split_generic(declared)?;
    if head == "Option" {
        let [inner] = args.as_slice() else {
            return Err(malformed(declared));
        };
        if is_container(inner)? {
            return Err(ConfigError::NestedContainer {
                declared: declared.to_string(),
            });
        }
        return Ok(resolve_element(inner, named)?.boxed());
    }
    if !args.is_empty() {
        debug!(declared, "unknown generic type, field is unsupported");
        return Ok(ParseType::Unsupported);
    }

    Ok(match head {
        "bool" => ParseType::Bool,
        "i32" => ParseType::Int,
        "i64" => ParseType::Long,
        "f32" => ParseType::Float,
        "f64" => ParseType::Double,
        "String" => ParseType::String,
        name => named(name).unwrap_or_else(|| {
            debug!(name, "unknown type name, field is unsupported");
            ParseType::Unsupported
        }),
    })
}

fn is_container(declared: &str) -> ConfigResult<bool> {
    let (head, _) = split_generic(declared)?;
    Ok(matches!(
        head,
        "Vec"
            | "List"
            | "LinkedList"
            | "VecDeque"
            | "Queue"
            | "HashSet"
            | "BTreeSet"
            | "IndexSet"
            | "Set"
            | "HashMap"
            | "BTreeMap"
            | "IndexMap"
            | "Map"
    ))
}

/// Split `Head<A, B>` into `("Head", ["A", "B"])`, splitting arguments only on
/// top-level commas. A name without angle brackets has no arguments.
fn split_generic(declared: &str) -> ConfigResult<(&str, Vec<&str>)> {
    let declared = declared.trim();
    let Some(open) = declared.find('<') else {
        if declared.is_empty() || declared.contains(['>', ',']) {
            return Err(malformed(declared));
        }
        return Ok((declared, Vec::new()));
    };
    if !declared.ends_with('>') {
        return Err(malformed(declared));
    }

    let head = declared[..open].trim();
    let inner = &declared[open + 1..declared.len() - 1];
    if head.is_empty() || inner.trim().is_empty() {
        return Err(malformed(declared));
    }

    let mut args = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, b) in inner.bytes().enumerate() {
        match b {
            b'<' => depth += 1,
            b'>' => {
                depth -= 1;
                if depth < 0 {
                    return Err(malformed(declared));
                }
            }
            b',' if depth == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(malformed(declared));
    }
    args.push(inner[start..].trim());
    if args.iter().any(|a| a.is_empty()) {
        return Err(malformed(declared));
    }
    Ok((head, args))
}

fn malformed(declared: &str) -> ConfigError {
    ConfigError::MalformedType {
        declared: declared.to_string(),
    }
}
