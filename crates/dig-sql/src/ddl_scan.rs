//! Object-creation statement scanner.
//!
//! Migration files hold whatever DDL the source catalog produced: PL/SQL
//! package bodies, Oracle storage clauses, trigger bodies. No SQL parser
//! accepts all of it, so existing files are scanned with a pattern instead.
//! Only the `CREATE ... <TYPE> [schema.]name` header of each statement matters.

use dig_core::identifier::{normalize_identifier, SchemaName};
use dig_core::object::{ObjectRef, ObjectType};
use regex::Regex;
use std::sync::OnceLock;

const IDENT: &str = r#"(?:"[^"]+"|[A-Za-z_][A-Za-z0-9_$#]*)"#;

fn create_pattern() -> &'static Regex {
    static CREATE: OnceLock<Regex> = OnceLock::new();
    CREATE.get_or_init(|| {
        let pattern = format!(
            concat!(
                r"(?i)\bCREATE\s+",
                r"(?:OR\s+REPLACE\s+)?",
                r"(?:(?:NON)?EDITIONABLE\s+)?",
                r"(?:(?:NO\s+)?FORCE\s+)?",
                r"(?:(?:UNIQUE|BITMAP|GLOBAL\s+TEMPORARY|PRIVATE\s+TEMPORARY|TEMPORARY|TEMP)\s+)?",
                r"(?P<kind>TABLE|MATERIALIZED\s+VIEW|VIEW|SEQUENCE|TYPE\s+BODY|TYPE",
                r"|PACKAGE\s+BODY|PACKAGE|FUNCTION|PROCEDURE|TRIGGER|INDEX)\s+",
                r"(?:IF\s+NOT\s+EXISTS\s+)?",
                r"(?P<first>{ident})(?:\s*\.\s*(?P<second>{ident}))?"
            ),
            ident = IDENT
        );
        Regex::new(&pattern).expect("valid regex literal")
    })
}

fn whitespace() -> &'static Regex {
    static WS: OnceLock<Regex> = OnceLock::new();
    WS.get_or_init(|| Regex::new(r"\s+").expect("valid regex literal"))
}

/// Map a matched keyword to the object it creates. Indexes create nothing we track.
fn object_type_for(keyword: &str) -> Option<ObjectType> {
    let keyword = whitespace().replace_all(keyword, " ").to_uppercase();
    match keyword.as_str() {
        "TABLE" => Some(ObjectType::Table),
        "VIEW" | "MATERIALIZED VIEW" => Some(ObjectType::View),
        "SEQUENCE" => Some(ObjectType::Sequence),
        // a type body completes its type
        "TYPE" | "TYPE BODY" => Some(ObjectType::Type),
        "PACKAGE" => Some(ObjectType::Package),
        "PACKAGE BODY" => Some(ObjectType::PackageBody),
        "FUNCTION" => Some(ObjectType::Function),
        "PROCEDURE" => Some(ObjectType::Procedure),
        "TRIGGER" => Some(ObjectType::Trigger),
        _ => None,
    }
}

/// Blank out `--` and `/* */` comments and the contents of string literals.
///
/// Quoted identifiers are kept. Comments become a single space so tokens on
/// either side stay apart; literals keep their quotes but lose their contents,
/// which hides DDL built as strings in dynamic SQL.
pub fn strip_comments_and_literals(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '-' if chars.peek() == Some(&'-') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                out.push(' ');
            }
            '\'' => {
                out.push('\'');
                while let Some(next) = chars.next() {
                    if next == '\'' {
                        // '' is an escaped quote inside the literal
                        if chars.peek() == Some(&'\'') {
                            chars.next();
                            continue;
                        }
                        break;
                    }
                }
                out.push('\'');
            }
            '"' => {
                out.push('"');
                for next in chars.by_ref() {
                    out.push(next);
                    if next == '"' {
                        break;
                    }
                }
            }
            other => out.push(other),
        }
    }

    out
}

/// Find every object a DDL text creates, in order of appearance.
///
/// Unqualified names are placed in `default_schema`. Duplicates (for example
/// a package spec followed by a `CREATE OR REPLACE` of the same spec) are
/// reported once.
pub fn scan_created_objects(ddl: &str, default_schema: &SchemaName) -> Vec<ObjectRef> {
    let cleaned = strip_comments_and_literals(ddl);
    let mut found: Vec<ObjectRef> = Vec::new();

    for caps in create_pattern().captures_iter(&cleaned) {
        let Some(object_type) = object_type_for(&caps["kind"]) else {
            continue;
        };
        let first = &caps["first"];
        let (schema, name) = match caps.name("second") {
            Some(second) => (
                SchemaName::try_new(first),
                normalize_identifier(second.as_str()),
            ),
            None => (Some(default_schema.clone()), normalize_identifier(first)),
        };
        let Some(schema) = schema else {
            continue;
        };
        match ObjectRef::try_new(schema.as_str(), &name, object_type) {
            Ok(object) => {
                if !found.contains(&object) {
                    found.push(object);
                }
            }
            Err(e) => log::debug!("Skipping unusable CREATE header: {}", e),
        }
    }

    found
}

#[cfg(test)]
#[path = "ddl_scan_test.rs"]
mod tests;
