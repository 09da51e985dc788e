//! Declarative field tag parsing.
//!
//! A tag is a comma-separated list of parts:
//!
//! ```text
//! omit
//! foreignKey,struct:User
//! foreignKey,struct:Category,table:categories,field:category
//! ```
//!
//! `key:value` parts are only valid after `foreignKey`, and `struct` is
//! mandatory once `foreignKey` appears.

use crate::error::{CoreError, CoreResult};

/// Parsed form of one field's tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTag {
    /// Field is never auto-populated nor wired
    pub omit: bool,
    pub foreign_key: Option<ForeignKeyTag>,
}

/// The `foreignKey` directive of a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyTag {
    /// `struct:` - dependency type name
    pub target: String,
    /// `table:` - dependency storage name
    pub table: Option<String>,
    /// `field:` - reference field receiving a copy of the dependency
    pub field: Option<String>,
}

/// Parse the tag attached to `type_name.field`.
pub fn parse_tag(type_name: &str, field: &str, tag: &str) -> CoreResult<FieldTag> {
    let fail = |reason: String| CoreError::TagFormat {
        type_name: type_name.to_string(),
        field: field.to_string(),
        reason,
    };

    let mut parsed = FieldTag::default();
    if tag.trim().is_empty() {
        return Ok(parsed);
    }

    let mut in_foreign_key = false;
    let mut target: Option<String> = None;
    let mut table: Option<String> = None;
    let mut value_field: Option<String> = None;

    for part in tag.split(',').map(str::trim) {
        if part.is_empty() {
            return Err(fail("empty segment".to_string()));
        }

        if let Some((key, value)) = part.split_once(':') {
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                return Err(fail(format!("malformed key:value pair '{part}'")));
            }
            if !in_foreign_key {
                return Err(fail(format!("'{part}' must follow foreignKey")));
            }
            let slot = match key {
                "struct" => &mut target,
                "table" => &mut table,
                "field" => &mut value_field,
                other => return Err(fail(format!("unknown key '{other}'"))),
            };
            if slot.is_some() {
                return Err(fail(format!("repeated key '{key}'")));
            }
            *slot = Some(value.to_string());
            continue;
        }

        match part {
            "omit" => parsed.omit = true,
            "foreignKey" => {
                if in_foreign_key {
                    return Err(fail("repeated foreignKey".to_string()));
                }
                in_foreign_key = true;
            }
            other => return Err(fail(format!("unknown directive '{other}'"))),
        }
    }

    if in_foreign_key {
        let target =
            target.ok_or_else(|| fail("foreignKey requires struct:<TypeName>".to_string()))?;
        parsed.foreign_key = Some(ForeignKeyTag {
            target,
            table,
            field: value_field,
        });
    }

    Ok(parsed)
}

#[cfg(test)]
#[path = "tag_test.rs"]
mod tests;
