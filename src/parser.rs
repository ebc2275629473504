use crate::error::{FamilyTreeError, Result, describe_person};
use crate::ir::PersonRecord;
use serde_json::Value;

/// Parses a family forest from JSON (JSON5 is accepted as a fallback).
///
/// The document is either an array of root persons or a single root person.
/// Structural problems are reported against the offending person rather than
/// as a bare line/column from the deserializer.
pub fn parse_family(input: &str) -> Result<Vec<PersonRecord>> {
    let value = parse_value(input)?;
    let roots = match value {
        Value::Array(items) => items,
        Value::Object(_) => vec![value],
        other => {
            return Err(FamilyTreeError::Input(format!(
                "expected an array of persons, found {}",
                kind_of(&other)
            )));
        }
    };

    for root in &roots {
        validate_person(root)?;
    }

    serde_json::from_value(Value::Array(roots)).map_err(|err| FamilyTreeError::Input(err.to_string()))
}

fn parse_value(input: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(input) {
        Ok(value) => Ok(value),
        Err(json_err) => json5::from_str::<Value>(input)
            .map_err(|_| FamilyTreeError::Input(json_err.to_string())),
    }
}

fn validate_person(value: &Value) -> Result<()> {
    let Value::Object(map) = value else {
        return Err(FamilyTreeError::Input(format!(
            "expected a person object, found {}",
            kind_of(value)
        )));
    };
    let who = || {
        let id = map.get("id").and_then(id_text);
        let name = map.get("name").and_then(Value::as_str).unwrap_or_default();
        describe_person(id.as_deref(), name)
    };

    if let Some(id) = map.get("id")
        && !(id.is_null() || id.is_string() || id.is_number())
    {
        return Err(malformed(who(), "id", "a string or a number"));
    }
    if let Some(name) = map.get("name")
        && !(name.is_null() || name.is_string())
    {
        return Err(malformed(who(), "name", "a string"));
    }
    if let Some(age) = map.get("age")
        && !(age.is_null() || age.is_number())
    {
        return Err(malformed(who(), "age", "a number"));
    }

    if let Some(children) = map.get("children") {
        let Some(children) = list_or_null(children) else {
            return Err(malformed(who(), "children", "an array"));
        };
        for child in children {
            validate_person(child)?;
        }
    }

    if let Some(marriages) = map.get("marriages") {
        let Some(marriages) = list_or_null(marriages) else {
            return Err(malformed(who(), "marriages", "an array"));
        };
        for (ordinal, marriage) in marriages.iter().enumerate() {
            let Value::Object(marriage) = marriage else {
                return Err(malformed(who(), "marriages", "an array of objects"));
            };
            match marriage.get("spouse") {
                Some(spouse @ Value::Object(_)) => validate_person(spouse)?,
                _ => {
                    return Err(FamilyTreeError::MissingSpouse {
                        person: who(),
                        ordinal,
                    });
                }
            }
            if let Some(children) = marriage.get("children") {
                let Some(children) = list_or_null(children) else {
                    return Err(malformed(who(), "marriages[].children", "an array"));
                };
                for child in children {
                    validate_person(child)?;
                }
            }
        }
    }

    Ok(())
}

fn list_or_null(value: &Value) -> Option<&[Value]> {
    match value {
        Value::Array(items) => Some(items.as_slice()),
        Value::Null => Some(&[]),
        _ => None,
    }
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn malformed(person: String, field: &'static str, expected: &'static str) -> FamilyTreeError {
    FamilyTreeError::MalformedRecord {
        person,
        field,
        expected,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
