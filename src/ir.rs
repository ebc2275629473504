use serde::{Deserialize, Deserializer, Serialize};

/// One person in the input forest.
///
/// Records are read-only for the reconciler: nothing is ever written back to
/// the caller's data. A repeated `id` means "the same individual", which is how
/// shared ancestors, in-laws and remarriages across branches are expressed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    #[serde(default, deserialize_with = "deserialize_person_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
    #[serde(default, alias = "class", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PersonRecord>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub marriages: Vec<MarriageRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarriageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spouse: Option<Box<PersonRecord>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub divorced: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PersonRecord>,
}

impl PersonRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn anonymous(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_child(mut self, child: PersonRecord) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_marriage(mut self, marriage: MarriageRecord) -> Self {
        self.marriages.push(marriage);
        self
    }

    pub fn with_age(mut self, age: f64) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }
}

impl MarriageRecord {
    pub fn to(spouse: PersonRecord) -> Self {
        Self {
            spouse: Some(Box::new(spouse)),
            ..Default::default()
        }
    }

    pub fn with_child(mut self, child: PersonRecord) -> Self {
        self.children.push(child);
        self
    }

    pub fn divorced(mut self) -> Self {
        self.divorced = true;
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Integer(i64),
    Number(f64),
    String(String),
}

impl NumberOrString {
    fn into_id(self) -> String {
        match self {
            NumberOrString::Integer(val) => val.to_string(),
            NumberOrString::Number(val) => format!("{}", val),
            NumberOrString::String(val) => val,
        }
    }
}

pub(crate) fn deserialize_person_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrString>::deserialize(deserializer)?;
    Ok(raw.map(NumberOrString::into_id))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_normalize_to_strings() {
        let people: Vec<PersonRecord> =
            serde_json::from_str(r#"[{"id": 4, "name": "A"}, {"id": "x", "name": "B"}, {"name": "C"}]"#)
                .unwrap();
        assert_eq!(people[0].id.as_deref(), Some("4"));
        assert_eq!(people[1].id.as_deref(), Some("x"));
        assert_eq!(people[2].id, None);
    }

    #[test]
    fn class_alias_is_accepted() {
        let person: PersonRecord =
            serde_json::from_str(r#"{"name": "A", "class": "woman", "textClass": "big"}"#).unwrap();
        assert_eq!(person.class_name.as_deref(), Some("woman"));
        assert_eq!(person.text_class.as_deref(), Some("big"));
    }

    #[test]
    fn null_fields_read_as_empty() {
        let person: PersonRecord =
            serde_json::from_str(r#"{"name": null, "children": null, "marriages": null}"#).unwrap();
        assert_eq!(person, PersonRecord::default());
    }

    #[test]
    fn marriage_spouse_is_optional_at_parse_time() {
        let person: PersonRecord =
            serde_json::from_str(r#"{"name": "A", "marriages": [{"divorced": true}]}"#).unwrap();
        assert!(person.marriages[0].spouse.is_none());
        assert!(person.marriages[0].divorced);
    }
}
