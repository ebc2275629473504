use thiserror::Error;

#[derive(Debug, Error)]
pub enum FamilyTreeError {
    #[error("invalid family data: {0}")]
    Input(String),

    #[error("{person}: `{field}` must be {expected}")]
    MalformedRecord {
        person: String,
        field: &'static str,
        expected: &'static str,
    },

    #[error("{person}: marriage #{ordinal} has no spouse")]
    MissingSpouse { person: String, ordinal: usize },

    #[error("{person}: marriage #{ordinal} names the person as their own spouse")]
    SelfMarriage { person: String, ordinal: usize },

    #[error("{person} is reachable from itself ({path})")]
    CyclicReference { person: String, path: String },

    #[error("union {source_id} -> {target_id} (#{ordinal}) references `{missing}`, which is not in the layout")]
    DanglingUnion {
        source_id: String,
        target_id: String,
        ordinal: usize,
        missing: String,
    },

    #[error("failed to measure node {node}: {message}")]
    Measurement { node: String, message: String },

    #[error("failed to render node {node}: {message}")]
    Render { node: String, message: String },

    #[error("flat import: {0}")]
    Import(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FamilyTreeError>;

/// Human readable handle for a person used in error messages.
pub(crate) fn describe_person(id: Option<&str>, name: &str) -> String {
    match (id, name.trim()) {
        (Some(id), "") => format!("person `{id}`"),
        (Some(id), name) => format!("person `{id}` ({name})"),
        (None, "") => "anonymous person".to_string(),
        (None, name) => format!("anonymous person ({name})"),
    }
}
