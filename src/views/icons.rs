/// Broad family of a column type tag, used to pick its icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Real,
    Text,
    Temporal,
    Boolean,
    Binary,
    Other,
}

// Checked in order, first match wins: "INTERVAL" is an integer, "DATETIME" is temporal.
const RULES: &[(TypeCategory, &[&str])] = &[
    (TypeCategory::Integer, &["INT"]),
    (TypeCategory::Real, &["REAL", "FLOAT", "DOUBLE"]),
    (TypeCategory::Text, &["TEXT", "CHAR", "STRING"]),
    (TypeCategory::Temporal, &["DATE", "TIME"]),
    (TypeCategory::Boolean, &["BOOL"]),
    (TypeCategory::Binary, &["BLOB"]),
];

impl TypeCategory {
    pub fn classify(type_tag: &str) -> Self {
        let upper = type_tag.to_uppercase();
        RULES
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| upper.contains(n)))
            .map(|(category, _)| *category)
            .unwrap_or(TypeCategory::Other)
    }

    pub fn icon(&self) -> &'static str {
        match self {
            TypeCategory::Integer => "🔢",
            TypeCategory::Real => "💯",
            TypeCategory::Text => "📝",
            TypeCategory::Temporal => "📅",
            TypeCategory::Boolean => "✓",
            TypeCategory::Binary => "📦",
            TypeCategory::Other => "📊",
        }
    }
}

pub fn type_icon(type_tag: &str) -> &'static str {
    TypeCategory::classify(type_tag).icon()
}
