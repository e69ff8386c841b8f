/// Foundational schemas shipped with the platform. They are resolved like any
/// other reference but never rule-walked or reported on.
pub const STANDARD_SCHEMAS: &[&str] = &[
    "Bentley_Common_Classes",
    "Bentley_Standard_Classes",
    "Bentley_Standard_CustomAttributes",
    "BentleyDesignLinks",
    "CoreCustomAttributes",
    "ECDbFileInfo",
    "ECDbMap",
    "ECDbMeta",
    "ECDbSchemaPolicies",
    "ECDbSystem",
    "ECv3ConversionAttributes",
    "EditorCustomAttributes",
    "Formats",
    "SchemaLocalizationCustomAttributes",
    "Units",
];

pub fn is_standard_schema(name: &str) -> bool {
    STANDARD_SCHEMAS
        .iter()
        .any(|standard| standard.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_names_match_case_insensitively() {
        assert!(is_standard_schema("units"));
        assert!(is_standard_schema("CoreCustomAttributes"));
        assert!(!is_standard_schema("BisCore"));
    }
}
