use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use schema_validator::graph::{SchemaGraph, SchemaId};
use schema_validator::validation::{
    Diagnostic, ExclusionEntry, IgnoreList, Outcome, ResultType, RuleWalker, RunConfig, Severity,
    ValidationOptions, ValidationOrchestrator, render_log,
};

const ECXML_3_2: &str = "http://www.bentley.com/schemas/Bentley.ECXML.3.2";

fn write_schema(dir: &Path, name: &str, version: &str, alias: Option<&str>, body: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let alias = alias.map(|a| format!(r#" alias="{a}""#)).unwrap_or_default();
    let path = dir.join(format!("{name}.{version}.ecschema.xml"));
    fs::write(
        &path,
        format!(
            "<ECSchema schemaName=\"{name}\"{alias} version=\"{version}\" xmlns=\"{ECXML_3_2}\">\n{body}\n</ECSchema>\n"
        ),
    )
    .unwrap();
    path
}

/// Schema with exactly two errors and one warning
fn write_messy_schema(dir: &Path) -> PathBuf {
    write_schema(
        dir,
        "Messy",
        "01.00.00",
        None,
        r#"    <ECEntityClass typeName="lower_thing">
        <ECProperty propertyName="Untyped"/>
    </ECEntityClass>"#,
    )
}

fn run(options: &ValidationOptions) -> schema_validator::validation::ValidationReport {
    ValidationOrchestrator::with_default_rules(RunConfig::default())
        .run(options)
        .unwrap()
}

#[test]
fn clean_single_file_yields_header_and_footer_only() {
    let dir = TempDir::new().unwrap();
    let path = write_schema(
        dir.path(),
        "Tidy",
        "01.00.00",
        Some("tdy"),
        r#"    <ECEntityClass typeName="Thing"><ECProperty propertyName="Name" typeName="string"/></ECEntityClass>"#,
    );

    let report = run(&ValidationOptions::new(&path));
    let results: Vec<_> = report.results().collect();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.result_type == ResultType::Message));
    assert_eq!(results[0].text, "BEGIN VALIDITY CHECK: Tidy");
    assert_eq!(results[1].text, "Succeeded. No rule violations found.");
    assert_eq!(report.outcome(), Outcome::Clean);
}

#[test]
fn directory_with_three_violations_fails() {
    let dir = TempDir::new().unwrap();
    write_messy_schema(dir.path());

    let report = run(&ValidationOptions::new(dir.path()));
    let results: Vec<_> = report.results().collect();

    assert_eq!(results.len(), 4);
    assert_eq!(results[0].result_type, ResultType::Message);
    assert!(
        results[1..]
            .iter()
            .all(|r| r.result_type == ResultType::RuleViolation)
    );
    assert_eq!(report.count(Severity::Warning), 1);
    assert_eq!(report.count(Severity::Error), 2);
    assert_eq!(report.outcome(), Outcome::Failed);
    assert!(!report.outcome().is_success());
}

#[test]
fn validation_log_round_trips() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out");
    fs::create_dir(&output).unwrap();
    let schemas = dir.path().join("schemas");
    write_messy_schema(&schemas);

    let report = run(&ValidationOptions::new(&schemas).with_output(&output));
    let written = fs::read_to_string(output.join("Messy.validation.log")).unwrap();

    assert_eq!(written, render_log(&report.schemas[0]));
    insta::assert_snapshot!(written, @r"
    RuleViolation: Error SV-100: Schema 'Messy' does not declare an alias.
    RuleViolation: Warning SV-200: Class 'Messy.lower_thing' should be named in PascalCase.
    RuleViolation: Error SV-102: Property 'Messy.lower_thing.Untyped' has no type.
    ");
}

#[test]
fn clean_schemas_produce_no_artifacts() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out");
    fs::create_dir(&output).unwrap();
    let schemas = dir.path().join("schemas");
    write_schema(&schemas, "Tidy", "01.00.00", Some("tdy"), "");

    let report = run(&ValidationOptions::new(&schemas).with_output(&output));
    assert!(report.artifacts.is_empty());
    assert_eq!(fs::read_dir(&output).unwrap().count(), 0);
}

/// Counts traversals so tests can prove the walker never ran
#[derive(Default)]
struct CountingWalker {
    calls: usize,
}

impl RuleWalker for CountingWalker {
    fn traverse(
        &mut self,
        _graph: &SchemaGraph,
        _schema: SchemaId,
    ) -> anyhow::Result<Vec<Diagnostic>> {
        self.calls += 1;
        Ok(vec![])
    }
}

#[test]
fn cyclic_references_never_reach_the_walker() {
    let dir = TempDir::new().unwrap();
    write_schema(
        dir.path(),
        "A",
        "01.00.00",
        Some("a"),
        r#"    <ECSchemaReference name="B" version="01.00.00" alias="b"/>"#,
    );
    write_schema(
        dir.path(),
        "B",
        "01.00.00",
        Some("b"),
        r#"    <ECSchemaReference name="A" version="01.00.00" alias="a"/>"#,
    );

    let mut orchestrator =
        ValidationOrchestrator::new(RunConfig::default(), CountingWalker::default());
    let report = orchestrator.run(&ValidationOptions::new(dir.path())).unwrap();

    assert_eq!(orchestrator.walker().calls, 0);
    assert_eq!(report.schemas.len(), 2);
    for schema in &report.schemas {
        let error = schema.results.last().unwrap();
        assert_eq!(error.result_type, ResultType::Error);
        assert!(error.text.contains("Cyclic schema reference detected"), "{}", error.text);
    }
}

#[test]
fn ignore_list_and_standard_schemas_are_not_validated() {
    let dir = TempDir::new().unwrap();
    write_schema(dir.path(), "Units", "01.00.07", Some("u"), "");
    write_schema(dir.path(), "Legacy", "01.00.00", None, "");
    write_schema(dir.path(), "Legacy", "02.00.00", None, "");

    let config = RunConfig::default()
        .with_ignore_list(IgnoreList::new(vec![ExclusionEntry::new("legacy", "01.00.00")]));
    let report = ValidationOrchestrator::with_default_rules(config)
        .run(&ValidationOptions::new(dir.path()))
        .unwrap();

    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.schemas.len(), 1);
    assert_eq!(
        report.schemas[0].path.file_name().unwrap(),
        "Legacy.02.00.00.ecschema.xml"
    );
}

#[test]
fn extra_reference_paths_resolve_external_schemas() {
    let dir = TempDir::new().unwrap();
    let shared = dir.path().join("shared");
    let app = dir.path().join("app");
    write_schema(
        &shared,
        "Common",
        "01.00.04",
        Some("cmn"),
        r#"    <ECEntityClass typeName="Base"/>"#,
    );
    let root = write_schema(
        &app,
        "App",
        "01.00.00",
        Some("app"),
        r#"    <ECSchemaReference name="Common" version="01.00.00" alias="cmn"/>
    <ECEntityClass typeName="Thing"><BaseClass>cmn:Base</BaseClass></ECEntityClass>"#,
    );

    let without = run(&ValidationOptions::new(&root));
    assert_eq!(without.outcome(), Outcome::Failed);

    let with = run(&ValidationOptions::new(&root).with_reference_path(&shared));
    assert_eq!(with.outcome(), Outcome::Clean);
}
