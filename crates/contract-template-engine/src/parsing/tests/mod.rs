//! Integration tests for the parsing passes.
//!
//! Fixtures (.html) live in `fixtures/`. Each one is converted to the editable
//! form, checked against the output invariants, and saved back.


use crate::convert::{to_editable, to_stored};
use crate::nodes::{BLOCK_TYPE, DATA_TYPE, RAW_BLOCK_TYPE, VARIABLE_TYPE};
use crate::parsing::{WrapperState, markup::find_marked_elements};

// Fixture-based round-trip tests

#[test]
fn fixture_lease_letter() {
    assert_fixture("lease_letter");
}

#[test]
fn fixture_tenants_table() {
    assert_fixture("tenants_table");
}

#[test]
fn fixture_furniture_list() {
    assert_fixture("furniture_list");
}

#[test]
fn fixture_full_document() {
    assert_fixture("full_document");
}

#[test]
fn fixture_malformed() {
    assert_fixture("malformed");
}

#[test]
fn fixture_nested_blocks() {
    assert_fixture("nested_blocks");
}

fn read_fixture(name: &str) -> String {
    let fixtures_dir = format!("{}/src/parsing/tests/fixtures", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(format!("{fixtures_dir}/{name}.html")).unwrap()
}

fn assert_fixture(name: &str) {
    let stored = read_fixture(name);
    let editable = to_editable(&stored);
    invariants::check(&stored, &editable);

    let saved = to_stored(&editable, &WrapperState::capture(&stored));
    pretty_assertions::assert_eq!(saved, stored, "fixture {name} did not round-trip");
}

fn count(editable: &str, data_type: &str) -> usize {
    find_marked_elements(editable, DATA_TYPE, &[data_type]).len()
}

// Unit counts per fixture

#[test]
fn lease_letter_units() {
    let editable = to_editable(&read_fixture("lease_letter"));
    // landlord.email inside href stays literal
    assert_eq!(count(&editable, VARIABLE_TYPE), 6);
    assert_eq!(count(&editable, BLOCK_TYPE), 3);
    assert_eq!(count(&editable, RAW_BLOCK_TYPE), 0);
    assert!(editable.contains(r#"href="mailto:{{ landlord.email }}""#));
}

#[test]
fn tenants_table_units() {
    let editable = to_editable(&read_fixture("tenants_table"));
    assert_eq!(count(&editable, RAW_BLOCK_TYPE), 1);
    assert_eq!(count(&editable, VARIABLE_TYPE), 1);
    assert_eq!(count(&editable, BLOCK_TYPE), 0);
}

#[test]
fn furniture_list_units() {
    let editable = to_editable(&read_fixture("furniture_list"));
    assert_eq!(count(&editable, RAW_BLOCK_TYPE), 1);
    assert_eq!(count(&editable, BLOCK_TYPE), 2);
}

#[test]
fn full_document_edits_only_the_body() {
    let stored = read_fixture("full_document");
    let editable = to_editable(&stored);
    assert!(!editable.contains("<head>"));
    assert!(editable.starts_with("<p>Between "));
    assert_eq!(count(&editable, RAW_BLOCK_TYPE), 1);

    let edited = editable.replacen("<p>Between ", "<p>Agreement between ", 1);
    let saved = to_stored(&edited, &WrapperState::capture(&stored));
    assert!(saved.starts_with("<!DOCTYPE html>\n<html lang=\"en\">\n<head>"));
    assert!(saved.contains(
        "<body class=\"contract\" data-version=\"3\">\n  <p>Agreement between {{ landlord.name }}"
    ));
    assert!(saved.contains("<div class=\"signature-section\">\n    <p>______________________</p>"));
}

#[test]
fn nested_blocks_units() {
    let editable = to_editable(&read_fixture("nested_blocks"));
    let kinds: Vec<_> = find_marked_elements(&editable, DATA_TYPE, &[RAW_BLOCK_TYPE])
        .iter()
        .filter_map(|el| el.tag.attr("data-raw-kind").map(str::to_string))
        .collect();
    assert_eq!(kinds, vec!["list", "table", "signature"]);
    assert_eq!(count(&editable, BLOCK_TYPE), 0);
    assert_eq!(count(&editable, VARIABLE_TYPE), 1);
}

#[test]
#[should_panic(expected = "direct child of <ul>")]
fn list_markers_tagged_without_isolation_break_the_invariants() {
    let stored = "<ul>{% for i in items %}<li>{{ i }}</li>{% endfor %}</ul>";
    invariants::check(stored, &crate::parsing::tag_inline(stored));
}

#[test]
fn malformed_syntax_is_not_tagged() {
    let editable = to_editable(&read_fixture("malformed"));
    assert_eq!(count(&editable, VARIABLE_TYPE), 0);
    // {% if a < b %}, {% endif %} and the stray {% endfor %} in the unclosed table
    assert_eq!(count(&editable, BLOCK_TYPE), 3);
    assert!(editable.contains("Unclosed {{ tenant.name and {% if x </p>"));
    assert!(editable.contains("<!-- {{ commented.out }} -->"));
}

// Edge cases

#[test]
fn empty_input() {
    assert_eq!(to_editable(""), "");
    assert_eq!(to_stored("", &WrapperState::default()), "");
}

#[test]
fn plain_html_passes_through() {
    let s = "<p>Plain <strong>contract</strong> text.</p>";
    assert_eq!(to_editable(s), s);
}
