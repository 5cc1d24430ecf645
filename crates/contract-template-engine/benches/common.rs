// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_contract_fragment(clauses: usize) -> String {
    let clause = concat!(
        "<h2>Clause</h2>\n",
        "<p>The tenant {{ tenant.name }} pays {{ rental_value | currency }} on day {{ lease.due_day }}.</p>\n",
        "{% if lease.has_guarantor %}<p>Guarantor: {{ guarantor.name | upper }}</p>{% endif %}\n",
        "<table><tr>{% for f in furniture %}<td>{{ f.name }}</td><td>{{ f.condition }}</td>{% endfor %}</tr></table>\n",
        "<ul>\n  {% for r in rules %}<li>{{ r.text }}</li>{% endfor %}\n</ul>\n",
        "<div class=\"page-break\" />\n",
    );
    clause.repeat(clauses)
}

#[allow(dead_code)]
pub fn generate_full_document(clauses: usize) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><style>body {{ font-family: serif; }}</style></head>\n<body class=\"contract\">\n{}<div class=\"signature-section\"><p>{{{{ landlord.name }}}}</p></div>\n</body>\n</html>\n",
        generate_contract_fragment(clauses)
    )
}
