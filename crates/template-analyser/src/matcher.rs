use serde::Serialize;

use crate::catalog::{FieldCodeCatalog, FieldCodePattern};

/// How many times one field code occurred in one template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCodeCount {
    pub label: String,
    pub count: usize,
}

impl FieldCodeCount {
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Counts non-overlapping, case-insensitive occurrences of `pattern` in `text`.
pub fn count_matches(text: &str, pattern: &FieldCodePattern) -> usize {
    pattern.regex().find_iter(text).count()
}

/// Runs every catalog entry against `text`, in catalog order.
///
/// Zero counts are kept: the table builder relies on every searched label
/// being present.
pub fn analyse_text(text: &str, catalog: &FieldCodeCatalog) -> Vec<FieldCodeCount> {
    catalog
        .iter()
        .map(|pattern| FieldCodeCount::new(pattern.label(), count_matches(text, pattern)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldCodeSpec;

    fn catalog(specs: &[FieldCodeSpec]) -> FieldCodeCatalog {
        FieldCodeCatalog::new(specs).unwrap()
    }

    struct MatchTestCase {
        name: &'static str,
        spec: FieldCodeSpec,
        text: &'static str,
        expected: usize,
    }

    fn match_cases() -> Vec<MatchTestCase> {
        vec![
            MatchTestCase {
                name: "literal_absent",
                spec: FieldCodeSpec::literal("<RQ", "RQ"),
                text: "no markers here",
                expected: 0,
            },
            MatchTestCase {
                name: "literal_repeated",
                spec: FieldCodeSpec::literal("<FC", "FC"),
                text: "<FC>a<FC>b<fc>c",
                expected: 3,
            },
            MatchTestCase {
                name: "literal_non_overlapping",
                spec: FieldCodeSpec::literal("aa", "AA"),
                text: "aaaa",
                expected: 2,
            },
            MatchTestCase {
                name: "literal_regex_metacharacters",
                spec: FieldCodeSpec::literal("a.b", "Dot"),
                text: "a.b axb A.B",
                expected: 2,
            },
            MatchTestCase {
                name: "empty_text",
                spec: FieldCodeSpec::literal("<SA", "SA"),
                text: "",
                expected: 0,
            },
            MatchTestCase {
                name: "regex_format_instruction",
                spec: FieldCodeSpec::regex(
                    "(<format>){1}([A-Z]+[,]{1})*(DeleteWord){1}([,]{1}[A-Z]+)*(</format>){1}",
                    "Delete Word",
                ),
                text: "<format>DeleteWord</format> x <format>UPPER,DeleteWord,BOLD</format> \
                       <format>UPPER</format>",
                expected: 2,
            },
            MatchTestCase {
                name: "regex_case_insensitive",
                spec: FieldCodeSpec::regex("(<format>){1}(AddOf){1}(</format>){1}", "Add Of"),
                text: "<FORMAT>addof</FORMAT>",
                expected: 1,
            },
        ]
    }

    #[test]
    fn test_count_matches_table() {
        for case in match_cases() {
            let catalog = catalog(std::slice::from_ref(&case.spec));
            let pattern = catalog.iter().next().unwrap();
            assert_eq!(
                count_matches(case.text, pattern),
                case.expected,
                "Test '{}' failed",
                case.name
            );
        }
    }

    #[test]
    fn test_analyse_text_counts_each_label() {
        let catalog = catalog(&[
            FieldCodeSpec::literal("<FC", "Field Code"),
            FieldCodeSpec::literal("<RQ", "Required Question"),
        ]);

        let counts = analyse_text("<FC>foo<FC>bar<RQ>baz", &catalog);

        assert_eq!(
            counts,
            vec![
                FieldCodeCount::new("Field Code", 2),
                FieldCodeCount::new("Required Question", 1),
            ]
        );
    }

    #[test]
    fn test_analyse_text_keeps_zero_counts() {
        let catalog = catalog(&[
            FieldCodeSpec::literal("<FC", "Field Code"),
            FieldCodeSpec::literal("<OP", "Optional Paragraph"),
        ]);

        let counts = analyse_text("<FC>only", &catalog);

        assert_eq!(counts.len(), 2);
        assert_eq!(counts[1], FieldCodeCount::new("Optional Paragraph", 0));
    }

    #[test]
    fn test_prefix_patterns_both_count() {
        // "<FC>Name Block" also contains "<FC"
        let catalog = FieldCodeCatalog::builtin().unwrap();
        let counts = analyse_text("<FC>Name Block and <FC>Other", &catalog);

        let get = |label: &str| counts.iter().find(|c| c.label == label).unwrap().count;
        assert_eq!(get("Field Code"), 2);
        assert_eq!(get("Name Block"), 1);
        assert_eq!(get("Delete Line (DL)"), 0);
    }
}
