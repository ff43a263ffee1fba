use super::FieldCodeSpec;

/// Builds a `<format>` instruction pattern: a comma-separated list of
/// upper-case flags wrapped in `<format>...</format>` that contains `keyword`.
fn format_instruction(keyword: &str) -> String {
    format!(
        "(<format>){{1}}([A-Z]+[,]{{1}})*({}){{1}}([,]{{1}}[A-Z]+)*(</format>){{1}}",
        keyword
    )
}

/// Field codes searched for when no catalog is configured.
pub fn builtin_field_codes() -> Vec<FieldCodeSpec> {
    vec![
        FieldCodeSpec::literal("<FC", "Field Code"),
        FieldCodeSpec::literal("<FC>Name Block", "Name Block"),
        FieldCodeSpec::literal("<RQ", "Required Question (RQ)"),
        FieldCodeSpec::literal("<RS", "Required Sentence (RS)"),
        FieldCodeSpec::literal("<YR", "Your Reference (YR)"),
        FieldCodeSpec::literal("<SA", "Start Address (SA)"),
        FieldCodeSpec::literal("<OP", "Optional Paragraph (OP)"),
        FieldCodeSpec::literal("<RD", "Required Date (RD)"),
        FieldCodeSpec::literal("<TT", "Time Type (TT)"),
        FieldCodeSpec::literal("<TU", "Time Units (TU)"),
        FieldCodeSpec::literal("<DR", "Document Reference (DR)"),
        FieldCodeSpec::literal("<HD", "Stationery Template (HD)"),
        FieldCodeSpec::literal("<HQ", "Stationery Template (HQ)"),
        FieldCodeSpec::literal("<PH", "Imported Paragraph (PH)"),
        FieldCodeSpec::literal("<DL>", "Delete Line (DL)"),
        FieldCodeSpec::regex(format_instruction("DeleteWord"), "Delete Word"),
        FieldCodeSpec::regex(format_instruction("delt"), "Delete Table Row (delt)"),
        FieldCodeSpec::regex(format_instruction("AddAnd"), "Add And"),
        FieldCodeSpec::regex(format_instruction("AddOf"), "Add Of"),
    ]
}
