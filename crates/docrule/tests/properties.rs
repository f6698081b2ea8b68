use docrule::{
    ContextExtractor, ContextWindow, HighlightMapper, HighlightPattern, Selection, extract_context,
    locate,
};

const REPORT: &str = "Relatório de conformidade\n\n\
    Empresa:   ACME Ltda\n\
    Status:    aprovado\n\
    Observações: nenhuma pendência encontrada em 2024";

#[test]
fn concrete_window_scenario() {
    assert_eq!(
        extract_context("alpha beta gamma delta epsilon", "gamma", 2),
        "beta gamma delta"
    );
}

#[test]
fn selection_with_collapsed_line_break_falls_back_to_itself() {
    let source = "Contrato nº 12/2024 - Anexo";
    let rendered = "Contrato nº\n12/2024 - Anexo I";
    assert_eq!(locate(source, rendered), None);
    assert_eq!(extract_context(source, rendered, 6), rendered);
}

#[test]
fn remapped_end_anchor_highlights_trailing_number() {
    let result = HighlightMapper::new().apply("total: 42", Some(&"\\d+\\Z".into()));
    let spans = result.highlighted_spans();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].slice("total: 42"), "42");
    assert_eq!(spans[0].end, "total: 42".len());
}

#[test]
fn every_verbatim_word_run_round_trips() {
    let words: Vec<&str> = REPORT.split_whitespace().collect();
    for start in 0..words.len() {
        for end in start + 1..=words.len().min(start + 4) {
            let first = REPORT.find(words[start]).unwrap();
            let Some(last) = REPORT[first..].find(words[end - 1]) else {
                continue;
            };
            let verbatim = &REPORT[first..first + last + words[end - 1].len()];
            let span = locate(REPORT, verbatim).expect("verbatim text is located");
            assert_eq!(span.slice(REPORT), verbatim);
        }
    }
}

#[test]
fn window_grows_monotonically_at_boundaries() {
    let extractor = ContextExtractor::default();
    for selected in ["Relatório", "2024", "aprovado"] {
        let selection = Selection::new(selected);
        let mut previous = None;
        for radius in 0..30 {
            let context =
                extractor.extract_with(REPORT, &selection, ContextWindow::from_radius(radius));
            let span = context.span.expect("located");
            assert!(span.end <= REPORT.len());
            if let Some(prev) = previous {
                assert!(span.contains(&prev));
            }
            previous = Some(span);
        }
    }
}

#[test]
fn highlighting_twice_does_not_double_wrap() {
    let pattern = HighlightPattern::from(r"[A-Z][a-z]+:");
    let once = HighlightMapper::new().apply(REPORT, Some(&pattern));
    let twice = once.apply(Some(&pattern));
    assert_eq!(once, twice);
    assert_eq!(twice.text(), REPORT);
}
