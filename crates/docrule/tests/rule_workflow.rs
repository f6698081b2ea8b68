use std::time::Duration;

use anyhow::Result;
use docrule::app::rules::{PatternRequest, PatternService, RuleWorkflow};
use docrule::domain::model::{GeneratedRule, Selection};
use docrule::infra::cache::QueryCache;
use docrule::infra::config::Config;

const CONTRACT: &str = "CONTRATO DE PRESTAÇÃO DE SERVIÇOS\n\n\
Contratante: ACME Ltda, CNPJ 12.345.678/0001-90\n\
Contratada: Beta Serviços S.A., CNPJ 98.765.432/0001-10\n\n\
Valor mensal: R$ 4.500,00";

/// Stand-in for the pattern generation backend, keyed on the request label.
struct FixedPatterns;

impl PatternService for FixedPatterns {
    fn generate(&self, request: &PatternRequest) -> Result<GeneratedRule> {
        assert!(!request.context.is_empty(), "context must be attached");
        let pattern = match request.key.as_str() {
            "cnpj" => r"\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}",
            "valor" => r"R\$ [\d.]+,\d{2}\Z",
            other => anyhow::bail!("no pattern for {other}"),
        };
        Ok(GeneratedRule {
            id: 1,
            user_id: 7,
            document_id: 42,
            name: request.key.clone(),
            is_section: request.is_section,
            pattern: pattern.into(),
            created_at: "2024-05-01T12:00:00Z".into(),
        })
    }
}

fn workflow() -> RuleWorkflow<FixedPatterns> {
    let mut config = Config::default();
    config.extraction.context_radius = 4;
    RuleWorkflow::with_cache(FixedPatterns, &config, QueryCache::new(Duration::from_secs(60)))
}

#[test]
fn selections_become_highlighted_template() -> Result<()> {
    let mut workflow = workflow();

    // The rendered view collapses the line break between the two parties.
    let rendered = Selection::new("12.345.678/0001-90 Contratada:");
    let example = workflow
        .confirm_selection(CONTRACT, "cnpj", &rendered)?
        .expect("new example");
    assert_eq!(
        example.context,
        "Ltda, CNPJ 12.345.678/0001-90\nContratada: Beta Serviços"
    );

    workflow.confirm_selection(CONTRACT, "valor", &Selection::new("R$ 4.500,00"))?;

    workflow.generate_rule("cnpj")?;
    workflow.generate_rule("valor")?;

    let highlighted = workflow.highlight_all(CONTRACT);
    let marked: Vec<_> = highlighted
        .highlighted_spans()
        .into_iter()
        .map(|span| span.slice(CONTRACT))
        .collect();
    assert_eq!(
        marked,
        ["12.345.678/0001-90", "98.765.432/0001-10", "R$ 4.500,00"]
    );
    assert_eq!(highlighted.text(), CONTRACT);

    let template = workflow.build_template("Contrato de serviços")?;
    assert_eq!(template.rules, ["cnpj", "valor"]);
    Ok(())
}

#[test]
fn unlocated_selection_keeps_raw_text_as_context() -> Result<()> {
    let mut workflow = workflow();
    let selection = Selection::new("Valor anual: R$ 54.000,00");

    let example = workflow
        .confirm_selection(CONTRACT, "valor", &selection)?
        .expect("new example");
    assert_eq!(example.context, "Valor anual: R$ 54.000,00");
    Ok(())
}
