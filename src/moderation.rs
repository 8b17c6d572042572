use lazy_static::lazy_static;
use regex::Regex;

/// One pattern rule of the personal-information filter.
struct Rule {
    label: &'static str,
    pattern: Regex,
}

lazy_static! {
    /// Ordered rule list. Order only affects the order of reported labels;
    /// any single match blocks the submission.
    static ref RULES: Vec<Rule> = vec![
        Rule {
            label: "Email detectado",
            pattern: Regex::new(r"(?i)[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap(),
        },
        Rule {
            label: "Número de telefone detectado",
            pattern: Regex::new(r"(\+55\s?)?(\(?\d{2}\)?[\s.-]?)?\d{4,5}[\s.-]?\d{4}").unwrap(),
        },
        Rule {
            label: "Referência ao WhatsApp detectada",
            pattern: Regex::new(r"(?i)whatsapp|wpp|zap|whats").unwrap(),
        },
        Rule {
            label: "CPF detectado",
            pattern: Regex::new(r"\d{3}\.?\d{3}\.?\d{3}-?\d{2}").unwrap(),
        },
    ];
}

/// Scans free text for personal-contact-information leakage and returns the
/// labels of every rule that matched, in rule order. Matching is partial:
/// a rule fires on any occurrence anywhere in the text.
pub fn scan(text: &str) -> Vec<&'static str> {
    RULES
        .iter()
        .filter(|rule| rule.pattern.is_match(text))
        .map(|rule| rule.label)
        .collect()
}

/// Scans several fields at once, deduplicating labels across fields while
/// preserving rule order.
pub fn scan_fields<'a, I>(fields: I) -> Vec<&'static str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut matched = Vec::new();
    for text in fields {
        for label in scan(text) {
            if !matched.contains(&label) {
                matched.push(label);
            }
        }
    }
    // Re-sort into rule order so reports are stable regardless of which
    // field matched first.
    matched.sort_by_key(|l| RULES.iter().position(|r| r.label == *l).unwrap_or(usize::MAX));
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_email_anywhere_in_text() {
        let issues = scan("entre em contato: a@b.com, respondo rápido");
        assert!(issues.contains(&"Email detectado"));
    }

    #[test]
    fn detects_brazilian_phone_formats() {
        for text in [
            "me liga no (11) 98765-4321",
            "telefone 11987654321",
            "+55 11 4002-8922",
        ] {
            let issues = scan(text);
            assert!(
                issues.contains(&"Número de telefone detectado"),
                "should flag: {text}"
            );
        }
    }

    #[test]
    fn detects_messaging_keywords_case_insensitively() {
        for text in ["me chama no WhatsApp", "manda um ZAP", "wpp disponível"] {
            let issues = scan(text);
            assert!(
                issues.contains(&"Referência ao WhatsApp detectada"),
                "should flag: {text}"
            );
        }
    }

    #[test]
    fn detects_cpf_with_and_without_punctuation() {
        assert!(scan("meu CPF é 123.456.789-09").contains(&"CPF detectado"));
        assert!(scan("doc 12345678909").contains(&"CPF detectado"));
    }

    #[test]
    fn clean_text_passes() {
        let issues = scan("Vendo bicicleta aro 29 em ótimo estado, aceito propostas");
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }

    #[test]
    fn reports_multiple_issues_in_rule_order() {
        let issues = scan("email a@b.com e whatsapp");
        assert_eq!(
            issues,
            vec!["Email detectado", "Referência ao WhatsApp detectada"]
        );
    }

    #[test]
    fn scan_fields_dedupes_across_fields() {
        let issues = scan_fields(["fale comigo no whats", "chama no zap"]);
        assert_eq!(issues, vec!["Referência ao WhatsApp detectada"]);
    }

    #[test]
    fn scan_fields_keeps_rule_order_across_fields() {
        // Second field triggers the earlier rule; order must still follow
        // the rule list, not field order.
        let issues = scan_fields(["whatsapp aqui", "escreva para x@y.org"]);
        assert_eq!(
            issues,
            vec!["Email detectado", "Referência ao WhatsApp detectada"]
        );
    }
}
