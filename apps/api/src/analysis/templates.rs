//! Prompt Template Store and Prompt Formatter.
//!
//! Every template body is parsed once when the registry is built, so a
//! malformed placeholder fails at startup and a missing value fails with the
//! template and placeholder named.

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;
use tracing::debug;

use crate::analysis::prompts::*;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("Template '{template}' has an unmatched '{brace}' at byte {position}")]
    UnbalancedBrace {
        template: String,
        brace: char,
        position: usize,
    },

    #[error("Template '{template}' has an invalid placeholder '{{{name}}}'")]
    InvalidPlaceholder { template: String, name: String },

    #[error("Template '{template}' requires a value for '{{{placeholder}}}'")]
    MissingValue {
        template: String,
        placeholder: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed template and the placeholders it requires.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    key: String,
    segments: Vec<Segment>,
    required: BTreeSet<String>,
}

impl PromptTemplate {
    pub fn parse(key: &str, body: &str) -> Result<Self, PromptError> {
        let segments = parse_segments(key, body)?;
        let required = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Placeholder(name) => Some(name.clone()),
                Segment::Literal(_) => None,
            })
            .collect();
        Ok(Self {
            key: key.to_string(),
            segments,
            required,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    /// Substitutes every placeholder. Values the template does not use are ignored.
    pub fn render(&self, values: &HashMap<&str, &str>) -> Result<String, PromptError> {
        if let Some(missing) = self
            .required
            .iter()
            .find(|name| !values.contains_key(name.as_str()))
        {
            return Err(PromptError::MissingValue {
                template: self.key.clone(),
                placeholder: missing.clone(),
            });
        }

        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                // presence checked above
                Segment::Placeholder(name) => out.push_str(values.get(name.as_str()).unwrap_or(&"")),
            }
        }
        Ok(out)
    }
}

fn parse_segments(key: &str, body: &str) -> Result<Vec<Segment>, PromptError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = body.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                literal.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, nc) in chars.by_ref() {
                    if nc == '}' {
                        closed = true;
                        break;
                    }
                    name.push(nc);
                }
                if !closed {
                    return Err(PromptError::UnbalancedBrace {
                        template: key.to_string(),
                        brace: '{',
                        position: pos,
                    });
                }
                if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(PromptError::InvalidPlaceholder {
                        template: key.to_string(),
                        name,
                    });
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(name));
            }
            '}' => {
                return Err(PromptError::UnbalancedBrace {
                    template: key.to_string(),
                    brace: '}',
                    position: pos,
                });
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Read-only registry of analysis templates, shared by all requests.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: Vec<PromptTemplate>,
    fallback: PromptTemplate,
}

impl TemplateRegistry {
    /// Builds the registry of built-in templates, validating every body.
    pub fn builtin() -> Result<Self, PromptError> {
        let templates = [
            (REAL_ESTATE_SALE_REVIEW, REAL_ESTATE_SALE_REVIEW_TEMPLATE),
            (CONTRACT_SUMMARY, CONTRACT_SUMMARY_TEMPLATE),
            (RISK_ASSESSMENT, RISK_ASSESSMENT_TEMPLATE),
            (LEGAL_COMPLIANCE_CHECK, LEGAL_COMPLIANCE_CHECK_TEMPLATE),
            (CUSTOM_QUERY, CUSTOM_QUERY_TEMPLATE),
        ]
        .into_iter()
        .map(|(key, body)| PromptTemplate::parse(key, body))
        .collect::<Result<Vec<_>, _>>()?;

        for template in &templates {
            debug!(template = template.key(), required = ?template.required(), "Template loaded");
        }

        Ok(Self {
            templates,
            fallback: PromptTemplate::parse("fallback", FALLBACK_TEMPLATE)?,
        })
    }

    /// Labels with a dedicated template, in display order.
    pub fn labels(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.key()).collect()
    }

    /// The template for `analysis_type`, or the generic fallback.
    pub fn get(&self, analysis_type: &str) -> &PromptTemplate {
        self.templates
            .iter()
            .find(|t| t.key() == analysis_type)
            .unwrap_or(&self.fallback)
    }

    /// Formats the prompt for one analysis.
    ///
    /// `content` and `custom_query` (empty when absent) are always supplied;
    /// `extra` values are added on top and win on a name clash.
    pub fn format(
        &self,
        analysis_type: &str,
        content: &str,
        custom_query: Option<&str>,
        extra: &HashMap<&str, &str>,
    ) -> Result<String, PromptError> {
        let mut values: HashMap<&str, &str> = HashMap::new();
        values.insert("content", content);
        values.insert("custom_query", custom_query.unwrap_or(""));
        values.extend(extra.iter().map(|(k, v)| (*k, *v)));

        self.get(analysis_type).render(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TemplateRegistry {
        TemplateRegistry::builtin().unwrap()
    }

    fn instructions(text: &str) -> HashMap<&str, &str> {
        HashMap::from([("instructions", text)])
    }

    fn has_unresolved_placeholder(text: &str) -> bool {
        let mut rest = text;
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            if let Some(end) = after.find('}') {
                let inner = &after[..end];
                if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return true;
                }
            }
            rest = after;
        }
        false
    }

    #[test]
    fn test_builtin_registry_has_all_labels() {
        let r = registry();
        let labels = r.labels();
        assert_eq!(
            labels,
            vec![
                "Avaliação de Contrato de Compra e Venda de Imóveis",
                "Contract Summary",
                "Risk Assessment",
                "Legal Compliance Check",
                "Custom Query",
            ]
        );
    }

    #[test]
    fn test_every_label_formats_completely() {
        let r = registry();
        let content = "CLAUSE 1. The seller transfers the property.";
        for label in r.labels() {
            let prompt = r
                .format(label, content, Some("Who pays the taxes?"), &instructions("be brief"))
                .unwrap();
            assert!(prompt.contains(content), "content missing for {label}");
            assert!(!has_unresolved_placeholder(&prompt), "placeholder left in {label}");
        }
    }

    #[test]
    fn test_unknown_label_uses_fallback() {
        let prompt = registry()
            .format("Tax Review", "X", None, &HashMap::new())
            .unwrap();
        assert_eq!(prompt, "Please analyze the following contract: X");
    }

    #[test]
    fn test_risk_assessment_includes_instructions() {
        let prompt = registry()
            .format(
                RISK_ASSESSMENT,
                "X",
                None,
                &instructions("focus on termination"),
            )
            .unwrap();
        assert!(prompt.contains("X"));
        assert!(prompt.contains("focus on termination"));
        assert!(prompt.starts_with("focus on termination"));
    }

    #[test]
    fn test_custom_query_defaults_to_empty() {
        let prompt = registry()
            .format(CUSTOM_QUERY, "Body", None, &instructions(""))
            .unwrap();
        assert!(prompt.contains("specific question:\n\n\n\nContract:"));
    }

    #[test]
    fn test_custom_query_is_substituted() {
        let prompt = registry()
            .format(CUSTOM_QUERY, "Body", Some("Is there a penalty?"), &instructions(""))
            .unwrap();
        assert!(prompt.contains("Is there a penalty?"));
    }

    #[test]
    fn test_missing_instructions_is_reported() {
        let err = registry()
            .format(CONTRACT_SUMMARY, "Body", None, &HashMap::new())
            .unwrap_err();
        assert_eq!(
            err,
            PromptError::MissingValue {
                template: CONTRACT_SUMMARY.to_string(),
                placeholder: "instructions".to_string(),
            }
        );
        assert!(err.to_string().contains("{instructions}"));
    }

    #[test]
    fn test_real_estate_template_uses_instructions() {
        let r = registry();
        let template = r.get(REAL_ESTATE_SALE_REVIEW);
        assert!(template.required().contains("instructions"));
        assert!(template.required().contains("content"));

        let prompt = r
            .format(REAL_ESTATE_SALE_REVIEW, "Contrato X", None, &instructions("foco no prazo"))
            .unwrap();
        assert!(prompt.contains("foco no prazo"));
        assert!(prompt.contains("Contrato X"));
    }

    #[test]
    fn test_extra_values_override_and_unused_are_ignored() {
        let extra = HashMap::from([("content", "override"), ("unused", "ignored")]);
        let prompt = registry().format("anything", "original", None, &extra).unwrap();
        assert_eq!(prompt, "Please analyze the following contract: override");
    }

    #[test]
    fn test_escaped_braces_are_literal() {
        let t = PromptTemplate::parse("json", "Return {{\"a\": {value}}}").unwrap();
        let out = t.render(&HashMap::from([("value", "1")])).unwrap();
        assert_eq!(out, "Return {\"a\": 1}");
        assert_eq!(t.required().len(), 1);
    }

    #[test]
    fn test_content_with_braces_is_not_reinterpreted() {
        let prompt = registry()
            .format("anything", "price {amount} due", None, &HashMap::new())
            .unwrap();
        assert!(prompt.ends_with("price {amount} due"));
    }

    #[test]
    fn test_unbalanced_braces_fail_at_parse() {
        let err = PromptTemplate::parse("bad", "Hello {name").unwrap_err();
        assert!(matches!(err, PromptError::UnbalancedBrace { brace: '{', .. }));

        let err = PromptTemplate::parse("bad", "Hello }").unwrap_err();
        assert!(matches!(err, PromptError::UnbalancedBrace { brace: '}', position: 6, .. }));
    }

    #[test]
    fn test_invalid_placeholder_names_fail_at_parse() {
        assert!(matches!(
            PromptTemplate::parse("bad", "Hello {}"),
            Err(PromptError::InvalidPlaceholder { .. })
        ));
        assert!(matches!(
            PromptTemplate::parse("bad", "Hello {first name}"),
            Err(PromptError::InvalidPlaceholder { .. })
        ));
    }
}
