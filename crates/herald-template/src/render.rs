// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Placeholder substitution for notification templates.
//!
//! Rendering never fails. Missing required variables are reported in the
//! result and the caller decides whether dispatch may proceed.

use std::collections::HashMap;

use herald_core::types::NotificationTemplate;

/// Result of rendering a template against a variable map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Rendered subject; `None` when the template has none.
    pub subject: Option<String>,
    pub body: String,
    /// Names of required variables that were neither supplied nor defaulted.
    /// Non-empty means the caller must not dispatch.
    pub missing_variables: Vec<String>,
}

impl Rendered {
    pub fn is_complete(&self) -> bool {
        self.missing_variables.is_empty()
    }
}

/// Fill `{{name}}` placeholders in subject and body.
///
/// Resolution per declared variable: a supplied value wins; an absent value
/// falls back to the declared default (required or not); a required variable
/// with neither is recorded in `missing_variables`. Placeholders with no
/// matching declared variable are left verbatim.
pub fn render(template: &NotificationTemplate, variables: &HashMap<String, String>) -> Rendered {
    let mut missing_variables = Vec::new();
    let mut resolved: Vec<(&str, &str)> = Vec::with_capacity(template.variables.len());

    for declared in &template.variables {
        match variables.get(&declared.name) {
            Some(value) => resolved.push((&declared.name, value)),
            None => match declared.default_value.as_deref() {
                Some(default) => resolved.push((&declared.name, default)),
                None if declared.required => missing_variables.push(declared.name.clone()),
                None => {}
            },
        }
    }

    let mut subject = template.subject.clone();
    let mut body = template.body.clone();

    for (name, value) in resolved {
        let placeholder = format!("{{{{{name}}}}}");
        if let Some(s) = subject.as_mut() {
            *s = s.replace(&placeholder, value);
        }
        body = body.replace(&placeholder, value);
    }

    Rendered {
        subject,
        body,
        missing_variables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use herald_core::types::{Channel, TemplateKind, TemplateVariable};
    use proptest::prelude::*;

    fn order_template() -> NotificationTemplate {
        NotificationTemplate {
            id: "order-confirm-email".into(),
            name: "Order Confirmation Email".into(),
            kind: TemplateKind::OrderConfirmation,
            channel: Channel::Email,
            subject: Some("Order {{orderId}}".into()),
            body: "Hi {{name}}".into(),
            variables: vec![
                TemplateVariable::required("name", "Customer name"),
                TemplateVariable::required("orderId", "Order id"),
            ],
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn missing_required_variable_is_reported() {
        let rendered = render(&order_template(), &vars(&[("name", "Ana")]));
        assert_eq!(rendered.missing_variables, vec!["orderId".to_string()]);
        assert!(!rendered.is_complete());
        assert_eq!(rendered.body, "Hi Ana");
        // The unresolved placeholder stays verbatim.
        assert_eq!(rendered.subject.as_deref(), Some("Order {{orderId}}"));
    }

    #[test]
    fn all_required_supplied_renders_completely() {
        let rendered = render(
            &order_template(),
            &vars(&[("name", "Ana"), ("orderId", "A-1009")]),
        );
        assert!(rendered.is_complete());
        assert_eq!(rendered.subject.as_deref(), Some("Order A-1009"));
        assert_eq!(rendered.body, "Hi Ana");
    }

    #[test]
    fn default_value_fills_absent_variable() {
        let mut template = order_template();
        template.body = "Hi {{name}}, {{note}}".into();
        template
            .variables
            .push(TemplateVariable::optional("note", "Extra note", Some("see you soon")));

        let rendered = render(&template, &vars(&[("name", "Ana"), ("orderId", "A-1")]));
        assert!(rendered.is_complete());
        assert_eq!(rendered.body, "Hi Ana, see you soon");
    }

    #[test]
    fn required_variable_with_default_is_not_missing() {
        let mut template = order_template();
        template.variables = vec![TemplateVariable {
            name: "name".into(),
            description: "Customer name".into(),
            required: true,
            default_value: Some("customer".into()),
        }];

        let rendered = render(&template, &HashMap::new());
        assert!(rendered.is_complete());
        assert_eq!(rendered.body, "Hi customer");
    }

    #[test]
    fn every_occurrence_is_replaced() {
        let mut template = order_template();
        template.body = "{{name}} and {{name}} again".into();

        let rendered = render(
            &template,
            &vars(&[("name", "Ana"), ("orderId", "A-1")]),
        );
        assert_eq!(rendered.body, "Ana and Ana again");
    }

    #[test]
    fn undeclared_placeholder_is_left_verbatim() {
        let mut template = order_template();
        template.body = "Hi {{name}}, code {{mystery}}".into();

        let rendered = render(
            &template,
            &vars(&[("name", "Ana"), ("orderId", "A-1"), ("mystery", "42")]),
        );
        // "mystery" is supplied but not declared, so it is not substituted.
        assert_eq!(rendered.body, "Hi Ana, code {{mystery}}");
    }

    proptest! {
        /// Whatever subset of variables is supplied, the missing set is
        /// exactly the required-without-default names that were left out,
        /// and every supplied declared placeholder disappears from output.
        #[test]
        fn missing_set_matches_omitted_required(supply_name in any::<bool>(), supply_order in any::<bool>()) {
            let template = order_template();
            let mut supplied = HashMap::new();
            if supply_name {
                supplied.insert("name".to_string(), "Ana".to_string());
            }
            if supply_order {
                supplied.insert("orderId".to_string(), "A-7".to_string());
            }

            let rendered = render(&template, &supplied);

            let mut expected_missing = Vec::new();
            if !supply_name {
                expected_missing.push("name".to_string());
            }
            if !supply_order {
                expected_missing.push("orderId".to_string());
            }
            prop_assert_eq!(&rendered.missing_variables, &expected_missing);

            if supply_name {
                prop_assert!(!rendered.body.contains("{{name}}"));
            }
            if supply_order {
                prop_assert!(!rendered.subject.as_deref().unwrap_or("").contains("{{orderId}}"));
            }
        }
    }
}
