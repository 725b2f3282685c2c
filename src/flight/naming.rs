use std::fmt;

use serde::{Deserialize, Serialize};

use crate::prelude::{NodeError, NodeResult};

/// A value substituted into a `{key}` placeholder of a name template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateValue {
    Int(i64),
    Number(f64),
    Text(String),
}

impl fmt::Display for TemplateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateValue::Int(v) => write!(f, "{}", v),
            TemplateValue::Number(v) => write!(f, "{}", v),
            TemplateValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for TemplateValue {
    fn from(v: i64) -> Self {
        TemplateValue::Int(v)
    }
}

impl From<f64> for TemplateValue {
    fn from(v: f64) -> Self {
        TemplateValue::Number(v)
    }
}

impl From<&str> for TemplateValue {
    fn from(v: &str) -> Self {
        TemplateValue::Text(v.to_string())
    }
}

/// Naming scheme for an event collection: either one fixed name, or a
/// `{key}` template whose outputs are the Cartesian product of ordered
/// option lists, e.g. one name per "phase" x "altitude band" combination.
#[derive(Debug, Clone, PartialEq)]
pub struct NameFormat {
    base: String,
    template: Option<String>,
    options: Vec<(String, Vec<TemplateValue>)>,
}

impl NameFormat {
    pub fn fixed(name: impl Into<String>) -> Self {
        Self {
            base: name.into(),
            template: None,
            options: Vec::new(),
        }
    }

    /// Every `{key}` in the template must have an option list; a template
    /// keyed on nothing would otherwise produce zero legal names and turn
    /// every later formatting attempt into a confusing failure.
    pub fn templated(
        base: impl Into<String>,
        template: impl Into<String>,
        options: Vec<(String, Vec<TemplateValue>)>,
    ) -> NodeResult<Self> {
        let template = template.into();
        for key in template_keys(&template) {
            if !options.iter().any(|(k, _)| *k == key) {
                return Err(NodeError::MissingKey(key));
            }
        }
        Ok(Self {
            base: base.into(),
            template: Some(template),
            options,
        })
    }

    /// The display name of the owning node.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Every legal formatted name: the product of all option lists, or the
    /// single fixed name when no template is configured.
    pub fn names(&self) -> Vec<String> {
        let template = match &self.template {
            Some(t) => t,
            None => return vec![self.base.clone()],
        };
        let mut combos: Vec<Vec<(&str, &TemplateValue)>> = vec![Vec::new()];
        for (key, values) in &self.options {
            let mut next = Vec::with_capacity(combos.len() * values.len());
            for combo in &combos {
                for value in values {
                    let mut extended = combo.clone();
                    extended.push((key.as_str(), value));
                    next.push(extended);
                }
            }
            combos = next;
        }
        combos
            .iter()
            .filter_map(|combo| substitute(template, |k| combo_lookup(combo, k)).ok())
            .collect()
    }

    /// Substitutes `values` into the template and verifies the result is a
    /// legal name. Keys the template does not use are ignored, so call
    /// sites may pass values generically.
    pub fn format_name(&self, values: &[(&str, TemplateValue)]) -> NodeResult<String> {
        let template = match &self.template {
            Some(t) => t,
            None => return Ok(self.base.clone()),
        };
        let name = substitute(template, |key| {
            values.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
        })?;
        if !self.names().contains(&name) {
            return Err(NodeError::InvalidName(name));
        }
        Ok(name)
    }
}

fn combo_lookup<'a>(combo: &'a [(&str, &TemplateValue)], key: &str) -> Option<&'a TemplateValue> {
    combo.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn template_keys(template: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '{' {
            continue;
        }
        let mut key = String::new();
        for k in chars.by_ref() {
            if k == '}' {
                break;
            }
            key.push(k);
        }
        keys.push(key);
    }
    keys
}

fn substitute<'a>(
    template: &str,
    lookup: impl Fn(&str) -> Option<&'a TemplateValue>,
) -> NodeResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }
        let mut key = String::new();
        for k in chars.by_ref() {
            if k == '}' {
                break;
            }
            key.push(k);
        }
        let value = lookup(&key).ok_or(NodeError::MissingKey(key))?;
        out.push_str(&value.to_string());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speed_at_altitude() -> NameFormat {
        NameFormat::templated(
            "Speed At Altitude",
            "Speed At {alt} Ft",
            vec![(
                "alt".to_string(),
                vec![TemplateValue::Int(1000), TemplateValue::Int(1500)],
            )],
        )
        .unwrap()
    }

    #[test]
    fn names_are_the_product_of_option_lists() {
        assert_eq!(
            speed_at_altitude().names(),
            vec!["Speed At 1000 Ft", "Speed At 1500 Ft"]
        );
    }

    #[test]
    fn format_name_rejects_values_outside_the_option_list() {
        let format = speed_at_altitude();
        assert_eq!(
            format.format_name(&[("alt", 1000.into())]).unwrap(),
            "Speed At 1000 Ft"
        );
        let err = format.format_name(&[("alt", 1200.into())]);
        assert!(matches!(err, Err(NodeError::InvalidName(_))));
    }

    #[test]
    fn unused_keys_are_ignored_and_missing_keys_raise() {
        let format = speed_at_altitude();
        let name = format
            .format_name(&[("alt", 1500.into()), ("phase", "Climb".into())])
            .unwrap();
        assert_eq!(name, "Speed At 1500 Ft");
        let err = format.format_name(&[("phase", "Climb".into())]);
        assert!(matches!(err, Err(NodeError::MissingKey(_))));
    }

    #[test]
    fn template_key_without_options_is_rejected_up_front() {
        let err = NameFormat::templated(
            "Speed At Altitude",
            "Speed At {alt} Ft",
            vec![("phase".to_string(), vec!["Climb".into()])],
        );
        assert!(matches!(err, Err(NodeError::MissingKey(ref k)) if k == "alt"));
    }

    #[test]
    fn fixed_format_has_exactly_one_name() {
        let format = NameFormat::fixed("Touchdown");
        assert_eq!(format.names(), vec!["Touchdown"]);
        assert_eq!(format.format_name(&[]).unwrap(), "Touchdown");
    }

    #[test]
    fn two_key_product_preserves_declared_order() {
        let format = NameFormat::templated(
            "Speed In Phase",
            "Speed In {phase} At {alt} Ft",
            vec![
                (
                    "phase".to_string(),
                    vec!["Climb".into(), "Descent".into()],
                ),
                ("alt".to_string(), vec![TemplateValue::Int(1000)]),
            ],
        )
        .unwrap();
        assert_eq!(
            format.names(),
            vec![
                "Speed In Climb At 1000 Ft",
                "Speed In Descent At 1000 Ft"
            ]
        );
    }
}
