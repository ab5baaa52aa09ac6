use crate::error::{MedgraphError, Result};

/// Renders plain-text output, so values are not HTML-escaped.
pub fn render_template(template: &str, context: &serde_json::Value) -> Result<String> {
    let context = tera::Context::from_serialize(context)
        .map_err(|err| MedgraphError::Other(anyhow::Error::new(err)))?;
    tera::Tera::one_off(template, &context, false)
        .map_err(|err| MedgraphError::Other(anyhow::Error::new(err)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::util::template::render_template;

    #[test]
    fn renders_inline_template() {
        let output = render_template(
            "Inputs: {% for path in paths %}{{ path }} {% endfor %}",
            &json!({
                "paths": ["data/edges.csv", "data/nodes.csv"],
            }),
        )
        .expect("render template");
        assert_eq!(output, "Inputs: data/edges.csv data/nodes.csv ");
    }

    #[test]
    fn reports_undefined_variables() {
        assert!(render_template("{{ missing }}", &json!({})).is_err());
    }
}
