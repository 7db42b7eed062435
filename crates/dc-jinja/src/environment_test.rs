use super::*;
use crate::error::JinjaError;

fn data(yaml: &str) -> BTreeMap<String, serde_yaml::Value> {
    serde_yaml::from_str(yaml).unwrap()
}

#[test]
fn test_render_plain_sql_unchanged() {
    let env = TemplateEnvironment::default();
    let sql = "SELECT * FROM t WHERE a = 1\n";
    assert_eq!(env.render(sql).unwrap(), sql);
}

#[test]
fn test_render_template_data() {
    let env = TemplateEnvironment::new(&data("schema: staging\nids: [1, 2, 3]\n"));
    let out = env
        .render("SELECT * FROM {{ schema }}.t WHERE id IN ({{ ids | join(', ') }})")
        .unwrap();
    assert_eq!(out, "SELECT * FROM staging.t WHERE id IN (1, 2, 3)");
}

#[test]
fn test_fixed_variable_overrides_template_data() {
    let env = TemplateEnvironment::new(&data("CONNECTION: from_data\n"))
        .with_var("CONNECTION", "test")
        .with_var("PIPELINE_NAME", "p1");
    assert_eq!(
        env.render("{{ CONNECTION }}/{{ PIPELINE_NAME }}").unwrap(),
        "test/p1"
    );
    assert_eq!(env.variable_names(), vec!["CONNECTION", "PIPELINE_NAME"]);
}

#[test]
fn test_env_var_default() {
    let env = TemplateEnvironment::default();
    let out = env
        .render("{{ env_var('DC_JINJA_SURELY_UNSET_VAR', 'fallback') }}")
        .unwrap();
    assert_eq!(out, "fallback");
}

#[test]
fn test_env_var_missing_is_error() {
    let env = TemplateEnvironment::default();
    let err = env
        .render("{{ env_var('DC_JINJA_SURELY_UNSET_VAR') }}")
        .unwrap_err();
    match err {
        JinjaError::RenderError(msg) => assert!(msg.contains("DC_JINJA_SURELY_UNSET_VAR")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_log_renders_nothing() {
    let env = TemplateEnvironment::default();
    assert_eq!(env.render("a{{ log('hello') }}b").unwrap(), "ab");
}

#[test]
fn test_syntax_error() {
    let env = TemplateEnvironment::default();
    assert!(matches!(
        env.render("{% if %}"),
        Err(JinjaError::RenderError(_))
    ));
}
