use eavql::report::{
    build_entity_query, EntityPlan, FilterOp, FilterSpec, ParamValue, ParameterCollector,
    PlanRegistry, ReportError,
};
use eavql::sql::Dialect;

fn loans(keys: &[&str]) -> EntityPlan {
    let mut plan = EntityPlan::new("loan_data", "j0");
    for key in keys {
        plan.require_key(key);
    }
    plan
}

fn status_filter(op: FilterOp, value: &str) -> FilterSpec {
    FilterSpec {
        key: "status".into(),
        op,
        value: Some(value.into()),
    }
}

#[test]
fn test_postgres_quotes_every_identifier() {
    let mut plan = loans(&["status"]);
    plan.add_filter(status_filter(FilterOp::Eq, "approved"));

    let mut params = ParameterCollector::new();
    let query = build_entity_query(&plan, &mut params, Dialect::Postgres).unwrap();

    assert_eq!(
        query.sql,
        "SELECT\n  \"j0_src\".\"entity_id\" AS \"entity_id\",\n  \
         MAX(CASE WHEN \"j0_src\".\"column_key\" = :p0 THEN \"j0_src\".\"column_value\" END) AS \"j0_c0\"\n\
         FROM \"loan_data\" AS \"j0_src\"\n\
         GROUP BY \"j0_src\".\"entity_id\"\n\
         HAVING MAX(CASE WHEN \"j0_src\".\"column_key\" = :p0 THEN \"j0_src\".\"column_value\" END) = :p1"
    );
}

#[test]
fn test_identity_key_is_never_pivoted() {
    let mut plan = loans(&["entity_id", "loan_amount", "loan_amount", " "]);
    plan.add_filter(FilterSpec {
        key: "entity_id".into(),
        op: FilterOp::Lt,
        value: Some("10".into()),
    });

    let mut params = ParameterCollector::new();
    let query = build_entity_query(&plan, &mut params, Dialect::Oracle).unwrap();

    assert_eq!(plan.keys(), ["loan_amount"]);
    assert_eq!(query.columns.len(), 1);
    assert!(query.sql.ends_with("HAVING j0_src.entity_id < :p1"));
}

#[test]
fn test_filters_combine_with_and() {
    let mut plan = loans(&["status", "loan_amount"]);
    plan.add_filter(status_filter(FilterOp::Like, "appr%"));
    plan.add_filter(FilterSpec {
        key: "loan_amount".into(),
        op: FilterOp::Gt,
        value: Some("1000".into()),
    });

    let mut params = ParameterCollector::new();
    let query = build_entity_query(&plan, &mut params, Dialect::Sqlite).unwrap();

    assert!(query
        .sql
        .ends_with("HAVING j0_c0 LIKE :p2 AND j0_c1 > :p3"));
    assert_eq!(params.get("p3"), Some(&ParamValue::Text("1000".into())));
}

#[test]
fn test_null_filter_value_is_bound_as_null() {
    let mut plan = loans(&["status"]);
    plan.add_filter(FilterSpec {
        key: "status".into(),
        op: FilterOp::Eq,
        value: None,
    });

    let mut params = ParameterCollector::new();
    build_entity_query(&plan, &mut params, Dialect::Sqlite).unwrap();
    assert_eq!(params.get("p1"), Some(&ParamValue::Null));
}

#[test]
fn test_parameter_names_continue_across_plans() {
    let mut registry = PlanRegistry::with_base("user_data");
    registry.get_mut(registry.base()).require_key("first_name");
    let loans_id = registry.register("loan_data", "j0").unwrap();
    registry.get_mut(loans_id).require_key("loan_amount");

    let mut params = ParameterCollector::new();
    let queries: Vec<_> = registry
        .iter()
        .map(|(_, plan)| build_entity_query(plan, &mut params, Dialect::Oracle).unwrap())
        .collect();

    assert!(queries[0].sql.contains(":p0"));
    assert!(queries[1].sql.contains(":p1"));
    assert_eq!(params.len(), 2);
}

#[test]
fn test_between_without_comma() {
    let mut plan = loans(&["status"]);
    plan.add_filter(status_filter(FilterOp::Between, "approved"));

    let mut params = ParameterCollector::new();
    assert_eq!(
        build_entity_query(&plan, &mut params, Dialect::Oracle),
        Err(ReportError::InvalidBetweenValue)
    );
}
