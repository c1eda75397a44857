use crate::domain::model::{Filter, FilterValue, FindParams, MangoQuery};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Turns a filter into a Mango selector. Literal values become `$eq`
/// comparisons; comparisons and `$`-combinators pass through.
pub fn normalize(filter: &Filter) -> Map<String, Value> {
    filter
        .fields
        .iter()
        .map(|(field, value)| {
            let condition = match value {
                FilterValue::Literal(literal) if field.starts_with('$') => literal.clone(),
                FilterValue::Literal(literal) => json!({ "$eq": literal }),
                FilterValue::Comparison(ops) => Value::Object(ops.clone()),
            };
            (field.clone(), condition)
        })
        .collect()
}

pub fn build_query(params: &FindParams) -> MangoQuery {
    MangoQuery {
        selector: normalize(&params.query),
        limit: params.limit,
        skip: params.offset,
        sort: params
            .sort
            .iter()
            .map(|s| BTreeMap::from([(s.field.clone(), s.direction)]))
            .collect(),
        fields: params.fields.clone(),
        bookmark: None,
    }
}
