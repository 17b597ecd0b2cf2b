use crate::types::{TypeDescriptor, TypeLattice};
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct MetricRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
pub struct TypeRow {
    #[tabled(rename = "Input")]
    pub input: String,
    #[tabled(rename = "Modifier")]
    pub modifier: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Adjustment")]
    pub adjustment: String,
    #[tabled(rename = "Rendered")]
    pub rendered: String,
    #[tabled(rename = "Kind")]
    pub kind: String,
}

impl TypeRow {
    pub fn new(input: &str, ty: &TypeDescriptor) -> Self {
        let kind = if ty.is_unknown() {
            "unknown"
        } else if TypeLattice::is_primitive(ty) {
            "primitive"
        } else {
            "nominal"
        };
        Self {
            input: input.to_string(),
            modifier: ty.modifier.clone(),
            name: ty.name.clone(),
            adjustment: ty.adjustment.clone(),
            rendered: ty.to_string(),
            kind: kind.to_string(),
        }
    }
}

fn render<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn stats_table<V: ToString>(stats: &[(&str, V)]) -> String {
    let rows: Vec<MetricRow> = stats
        .iter()
        .map(|(label, value)| MetricRow {
            metric: label.to_string(),
            value: value.to_string(),
        })
        .collect();
    render(&rows)
}

pub fn types_table(rows: &[TypeRow]) -> String {
    render(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_table_contains_rows() {
        let table = stats_table(&[("dummy fields", 3), ("dummy records", 1)]);
        assert!(table.contains("dummy fields"));
        assert!(table.contains('3'));
        assert!(stats_table::<usize>(&[]).is_empty());
    }

    #[test]
    fn test_type_row_kinds() {
        let row = TypeRow::new("const int", &TypeDescriptor::parse("const int"));
        assert_eq!(row.kind, "primitive");
        assert_eq!(row.modifier, "const");
        let row = TypeRow::new("?", &TypeDescriptor::parse("?"));
        assert_eq!(row.kind, "unknown");
        let row = TypeRow::new("Foo*", &TypeDescriptor::parse("Foo*"));
        assert_eq!(row.kind, "nominal");
        assert_eq!(row.adjustment, "*");
    }
}
