use super::*;
use entimap_config::MapSource;
use proptest::prelude::*;
use std::sync::Arc;

const USER: &str = "app::User";
const BASE: &str = "app::BaseId";

fn attr(owner: &str, name: &str, kind: AttributeKind) -> Arc<Attribute> {
    Attribute::new(owner, name, kind).into_shared()
}

fn col(owner: &str, name: &str) -> EntityColumn {
    EntityColumn::new(name, attr(owner, name, AttributeKind::Other))
}

fn user_table() -> EntityTable {
    EntityTable::new("user", TypeRef::new(USER), "lower_underscore")
}

#[test]
fn simple_name_strips_path_segments() {
    assert_eq!(TypeRef::new("app::model::User").simple_name(), "User");
    assert_eq!(TypeRef::new("io.example.Role").simple_name(), "Role");
    assert_eq!(TypeRef::new("Plain").simple_name(), "Plain");
}

#[test]
fn own_columns_append_in_declaration_order() {
    let mut table = user_table();
    table.add_column(col(USER, "id").primary_key(true));
    table.add_column(col(USER, "name"));
    table.add_column(col(USER, "sex"));

    assert_eq!(table.base_column_list(), "id,name,sex");
    assert_eq!(table.base_column_as_property_list(), "id,name,sex");
}

#[test]
fn inherited_columns_go_first() {
    let mut table = user_table();
    table.add_column(col(USER, "name"));
    table.add_column(col(BASE, "id"));

    assert_eq!(table.column_names(), vec!["id", "name"]);
}

#[test]
fn redeclared_column_moves_to_front_without_duplicating() {
    let mut table = user_table();
    table.add_column(col(USER, "name"));
    table.add_column(col(USER, "sex"));
    table.add_column(col(BASE, "sex"));

    assert_eq!(table.columns().len(), 2);
    assert_eq!(table.column_names(), vec!["sex", "name"]);
    let sex = table.column("sex").expect("sex column should exist");
    assert_eq!(sex.attribute().declaring_type().path(), USER);
}

#[test]
fn id_columns_fall_back_to_all_columns() {
    let mut table = user_table();
    table.add_column(col(USER, "a"));
    table.add_column(col(USER, "b"));
    assert_eq!(table.id_columns().len(), 2);

    table.add_column(col(USER, "c").primary_key(true));
    let ids = table.id_columns();
    assert_eq!(ids.len(), 1);
    assert_eq!(ids[0].column(), "c");
    assert_eq!(table.normal_columns().len(), 2);
}

#[test]
fn derived_views_filter_without_mutating() {
    let mut table = user_table();
    table.add_column(col(USER, "id").primary_key(true).updatable(false));
    table.add_column(col(USER, "secret").selectable(false));
    table.add_column(col(USER, "created").insertable(false));

    assert_eq!(table.base_column_list(), "id,created");
    assert_eq!(table.insert_column_list(), "id,secret");
    assert_eq!(table.update_columns().len(), 2);
    assert_eq!(table.where_columns().len(), 3);
    assert_eq!(table.column_names(), vec!["id", "secret", "created"]);
}

#[test]
fn column_as_property_aliases_mismatched_names() {
    let column = EntityColumn::new("user_name", attr(USER, "userName", AttributeKind::Text));

    assert_eq!(column.column_as_property(""), "user_name AS userName");
    assert_eq!(column.column_as_property("u."), "user_name AS u.userName");
    assert_eq!(column.column_equals_property(""), "user_name = #{userName}");
}

#[test]
fn variables_carry_type_codec_and_scale() {
    let points = EntityColumn::new("points", attr(USER, "points", AttributeKind::Decimal))
        .scale(Some("4".into()));
    assert_eq!(points.variables(""), "#{points, numericScale=4}");

    let created = EntityColumn::new("when_created", attr(USER, "whenCreated", AttributeKind::Temporal))
        .type_hint(Some("TIMESTAMP".into()));
    assert_eq!(created.variables(""), "#{whenCreated, jdbcType=TIMESTAMP}");

    let info = EntityColumn::new("info", attr(USER, "info", AttributeKind::Text))
        .value_codec(Some("codec::Json".into()));
    assert_eq!(info.variables("p."), "#{p.info, typeHandler=codec::Json}");
}

#[test]
fn not_empty_test_depends_on_kind() {
    let name = EntityColumn::new("name", attr(USER, "name", AttributeKind::Text));
    let age = EntityColumn::new("age", attr(USER, "age", AttributeKind::Integer));

    assert_eq!(name.not_empty_test(""), "name != null and name != ''");
    assert_eq!(age.not_empty_test("u."), "u.age != null");
    assert_eq!(age.not_null_test(""), "age != null");
}

#[test]
fn order_by_sorts_by_priority_and_keeps_ties_stable() {
    let mut table = user_table();
    assert!(table.order_by_clause().is_none());

    table.add_column(col(USER, "a").order_by(Some(OrderDirection::Desc), 2));
    table.add_column(col(USER, "b"));
    table.add_column(col(USER, "c").order_by(Some(OrderDirection::Asc), 1));
    table.add_column(col(USER, "d").order_by(Some(OrderDirection::Asc), 2));

    assert_eq!(
        table.order_by_column_list().as_deref(),
        Some("c ASC,a DESC,d ASC")
    );
    assert_eq!(
        table.order_by_clause().as_deref(),
        Some(" ORDER BY c ASC,a DESC,d ASC")
    );
}

#[test]
fn result_mapping_modes() {
    let named = user_table().with_result_mapping(ResultMapping::Named("userMap".into()));
    assert_eq!(named.result_map(), Some("userMap"));
    assert!(!named.auto_result_map());

    let auto = user_table().with_result_mapping(ResultMapping::Auto);
    assert!(auto.auto_result_map());
    assert_eq!(auto.result_map(), None);
}

#[test]
fn props_fall_back_to_property_source() {
    let props: Props = [("limit", "10"), ("flag", "nope")].into_iter().collect();
    let source = MapSource::new()
        .with("limit", "99")
        .with("missing", "yes");

    assert_eq!(props.get_int("limit", 0), 10);
    assert!(props.get_bool("flag", true), "malformed bool should use default");
    assert_eq!(props.get_int_with_fallback("limit", &source, 0), 10);
    assert!(props.get_bool_with_fallback("missing", &source, false));
    assert_eq!(
        props.get_with_fallback("missing", &source).as_deref(),
        Some("yes")
    );
    assert_eq!(props.get_or("absent", "d"), "d");
}

#[test]
fn attribute_declarations_are_queryable() {
    let a = Attribute::new(USER, "id", AttributeKind::Integer)
        .with_declaration(Declaration::Column(ColumnDeclaration::new().id()))
        .with_declaration(Declaration::Prop {
            name: "k".into(),
            value: "v".into(),
        });

    assert!(a.has_declaration(DeclarationKind::Column));
    assert!(!a.is_transient());
    assert!(a.column_declaration().is_some_and(|c| c.id));
    assert_eq!(a.props().collect::<Vec<_>>(), vec![("k", "v")]);
}

#[test]
fn find_type_tries_lower_bounds_before_upper() {
    let accept = |ty: &TypeRef| ty.path().starts_with("app::");
    let shape = TypeShape::Wildcard {
        lower: vec![TypeShape::named("app::Lower")],
        upper: vec![TypeShape::named("app::Upper")],
    };
    assert_eq!(shape.find_type(&accept), Some(TypeRef::new("app::Lower")));

    let nested = TypeShape::generic(
        "std::Vec",
        [TypeShape::array(TypeShape::named("app::User"))],
    );
    assert_eq!(nested.find_type(&accept), Some(TypeRef::new("app::User")));
    assert_eq!(TypeShape::Unit.find_type(&accept), None);
    assert_eq!(TypeShape::named("std::String").find_type(&accept), None);
}

proptest! {
    #[test]
    fn add_column_keeps_names_unique(
        names in prop::collection::vec((0u8..6, any::<bool>()), 0..24)
    ) {
        let mut table = user_table();
        for (n, inherited) in &names {
            let owner = if *inherited { BASE } else { USER };
            table.add_column(col(owner, &format!("c{n}")));
        }

        let mut seen = table.column_names();
        let len = seen.len();
        seen.sort_unstable();
        seen.dedup();
        prop_assert_eq!(seen.len(), len);
    }
}
