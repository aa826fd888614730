use super::*;
use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::{Attribute, AttributeKind, EntityColumn, TypeRef},
};
use std::sync::Arc;

fn user_table() -> EntityTable {
    let mut table = EntityTable::new("user", TypeRef::new("app::User"), "lower_underscore");
    for (name, kind, pk) in [
        ("id", AttributeKind::Integer, true),
        ("userName", AttributeKind::Text, false),
    ] {
        let attribute = Attribute::new("app::User", name, kind).into_shared();
        let column = if name == "userName" { "user_name" } else { name };
        table.add_column(EntityColumn::new(column, attribute).primary_key(pk));
    }

    table
}

///
/// Prefix
///

struct Prefix(&'static str, i32);

impl ScriptWrapper for Prefix {
    fn priority(&self) -> i32 {
        self.1
    }

    fn wrap(
        &self,
        _cx: &ScriptContext<'_>,
        script: Arc<dyn SqlScript>,
    ) -> Result<Arc<dyn SqlScript>, InternalError> {
        let tag = self.0;
        Ok(Arc::new(move |table: &EntityTable| {
            format!("{tag}({})", script.sql(table))
        }))
    }
}

///
/// Refuse
///

struct Refuse;

impl ScriptWrapper for Refuse {
    fn wrap(
        &self,
        cx: &ScriptContext<'_>,
        _script: Arc<dyn SqlScript>,
    ) -> Result<Arc<dyn SqlScript>, InternalError> {
        Err(InternalError::script_unsupported(format!(
            "{} cannot be wrapped",
            cx.method
        )))
    }
}

#[test]
fn closures_are_scripts() {
    let script = |table: &EntityTable| {
        format!(
            "SELECT {} FROM {}",
            table.base_column_as_property_list(),
            table.storage_name()
        )
    };

    assert_eq!(
        script.sql(&user_table()),
        "SELECT id,user_name AS userName FROM user"
    );
}

#[test]
fn select_by_key_composes_helpers() {
    let table = user_table();
    let conditions: String = table
        .id_columns()
        .iter()
        .map(|c| if_test(&c.not_null_test(""), &format!("AND {}", c.column_equals_property(""))))
        .collect();
    let sql = wrap_script(&format!(
        "SELECT {} FROM {}{}",
        table.base_column_list(),
        table.storage_name(),
        where_(&conditions)
    ));

    assert_eq!(
        sql,
        "<script>\nSELECT id,user_name FROM user\n<where>\n<if test=\"id != null\">\nAND id = #{id}\n</if> \n</where> \n</script>"
    );
}

#[test]
fn tag_helpers_match_dialect() {
    assert_eq!(set("a = 1"), "\n<set>\na = 1\n</set> ");
    assert_eq!(choose("x"), "\n<choose>\nx\n</choose> ");
    assert_eq!(otherwise("x"), "\n<otherwise>\nx\n</otherwise> ");
    assert_eq!(when_test("a", "x"), "\n<when test=\"a\">\nx\n</when> ");
    assert_eq!(
        if_parameter_not_null("x"),
        "\n<if test=\"_parameter != null\">\nx\n</if> "
    );
    assert_eq!(bind("n", "v"), "\n<bind name=\"n\" value=\"v\"/>");
    assert_eq!(
        trim("(", ")", "AND", ",", "x"),
        "\n<trim prefix=\"(\" prefixOverrides=\"AND\" suffixOverrides=\",\" suffix=\")\">\nx\n</trim> "
    );
    assert_eq!(
        trim_suffix_overrides("SET", "", ",", "x"),
        "\n<trim prefix=\"SET\" suffixOverrides=\",\" suffix=\"\">\nx\n</trim> "
    );
    assert_eq!(
        trim_prefix_overrides("WHERE", "", "AND", "x"),
        "\n<trim prefix=\"WHERE\" prefixOverrides=\"AND\" suffix=\"\">\nx\n</trim> "
    );
}

#[test]
fn foreach_omits_unset_attributes() {
    assert_eq!(
        foreach("list", "item", "#{item}"),
        "\n<foreach collection=\"list\" item=\"item\">\n#{item}\n</foreach> "
    );
    assert_eq!(
        Foreach::new("ids", "id")
            .open("(")
            .close(")")
            .separator(",")
            .render("#{id}"),
        "\n<foreach collection=\"ids\" item=\"id\" open=\"(\" close=\")\" separator=\",\">\n#{id}\n</foreach> "
    );
}

#[test]
fn wrappers_apply_by_descending_priority() {
    let wrappers = ScriptWrappers::new()
        .with(Arc::new(Prefix("low", -1)))
        .with(Arc::new(Prefix("high", 5)))
        .with(Arc::new(Prefix("mid", 0)));
    let table = user_table();
    let mapper = TypeRef::new("app::UserMapper");
    let cx = ScriptContext {
        mapper: &mapper,
        method: "select",
        table: &table,
    };

    let base: Arc<dyn SqlScript> = Arc::new(|_: &EntityTable| "q".to_string());
    let wrapped = wrappers.apply(&cx, base).unwrap();

    assert_eq!(wrapped.sql(&table), "low(mid(high(q)))");
}

#[test]
fn wrapper_errors_abort_registration() {
    let wrappers = ScriptWrappers::new().with(Arc::new(Refuse));
    let table = user_table();
    let mapper = TypeRef::new("app::UserMapper");
    let cx = ScriptContext {
        mapper: &mapper,
        method: "select",
        table: &table,
    };

    let Err(err) = wrappers.apply(&cx, Arc::new(|_: &EntityTable| String::new())) else {
        panic!("wrapper should refuse");
    };
    assert_eq!(err.class, ErrorClass::Unsupported);
    assert_eq!(err.origin, ErrorOrigin::Script);
}
