use crate::{
    chain::{ColumnChain, EntityColumnFactory, EntityTableFactory, ResolveContext, TableChain},
    error::InternalError,
    model::{Attribute, ColumnDeclaration, EntityColumn, EntityTable, Props, ResultMapping, TypeRef},
};
use std::sync::Arc;

///
/// DefaultEntityTableFactory
///
/// Builds a table from the type-level declaration. Undeclared types are
/// passed on, which at the tail of the chain means "no mapping".
///

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultEntityTableFactory;

impl EntityTableFactory for DefaultEntityTableFactory {
    fn priority(&self) -> i32 {
        i32::MIN
    }

    fn create_table(
        &self,
        cx: &ResolveContext<'_>,
        ty: &TypeRef,
        next: TableChain<'_>,
    ) -> Result<Option<EntityTable>, InternalError> {
        let Some(declaration) = cx.catalog.declaration(ty) else {
            return next.create_table(cx, ty);
        };

        let style = cx.styles.resolve(declaration.style.as_deref())?;
        let name = match declaration.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => style.table_name(ty),
        };
        let mapping = match (&declaration.result_map, declaration.auto_result_map) {
            (Some(name), _) if !name.is_empty() => ResultMapping::Named(name.clone()),
            (_, true) => ResultMapping::Auto,
            _ => ResultMapping::None,
        };
        let props: Props = declaration.props.iter().cloned().collect();

        Ok(Some(
            EntityTable::new(name, ty.clone(), style.name())
                .with_result_mapping(mapping)
                .with_props(props),
        ))
    }
}

///
/// DefaultEntityColumnFactory
///
/// One column per attribute. Declared settings win; undeclared attributes
/// get a styled name and default flags.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultEntityColumnFactory;

impl EntityColumnFactory for DefaultEntityColumnFactory {
    fn priority(&self) -> i32 {
        i32::MIN
    }

    fn create_columns(
        &self,
        cx: &ResolveContext<'_>,
        table: &EntityTable,
        attribute: &Arc<Attribute>,
        _next: ColumnChain<'_>,
    ) -> Result<Option<Vec<EntityColumn>>, InternalError> {
        if attribute.is_transient() {
            return Ok(None);
        }

        let fallback = ColumnDeclaration::default();
        let declaration = attribute.column_declaration().unwrap_or(&fallback);
        let name = match declaration.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => cx
                .styles
                .resolve(Some(table.style()))?
                .column_name(table, attribute),
        };

        let mut props: Props = declaration.props.iter().cloned().collect();
        props.extend(attribute.props());

        let column = EntityColumn::new(name, Arc::clone(attribute))
            .primary_key(declaration.id)
            .order_by(declaration.order_by, declaration.order_priority)
            .selectable(declaration.selectable)
            .insertable(declaration.insertable)
            .updatable(declaration.updatable)
            .type_hint(declaration.type_hint.clone())
            .value_codec(declaration.value_codec.clone())
            .scale(declaration.scale.clone())
            .key_strategy(attribute.key_strategy().cloned())
            .with_props(props);

        Ok(Some(vec![column]))
    }
}
