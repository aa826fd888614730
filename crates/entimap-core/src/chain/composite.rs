use crate::{
    chain::{ColumnChain, EntityColumnFactory, ResolveContext},
    error::InternalError,
    model::{Attribute, AttributeKind, EntityColumn, EntityTable},
};
use std::sync::Arc;

///
/// FlattenCompositeFactory
///
/// Expands a `Composite` attribute into one column per attribute of the
/// value type: `address.city` becomes column `address_city` bound to
/// property `address.city`. Inner columns inherit the outer attribute's
/// declaring type so they are placed where the outer attribute would be.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct FlattenCompositeFactory;

impl EntityColumnFactory for FlattenCompositeFactory {
    fn create_columns(
        &self,
        cx: &ResolveContext<'_>,
        table: &EntityTable,
        attribute: &Arc<Attribute>,
        next: ColumnChain<'_>,
    ) -> Result<Option<Vec<EntityColumn>>, InternalError> {
        let AttributeKind::Composite(value_type) = attribute.kind() else {
            return next.create_columns(cx, table, attribute);
        };
        if attribute.column_declaration().is_some() {
            return next.create_columns(cx, table, attribute);
        }

        let inner = cx.catalog.own_attributes(value_type);
        if inner.is_empty() {
            return next.create_columns(cx, table, attribute);
        }

        let mut columns = Vec::with_capacity(inner.len());
        for sub in inner.iter().filter(|sub| !sub.is_transient()) {
            let synthesized = Arc::new(
                Attribute::new(
                    attribute.declaring_type().clone(),
                    format!("{}_{}", attribute.name(), sub.name()),
                    sub.kind().clone(),
                )
                .with_declarations(sub.declarations().iter().cloned()),
            );
            let property = format!("{}.{}", attribute.name(), sub.name());

            if let Some(created) = next.create_columns(cx, table, &synthesized)? {
                columns.extend(
                    created
                        .into_iter()
                        .map(|column| column.with_property(property.clone())),
                );
            }
        }

        Ok(Some(columns))
    }
}
