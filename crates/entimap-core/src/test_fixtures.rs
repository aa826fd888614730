//! Shared catalog used across module tests.

use crate::{
    chain::{ResolutionChain, ResolveContext},
    introspect::{StaticCatalog, TypeDescriptor},
    model::{
        AttributeKind, ColumnDeclaration, Declaration, EntityTable, KeyStrategy, KeyTiming,
        OrderDirection, TableDeclaration, TypeRef,
    },
    style::StyleRegistry,
};
use entimap_config::MapSource;
use std::sync::Arc;

pub(crate) const USER: &str = "app::User";
pub(crate) const ADMIN: &str = "app::Admin";
pub(crate) const BASE: &str = "app::Base";
pub(crate) const CUSTOMER: &str = "app::Customer";
pub(crate) const ADDRESS: &str = "app::Address";
pub(crate) const PLAIN: &str = "app::Plain";
pub(crate) const TICKET: &str = "app::Ticket";

fn column() -> Declaration {
    Declaration::Column(ColumnDeclaration::new())
}

fn id() -> Declaration {
    Declaration::Column(ColumnDeclaration::new().id())
}

/// `User { id (pk), name, sex }`, `Admin: User { level, sex }`,
/// `Customer: Base { name, address: Address }`, `Ticket { id (sequence) }`.
pub(crate) fn catalog() -> StaticCatalog {
    StaticCatalog::new()
        .with_type(
            TypeDescriptor::new(USER)
                .table(TableDeclaration::new().name("user"))
                .field("id", AttributeKind::Integer, [id()])
                .field("name", AttributeKind::Text, [column()])
                .field("sex", AttributeKind::Text, [column()])
                .field("scratch", AttributeKind::Text, [Declaration::Transient]),
        )
        .with_type(
            TypeDescriptor::new(ADMIN)
                .extends(USER)
                .table(TableDeclaration::new().auto_result_map())
                .field("level", AttributeKind::Integer, [])
                .field(
                    "sex",
                    AttributeKind::Text,
                    [Declaration::Column(
                        ColumnDeclaration::new().order_by(OrderDirection::Desc, 1),
                    )],
                ),
        )
        .with_type(
            TypeDescriptor::new(BASE)
                .field("id", AttributeKind::Integer, [id()])
                .field("createdAt", AttributeKind::Temporal, []),
        )
        .with_type(
            TypeDescriptor::new(CUSTOMER)
                .extends(BASE)
                .table(TableDeclaration::new().style("upper_underscore"))
                .field("fullName", AttributeKind::Text, [])
                .field(
                    "address",
                    AttributeKind::Composite(ADDRESS.into()),
                    [],
                ),
        )
        .with_type(
            TypeDescriptor::new(ADDRESS)
                .field("city", AttributeKind::Text, [])
                .field("zipCode", AttributeKind::Text, []),
        )
        .with_type(TypeDescriptor::new(PLAIN).field("value", AttributeKind::Text, []))
        .with_type(
            TypeDescriptor::new(TICKET)
                .table(TableDeclaration::new())
                .field(
                    "id",
                    AttributeKind::Integer,
                    [
                        id(),
                        Declaration::KeyStrategy(KeyStrategy::Generator {
                            name: "sequence".into(),
                            timing: KeyTiming::Before,
                        }),
                    ],
                )
                .field("title", AttributeKind::Text, []),
        )
}

///
/// Fixture
/// Owns the collaborators a [`ResolveContext`] borrows.
///

pub(crate) struct Fixture {
    pub(crate) catalog: StaticCatalog,
    pub(crate) styles: StyleRegistry,
    pub(crate) properties: Arc<MapSource>,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self::with_catalog(catalog())
    }

    pub(crate) fn with_catalog(catalog: StaticCatalog) -> Self {
        let properties = Arc::new(MapSource::new());

        Self {
            catalog,
            styles: StyleRegistry::new(properties.clone()),
            properties,
        }
    }

    pub(crate) fn cx(&self) -> ResolveContext<'_> {
        ResolveContext {
            catalog: &self.catalog,
            styles: &self.styles,
            properties: self.properties.as_ref(),
        }
    }
}

/// Ready table for `ty`, resolved through the default chain.
pub(crate) fn resolve(ty: &str) -> Arc<EntityTable> {
    let fixture = Fixture::new();
    let chain = ResolutionChain::default();
    let cx = fixture.cx();
    let mut table = chain
        .create_table(&cx, &TypeRef::new(ty))
        .unwrap()
        .expect("fixture type should be mapped");
    chain.assemble(&cx, &mut table).unwrap();
    table.mark_ready();

    Arc::new(table)
}
