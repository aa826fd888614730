use super::*;
use crate::{
    introspect::{MethodOptions, StatementKind},
    model::{Attribute, AttributeKind, EntityColumn, EntityTable, KeyStrategy, KeyTiming},
    obs::{self, CountingSink},
    test_fixtures::{TICKET, USER, resolve},
};
use std::{
    sync::{Arc, Barrier},
    thread,
};

fn hook(timing: KeyTiming, concurrency: usize) -> KeyGenerationHook {
    KeyGenerationHook::new(
        Arc::new(SequenceKeyGenerator::new()),
        resolve(TICKET),
        "id",
        timing,
        concurrency,
        obs::noop(),
    )
}

fn ticket() -> KeyedRecord {
    KeyedRecord::new(TICKET).with("title", "t".to_string())
}

fn strategy_column(name: &str, strategy: KeyStrategy) -> EntityColumn {
    let attribute = Attribute::new(TICKET, name, AttributeKind::Integer).into_shared();

    EntityColumn::new(name, attribute)
        .primary_key(true)
        .key_strategy(Some(strategy))
}

fn table_with(columns: impl IntoIterator<Item = EntityColumn>) -> Arc<EntityTable> {
    let mut table = EntityTable::new("ticket", TypeRef::new(TICKET), "lower_underscore");
    for column in columns {
        table.add_column(column);
    }

    Arc::new(table)
}

#[test]
fn before_hook_assigns_before_and_not_after() {
    let hook = hook(KeyTiming::Before, 10);
    let mut record = ticket();

    assert_eq!(hook.process_after(&mut Parameter::Record(&mut record)).unwrap(), 0);
    assert!(record.get("id").is_none());

    assert_eq!(hook.process_before(&mut Parameter::Record(&mut record)).unwrap(), 1);
    assert_eq!(record.get("id"), Some(&KeyValue::Int(1)));
}

#[test]
fn after_hook_ignores_prepare_and_before() {
    let hook = hook(KeyTiming::After, 10);
    let mut record = ticket();

    assert_eq!(hook.prepare(&mut Parameter::Record(&mut record)).unwrap(), 0);
    assert_eq!(hook.process_before(&mut Parameter::Record(&mut record)).unwrap(), 0);
    assert_eq!(hook.process_after(&mut Parameter::Record(&mut record)).unwrap(), 1);
}

#[test]
fn existing_keys_and_foreign_records_are_left_alone() {
    let hook = hook(KeyTiming::Before, 10);
    let mut keyed = ticket().with("id", 42_i64);
    let mut foreign = KeyedRecord::new(USER);
    let mut fresh = ticket();

    let mut batch = Parameter::Batch(vec![&mut keyed as &mut dyn KeyTarget, &mut foreign, &mut fresh]);
    assert_eq!(hook.process_before(&mut batch).unwrap(), 1);

    assert_eq!(keyed.get("id"), Some(&KeyValue::Int(42)));
    assert!(foreign.get("id").is_none());
    assert!(fresh.get("id").is_some());
    assert_eq!(hook.process_before(&mut Parameter::Empty).unwrap(), 0);
}

#[test]
fn concurrent_prepares_before_attach_all_receive_keys() {
    const CALLS: usize = 5;
    let _ = env_logger::builder().is_test(true).try_init();

    let hook = hook(KeyTiming::Before, 3);
    let barrier = Barrier::new(CALLS);

    let records: Vec<KeyedRecord> = thread::scope(|s| {
        let handles: Vec<_> = (0..CALLS)
            .map(|_| {
                s.spawn(|| {
                    let mut record = ticket();
                    barrier.wait();
                    hook.prepare(&mut Parameter::Record(&mut record)).unwrap();
                    record
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut keys: Vec<_> = records
        .iter()
        .map(|r| r.get("id").cloned().expect("every record should have a key"))
        .collect();
    keys.sort_by_key(ToString::to_string);
    keys.dedup();
    assert_eq!(keys.len(), CALLS, "keys should be distinct");
}

#[test]
fn prepare_budget_applies_once_attached() {
    let hook = hook(KeyTiming::Before, 3);
    hook.attach();
    assert!(hook.is_attached());

    let assigned: Vec<usize> = (0..5)
        .map(|_| {
            let mut record = ticket();
            hook.prepare(&mut Parameter::Record(&mut record)).unwrap()
        })
        .collect();

    assert_eq!(assigned, vec![1, 1, 1, 0, 0]);
    assert_eq!(hook.remaining_prepares(), 0);
}

#[test]
fn hook_reports_to_the_sink() {
    let sink = Arc::new(CountingSink::new());
    let hook = KeyGenerationHook::new(
        Arc::new(UlidKeyGenerator::new()),
        resolve(TICKET),
        "id",
        KeyTiming::Before,
        1,
        sink.clone(),
    );

    let mut a = ticket();
    let mut b = ticket();
    hook.prepare(&mut Parameter::Record(&mut a)).unwrap();
    hook.process_before(&mut Parameter::Record(&mut b)).unwrap();

    let counters = sink.snapshot();
    assert_eq!(counters.keys_prepared, 1);
    assert_eq!(counters.keys_generated, 1);
    assert!(matches!(a.get("id"), Some(KeyValue::Text(text)) if text.len() == 26));
}

#[test]
fn planner_binds_generator_for_inserts_only() {
    let planner = KeyStrategyPlanner::default().with_concurrency(7);
    let table = resolve(TICKET);
    let options = MethodOptions::default();

    let binding = planner
        .plan("TicketMapper.insert", &table, StatementKind::Insert, &options)
        .unwrap();
    let hook = binding.hook().expect("insert should bind a generator");
    assert_eq!(hook.generator_name(), "sequence");
    assert_eq!(hook.remaining_prepares(), 7);

    let binding = planner
        .plan("TicketMapper.update", &table, StatementKind::Update, &options)
        .unwrap();
    assert!(matches!(binding, KeyBinding::None));
}

#[test]
fn planner_ignores_tables_without_strategies() {
    let planner = KeyStrategyPlanner::default();
    let binding = planner
        .plan("m.insert", &resolve(USER), StatementKind::Insert, &MethodOptions::default())
        .unwrap();

    assert!(matches!(binding, KeyBinding::None));
}

#[test]
fn method_options_override_declared_strategy() {
    let planner = KeyStrategyPlanner::default();
    let options = MethodOptions {
        use_generated_keys: true,
        select_key: None,
    };
    let binding = planner
        .plan("m.insert", &resolve(TICKET), StatementKind::Insert, &options)
        .unwrap();

    assert!(matches!(binding, KeyBinding::None));
}

#[test]
fn planner_maps_engine_strategies() {
    let planner = KeyStrategyPlanner::default();
    let options = MethodOptions::default();

    let table = table_with([strategy_column("id", KeyStrategy::GeneratedKeys)]);
    let binding = planner.plan("m.insert", &table, StatementKind::Insert, &options).unwrap();
    assert!(matches!(binding, KeyBinding::GeneratedKeys { ref column, .. } if column == "id"));

    let table = table_with([strategy_column(
        "id",
        KeyStrategy::AfterSql("SELECT LAST_INSERT_ID()".into()),
    )]);
    let binding = planner.plan("m.insert", &table, StatementKind::Insert, &options).unwrap();
    assert!(matches!(binding, KeyBinding::AfterSql { ref sql, .. } if sql.starts_with("SELECT")));
}

#[test]
fn multiple_strategies_are_an_invariant_violation() {
    let planner = KeyStrategyPlanner::default();
    let table = table_with([
        strategy_column("a", KeyStrategy::GeneratedKeys),
        strategy_column("b", KeyStrategy::GeneratedKeys),
    ]);

    let err = planner
        .plan("m.insert", &table, StatementKind::Insert, &MethodOptions::default())
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::InvariantViolation);
    assert_eq!(err.origin, ErrorOrigin::KeyGeneration);
}

#[test]
fn unknown_generator_is_a_configuration_error() {
    let planner = KeyStrategyPlanner::new(KeyGeneratorRegistry::empty());
    let err = planner
        .plan("m.insert", &resolve(TICKET), StatementKind::Insert, &MethodOptions::default())
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::Configuration);
    assert!(matches!(
        err.detail,
        Some(ErrorDetail::KeyGeneration(KeyGenerationError::UnknownGenerator { ref name }))
            if name == "sequence"
    ));
}

#[test]
fn sequence_generator_counts_up() {
    let table = resolve(TICKET);
    let column = &table.columns()[0];
    let generator = SequenceKeyGenerator::starting_at(100);

    assert_eq!(generator.generate(&table, column).unwrap(), KeyValue::Int(100));
    assert_eq!(generator.generate(&table, column).unwrap(), KeyValue::Int(101));
}
