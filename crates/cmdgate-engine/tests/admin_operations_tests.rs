//! Rule, principal and audit administration

use cmdgate_core::errors::ExErrorKind;
use cmdgate_core::model::{AuditAction, Principal, Role, RuleAction, DEFAULT_CREDITS};
use cmdgate_core::policy;
use cmdgate_core::MockExecutionAdapter;
use cmdgate_engine::commands::queries::MAX_AUDIT_LIMIT;
use cmdgate_engine::{
    apply_engine_command, authenticate, bootstrap_gateway, create_principal, create_rule,
    get_audit, list_rules, EngineCommand, EngineCommandResult, EngineContext, RuleCache,
};
use cmdgate_store::bootstrap::{ADMIN_CREDITS, DEFAULT_RULES};
use cmdgate_store::{db, migrations, RuleRepo};
use rusqlite::Connection;

const ADMIN_KEY: &str = "admin-test-key";

fn setup() -> (Connection, Principal) {
    let mut conn = db::open_in_memory().unwrap();
    migrations::apply_migrations(&mut conn).unwrap();
    bootstrap_gateway(&mut conn, Some(ADMIN_KEY)).unwrap();
    let admin = authenticate(&conn, Some(ADMIN_KEY)).unwrap();
    (conn, admin)
}

fn member(conn: &mut Connection, admin: &Principal, name: &str) -> Principal {
    create_principal(admin, name, Role::Member, None, conn)
        .unwrap()
        .principal
}

#[test]
fn test_bootstrap_seeds_admin_and_default_rules() {
    let (conn, admin) = setup();

    assert!(admin.is_admin());
    assert_eq!(admin.balance, ADMIN_CREDITS);

    let rules = list_rules(&conn).unwrap();
    assert_eq!(rules.len(), DEFAULT_RULES.len());
    for (rule, (pattern, action)) in rules.iter().zip(DEFAULT_RULES) {
        assert_eq!(rule.pattern, *pattern);
        assert_eq!(rule.action, *action);
    }
}

#[test]
fn test_bootstrap_twice_changes_nothing() {
    let (mut conn, admin) = setup();
    let audit_before = get_audit(&admin, 1_000, &conn).unwrap().len();

    let report = bootstrap_gateway(&mut conn, Some(ADMIN_KEY)).unwrap();

    assert!(!report.admin_created);
    assert_eq!(report.rules_seeded, 0);
    assert_eq!(list_rules(&conn).unwrap().len(), DEFAULT_RULES.len());
    assert_eq!(get_audit(&admin, 1_000, &conn).unwrap().len(), audit_before);
}

#[test]
fn test_create_rule_appends_and_audits() {
    let (mut conn, admin) = setup();

    let rule = create_rule(&admin, "shutdown", RuleAction::AutoReject, &mut conn).unwrap();

    let rules = list_rules(&conn).unwrap();
    assert_eq!(rules.last().map(|r| r.id.as_str()), Some(rule.id.as_str()));
    assert_eq!(rule.created_by.as_deref(), Some(admin.id.as_str()));
    assert!(policy::match_first("sudo shutdown now", &rules).is_some());

    let latest = &get_audit(&admin, 1, &conn).unwrap()[0];
    assert_eq!(latest.action, AuditAction::RuleCreated);
    assert!(latest.detail.contains("shutdown"));
}

#[test]
fn test_invalid_pattern_is_never_persisted() {
    let (mut conn, admin) = setup();
    let revision = RuleRepo::revision(&conn).unwrap();

    let err = create_rule(&admin, "([unclosed", RuleAction::AutoReject, &mut conn).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidPattern);
    assert_eq!(list_rules(&conn).unwrap().len(), DEFAULT_RULES.len());
    assert_eq!(RuleRepo::revision(&conn).unwrap(), revision);
}

#[test]
fn test_member_cannot_administer() {
    let (mut conn, admin) = setup();
    let bob = member(&mut conn, &admin, "bob");

    let err = create_rule(&bob, "x", RuleAction::AutoReject, &mut conn).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Forbidden);

    let err = create_principal(&bob, "eve", Role::Admin, Some(1_000_000), &mut conn).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Forbidden);

    let err = get_audit(&bob, 10, &conn).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Forbidden);

    assert_eq!(list_rules(&conn).unwrap().len(), DEFAULT_RULES.len());
}

#[test]
fn test_created_principal_authenticates_with_returned_key() {
    let (mut conn, admin) = setup();

    let provisioned = create_principal(&admin, "carol", Role::Member, None, &mut conn).unwrap();

    assert_eq!(provisioned.principal.balance, DEFAULT_CREDITS);
    let carol = authenticate(&conn, Some(provisioned.api_key.expose().as_str())).unwrap();
    assert_eq!(carol.id, provisioned.principal.id);
    assert!(!format!("{:?}", provisioned).contains(provisioned.api_key.expose().as_str()));

    let latest = &get_audit(&admin, 1, &conn).unwrap()[0];
    assert_eq!(latest.action, AuditAction::PrincipalCreated);
}

#[test]
fn test_create_principal_validates_input() {
    let (mut conn, admin) = setup();

    let err = create_principal(&admin, "  ", Role::Member, None, &mut conn).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);

    let err = create_principal(&admin, "dave", Role::Member, Some(-1), &mut conn).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
}

#[test]
fn test_audit_limit_is_respected_and_capped() {
    let (conn, admin) = setup();

    assert_eq!(get_audit(&admin, 2, &conn).unwrap().len(), 2);
    let all = get_audit(&admin, usize::MAX, &conn).unwrap();
    assert!(all.len() <= MAX_AUDIT_LIMIT);
    assert!(all.windows(2).all(|w| (w[0].timestamp, w[0].id) > (w[1].timestamp, w[1].id)));
}

#[test]
fn test_engine_command_dispatch() {
    let (mut conn, admin) = setup();
    let cache = RuleCache::new();

    let result = apply_engine_command(
        EngineCommand::Submit {
            text: "git status".to_string(),
        },
        &admin,
        EngineContext {
            conn: &mut conn,
            adapter: &MockExecutionAdapter,
            rules: &cache,
        },
    )
    .unwrap();
    assert!(matches!(result, EngineCommandResult::Submitted(_)));

    let result = apply_engine_command(
        EngineCommand::GetCredits,
        &admin,
        EngineContext {
            conn: &mut conn,
            adapter: &MockExecutionAdapter,
            rules: &cache,
        },
    )
    .unwrap();
    assert!(matches!(result, EngineCommandResult::Credits(c) if c == ADMIN_CREDITS - 1));

    let bob = member(&mut conn, &admin, "bob");
    let result = apply_engine_command(
        EngineCommand::ListRules,
        &bob,
        EngineContext {
            conn: &mut conn,
            adapter: &MockExecutionAdapter,
            rules: &cache,
        },
    )
    .unwrap();
    assert!(matches!(result, EngineCommandResult::Rules(r) if r.len() == DEFAULT_RULES.len()));
}
