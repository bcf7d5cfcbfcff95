use std::time::Duration;

use plugin_matrix::core::models::{Failure, InstallCommand, SessionKind, SessionResult, SessionSpec};

fn plugin_spec() -> SessionSpec {
    SessionSpec::new(
        SessionKind::TestPlugin {
            install_cmd: InstallCommand::new(vec!["pip".into(), "install".into(), "-e".into(), ".".into()]),
            plugin_name: "example".to_string(),
        },
        Some("3.6".to_string()),
    )
}

#[test]
fn test_session_ids() {
    let core = SessionSpec::new(SessionKind::TestCore, Some("2.7".to_string()));
    assert_eq!(core.id(), "test_core-2.7");
    assert_eq!(
        plugin_spec().id(),
        "test_plugin-3.6(install_cmd='pip install -e .', plugin_name='example')"
    );
    assert_eq!(SessionSpec::new(SessionKind::Coverage, None).id(), "coverage");
    assert_eq!(format!("{}", core), "test_core-2.7");
}

#[test]
fn test_install_command_for_target() {
    let cmd = InstallCommand::new(vec!["pip".into(), "install".into(), "-e".into(), ".".into()]);
    assert_eq!(
        cmd.for_target("plugins/example"),
        vec!["pip", "install", "-e", ".", "plugins/example"]
    );
    assert_eq!(cmd.to_string(), "pip install -e .");
}

#[test]
fn test_result_status_and_detail() {
    let success = SessionResult::Success {
        session: SessionSpec::new(SessionKind::Coverage, None),
        duration: Duration::from_secs(3),
    };
    assert!(success.is_success());
    assert_eq!(success.status_key(), "success");
    assert_eq!(success.detail(), "");
    assert_eq!(success.to_string(), "coverage: success");

    let skipped = SessionResult::Skipped {
        session: plugin_spec(),
        reason: "Not testing example on Python 3.6, supports [3.7]".to_string(),
        duration: Duration::ZERO,
    };
    assert!(skipped.is_skipped());
    assert!(!skipped.is_failure());
    assert_eq!(skipped.status_key(), "skipped");
    assert!(skipped.to_string().ends_with("(Not testing example on Python 3.6, supports [3.7])"));

    let failed = SessionResult::Failed {
        session: plugin_spec(),
        failure: Failure {
            command: "pytest".to_string(),
            code: Some(1),
            message: "Command pytest failed with exit code 1".to_string(),
            output: "E   assert False".to_string(),
        },
        duration: Duration::from_millis(10),
    };
    assert!(failed.is_failure());
    assert_eq!(failed.status_key(), "failed");
    assert_eq!(failed.output(), "E   assert False");
    assert_eq!(failed.duration(), Duration::from_millis(10));
    assert_eq!(failed.session(), &plugin_spec());
}
