mod common;

use common::{setup_project, write_config};
use plugin_matrix::core::config::{
    DEFAULT_PYTHON_VERSIONS, SessionMatrix, VenvBackend,
};

/// An empty file yields the stock matrix.
///
/// 空文件得到默认矩阵。
#[test]
fn test_empty_config_uses_defaults() {
    let config = SessionMatrix::parse("").unwrap();
    assert_eq!(config, SessionMatrix::default());
    assert_eq!(config.python_versions, DEFAULT_PYTHON_VERSIONS.to_vec());
    assert_eq!(config.install_commands, vec!["pip install .", "pip install -e ."]);
    assert_eq!(config.venv_backend, VenvBackend::Virtualenv);
    assert_eq!(config.coverage.fail_under, 80);
}

#[test]
fn test_full_config_parsing() {
    let toml_content = r#"
        language = "zh-CN"
        python_versions = ["3.8", "3.9"]
        default_interpreter = "python3.9"
        plugins_dir = "contrib"
        plugin_namespace = "acme_plugins"
        core_import = "import acme"
        install_commands = ["pip install --no-deps ."]
        envdir = "build/envs"
        venv_backend = "venv"

        [coverage]
        fail_under = 95
    "#;

    let config = SessionMatrix::parse(toml_content).unwrap();
    assert_eq!(config.language, "zh-CN");
    assert_eq!(config.python_versions, vec!["3.8", "3.9"]);
    assert_eq!(config.default_interpreter, "python3.9");
    assert_eq!(config.plugins_dir, "contrib");
    assert_eq!(config.plugin_namespace, "acme_plugins");
    assert_eq!(config.core_import, "import acme");
    assert_eq!(config.envdir, "build/envs");
    assert_eq!(config.venv_backend, VenvBackend::Venv);
    assert_eq!(config.coverage.fail_under, 95);
}

#[test]
fn test_invalid_config_is_rejected() {
    assert!(SessionMatrix::parse("python_versions = 3.6").is_err());
    assert!(SessionMatrix::parse("venv_backend = \"conda\"").is_err());
    assert!(SessionMatrix::parse("[coverage]\nfail_under = 300").is_err());
}

#[test]
fn test_env_override_replaces_configured_versions() {
    let config = SessionMatrix::default();
    assert_eq!(
        config.effective_python_versions(Some("3.6, 3.7,,3.6")),
        vec!["3.6", "3.7"]
    );
    assert_eq!(
        config.effective_python_versions(None),
        DEFAULT_PYTHON_VERSIONS.to_vec()
    );
}

#[test]
fn test_empty_env_override_gives_no_versions() {
    let config = SessionMatrix::default();
    assert!(config.effective_python_versions(Some("")).is_empty());
}

#[test]
fn test_install_commands_are_split_like_a_shell() {
    let config = SessionMatrix {
        install_commands: vec![
            "pip install .".to_string(),
            "pip  install   .".to_string(),
            "pip install --config-settings 'editable mode=compat' -e".to_string(),
        ],
        ..SessionMatrix::default()
    };
    let commands = config.parsed_install_commands().unwrap();
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0].argv(), ["pip", "install", "."]);
    assert_eq!(
        commands[1].argv(),
        ["pip", "install", "--config-settings", "editable mode=compat", "-e"]
    );
}

#[test]
fn test_install_commands_must_not_be_empty() {
    let none = SessionMatrix {
        install_commands: vec![],
        ..SessionMatrix::default()
    };
    assert!(none.parsed_install_commands().is_err());

    let blank = SessionMatrix {
        install_commands: vec!["   ".to_string()],
        ..SessionMatrix::default()
    };
    assert!(blank.parsed_install_commands().is_err());

    let unbalanced = SessionMatrix {
        install_commands: vec!["pip install 'oops".to_string()],
        ..SessionMatrix::default()
    };
    assert!(unbalanced.parsed_install_commands().is_err());
}

#[test]
fn test_resolve_without_file_uses_defaults() {
    let project = setup_project(&[]);
    let (config, path) = SessionMatrix::resolve(None, project.path()).unwrap();
    assert_eq!(config, SessionMatrix::default());
    assert!(path.is_none());
}

#[test]
fn test_resolve_finds_project_file() {
    let project = setup_project(&[]);
    let written = write_config(project.path(), "python_versions = [\"3.7\"]\n");
    let (config, path) = SessionMatrix::resolve(None, project.path()).unwrap();
    assert_eq!(config.python_versions, vec!["3.7"]);
    assert_eq!(path, Some(written));
}

#[test]
fn test_resolve_explicit_path_must_exist() {
    let project = setup_project(&[]);
    let missing = project.path().join("nope.toml");
    assert!(SessionMatrix::resolve(Some(&missing), project.path()).is_err());
}

#[test]
fn test_project_path_is_anchored_at_root() {
    let project = setup_project(&[]);
    let config = SessionMatrix::default();
    let path = config.project_path(project.path(), ".nox").unwrap();
    assert_eq!(path, project.path().join(".nox"));
}
