//! # Interpreter Compatibility Module / 解释器兼容性模块
//!
//! A plugin declares the interpreters it supports through its packaging
//! classifiers (`Programming Language :: Python :: 3.6`). `test_plugin`
//! reads them from `setup.py --classifiers` and skips the session when the
//! interpreter it runs on is not listed.
//!
//! 插件通过其打包分类器声明所支持的解释器。
//! `test_plugin` 从 `setup.py --classifiers` 读取它们，当运行的解释器未列出时跳过该会话。

/// Marker that identifies a Python classifier line.
pub const PYTHON_CLASSIFIER: &str = "Programming Language :: Python";

const PYTHON_VERSION_PREFIX: &str = "Programming Language :: Python :: ";

/// Extracts the declared interpreter versions from classifier output.
///
/// Every line mentioning [`PYTHON_CLASSIFIER`] contributes the text after
/// `Programming Language :: Python :: `. The bare marker line contributes an
/// empty string, and lines such as `... :: 3 :: Only` are kept verbatim
/// (`3 :: Only`); neither ever equals a real version, so they never cause a
/// false match.
///
/// 从分类器输出中提取声明的解释器版本。
pub fn supported_versions(classifier_output: &str) -> Vec<String> {
    classifier_output
        .lines()
        .map(str::trim)
        .filter(|line| line.contains(PYTHON_CLASSIFIER))
        .map(|line| line.strip_prefix(PYTHON_VERSION_PREFIX).unwrap_or("").to_string())
        .collect()
}

/// Exact membership: `3.6` does not match a plugin that only declares `3`.
pub fn is_supported(version: &str, supported: &[String]) -> bool {
    supported.iter().any(|v| v == version)
}

/// The message a skipped `test_plugin` session reports.
/// 被跳过的 `test_plugin` 会话报告的消息。
pub fn skip_reason(plugin_name: &str, version: &str, supported: &[String]) -> String {
    format!(
        "Not testing {} on Python {}, supports [{}]",
        plugin_name,
        version,
        supported.join(",")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETUP_OUTPUT: &str = "\
Programming Language :: Python
Programming Language :: Python :: 2.7
Programming Language :: Python :: 3.6
Operating System :: OS Independent
";

    #[test]
    fn extracts_versions_in_declaration_order() {
        assert_eq!(supported_versions(SETUP_OUTPUT), vec!["", "2.7", "3.6"]);
    }

    #[test]
    fn handles_crlf_output() {
        let output = "Programming Language :: Python :: 3.7\r\nLicense :: OSI Approved\r\n";
        assert_eq!(supported_versions(output), vec!["3.7"]);
    }

    #[test]
    fn membership_is_exact() {
        let supported = supported_versions(SETUP_OUTPUT);
        assert!(is_supported("3.6", &supported));
        assert!(!is_supported("3", &supported));
        assert!(!is_supported("3.5", &supported));
    }
}
