//! Property tests for remote command quoting.

use std::process::Command;

use proptest::prelude::*;

use deploygate::infrastructure::shell::{is_env_name, quote};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: A quoted word reaches the shell as exactly one argument
    /// with its original bytes.
    #[cfg(unix)]
    #[test]
    fn property_quote_survives_the_shell(s in "[ -~\t\n]{0,40}") {
        let output = Command::new("sh")
            .arg("-c")
            .arg(format!("printf %s {}", quote(&s)))
            .output()
            .unwrap();

        prop_assert!(output.status.success());
        prop_assert_eq!(String::from_utf8_lossy(&output.stdout), s);
    }

    /// PROPERTY: Accepted variable names are plain identifiers.
    #[test]
    fn property_env_names_are_identifiers(s in "(?s).{0,16}") {
        if is_env_name(&s) {
            let mut chars = s.chars();
            let first = chars.next().unwrap();
            prop_assert!(first == '_' || first.is_ascii_alphabetic());
            prop_assert!(chars.all(|c| c == '_' || c.is_ascii_alphanumeric()));
        }
    }
}
