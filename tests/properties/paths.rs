//! Property tests for project ids and the paths derived from them.

use std::path::{Component, Path};

use proptest::prelude::*;

use deploygate::application::deploy::DeployOptions;
use deploygate::ProjectId;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Parsing a project id never panics.
    #[test]
    fn property_project_parse_never_panics(s in "(?s).{0,64}") {
        let _ = s.parse::<ProjectId>();
    }

    /// PROPERTY: Every accepted project id stays under the staging root.
    #[test]
    fn property_staging_path_stays_under_root(s in "[A-Za-z0-9./_~-]{1,48}") {
        if let Ok(project) = s.parse::<ProjectId>() {
            let root = Path::new("/var/lib/deploygate/staging");
            let path = project.staging_path(root);

            prop_assert!(path.starts_with(root));
            prop_assert!(path != root);
            let escapes = path
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::CurDir));
            prop_assert!(!escapes, "{} escapes via {:?}", s, path);
            prop_assert_eq!(path.parent(), Some(root), "{} nests below the root", s);
        }
    }

    /// PROPERTY: The remote directory is the project's base name, optionally
    /// under the configured root.
    #[test]
    fn property_remote_dir_ends_with_base_name(
        s in "[a-z0-9]{1,8}(/[a-z0-9]{1,8}){0,3}",
        root in proptest::option::of("[a-z/~]{0,12}"),
    ) {
        let project: ProjectId = s.parse().unwrap();
        let mut options = DeployOptions::default();
        if let Some(root) = root {
            options = options.with_remote_root(root);
        }

        let dir = options.remote_dir(&project);

        prop_assert!(dir.ends_with(project.base_name()));
        prop_assert!(!dir.starts_with('/') || options.remote_root.is_some());
    }
}
