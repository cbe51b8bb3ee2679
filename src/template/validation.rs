// src/template/validation.rs

//! Validation of user-supplied ids, templates and repository registrations
//!
//! Every check collects messages instead of stopping at the first problem so
//! a caller can show them all at once.

use super::model::{Dependency, TemplateBuilder};
use crate::paths;

/// Characters that cannot appear in an id because ids become file names
pub const DISALLOWED_ID_CHARACTERS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Problems with a single id-like field
pub fn check_identifier(field: &str, value: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if value.trim().is_empty() {
        errors.push(format!("- {field} cannot be empty."));
        return errors;
    }

    let found: Vec<char> = value
        .chars()
        .filter(|c| DISALLOWED_ID_CHARACTERS.contains(c) || c.is_control())
        .collect();
    if !found.is_empty() {
        let listed: String = found.iter().map(|c| format!("'{}'", c.escape_default())).collect::<Vec<_>>().join(", ");
        errors.push(format!("- {field} '{value}' contains disallowed characters: {listed}."));
    } else if !paths::is_plain_file_name(value.trim()) {
        errors.push(format!("- {field} '{value}' is not a usable name."));
    }

    if value != value.trim() {
        errors.push(format!("- {field} '{value}' cannot start or end with whitespace."));
    }

    errors
}

/// Field-level problems with declared dependencies
pub fn check_dependencies(dependencies: &[Dependency]) -> Vec<String> {
    let mut errors = Vec::new();

    for (index, dependency) in dependencies.iter().enumerate() {
        let label = if dependency.name.trim().is_empty() {
            format!("#{}", index + 1)
        } else {
            dependency.name.clone()
        };

        if dependency.name.trim().is_empty() {
            errors.push(format!("- Dependency {label}: name cannot be empty."));
        }
        if dependency.version.trim().is_empty() {
            errors.push(format!("- Dependency {label}: version cannot be empty."));
        }
        if dependency.url.trim().is_empty() {
            errors.push(format!("- Dependency {label}: URL cannot be empty."));
        }
        if !dependency.name.trim().is_empty()
            && !dependency.version.trim().is_empty()
            && !paths::is_plain_file_name(&dependency.file_name())
        {
            errors.push(format!(
                "- Dependency {label}: name and version cannot form a file name."
            ));
        }

        let duplicated = dependencies[..index]
            .iter()
            .any(|previous| !dependency.name.is_empty() && previous.same_name(&dependency.name));
        if duplicated {
            errors.push(format!("- Dependency {label} is declared more than once."));
        }
    }

    errors
}

/// Problems with a template about to be saved
///
/// `existing_versions` are the versions already saved for the same id.
pub fn check_template(builder: &TemplateBuilder, existing_versions: &[String]) -> Vec<String> {
    let mut errors = check_identifier("Template id", builder.id());
    errors.extend(check_identifier("Template version", builder.version()));

    if existing_versions.iter().any(|v| v == builder.version()) {
        errors.push(format!(
            "- Version {} of {} already exists.",
            builder.version(),
            builder.id()
        ));
    }

    errors.extend(check_dependencies(builder.dependency_list()));
    errors
}

/// Problems with registering `name` at `locator` next to `existing` repositories
pub fn check_new_repository<'a, I>(name: &str, locator: &str, existing: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut errors = check_identifier("Repository id", name);

    if locator.trim().is_empty() {
        errors.push("- Repository URL cannot be empty.".to_string());
    }

    for (existing_name, existing_locator) in existing {
        if existing_name == name {
            errors.push(format!("- Repository id '{name}' is already in use."));
        }
        if !locator.is_empty() && existing_locator == locator {
            errors.push(format!(
                "- Repository URL {locator} is already used by '{existing_name}'."
            ));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_checks() {
        assert!(check_identifier("Template id", "wordpress").is_empty());
        assert!(check_identifier("Template id", "word press").is_empty());
        assert_eq!(check_identifier("Template id", "  ").len(), 1);
        let errors = check_identifier("Template id", "a/b:c");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'/'"));
        assert!(errors[0].contains("':'"));
        assert_eq!(check_identifier("Template id", " padded").len(), 1);
    }

    #[test]
    fn test_dot_names_are_rejected() {
        for value in [".", "..", " .. "] {
            let errors = check_identifier("Repository id", value);
            assert!(
                errors.iter().any(|e| e.contains("not a usable name")),
                "{value:?}: {errors:?}"
            );
        }
        assert!(check_identifier("Repository id", "..hidden").is_empty());

        let errors = check_new_repository("..", "/srv/x-repository.json", std::iter::empty());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_dependency_file_name_must_stay_plain() {
        let errors = check_dependencies(&[Dependency::new(
            "../../outside",
            "1",
            "https://example.com/outside.jar",
        )]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("file name"));
    }

    #[test]
    fn test_template_reports_every_problem() {
        let builder = TemplateBuilder::new("bad/id", "1.0").dependencies(vec![
            Dependency::new("lib", "", "https://example.com/lib.jar"),
            Dependency::new("LIB", "2", ""),
        ]);
        let errors = check_template(&builder, &["1.0".to_string()]);
        assert_eq!(errors.len(), 5, "{errors:?}");
    }

    #[test]
    fn test_valid_template() {
        let builder = TemplateBuilder::new("wordpress", "1.2").dependencies(vec![Dependency::new(
            "lib",
            "1",
            "https://example.com/lib.jar",
        )]);
        assert!(check_template(&builder, &["1.0".to_string(), "1.1".to_string()]).is_empty());
    }

    #[test]
    fn test_new_repository_duplicates() {
        let existing = vec![("local", "/tmp/local-repository.json"), ("test", "https://a/b.json")];
        let errors = check_new_repository("test", "https://a/b.json", existing.iter().copied());
        assert_eq!(errors.len(), 2);

        let errors = check_new_repository("other", "https://c/d.json", existing.iter().copied());
        assert!(errors.is_empty());
    }
}
